//! Features Module - the 21 cardiotocogram inputs
//!
//! `layout` is the schema, `record` the single row handed to the model.

pub mod layout;
pub mod record;


// Re-export common types
pub use layout::{
    default_values, feature_index, feature_names, layout_hash, FeatureSpec, LayoutInfo,
    FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION,
};
pub use record::{FeatureRecord, FeatureRecordBuilder};

//! Model Module - classifier handle and inference adapter
//!
//! `inference` owns the opaque classifier, `adapter` turns its raw output
//! into a health status, `status` holds the label/advisory table.

pub mod adapter;
pub mod inference;
pub mod status;


// Re-export common types
pub use adapter::{
    coerce_class_code, EngineStatus, EvaluationState, InferenceAdapter, MappingPolicy,
    PredictionResult,
};
pub use inference::{Classifier, ClassifierHandle, ModelMetadata, OnnxClassifier, RawInferenceOutput};
pub use status::{Advisory, AdvisoryTier, HealthStatus};

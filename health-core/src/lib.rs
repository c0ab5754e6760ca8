//! Fetal Health Classification - Core Library
//!
//! Collects the 21 cardiotocogram features into a single ordered row,
//! runs the pre-trained classifier on it and maps the class code to
//! Normal / Suspect / Pathological with an advisory message.
//!
//! ```text
//! FeatureRecord ──▶ InferenceAdapter ──▶ Classifier (ONNX)
//!                          │
//!                          ▼
//!                  PredictionResult { label, advisory }
//! ```

pub mod constants;
pub mod error;
pub mod logic;

pub use error::{ArtifactLoadError, ConversionError, FeatureError, InferenceError, PredictError};
pub use logic::features::{FeatureRecord, FeatureRecordBuilder, FeatureSpec, LayoutInfo, FEATURE_COUNT, FEATURE_LAYOUT};
pub use logic::model::{
    Advisory, AdvisoryTier, Classifier, ClassifierHandle, EngineStatus, EvaluationState,
    HealthStatus, InferenceAdapter, MappingPolicy, OnnxClassifier, PredictionResult,
    RawInferenceOutput,
};

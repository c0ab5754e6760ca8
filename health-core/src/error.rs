//! Error types

use std::path::PathBuf;

use thiserror::Error;

/// Model artifact could not be loaded. Fatal at startup.
#[derive(Debug, Error)]
pub enum ArtifactLoadError {
    #[error("Model not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Model unreadable: {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to load model: {0}")]
    Runtime(String),
}

/// Raw classifier output could not be interpreted as a number
#[derive(Debug, Clone, PartialEq, Error)]
#[error("could not convert {raw:?} to a number")]
pub struct ConversionError {
    pub raw: String,
}

/// The classifier call itself failed
#[derive(Debug, Clone, PartialEq, Error)]
#[error("InferenceError: {0}")]
pub struct InferenceError(pub String);

/// Per-evaluation failure. The process stays usable after any of these.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictError {
    #[error("Error in prediction conversion: {0}")]
    Conversion(#[from] ConversionError),

    #[error("Prediction not found in health status mapping: {0}")]
    UnmappedCode(i64),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error("Another evaluation is still in progress")]
    Busy,
}

/// Malformed feature input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeatureError {
    /// Sorted, deduplicated names
    #[error("Unknown feature(s): {}", .0.join(", "))]
    UnknownFeatures(Vec<String>),

    #[error("Expected {expected} feature values, got {actual}")]
    WrongLength { expected: usize, actual: usize },
}

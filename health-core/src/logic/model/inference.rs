//! Inference Engine - ONNX Runtime Integration
//!
//! The classifier is an opaque collaborator: it receives one row of 21
//! features in layout order and answers with a raw value that is expected
//! to be a class code. Loading happens once at startup; afterwards the
//! handle is only ever read.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ndarray::Array2;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use ort::session::{Session, builder::GraphOptimizationLevel};
use ort::value::Value;

use crate::error::{ArtifactLoadError, InferenceError};
use crate::logic::features::{layout_hash, FeatureRecord, FEATURE_COUNT, FEATURE_VERSION};

// ============================================================================
// RAW OUTPUT
// ============================================================================

/// Whatever the classifier handed back for the single row
#[derive(Debug, Clone, PartialEq)]
pub enum RawInferenceOutput {
    Numeric(f64),
    /// Non-numeric output, kept in textual form for the conversion step
    NonNumeric(String),
}

impl std::fmt::Display for RawInferenceOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RawInferenceOutput::Numeric(v) => write!(f, "{}", v),
            RawInferenceOutput::NonNumeric(s) => write!(f, "{}", s),
        }
    }
}

// ============================================================================
// CLASSIFIER TRAIT
// ============================================================================

/// Single-row classifier (ONNX, or a stub in tests)
pub trait Classifier: Send + Sync {
    fn predict_row(&self, record: &FeatureRecord) -> Result<RawInferenceOutput, InferenceError>;

    /// Human readable identification for status output
    fn name(&self) -> &str;

    /// Artifact details, for classifiers loaded from a file
    fn metadata(&self) -> Option<&ModelMetadata> {
        None
    }
}

/// Process-wide, read-only classifier shared by every evaluation
pub type ClassifierHandle = Arc<dyn Classifier>;

// ============================================================================
// MODEL METADATA
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub model_path: String,
    /// SHA-256 of the artifact bytes, hex encoded
    pub sha256: String,
    pub size_bytes: usize,
    pub features: usize,
    pub feature_version: u8,
    pub layout_hash: u32,
    pub loaded_at: chrono::DateTime<chrono::Utc>,
}

// ============================================================================
// ONNX IMPLEMENTATION
// ============================================================================

pub struct OnnxClassifier {
    // `Session::run` needs exclusive access
    session: Mutex<Session>,
    output_name: String,
    metadata: ModelMetadata,
}

impl OnnxClassifier {
    /// Load ONNX model from file
    pub fn load(model_path: impl AsRef<Path>) -> Result<Self, ArtifactLoadError> {
        let path = model_path.as_ref();
        log::info!("Loading ONNX model from: {}", path.display());

        if !path.exists() {
            return Err(ArtifactLoadError::NotFound(path.to_path_buf()));
        }

        let bytes = std::fs::read(path).map_err(|source| ArtifactLoadError::Unreadable {
            path: PathBuf::from(path),
            source,
        })?;

        Self::from_bytes(&bytes, path.display().to_string())
    }

    /// Load ONNX model from bytes
    pub fn from_bytes(model_bytes: &[u8], origin: String) -> Result<Self, ArtifactLoadError> {
        let session = Session::builder()
            .map_err(|e| ArtifactLoadError::Runtime(format!("Session builder error: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ArtifactLoadError::Runtime(format!("Optimization error: {}", e)))?
            .commit_from_memory(model_bytes)
            .map_err(|e| ArtifactLoadError::Runtime(format!("Load error: {}", e)))?;

        // sklearn-onnx classifiers put the predicted label first
        let output_name = session.outputs.first()
            .map(|o| o.name.clone())
            .ok_or_else(|| ArtifactLoadError::Runtime("No output defined".to_string()))?;

        let metadata = ModelMetadata {
            model_path: origin,
            sha256: hex::encode(Sha256::digest(model_bytes)),
            size_bytes: model_bytes.len(),
            features: FEATURE_COUNT,
            feature_version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            loaded_at: chrono::Utc::now(),
        };

        log::info!(
            "ONNX model loaded ({} bytes, sha256 {}, output '{}')",
            metadata.size_bytes, metadata.sha256, output_name
        );

        Ok(Self {
            session: Mutex::new(session),
            output_name,
            metadata,
        })
    }
}

impl Classifier for OnnxClassifier {
    fn predict_row(&self, record: &FeatureRecord) -> Result<RawInferenceOutput, InferenceError> {
        let input_array = Array2::<f32>::from_shape_vec(
            (1, FEATURE_COUNT),
            record.to_row_f32().to_vec(),
        ).map_err(|e| InferenceError(format!("Array error: {}", e)))?;

        let input_tensor = Value::from_array(input_array)
            .map_err(|e| InferenceError(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();
        let outputs = session.run(ort::inputs![input_tensor])
            .map_err(|e| InferenceError(format!("Inference failed: {}", e)))?;

        let output = outputs.get(&self.output_name)
            .ok_or_else(|| InferenceError("No output".to_string()))?;

        if let Ok((_, data)) = output.try_extract_tensor::<i64>() {
            return first_value(data.iter().map(|&v| v as f64));
        }
        if let Ok((_, data)) = output.try_extract_tensor::<f32>() {
            return first_value(data.iter().map(|&v| v as f64));
        }
        if let Ok((_, data)) = output.try_extract_tensor::<f64>() {
            return first_value(data.iter().copied());
        }
        // Classifiers trained on string classes export a string label
        if let Ok((_, labels)) = output.try_extract_strings() {
            return first_label(labels);
        }

        Ok(RawInferenceOutput::NonNumeric(format!(
            "<unsupported output tensor '{}'>",
            self.output_name
        )))
    }

    fn name(&self) -> &str {
        &self.metadata.model_path
    }

    fn metadata(&self) -> Option<&ModelMetadata> {
        Some(&self.metadata)
    }
}

fn first_value(mut values: impl Iterator<Item = f64>) -> Result<RawInferenceOutput, InferenceError> {
    values
        .next()
        .map(RawInferenceOutput::Numeric)
        .ok_or_else(|| InferenceError("Empty output tensor".to_string()))
}

fn first_label(labels: Vec<String>) -> Result<RawInferenceOutput, InferenceError> {
    labels
        .into_iter()
        .next()
        .map(RawInferenceOutput::NonNumeric)
        .ok_or_else(|| InferenceError("Empty output tensor".to_string()))
}

// ============================================================================
// TESTS
// ============================================================================

//! Inference Adapter
//!
//! FeatureRecord → classifier → class code → HealthStatus + advisory.
//! One synchronous attempt per evaluation, no retries.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};

use super::inference::{ClassifierHandle, RawInferenceOutput};
use super::status::{Advisory, HealthStatus};
use crate::error::{ConversionError, PredictError};
use crate::logic::features::{layout_hash, FeatureRecord, FEATURE_VERSION};

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// What to do with a class code outside {1, 2, 3}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingPolicy {
    /// Report label "Unknown" without an advisory
    #[default]
    Permissive,
    /// Fail the evaluation with `PredictError::UnmappedCode`
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationState {
    Idle,
    Evaluating,
}

/// Outcome of one evaluation. Built fresh per request, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub class_code: i64,
    pub status: HealthStatus,
    pub label: &'static str,
    pub advisory: Option<Advisory>,
    pub inference_time_us: u64,
}

/// Engine Status for UI
#[derive(Debug, Clone, Serialize)]
pub struct EngineStatus {
    pub model_loaded: bool,
    pub model_name: String,
    /// SHA-256 of the loaded artifact, when the classifier has one
    pub model_sha256: Option<String>,
    pub model_loaded_at: Option<chrono::DateTime<chrono::Utc>>,
    pub inference_device: String,
    pub mapping_policy: MappingPolicy,
    pub state: EvaluationState,
    pub feature_version: u8,
    pub layout_hash: u32,
    pub evaluation_count: u64,
    pub failure_count: u64,
    pub avg_latency_ms: f32,
}

// ============================================================================
// COERCION
// ============================================================================

/// Raw output → class code.
///
/// Text is parsed as a float first. The float is rounded half-to-even;
/// values beyond the i64 range saturate and end up unmapped.
pub fn coerce_class_code(raw: &RawInferenceOutput) -> Result<i64, ConversionError> {
    let value = match raw {
        RawInferenceOutput::Numeric(v) => *v,
        RawInferenceOutput::NonNumeric(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| ConversionError { raw: text.clone() })?,
    };

    if !value.is_finite() {
        return Err(ConversionError { raw: raw.to_string() });
    }

    Ok(value.round_ties_even() as i64)
}

// ============================================================================
// ADAPTER
// ============================================================================

pub struct InferenceAdapter {
    classifier: ClassifierHandle,
    policy: MappingPolicy,
    // Held for the duration of an evaluation
    gate: Mutex<()>,
    evaluations: AtomicU64,
    failures: AtomicU64,
    latency_sum_us: AtomicU64,
}

impl InferenceAdapter {
    pub fn new(classifier: ClassifierHandle) -> Self {
        Self::with_policy(classifier, MappingPolicy::default())
    }

    pub fn with_policy(classifier: ClassifierHandle, policy: MappingPolicy) -> Self {
        Self {
            classifier,
            policy,
            gate: Mutex::new(()),
            evaluations: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            latency_sum_us: AtomicU64::new(0),
        }
    }

    pub fn policy(&self) -> MappingPolicy {
        self.policy
    }

    pub fn state(&self) -> EvaluationState {
        if self.gate.is_locked() {
            EvaluationState::Evaluating
        } else {
            EvaluationState::Idle
        }
    }

    /// Run one evaluation to completion, waiting as long as needed for a
    /// running evaluation to finish first
    pub fn evaluate(&self, record: &FeatureRecord) -> Result<PredictionResult, PredictError> {
        let evaluating = self.gate.lock();
        self.evaluate_gated(record, evaluating)
    }

    /// Like [`evaluate`](Self::evaluate), but gives up with
    /// `PredictError::Busy` if another evaluation still holds the gate
    /// after `wait`. `on_start` runs once the gate is taken, before the
    /// classifier is called.
    pub fn evaluate_queued(
        &self,
        record: &FeatureRecord,
        wait: Duration,
        on_start: impl FnOnce(),
    ) -> Result<PredictionResult, PredictError> {
        let evaluating = self.gate.try_lock_for(wait).ok_or_else(|| {
            log::warn!("Evaluation rejected: gate still held after {:?}", wait);
            PredictError::Busy
        })?;
        on_start();
        self.evaluate_gated(record, evaluating)
    }

    fn evaluate_gated(
        &self,
        record: &FeatureRecord,
        _evaluating: MutexGuard<'_, ()>,
    ) -> Result<PredictionResult, PredictError> {
        let start_time = Instant::now();

        let outcome = self.run(record);
        let inference_time_us = start_time.elapsed().as_micros() as u64;

        self.evaluations.fetch_add(1, Ordering::Relaxed);
        self.latency_sum_us.fetch_add(inference_time_us, Ordering::Relaxed);

        match outcome {
            Ok((class_code, status)) => {
                log::info!(
                    "Evaluation: class code {} → {} ({}us)",
                    class_code, status, inference_time_us
                );
                Ok(PredictionResult {
                    class_code,
                    status,
                    label: status.label(),
                    advisory: status.advisory(),
                    inference_time_us,
                })
            }
            Err(e) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                log::warn!("Evaluation failed: {}", e);
                log::debug!("Failed record: {}", record.to_log_entry());
                Err(e)
            }
        }
    }

    fn run(&self, record: &FeatureRecord) -> Result<(i64, HealthStatus), PredictError> {
        let raw = self.classifier.predict_row(record)?;
        let class_code = coerce_class_code(&raw)?;
        let status = HealthStatus::from_code(class_code);

        if !status.is_mapped() {
            if self.policy == MappingPolicy::Strict {
                return Err(PredictError::UnmappedCode(class_code));
            }
            log::debug!("Class code {} has no mapping, reporting Unknown", class_code);
        }

        Ok((class_code, status))
    }

    pub fn status(&self) -> EngineStatus {
        let count = self.evaluations.load(Ordering::Relaxed);
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let avg = if count > 0 { (sum as f32 / count as f32) / 1000.0 } else { 0.0 };

        let metadata = self.classifier.metadata();

        EngineStatus {
            model_loaded: true,
            model_name: self.classifier.name().to_string(),
            model_sha256: metadata.map(|m| m.sha256.clone()),
            model_loaded_at: metadata.map(|m| m.loaded_at),
            inference_device: "ONNX Runtime (CPU)".to_string(),
            mapping_policy: self.policy,
            state: self.state(),
            feature_version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            evaluation_count: count,
            failure_count: self.failures.load(Ordering::Relaxed),
            avg_latency_ms: avg,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_integers_and_floats() {
        assert_eq!(coerce_class_code(&RawInferenceOutput::Numeric(1.0)), Ok(1));
        assert_eq!(coerce_class_code(&RawInferenceOutput::Numeric(2.4)), Ok(2));
        assert_eq!(coerce_class_code(&RawInferenceOutput::Numeric(2.6)), Ok(3));
        assert_eq!(coerce_class_code(&RawInferenceOutput::Numeric(-0.4)), Ok(0));
    }

    #[test]
    fn test_coerce_rounds_half_to_even() {
        assert_eq!(coerce_class_code(&RawInferenceOutput::Numeric(1.5)), Ok(2));
        assert_eq!(coerce_class_code(&RawInferenceOutput::Numeric(2.5)), Ok(2));
        assert_eq!(coerce_class_code(&RawInferenceOutput::Numeric(3.5)), Ok(4));
    }

    #[test]
    fn test_coerce_numeric_text() {
        let raw = RawInferenceOutput::NonNumeric(" 3.0 ".to_string());
        assert_eq!(coerce_class_code(&raw), Ok(3));
    }

    #[test]
    fn test_coerce_rejects_garbage() {
        let raw = RawInferenceOutput::NonNumeric("Pathological".to_string());
        let err = coerce_class_code(&raw).unwrap_err();
        assert_eq!(err.raw, "Pathological");
    }

    #[test]
    fn test_coerce_rejects_non_finite() {
        assert!(coerce_class_code(&RawInferenceOutput::Numeric(f64::NAN)).is_err());
        assert!(coerce_class_code(&RawInferenceOutput::Numeric(f64::INFINITY)).is_err());
        assert!(coerce_class_code(&RawInferenceOutput::NonNumeric("nan".into())).is_err());
    }

    #[test]
    fn test_coerce_saturates_huge_values() {
        assert_eq!(coerce_class_code(&RawInferenceOutput::Numeric(1e300)), Ok(i64::MAX));
    }
}

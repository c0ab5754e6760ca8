//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.

/// Default model artifact path (ONNX export of the trained classifier)
pub const DEFAULT_MODEL_PATH: &str = "fetal-health-adasyn.onnx";

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 8080;

/// Upper bound for a single evaluation (seconds)
pub const DEFAULT_INFERENCE_TIMEOUT_SECS: u64 = 10;

/// App name
pub const APP_NAME: &str = "Fetal Health Classification";

/// Label of the form's trigger action
pub const PREDICT_ACTION_LABEL: &str = "Predict Fetal Health Status";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get model path from environment or use default
pub fn get_model_path() -> String {
    std::env::var("MODEL_PATH")
        .unwrap_or_else(|_| DEFAULT_MODEL_PATH.to_string())
}

/// Get inference timeout from environment or use default
pub fn get_inference_timeout_secs() -> u64 {
    std::env::var("INFERENCE_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|&s| s > 0)
        .unwrap_or(DEFAULT_INFERENCE_TIMEOUT_SECS)
}

/// Check if unmapped class codes should fail instead of reporting Unknown
pub fn is_strict_mapping() -> bool {
    std::env::var("STRICT_MAPPING")
        .map(|s| {
            let s = s.to_lowercase();
            s == "true" || s == "1"
        })
        .unwrap_or(false)
}

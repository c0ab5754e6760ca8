//! Configuration module

use std::env;
use std::time::Duration;

use fetal_health_core::constants;
use fetal_health_core::MappingPolicy;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Path of the ONNX model artifact
    pub model_path: String,

    /// Handling of class codes outside {1, 2, 3}
    pub mapping_policy: MappingPolicy,

    /// Upper bound for one evaluation
    pub inference_timeout: Duration,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(constants::DEFAULT_PORT),

            model_path: constants::get_model_path(),

            mapping_policy: if constants::is_strict_mapping() {
                MappingPolicy::Strict
            } else {
                MappingPolicy::Permissive
            },

            inference_timeout: Duration::from_secs(constants::get_inference_timeout_secs()),

            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: constants::DEFAULT_PORT,
            model_path: constants::DEFAULT_MODEL_PATH.to_string(),
            mapping_policy: MappingPolicy::Permissive,
            inference_timeout: Duration::from_secs(constants::DEFAULT_INFERENCE_TIMEOUT_SECS),
            environment: "development".to_string(),
        }
    }
}

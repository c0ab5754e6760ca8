//! Prediction API models

use std::collections::HashMap;

use fetal_health_core::{FeatureRecord, PredictionResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Named features; absent names take their documented default
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub features: HashMap<String, f64>,
}

/// The 21 values in model column order
#[derive(Debug, Deserialize, Validate)]
pub struct PredictValuesRequest {
    #[validate(length(equal = 21, message = "exactly 21 feature values are required"))]
    pub values: Vec<f64>,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub evaluation_id: Uuid,
    pub features: FeatureRecord,
    #[serde(flatten)]
    pub result: PredictionResult,
    pub evaluated_at: i64,
}

impl PredictResponse {
    pub fn new(features: FeatureRecord, result: PredictionResult) -> Self {
        Self {
            evaluation_id: Uuid::new_v4(),
            features,
            result,
            evaluated_at: chrono::Utc::now().timestamp(),
        }
    }
}

//! Error handling

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use fetal_health_core::{FeatureError, PredictError};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    // Input errors
    #[error("{0}")]
    ValidationError(String),

    // Evaluation errors
    #[error(transparent)]
    Prediction(#[from] PredictError),

    #[error("Inference timed out")]
    Timeout,

    // Generic errors
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::Prediction(PredictError::Conversion(_))
            | AppError::Prediction(PredictError::UnmappedCode(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Prediction(PredictError::Inference(_)) => StatusCode::BAD_GATEWAY,
            AppError::Prediction(PredictError::Busy) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_message = match &self {
            AppError::Prediction(PredictError::Inference(e)) => {
                tracing::error!("Inference error: {}", e);
                "Inference failed".to_string()
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<FeatureError> for AppError {
    fn from(err: FeatureError) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

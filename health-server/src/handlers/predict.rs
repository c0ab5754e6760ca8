//! Prediction API handlers

use axum::{extract::State, Json};
use fetal_health_core::{EngineStatus, FeatureRecord, LayoutInfo};
use validator::Validate;

use crate::{AppResult, AppState};
use crate::models::{PredictRequest, PredictResponse, PredictValuesRequest};

/// Evaluate named features
pub async fn predict(
    State(state): State<AppState>,
    Json(req): Json<PredictRequest>,
) -> AppResult<Json<PredictResponse>> {
    let record = FeatureRecord::from_named(&req.features)?;
    let result = super::evaluate(&state, record).await?;

    Ok(Json(PredictResponse::new(record, result)))
}

/// Evaluate an ordered row of 21 values
pub async fn predict_values(
    State(state): State<AppState>,
    Json(req): Json<PredictValuesRequest>,
) -> AppResult<Json<PredictResponse>> {
    req.validate()?;

    let record = FeatureRecord::from_slice(&req.values)?;
    let result = super::evaluate(&state, record).await?;

    Ok(Json(PredictResponse::new(record, result)))
}

/// Feature layout (names, labels, defaults, precision, help)
pub async fn features() -> Json<LayoutInfo> {
    Json(LayoutInfo::current())
}

pub async fn engine_status(State(state): State<AppState>) -> Json<EngineStatus> {
    Json(state.adapter.status())
}

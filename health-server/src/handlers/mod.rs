//! HTTP handlers

pub mod health;
pub mod form;
pub mod predict;

#[cfg(test)]
mod tests;

use fetal_health_core::{FeatureRecord, PredictionResult};
use tokio::sync::oneshot;

use crate::{AppError, AppResult, AppState};

/// Run one evaluation off the async runtime.
///
/// Waiting for a concurrent evaluation and running the classifier are bounded
/// separately, each by the configured timeout. A request that cannot take the
/// gate fails with `Busy` instead of timing out behind an abandoned task.
pub(crate) async fn evaluate(state: &AppState, record: FeatureRecord) -> AppResult<PredictionResult> {
    let adapter = state.adapter.clone();
    let limit = state.config.inference_timeout;
    let (started_tx, started_rx) = oneshot::channel();

    let mut task = tokio::task::spawn_blocking(move || {
        adapter.evaluate_queued(&record, limit, move || {
            let _ = started_tx.send(());
        })
    });

    // Sender dropped without a signal: the gate was never taken and the task
    // is already finishing with `Busy`
    let _ = started_rx.await;

    match tokio::time::timeout(limit, &mut task).await {
        Ok(Ok(result)) => Ok(result?),
        Ok(Err(join_error)) => Err(AppError::InternalError(join_error.to_string())),
        Err(_) => {
            tracing::warn!("Evaluation exceeded {:?}", limit);
            Err(AppError::Timeout)
        }
    }
}

//! Fetal Health Classification Server
//!
//! Serves the cardiotocogram form and a small JSON API in front of a
//! pre-trained classifier.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 FETAL HEALTH CLASSIFICATION                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌───────────┐  ┌─────────────────────────┐ │
//! │  │  Form     │  │  JSON API │  │  Health / Engine status │ │
//! │  │  (HTML)   │  │  (Axum)   │  │                         │ │
//! │  └─────┬─────┘  └─────┬─────┘  └────────────┬────────────┘ │
//! │        └──────────────┼──────────────────────┘              │
//! │                       ▼                                     │
//! │                ┌──────────────────┐                         │
//! │                │ InferenceAdapter │──▶ ONNX classifier      │
//! │                └──────────────────┘                         │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod handlers;
mod models;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use fetal_health_core::{InferenceAdapter, OnnxClassifier};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "fetal_health_server=debug,fetal_health_core=info,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = config::Config::from_env();

    tracing::info!("Fetal Health Classification server starting...");
    tracing::info!("Environment: {}", config.environment);
    tracing::info!("Model: {} (mapping: {:?})", config.model_path, config.mapping_policy);

    // Load the classifier once; nothing can be served without it
    let classifier = OnnxClassifier::load(&config.model_path)
        .map_err(|e| {
            tracing::error!("Model artifact could not be loaded: {}", e);
            e
        })
        .with_context(|| format!("Failed to load model artifact {}", config.model_path))?;

    let adapter = InferenceAdapter::with_policy(Arc::new(classifier), config.mapping_policy);

    // Build application state
    let state = AppState {
        adapter: Arc::new(adapter),
        config: config.clone(),
    };

    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await
        .context("Server error")?;

    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub adapter: Arc<InferenceAdapter>,
    pub config: config::Config,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    let form_routes = Router::new()
        .route("/", get(handlers::form::show).post(handlers::form::submit));

    let api_routes = Router::new()
        .route("/health", get(handlers::health::check))
        .route("/api/v1/features", get(handlers::predict::features))
        .route("/api/v1/predict", post(handlers::predict::predict))
        .route("/api/v1/predict/values", post(handlers::predict::predict_values))
        .route("/api/v1/engine/status", get(handlers::predict::engine_status));

    Router::new()
        .merge(form_routes)
        .merge(api_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}

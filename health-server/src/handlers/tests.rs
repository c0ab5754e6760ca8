//! Router tests with stub classifiers

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use fetal_health_core::{
    Classifier, FeatureRecord, InferenceAdapter, InferenceError, MappingPolicy,
    RawInferenceOutput, FEATURE_LAYOUT,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::{config::Config, create_router, AppState};

struct FixedClassifier(RawInferenceOutput);

impl Classifier for FixedClassifier {
    fn predict_row(&self, _record: &FeatureRecord) -> Result<RawInferenceOutput, InferenceError> {
        Ok(self.0.clone())
    }

    fn name(&self) -> &str {
        "stub"
    }
}

/// Stalls on its first call only
struct SlowFirstClassifier {
    stall: Duration,
    stalled: AtomicBool,
}

impl Classifier for SlowFirstClassifier {
    fn predict_row(&self, _record: &FeatureRecord) -> Result<RawInferenceOutput, InferenceError> {
        if !self.stalled.swap(true, Ordering::SeqCst) {
            std::thread::sleep(self.stall);
        }
        Ok(RawInferenceOutput::Numeric(1.0))
    }

    fn name(&self) -> &str {
        "slow"
    }
}

fn app_with(raw: RawInferenceOutput, policy: MappingPolicy) -> Router {
    let adapter = InferenceAdapter::with_policy(Arc::new(FixedClassifier(raw)), policy);
    create_router(AppState {
        adapter: Arc::new(adapter),
        config: Config::default(),
    })
}

fn app(code: f64) -> Router {
    app_with(RawInferenceOutput::Numeric(code), MappingPolicy::Permissive)
}

fn default_form_body() -> String {
    FEATURE_LAYOUT
        .iter()
        .map(|spec| format!("{}={}", spec.name.replace(' ', "+"), spec.format_value(spec.default)))
        .collect::<Vec<_>>()
        .join("&")
}

fn form_request(body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

#[tokio::test]
async fn test_form_page_lists_all_features() {
    let response = app(1.0)
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let page = body_text(response).await;
    assert!(page.contains("Predict Fetal Health Status"));
    for spec in &FEATURE_LAYOUT {
        assert!(page.contains(spec.label), "missing {}", spec.label);
    }
    assert!(page.contains("The baseline fetal heart rate in beats per minute (bpm)."));
}

#[tokio::test]
async fn test_form_submit_normal() {
    let response = app(1.0).oneshot(form_request(default_form_body())).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let page = body_text(response).await;
    assert!(page.contains("Predicted Fetal Health Status: Normal"));
    assert!(page.contains(
        r#"<div class="suggestion success">The fetal health status is Normal. Continue regular check-ups.</div>"#
    ));
}

#[tokio::test]
async fn test_form_submit_pathological() {
    let response = app(3.0).oneshot(form_request(default_form_body())).await.unwrap();

    let page = body_text(response).await;
    assert!(page.contains("Predicted Fetal Health Status: Pathological"));
    assert!(page.contains(r#"class="suggestion error""#));
}

#[tokio::test]
async fn test_form_submit_unknown_has_no_advisory() {
    let response = app(4.0).oneshot(form_request(default_form_body())).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let page = body_text(response).await;
    assert!(page.contains("Predicted Fetal Health Status: Unknown"));
    assert!(!page.contains(r#"class="suggestion"#));
}

#[tokio::test]
async fn test_form_submit_conversion_error_is_inline() {
    let app = app_with(
        RawInferenceOutput::NonNumeric("abc".to_string()),
        MappingPolicy::Permissive,
    );
    let response = app.oneshot(form_request(default_form_body())).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let page = body_text(response).await;
    assert!(page.contains("Error in prediction conversion"));
    assert!(!page.contains("Predicted Fetal Health Status:"));
}

#[tokio::test]
async fn test_form_submit_keeps_entered_values() {
    let body = default_form_body().replace("baseline+value=120.00", "baseline+value=141.50");
    let response = app(2.0).oneshot(form_request(body)).await.unwrap();

    let page = body_text(response).await;
    assert!(page.contains(r#"value="141.50""#));
    assert!(page.contains("Predicted Fetal Health Status: Suspect"));
}

#[tokio::test]
async fn test_form_submit_rejects_non_numeric_input() {
    let body = default_form_body().replace("histogram_mode=120.00", "histogram_mode=abc");
    let response = app(1.0).oneshot(form_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let page = body_text(response).await;
    assert!(page.contains("Histogram Mode must be a number"));
}

#[tokio::test]
async fn test_api_predict_named_features() {
    let request = json_request(
        "/api/v1/predict",
        json!({ "features": { "baseline value": 150.0, "histogram_tendency": -1.0 } }),
    );
    let response = app(2.0).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["label"], "Suspect");
    assert_eq!(body["class_code"], 2);
    assert_eq!(body["advisory"]["tier"], "warning");
    assert_eq!(body["features"]["baseline value"], 150.0);
    assert_eq!(body["features"]["histogram_min"], 62.0);
}

#[tokio::test]
async fn test_api_predict_unknown_feature() {
    let request = json_request("/api/v1/predict", json!({ "features": { "heart_rate": 1.0 } }));
    let response = app(1.0).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Unknown feature(s): heart_rate");
}

#[tokio::test]
async fn test_api_predict_unknown_code() {
    let request = json_request("/api/v1/predict", json!({}));
    let response = app(4.0).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["label"], "Unknown");
    assert!(body["advisory"].is_null());
}

#[tokio::test]
async fn test_api_predict_strict_unknown_code() {
    let app = app_with(RawInferenceOutput::Numeric(4.0), MappingPolicy::Strict);
    let response = app.oneshot(json_request("/api/v1/predict", json!({}))).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_api_predict_conversion_error() {
    let app = app_with(
        RawInferenceOutput::NonNumeric("n/a".to_string()),
        MappingPolicy::Permissive,
    );
    let response = app.oneshot(json_request("/api/v1/predict", json!({}))).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().starts_with("Error in prediction conversion"));
}

#[tokio::test]
async fn test_api_predict_values() {
    let values: Vec<f64> = FEATURE_LAYOUT.iter().map(|spec| spec.default).collect();
    let request = json_request("/api/v1/predict/values", json!({ "values": values }));
    let response = app(1.0).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["label"], "Normal");
}

#[tokio::test]
async fn test_api_predict_values_wrong_length() {
    let request = json_request("/api/v1/predict/values", json!({ "values": [1.0, 2.0] }));
    let response = app(1.0).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_features_endpoint() {
    let response = app(1.0)
        .oneshot(Request::builder().uri("/api/v1/features").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let body = body_json(response).await;
    assert_eq!(body["feature_count"], 21);
    assert_eq!(body["features"][0]["name"], "baseline value");
    assert_eq!(body["features"][0]["precision"], 2);
}

#[tokio::test]
async fn test_engine_status_and_health() {
    let app = app(1.0);
    app.clone().oneshot(json_request("/api/v1/predict", json!({}))).await.unwrap();

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/api/v1/engine/status").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["evaluation_count"], 1);
    assert_eq!(body["state"], "idle");
    assert_eq!(body["mapping_policy"], "permissive");
    assert!(body["model_sha256"].is_null());

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model"], "stub");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_timed_out_evaluation_does_not_stall_later_requests() {
    let classifier = SlowFirstClassifier {
        stall: Duration::from_millis(600),
        stalled: AtomicBool::new(false),
    };
    let app = create_router(AppState {
        adapter: Arc::new(InferenceAdapter::new(Arc::new(classifier))),
        config: Config {
            inference_timeout: Duration::from_millis(200),
            ..Config::default()
        },
    });

    let response = app.clone().oneshot(json_request("/api/v1/predict", json!({}))).await.unwrap();
    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body_json(response).await["error"], "Inference timed out");

    // The abandoned evaluation still holds the gate
    let response = app.clone().oneshot(json_request("/api/v1/predict", json!({}))).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["error"], "Another evaluation is still in progress");

    tokio::time::sleep(Duration::from_millis(500)).await;

    let response = app.clone().oneshot(json_request("/api/v1/predict", json!({}))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["label"], "Normal");

    let response = app
        .oneshot(Request::builder().uri("/api/v1/engine/status").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["state"], "idle");
    assert_eq!(body["evaluation_count"], 2);
}

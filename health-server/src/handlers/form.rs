//! Form handlers
//!
//! Server-rendered page: 21 numeric inputs in the sidebar, the prediction
//! banner and advisory panel in the main column.

use std::fmt::Write as _;

use axum::{
    extract::State,
    http::StatusCode,
    response::Html,
    Form,
};
use fetal_health_core::constants::{APP_NAME, PREDICT_ACTION_LABEL};
use fetal_health_core::{FeatureRecord, PredictError, PredictionResult, FEATURE_LAYOUT};

use crate::{AppError, AppState};

/// What the main column shows below the title
pub enum Outcome {
    Prediction(PredictionResult),
    Error(String),
}

/// Form with every input at its default
pub async fn show() -> Html<String> {
    Html(render_page(&FeatureRecord::defaults(), None))
}

/// "Predict Fetal Health Status" submit
pub async fn submit(
    State(state): State<AppState>,
    Form(fields): Form<Vec<(String, String)>>,
) -> (StatusCode, Html<String>) {
    let record = match parse_fields(&fields) {
        Ok(record) => record,
        Err((partial, message)) => {
            tracing::debug!("Rejected form submit: {}", message);
            let page = render_page(&partial, Some(&Outcome::Error(message)));
            return (StatusCode::UNPROCESSABLE_ENTITY, Html(page));
        }
    };

    let outcome = match super::evaluate(&state, record).await {
        Ok(result) => Outcome::Prediction(result),
        Err(AppError::Prediction(e)) if e != PredictError::Busy => Outcome::Error(e.to_string()),
        Err(e) => {
            let status = e.status_code();
            tracing::warn!("Form evaluation failed: {}", e);
            return (status, Html(render_page(&record, Some(&Outcome::Error(e.to_string())))));
        }
    };

    (StatusCode::OK, Html(render_page(&record, Some(&outcome))))
}

/// Form fields → record.
///
/// On failure returns the record built from the fields that did parse,
/// so the page can be shown again with the user's input.
fn parse_fields(fields: &[(String, String)]) -> Result<FeatureRecord, (FeatureRecord, String)> {
    let mut record = FeatureRecord::defaults();
    let mut problem = None;

    for (name, raw) in fields {
        let Some(spec) = FEATURE_LAYOUT.iter().find(|spec| spec.name == name) else {
            problem.get_or_insert_with(|| format!("Unknown feature: {}", name));
            continue;
        };
        match raw.trim().parse::<f64>() {
            Ok(value) => {
                record.set_by_name(spec.name, value);
            }
            Err(_) => {
                problem.get_or_insert_with(|| format!("{} must be a number, got {:?}", spec.label, raw));
            }
        }
    }

    match problem {
        None => Ok(record),
        Some(message) => Err((record, message)),
    }
}

// ============================================================================
// RENDERING
// ============================================================================

const STYLE: &str = r#"
body { margin: 0; font-family: Arial, sans-serif; background-color: #f7f9fc; display: flex; }
.sidebar { width: 360px; padding: 10px 20px; background: #eef1f6; height: 100vh; overflow-y: auto; }
.sidebar label { display: block; margin-top: 10px; font-size: 0.9em; }
.sidebar input { width: 100%; box-sizing: border-box; border: 2px solid #ff7f50; border-radius: 5px; padding: 5px; }
.main-content { flex: 1; max-width: 800px; margin: auto; padding: 20px; }
h1 { color: #4A4A4A; font-size: 2.5em; font-weight: 600; text-align: center; }
button { background-color: #ff7f50; color: white; border: none; padding: 10px 25px; font-size: 16px; margin: 10px 2px; cursor: pointer; border-radius: 8px; }
button:hover { background-color: #e67342; }
.prediction-box { background-color: black; color: white; padding: 20px; border-radius: 10px; text-align: center; font-size: 1.5em; }
.suggestion { margin-top: 20px; padding: 15px; border-radius: 5px; color: white; }
.success { background-color: #28a745; }
.warning { background-color: #ffc107; }
.error { background-color: #dc3545; }
.conversion-error { margin-top: 20px; color: #dc3545; }
"#;

pub fn render_page(record: &FeatureRecord, outcome: Option<&Outcome>) -> String {
    let mut inputs = String::new();
    for (spec, (_, value)) in FEATURE_LAYOUT.iter().zip(record.iter()) {
        let _ = write!(
            inputs,
            r#"<label title="{help}">{label}<input type="number" name="{name}" value="{value}" step="{step}" title="{help}" required></label>"#,
            help = escape_html(spec.help),
            label = escape_html(spec.label),
            name = escape_html(spec.name),
            value = spec.format_value(value),
            step = spec.step(),
        );
        inputs.push('\n');
    }

    let result = match outcome {
        None => String::new(),
        Some(Outcome::Prediction(result)) => render_prediction(result),
        Some(Outcome::Error(message)) => format!(
            r#"<div class="conversion-error">{}</div>"#,
            escape_html(message)
        ),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>{style}</style>
</head>
<body>
<form class="sidebar" method="post" action="/" id="features">
<h2>Enter Features for Prediction</h2>
{inputs}</form>
<div class="main-content">
<h1>{title}</h1>
<button type="submit" form="features">{action}</button>
{result}
</div>
</body>
</html>
"#,
        title = APP_NAME,
        style = STYLE,
        inputs = inputs,
        action = PREDICT_ACTION_LABEL,
        result = result,
    )
}

fn render_prediction(result: &PredictionResult) -> String {
    let mut html = format!(
        r#"<div class="prediction-box">Predicted Fetal Health Status: {}</div>"#,
        result.label
    );
    if let Some(advisory) = &result.advisory {
        let _ = write!(
            html,
            r#"<div class="suggestion {}">{}</div>"#,
            advisory.tier.as_str(),
            escape_html(&advisory.message)
        );
    }
    html
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

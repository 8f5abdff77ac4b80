//! Health check endpoint
//!
//! Runs a canary prediction through the loaded model so a broken artifact
//! reports unhealthy instead of merely "running".

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tracing::error;

use crate::AppState;

/// Text classified on every health check
pub const HEALTH_CANARY_TEXT: &str = "test login issue";

#[derive(Debug, Serialize)]
pub struct Components {
    pub model_loaded: bool,
    pub vectorizer_loaded: bool,
    pub smart_classifier_ready: bool,
    pub api_server: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Diagnostics {
    pub test_prediction: String,
    pub test_confidence: f64,
    pub total_predictions: u64,
    pub average_confidence: f64,
    pub system_uptime: f64,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub components: Components,
    pub diagnostics: Diagnostics,
    pub message: String,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Response {
    let timestamp = Utc::now().to_rfc3339();

    let prediction = match state.triage.predict(HEALTH_CANARY_TEXT) {
        Ok(prediction) => prediction,
        Err(e) => {
            error!(error = %e, "Health check canary prediction failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "status": "unhealthy",
                    "error": e.to_string(),
                    "timestamp": timestamp,
                })),
            )
                .into_response();
        }
    };

    let stats = state.triage.aggregator().snapshot();

    Json(HealthResponse {
        status: "healthy",
        timestamp,
        components: Components {
            model_loaded: true,
            vectorizer_loaded: true,
            smart_classifier_ready: true,
            api_server: "RUNNING",
        },
        diagnostics: Diagnostics {
            test_confidence: prediction.confidence(),
            test_prediction: prediction.category,
            total_predictions: stats.total_predictions,
            average_confidence: stats.average_confidence,
            system_uptime: stats.system_uptime,
        },
        message: format!("All systems operational ({})", state.triage.classifier().name()),
    })
    .into_response()
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

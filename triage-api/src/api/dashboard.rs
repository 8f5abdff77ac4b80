//! System dashboard endpoint

use axum::{extract::State, Json};
use serde::Serialize;

use crate::services::metrics_aggregator::{AggregateStats, SystemHealth};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ConfidenceThresholds {
    pub auto_resolve: f64,
    pub human_review: f64,
    pub medium_confidence: [f64; 2],
}

#[derive(Debug, Serialize)]
pub struct ModelInfo {
    pub model_type: String,
    pub version: String,
    pub categories: Vec<String>,
    pub smart_features_enabled: bool,
    pub confidence_thresholds: ConfidenceThresholds,
}

#[derive(Debug, Serialize)]
pub struct Endpoints {
    pub basic_classification: &'static str,
    pub smart_classification: &'static str,
    pub batch_classification: &'static str,
    pub dashboard: &'static str,
    pub health: &'static str,
    pub test: &'static str,
}

const ENDPOINTS: Endpoints = Endpoints {
    basic_classification: "/classify",
    smart_classification: "/classify_smart",
    batch_classification: "/batch_classify",
    dashboard: "/dashboard",
    health: "/health",
    test: "/test",
};

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub status: &'static str,
    pub system_health: SystemHealth,
    pub system_metrics: AggregateStats,
    pub model_info: ModelInfo,
    pub endpoints: Endpoints,
}

/// GET /dashboard
pub async fn dashboard(State(state): State<AppState>) -> Json<DashboardResponse> {
    let stats = state.triage.aggregator().snapshot();
    let classifier = state.triage.classifier();
    let thresholds = state.thresholds();

    Json(DashboardResponse {
        status: "success",
        system_health: SystemHealth::from_stats(&stats),
        system_metrics: stats,
        model_info: ModelInfo {
            model_type: classifier.name().to_string(),
            version: classifier.version().to_string(),
            categories: classifier.categories(),
            smart_features_enabled: true,
            confidence_thresholds: ConfidenceThresholds {
                auto_resolve: thresholds.auto_resolve_threshold,
                human_review: thresholds.human_review_threshold,
                medium_confidence: [
                    thresholds.human_review_threshold,
                    thresholds.auto_resolve_threshold,
                ],
            },
        },
        endpoints: ENDPOINTS,
    })
}

//! triage-api library - ticket classification and confidence routing
//!
//! Wraps a pre-trained text classifier with routing rules and running
//! prediction statistics, exposed over HTTP.

use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use triage_common::config::RoutingThresholds;

pub mod api;
pub mod classifier;
pub mod error;
pub mod services;

pub use error::{ApiError, ApiResult};

use classifier::Classifier;
use services::{ConfidenceRouter, MetricsAggregator, SmartClassifier};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Classification pipeline (model, routing policy, metrics)
    pub triage: SmartClassifier,
}

impl AppState {
    /// Create new application state
    ///
    /// `history_capacity` bounds the retained prediction history; `None` or
    /// `Some(0)` keeps every record.
    pub fn new(
        classifier: Arc<dyn Classifier>,
        thresholds: RoutingThresholds,
        history_capacity: Option<usize>,
    ) -> Self {
        let aggregator = Arc::new(MetricsAggregator::new(thresholds, history_capacity));
        Self {
            triage: SmartClassifier::new(classifier, ConfidenceRouter::new(thresholds), aggregator),
        }
    }

    pub fn thresholds(&self) -> RoutingThresholds {
        self.triage.router().thresholds()
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let pages = Router::new()
        .route("/", get(api::serve_index))
        .route("/test", get(api::serve_test_page));

    let classification = Router::new()
        .route("/classify", post(api::classify))
        .route("/classify_smart", post(api::classify_smart))
        .route("/batch_classify", post(api::batch_classify));

    let monitoring = Router::new()
        .route("/dashboard", get(api::dashboard))
        .route("/api/buildinfo", get(api::get_build_info))
        .merge(api::health_routes());

    Router::new()
        .merge(pages)
        .merge(classification)
        .merge(monitoring)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

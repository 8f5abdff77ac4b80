//! Triage services layered over the classifier
//!
//! - `confidence_router`: routing policy from (category, confidence)
//! - `metrics_aggregator`: shared prediction history and statistics
//! - `smart_classifier`: normalize → classify → route → record pipeline

pub mod confidence_router;
pub mod metrics_aggregator;
pub mod smart_classifier;

pub use confidence_router::{
    AlternativeCategory, ConfidenceLevel, ConfidenceRouter, Priority, RiskLevel, RoutingAction,
    RoutingDecision, RoutingOutcome,
};
pub use metrics_aggregator::{round_to, AggregateStats, MetricsAggregator, SystemHealth};
pub use smart_classifier::{BasicClassification, SmartClassification, SmartClassifier};

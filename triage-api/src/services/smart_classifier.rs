//! Smart classification pipeline
//!
//! Wraps a [`Classifier`] with confidence routing and metrics recording. The
//! model itself is never modified; every request goes through the same
//! normalize → classify → route → record sequence.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;
use triage_common::text::{normalize, ticket_text};
use triage_common::Result;

use super::confidence_router::{
    AlternativeCategory, ConfidenceLevel, ConfidenceRouter, Priority, RiskLevel, RoutingDecision,
};
use super::metrics_aggregator::{round_to, MetricsAggregator};
use crate::classifier::{Classifier, Prediction};

/// Hex characters of the digest kept in a ticket identifier
const TICKET_HASH_LEN: usize = 8;

/// Plain classification, no routing or recording
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasicClassification {
    pub ticket_category: String,
    pub confidence: f64,
}

/// Timing and labels for one classification
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceMetrics {
    pub processing_time_ms: f64,
    pub confidence_level: ConfidenceLevel,
    pub risk_level: RiskLevel,
}

/// Full result of the smart pipeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SmartClassification {
    pub ticket_id: String,
    pub ticket_category: String,
    pub confidence: f64,
    pub response_time_ms: f64,
    pub smart_routing: RoutingDecision,
    pub should_auto_resolve: bool,
    pub needs_human_review: bool,
    pub suggested_priority: Priority,
    pub top_alternatives: Vec<AlternativeCategory>,
    pub performance_metrics: PerformanceMetrics,
}

/// Classifier plus routing policy plus shared metrics
#[derive(Clone)]
pub struct SmartClassifier {
    classifier: Arc<dyn Classifier>,
    router: ConfidenceRouter,
    aggregator: Arc<MetricsAggregator>,
}

impl SmartClassifier {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        router: ConfidenceRouter,
        aggregator: Arc<MetricsAggregator>,
    ) -> Self {
        Self {
            classifier,
            router,
            aggregator,
        }
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn router(&self) -> &ConfidenceRouter {
        &self.router
    }

    pub fn aggregator(&self) -> &MetricsAggregator {
        &self.aggregator
    }

    /// Normalize then classify arbitrary text
    pub fn predict(&self, raw_text: &str) -> Result<Prediction> {
        self.classifier.classify(&normalize(raw_text))
    }

    /// Category and confidence only; nothing is recorded
    pub fn classify_basic(&self, subject: &str, description: &str) -> Result<BasicClassification> {
        let prediction = self.predict(&ticket_text(subject, description))?;
        Ok(BasicClassification {
            confidence: prediction.confidence(),
            ticket_category: prediction.category,
        })
    }

    /// Classify, route and record one ticket
    pub fn classify(&self, subject: &str, description: &str) -> Result<SmartClassification> {
        let started = Instant::now();
        let prediction = self.predict(&ticket_text(subject, description))?;
        let response_time_ms = round_to(started.elapsed().as_secs_f64() * 1000.0, 3);

        let confidence = prediction.confidence();
        let ticket_hash = ticket_hash(subject, description, Utc::now());
        let outcome = self
            .router
            .route(&prediction.category, confidence, &prediction.distribution);

        self.aggregator
            .record(&prediction.category, confidence, Some(response_time_ms), subject);

        debug!(
            ticket = %ticket_hash,
            category = %prediction.category,
            confidence,
            action = outcome.decision.action().as_str(),
            "Classified ticket"
        );

        Ok(SmartClassification {
            ticket_id: format!("TICKET-{}", ticket_hash),
            ticket_category: prediction.category,
            confidence,
            response_time_ms,
            smart_routing: outcome.decision.with_ticket_id(&ticket_hash),
            should_auto_resolve: outcome.should_auto_resolve,
            needs_human_review: outcome.needs_human_review,
            suggested_priority: outcome.suggested_priority,
            top_alternatives: outcome.top_alternatives,
            performance_metrics: PerformanceMetrics {
                processing_time_ms: response_time_ms,
                confidence_level: outcome.confidence_level,
                risk_level: outcome.risk_level,
            },
        })
    }
}

/// First 8 upper-case hex characters of SHA-256(subject, description, time)
pub fn ticket_hash(subject: &str, description: &str, at: DateTime<Utc>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(subject.as_bytes());
    hasher.update(description.as_bytes());
    hasher.update(at.to_rfc3339().as_bytes());

    let mut hex: String = hasher
        .finalize()
        .iter()
        .map(|byte| format!("{:02X}", byte))
        .collect();
    hex.truncate(TICKET_HASH_LEN);
    hex
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::confidence_router::RoutingAction;
    use chrono::TimeZone;
    use triage_common::config::RoutingThresholds;

    /// Returns a fixed distribution and remembers nothing
    struct FixedClassifier {
        distribution: Vec<(String, f64)>,
    }

    impl FixedClassifier {
        fn new(pairs: &[(&str, f64)]) -> Self {
            Self {
                distribution: pairs.iter().map(|(c, p)| (c.to_string(), *p)).collect(),
            }
        }
    }

    impl Classifier for FixedClassifier {
        fn classify(&self, _text: &str) -> Result<Prediction> {
            let top = self
                .distribution
                .iter()
                .fold(&self.distribution[0], |best, item| if item.1 > best.1 { item } else { best });
            Ok(Prediction::new(top.0.clone(), self.distribution.clone()))
        }

        fn name(&self) -> &str {
            "Fixed"
        }

        fn categories(&self) -> Vec<String> {
            self.distribution.iter().map(|(c, _)| c.clone()).collect()
        }
    }

    fn smart(pairs: &[(&str, f64)]) -> SmartClassifier {
        SmartClassifier::new(
            Arc::new(FixedClassifier::new(pairs)),
            ConfidenceRouter::default(),
            Arc::new(MetricsAggregator::new(RoutingThresholds::default(), None)),
        )
    }

    #[test]
    fn test_ticket_hash_format() {
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        let hash = ticket_hash("Login failed", "Cannot access", at);

        assert_eq!(hash.len(), 8);
        assert!(hash.chars().all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
        assert_eq!(hash, ticket_hash("Login failed", "Cannot access", at));
    }

    #[test]
    fn test_ticket_hash_depends_on_time() {
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 1).unwrap();
        assert_ne!(ticket_hash("a", "b", at), ticket_hash("a", "b", later));
    }

    #[test]
    fn test_classify_records_prediction() {
        let smart = smart(&[("Bug", 0.85), ("Technical", 0.15)]);
        let result = smart.classify("App crash", "Crashes on export").unwrap();

        assert!(result.ticket_id.starts_with("TICKET-"));
        assert_eq!(result.ticket_id.len(), "TICKET-".len() + 8);
        assert_eq!(result.ticket_category, "Bug");
        assert_eq!(result.confidence, 0.85);
        assert!(result.should_auto_resolve);
        assert_eq!(result.smart_routing.action(), RoutingAction::AutoResolve);
        assert_eq!(result.performance_metrics.processing_time_ms, result.response_time_ms);
        assert!(result.top_alternatives.is_empty());

        let stats = smart.aggregator().snapshot();
        assert_eq!(stats.total_predictions, 1);
        assert_eq!(stats.high_confidence_predictions, 1);
    }

    #[test]
    fn test_template_reference_uses_ticket_hash() {
        let smart = smart(&[("Billing", 0.9), ("Account", 0.1)]);
        let result = smart.classify("Refund", "Charged twice").unwrap();

        let hash = result.ticket_id.trim_start_matches("TICKET-");
        match result.smart_routing {
            RoutingDecision::AutoResolve { template, .. } => {
                assert!(template.ends_with(&format!("Reference: BILL-{}", hash)));
            }
            other => panic!("unexpected decision: {:?}", other),
        }
    }

    #[test]
    fn test_classify_basic_does_not_record() {
        let smart = smart(&[("Account", 0.35), ("Billing", 0.30), ("Bug", 0.35)]);
        let basic = smart.classify_basic("Login", "Locked out").unwrap();

        // First maximum wins ties
        assert_eq!(basic.ticket_category, "Account");
        assert_eq!(basic.confidence, 0.35);
        assert_eq!(smart.aggregator().snapshot().total_predictions, 0);
    }

    #[test]
    fn test_low_confidence_suggests_alternatives() {
        let smart = smart(&[
            ("Account", 0.35),
            ("Billing", 0.30),
            ("Bug", 0.20),
            ("Technical", 0.10),
            ("Feature", 0.05),
        ]);
        let result = smart.classify("Help", "Something is wrong").unwrap();

        assert!(result.needs_human_review);
        assert_eq!(result.suggested_priority, Priority::High);
        assert_eq!(result.performance_metrics.risk_level, RiskLevel::HighRisk);
        let names: Vec<&str> = result
            .top_alternatives
            .iter()
            .map(|alt| alt.category.as_str())
            .collect();
        assert_eq!(names, vec!["Billing", "Bug"]);
    }

    #[test]
    fn test_serialized_shape() {
        let smart = smart(&[("Technical", 0.65), ("Bug", 0.35)]);
        let result = smart.classify("Timeout", "Server timeout").unwrap();
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["ticket_category"], "Technical");
        assert_eq!(json["smart_routing"]["action"], "AUTO_ROUTE");
        assert_eq!(json["smart_routing"]["department"], "Technical Support - Tier 1");
        assert_eq!(json["suggested_priority"], "MEDIUM-HIGH");
        assert_eq!(json["performance_metrics"]["confidence_level"], "HIGH");
        assert_eq!(json["performance_metrics"]["risk_level"], "LOW_RISK");
    }
}

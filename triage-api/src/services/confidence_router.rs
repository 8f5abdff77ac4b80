//! Confidence Router
//!
//! Turns a raw prediction (label, confidence, probability distribution) into a
//! routing decision plus the derived priority, risk and alternative fields.
//!
//! **Default thresholds:**
//! - Auto-resolve: confidence > 0.8
//! - Auto-route: 0.6 ≤ confidence ≤ 0.8
//! - Human review: confidence < 0.6
//!
//! Labels missing from the lookup tables resolve to generic fallbacks; routing
//! never fails.

use serde::Serialize;
use std::cmp::Ordering;
use triage_common::category::{is_engineering_label, Category};
use triage_common::config::RoutingThresholds;

/// Placeholder substituted with the ticket identifier in response templates
pub const TICKET_ID_PLACEHOLDER: &str = "{ticket_id}";

/// Probability an alternative must exceed to be suggested
const ALTERNATIVE_MIN_PROBABILITY: f64 = 0.1;

/// Maximum number of alternatives suggested
const MAX_ALTERNATIVES: usize = 2;

/// Confidence below which risk is always HIGH_RISK
const HIGH_RISK_CEILING: f64 = 0.4;

/// Routing action chosen purely from confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoutingAction {
    AutoResolve,
    AutoRoute,
    HumanReview,
}

impl RoutingAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoutingAction::AutoResolve => "AUTO_RESOLVE",
            RoutingAction::AutoRoute => "AUTO_ROUTE",
            RoutingAction::HumanReview => "HUMAN_REVIEW",
        }
    }
}

/// Human review urgency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Urgency {
    High,
    Normal,
}

/// Suggested ticket priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Priority {
    #[serde(rename = "HIGH")]
    High,
    #[serde(rename = "MEDIUM-HIGH")]
    MediumHigh,
    #[serde(rename = "MEDIUM")]
    Medium,
    #[serde(rename = "LOW")]
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "HIGH",
            Priority::MediumHigh => "MEDIUM-HIGH",
            Priority::Medium => "MEDIUM",
            Priority::Low => "LOW",
        }
    }
}

/// Human-readable confidence band (lower bound inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfidenceLevel {
    VeryHigh,
    High,
    Medium,
    Low,
    VeryLow,
}

impl ConfidenceLevel {
    /// Bands: VERY_HIGH ≥ 0.8, HIGH ≥ 0.6, MEDIUM ≥ 0.4, LOW ≥ 0.2, else VERY_LOW
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.8 {
            ConfidenceLevel::VeryHigh
        } else if confidence >= 0.6 {
            ConfidenceLevel::High
        } else if confidence >= 0.4 {
            ConfidenceLevel::Medium
        } else if confidence >= 0.2 {
            ConfidenceLevel::Low
        } else {
            ConfidenceLevel::VeryLow
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::VeryHigh => "VERY_HIGH",
            ConfidenceLevel::High => "HIGH",
            ConfidenceLevel::Medium => "MEDIUM",
            ConfidenceLevel::Low => "LOW",
            ConfidenceLevel::VeryLow => "VERY_LOW",
        }
    }
}

/// Routing risk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    HighRisk,
    MediumRisk,
    LowRisk,
    VeryLowRisk,
}

/// How close an alternative is to the top prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelativeStrength {
    VeryClose,
    Close,
    Moderate,
    Distant,
}

impl RelativeStrength {
    /// Ratio is alternative probability / top probability
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio > 0.8 {
            RelativeStrength::VeryClose
        } else if ratio > 0.6 {
            RelativeStrength::Close
        } else if ratio > 0.4 {
            RelativeStrength::Moderate
        } else {
            RelativeStrength::Distant
        }
    }
}

/// Candidate category other than the top prediction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlternativeCategory {
    pub category: String,
    pub confidence: f64,
    pub relative_strength: RelativeStrength,
}

/// Routing decision with action-specific payload
///
/// Serializes as `{"action": "AUTO_ROUTE", "message": ..., "department": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoutingDecision {
    AutoResolve {
        message: String,
        template: String,
        estimated_resolution_time: String,
    },
    AutoRoute {
        message: String,
        department: String,
        estimated_wait_time: String,
    },
    HumanReview {
        message: String,
        urgency: Urgency,
        estimated_wait_time: String,
    },
}

impl RoutingDecision {
    pub fn action(&self) -> RoutingAction {
        match self {
            RoutingDecision::AutoResolve { .. } => RoutingAction::AutoResolve,
            RoutingDecision::AutoRoute { .. } => RoutingAction::AutoRoute,
            RoutingDecision::HumanReview { .. } => RoutingAction::HumanReview,
        }
    }

    /// Fill the ticket reference into an auto-resolve template
    pub fn with_ticket_id(self, ticket_id: &str) -> Self {
        match self {
            RoutingDecision::AutoResolve {
                message,
                template,
                estimated_resolution_time,
            } => RoutingDecision::AutoResolve {
                message,
                template: template.replace(TICKET_ID_PLACEHOLDER, ticket_id),
                estimated_resolution_time,
            },
            other => other,
        }
    }
}

/// Everything the router derives for one prediction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutingOutcome {
    pub decision: RoutingDecision,
    pub should_auto_resolve: bool,
    pub needs_human_review: bool,
    pub suggested_priority: Priority,
    pub confidence_level: ConfidenceLevel,
    pub risk_level: RiskLevel,
    pub top_alternatives: Vec<AlternativeCategory>,
}

/// Confidence Router
///
/// Stateless apart from its thresholds; cheap to copy into each request.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfidenceRouter {
    thresholds: RoutingThresholds,
}

impl ConfidenceRouter {
    pub fn new(thresholds: RoutingThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> RoutingThresholds {
        self.thresholds
    }

    /// Route one prediction
    ///
    /// `distribution` is the full probability distribution in model class
    /// order; it is only consulted for alternatives.
    pub fn route(&self, category: &str, confidence: f64, distribution: &[(String, f64)]) -> RoutingOutcome {
        RoutingOutcome {
            decision: self.decide(category, confidence),
            should_auto_resolve: self.should_auto_resolve(confidence),
            needs_human_review: self.needs_human_review(confidence),
            suggested_priority: self.suggested_priority(category, confidence),
            confidence_level: ConfidenceLevel::from_confidence(confidence),
            risk_level: self.risk_level(category, confidence),
            top_alternatives: self.top_alternatives(category, confidence, distribution),
        }
    }

    /// Action from confidence alone, independent of category
    pub fn action(&self, confidence: f64) -> RoutingAction {
        if confidence > self.thresholds.auto_resolve_threshold {
            RoutingAction::AutoResolve
        } else if confidence >= self.thresholds.human_review_threshold {
            RoutingAction::AutoRoute
        } else {
            RoutingAction::HumanReview
        }
    }

    pub fn should_auto_resolve(&self, confidence: f64) -> bool {
        confidence > self.thresholds.auto_resolve_threshold
    }

    pub fn needs_human_review(&self, confidence: f64) -> bool {
        confidence < self.thresholds.human_review_threshold
    }

    fn decide(&self, category: &str, confidence: f64) -> RoutingDecision {
        match self.action(confidence) {
            RoutingAction::AutoResolve => RoutingDecision::AutoResolve {
                message: "High confidence - can be auto-resolved".to_string(),
                template: response_template(category),
                estimated_resolution_time: "Immediate".to_string(),
            },
            RoutingAction::AutoRoute => RoutingDecision::AutoRoute {
                message: format!("Route to {} department", category),
                department: department_for(category).to_string(),
                estimated_wait_time: "Within 1 hour".to_string(),
            },
            RoutingAction::HumanReview => RoutingDecision::HumanReview {
                message: "Low confidence - needs agent review".to_string(),
                urgency: if is_engineering_label(category) {
                    Urgency::High
                } else {
                    Urgency::Normal
                },
                estimated_wait_time: "Within 4 hours".to_string(),
            },
        }
    }

    /// Category escalation takes precedence over high-confidence de-escalation
    pub fn suggested_priority(&self, category: &str, confidence: f64) -> Priority {
        if confidence < self.thresholds.human_review_threshold {
            Priority::High
        } else if is_engineering_label(category) {
            Priority::MediumHigh
        } else if confidence > self.thresholds.auto_resolve_threshold {
            Priority::Low
        } else {
            Priority::Medium
        }
    }

    pub fn risk_level(&self, category: &str, confidence: f64) -> RiskLevel {
        if confidence < HIGH_RISK_CEILING {
            RiskLevel::HighRisk
        } else if confidence < self.thresholds.human_review_threshold {
            RiskLevel::MediumRisk
        } else if is_engineering_label(category)
            && confidence < self.thresholds.auto_resolve_threshold
        {
            RiskLevel::LowRisk
        } else {
            RiskLevel::VeryLowRisk
        }
    }

    /// Up to two runner-up categories, only when confidence is below the
    /// auto-resolve threshold
    pub fn top_alternatives(
        &self,
        category: &str,
        confidence: f64,
        distribution: &[(String, f64)],
    ) -> Vec<AlternativeCategory> {
        if confidence >= self.thresholds.auto_resolve_threshold {
            return Vec::new();
        }

        let mut candidates: Vec<&(String, f64)> = distribution
            .iter()
            .filter(|(label, _)| label != category)
            .collect();
        // Stable sort keeps distribution order for ties
        candidates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        candidates
            .into_iter()
            .take(MAX_ALTERNATIVES)
            .filter(|(_, p)| *p > ALTERNATIVE_MIN_PROBABILITY)
            .map(|(label, p)| {
                let ratio = if confidence > 0.0 { p / confidence } else { 0.0 };
                AlternativeCategory {
                    category: label.clone(),
                    confidence: *p,
                    relative_strength: RelativeStrength::from_ratio(ratio),
                }
            })
            .collect()
    }
}

/// Department assignment for auto-routed tickets
pub fn department_for(category: &str) -> &'static str {
    match Category::from_label(category) {
        Some(Category::Bug) => "Technical Support - Tier 2",
        Some(Category::Technical) => "Technical Support - Tier 1",
        Some(Category::Billing) => "Finance Department",
        Some(Category::Account) => "Customer Success Team",
        Some(Category::Feature) => "Product Management Team",
        None => "General Support",
    }
}

/// Canned auto-resolve response, with a `{ticket_id}` reference placeholder
pub fn response_template(category: &str) -> String {
    let (body, prefix) = match Category::from_label(category) {
        Some(Category::Bug) => (
            "We've identified this as a bug. Our development team is working on a fix.",
            "BUG",
        ),
        Some(Category::Billing) => (
            "Your billing inquiry has been received. Our finance team will contact you within 24 hours.",
            "BILL",
        ),
        Some(Category::Account) => (
            "Your account issue has been logged. Please check your email for password reset instructions.",
            "ACC",
        ),
        Some(Category::Technical) => (
            "We're aware of this technical issue. Please try clearing cache and restarting. If issue persists, reply to this email.",
            "TECH",
        ),
        Some(Category::Feature) => (
            "Thank you for your feature request! Our product team will review this suggestion.",
            "FEAT",
        ),
        None => (
            "We've received your ticket and will respond soon.",
            "TICKET",
        ),
    };

    format!("{} Reference: {}-{}", body, prefix, TICKET_ID_PLACEHOLDER)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> ConfidenceRouter {
        ConfidenceRouter::default()
    }

    fn dist(pairs: &[(&str, f64)]) -> Vec<(String, f64)> {
        pairs.iter().map(|(c, p)| (c.to_string(), *p)).collect()
    }

    #[test]
    fn test_bug_high_confidence_scenario() {
        let outcome = router().route("Bug", 0.85, &dist(&[("Bug", 0.85), ("Technical", 0.15)]));

        assert_eq!(outcome.decision.action(), RoutingAction::AutoResolve);
        assert!(outcome.should_auto_resolve);
        assert!(!outcome.needs_human_review);
        assert_eq!(outcome.suggested_priority, Priority::MediumHigh);
        assert_eq!(outcome.confidence_level, ConfidenceLevel::VeryHigh);
        assert_eq!(outcome.risk_level, RiskLevel::VeryLowRisk);
        assert!(outcome.top_alternatives.is_empty());
    }

    #[test]
    fn test_non_engineering_high_confidence_is_low_priority() {
        let outcome = router().route("Billing", 0.85, &[]);
        assert_eq!(outcome.suggested_priority, Priority::Low);
        assert_eq!(outcome.risk_level, RiskLevel::VeryLowRisk);
    }

    #[test]
    fn test_technical_auto_route_scenario() {
        let outcome = router().route("Technical", 0.65, &dist(&[("Technical", 0.65), ("Bug", 0.35)]));

        assert_eq!(outcome.decision.action(), RoutingAction::AutoRoute);
        match &outcome.decision {
            RoutingDecision::AutoRoute {
                department,
                estimated_wait_time,
                message,
            } => {
                assert_eq!(department, "Technical Support - Tier 1");
                assert_eq!(estimated_wait_time, "Within 1 hour");
                assert_eq!(message, "Route to Technical department");
            }
            other => panic!("unexpected decision {:?}", other),
        }
        assert_eq!(outcome.suggested_priority, Priority::MediumHigh);
        assert_eq!(outcome.risk_level, RiskLevel::LowRisk);
        assert_eq!(outcome.confidence_level, ConfidenceLevel::High);
    }

    #[test]
    fn test_account_human_review_scenario() {
        let distribution = dist(&[
            ("Account", 0.35),
            ("Billing", 0.30),
            ("Bug", 0.20),
            ("Technical", 0.10),
            ("Feature", 0.05),
        ]);
        let outcome = router().route("Account", 0.35, &distribution);

        match &outcome.decision {
            RoutingDecision::HumanReview {
                urgency,
                estimated_wait_time,
                ..
            } => {
                assert_eq!(*urgency, Urgency::Normal);
                assert_eq!(estimated_wait_time, "Within 4 hours");
            }
            other => panic!("unexpected decision {:?}", other),
        }
        assert_eq!(outcome.suggested_priority, Priority::High);
        assert_eq!(outcome.risk_level, RiskLevel::HighRisk);
        assert!(outcome.needs_human_review);

        let alternatives = &outcome.top_alternatives;
        assert_eq!(alternatives.len(), 2);
        assert_eq!(alternatives[0].category, "Billing");
        assert_eq!(alternatives[0].relative_strength, RelativeStrength::VeryClose);
        assert_eq!(alternatives[1].category, "Bug");
        // 0.20 / 0.35 ≈ 0.571 falls in the (0.4, 0.6] band
        assert_eq!(alternatives[1].relative_strength, RelativeStrength::Moderate);
    }

    #[test]
    fn test_human_review_engineering_urgency_high() {
        for category in ["Bug", "Technical"] {
            match router().route(category, 0.3, &[]).decision {
                RoutingDecision::HumanReview { urgency, .. } => assert_eq!(urgency, Urgency::High),
                other => panic!("unexpected decision {:?}", other),
            }
        }
    }

    #[test]
    fn test_action_boundaries() {
        let r = router();
        assert_eq!(r.action(0.81), RoutingAction::AutoResolve);
        assert_eq!(r.action(0.8), RoutingAction::AutoRoute);
        assert_eq!(r.action(0.6), RoutingAction::AutoRoute);
        assert_eq!(r.action(0.5999), RoutingAction::HumanReview);
        assert_eq!(r.action(0.0), RoutingAction::HumanReview);
        assert_eq!(r.action(1.0), RoutingAction::AutoResolve);
    }

    #[test]
    fn test_action_independent_of_category() {
        let r = router();
        for step in 0..=100 {
            let confidence = step as f64 / 100.0;
            let expected = r.action(confidence);
            for category in ["Bug", "Billing", "Feature", "Technical", "Account", "Shipping"] {
                let outcome = r.route(category, confidence, &[]);
                assert_eq!(outcome.decision.action(), expected);
            }
        }
    }

    #[test]
    fn test_confidence_level_bands_inclusive_lower() {
        assert_eq!(ConfidenceLevel::from_confidence(0.8), ConfidenceLevel::VeryHigh);
        assert_eq!(ConfidenceLevel::from_confidence(0.79), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_confidence(0.6), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_confidence(0.4), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_confidence(0.2), ConfidenceLevel::Low);
        assert_eq!(ConfidenceLevel::from_confidence(0.19), ConfidenceLevel::VeryLow);
        assert_eq!(ConfidenceLevel::from_confidence(0.0), ConfidenceLevel::VeryLow);
    }

    #[test]
    fn test_confidence_level_monotonic() {
        // VeryHigh < High < ... in declaration order, so levels must not decrease
        // as confidence decreases
        let mut previous = ConfidenceLevel::from_confidence(1.0);
        for step in (0..=1000).rev() {
            let level = ConfidenceLevel::from_confidence(step as f64 / 1000.0);
            assert!(level >= previous);
            previous = level;
        }
    }

    #[test]
    fn test_risk_level_order() {
        let r = router();
        assert_eq!(r.risk_level("Billing", 0.39), RiskLevel::HighRisk);
        assert_eq!(r.risk_level("Bug", 0.39), RiskLevel::HighRisk);
        assert_eq!(r.risk_level("Billing", 0.4), RiskLevel::MediumRisk);
        assert_eq!(r.risk_level("Bug", 0.59), RiskLevel::MediumRisk);
        assert_eq!(r.risk_level("Bug", 0.6), RiskLevel::LowRisk);
        assert_eq!(r.risk_level("Billing", 0.6), RiskLevel::VeryLowRisk);
        assert_eq!(r.risk_level("Technical", 0.8), RiskLevel::VeryLowRisk);
    }

    #[test]
    fn test_priority_order() {
        let r = router();
        assert_eq!(r.suggested_priority("Bug", 0.5), Priority::High);
        assert_eq!(r.suggested_priority("Bug", 0.95), Priority::MediumHigh);
        assert_eq!(r.suggested_priority("Account", 0.95), Priority::Low);
        assert_eq!(r.suggested_priority("Account", 0.7), Priority::Medium);
        assert_eq!(r.suggested_priority("Account", 0.8), Priority::Medium);
    }

    #[test]
    fn test_alternatives_empty_at_auto_resolve_threshold() {
        let distribution = dist(&[("Billing", 0.8), ("Bug", 0.2)]);
        assert!(router().top_alternatives("Billing", 0.8, &distribution).is_empty());
    }

    #[test]
    fn test_alternatives_never_include_top_category() {
        let distribution = dist(&[("Bug", 0.4), ("Technical", 0.4), ("Billing", 0.2)]);
        let alternatives = router().top_alternatives("Bug", 0.4, &distribution);

        assert!(alternatives.iter().all(|a| a.category != "Bug"));
        assert_eq!(alternatives[0].category, "Technical");
        assert_eq!(alternatives[0].relative_strength, RelativeStrength::VeryClose);
    }

    #[test]
    fn test_alternatives_ties_keep_distribution_order() {
        let distribution = dist(&[("Account", 0.4), ("Feature", 0.2), ("Billing", 0.2), ("Bug", 0.2)]);
        let alternatives = router().top_alternatives("Account", 0.4, &distribution);

        let labels: Vec<&str> = alternatives.iter().map(|a| a.category.as_str()).collect();
        assert_eq!(labels, vec!["Feature", "Billing"]);
    }

    #[test]
    fn test_alternatives_strictly_above_minimum() {
        let distribution = dist(&[("Account", 0.7), ("Billing", 0.2), ("Bug", 0.1)]);
        let alternatives = router().top_alternatives("Account", 0.7, &distribution);

        assert_eq!(alternatives.len(), 1);
        assert_eq!(alternatives[0].category, "Billing");
        assert_eq!(alternatives[0].relative_strength, RelativeStrength::Distant);
    }

    #[test]
    fn test_relative_strength_bands() {
        assert_eq!(RelativeStrength::from_ratio(0.81), RelativeStrength::VeryClose);
        assert_eq!(RelativeStrength::from_ratio(0.8), RelativeStrength::Close);
        assert_eq!(RelativeStrength::from_ratio(0.6), RelativeStrength::Moderate);
        assert_eq!(RelativeStrength::from_ratio(0.4), RelativeStrength::Distant);
    }

    #[test]
    fn test_unknown_category_fallbacks() {
        assert_eq!(department_for("Shipping"), "General Support");
        assert!(response_template("Shipping").starts_with("We've received your ticket"));
        assert!(response_template("Shipping").ends_with("TICKET-{ticket_id}"));

        let outcome = router().route("Shipping", 0.7, &[]);
        match outcome.decision {
            RoutingDecision::AutoRoute { department, .. } => assert_eq!(department, "General Support"),
            other => panic!("unexpected decision {:?}", other),
        }
        assert_eq!(outcome.suggested_priority, Priority::Medium);
    }

    #[test]
    fn test_template_ticket_reference() {
        let decision = router()
            .route("Billing", 0.9, &[])
            .decision
            .with_ticket_id("TICKET-ABCD1234");
        match decision {
            RoutingDecision::AutoResolve { template, .. } => {
                assert!(template.ends_with("Reference: BILL-TICKET-ABCD1234"));
                assert!(!template.contains(TICKET_ID_PLACEHOLDER));
            }
            other => panic!("unexpected decision {:?}", other),
        }
    }

    #[test]
    fn test_custom_thresholds() {
        let r = ConfidenceRouter::new(RoutingThresholds {
            auto_resolve_threshold: 0.9,
            human_review_threshold: 0.7,
        });
        assert_eq!(r.action(0.85), RoutingAction::AutoRoute);
        assert_eq!(r.action(0.65), RoutingAction::HumanReview);
        assert_eq!(r.risk_level("Billing", 0.65), RiskLevel::MediumRisk);
        // Bands stay fixed regardless of thresholds
        assert_eq!(ConfidenceLevel::from_confidence(0.85), ConfidenceLevel::VeryHigh);
    }

    #[test]
    fn test_decision_serialization_shape() {
        let outcome = router().route("Bug", 0.5, &[]);
        let json = serde_json::to_value(&outcome.decision).unwrap();

        assert_eq!(json["action"], "HUMAN_REVIEW");
        assert_eq!(json["urgency"], "HIGH");
        assert_eq!(json["message"], "Low confidence - needs agent review");

        let json = serde_json::to_value(Priority::MediumHigh).unwrap();
        assert_eq!(json, "MEDIUM-HIGH");
        let json = serde_json::to_value(RiskLevel::VeryLowRisk).unwrap();
        assert_eq!(json, "VERY_LOW_RISK");
    }
}

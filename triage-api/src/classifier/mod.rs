//! Classifier capability consumed by the triage pipeline
//!
//! The router and aggregator only ever see a [`Prediction`]; any inference
//! backend implementing [`Classifier`] can be plugged into [`crate::AppState`].

pub mod naive_bayes;

pub use naive_bayes::NaiveBayesClassifier;

use triage_common::Result;

/// Trait for ticket text classifiers
///
/// Implementations hold an immutable, already-trained model and must be safe
/// to call concurrently from request handlers.
pub trait Classifier: Send + Sync {
    /// Classify normalized ticket text
    fn classify(&self, text: &str) -> Result<Prediction>;

    /// Model family name (e.g. "MultinomialNB")
    fn name(&self) -> &str;

    /// Model artifact version
    fn version(&self) -> &str {
        "unknown"
    }

    /// Category labels in the model's class order
    fn categories(&self) -> Vec<String>;
}

/// Result of one classification
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Top predicted label
    pub category: String,
    /// Probability per label, in the model's class order
    pub distribution: Vec<(String, f64)>,
}

impl Prediction {
    pub fn new(category: impl Into<String>, distribution: Vec<(String, f64)>) -> Self {
        Self {
            category: category.into(),
            distribution,
        }
    }

    /// Highest probability in the distribution (0.0 when empty)
    pub fn confidence(&self) -> f64 {
        self.distribution
            .iter()
            .map(|(_, p)| *p)
            .fold(0.0, f64::max)
    }
}

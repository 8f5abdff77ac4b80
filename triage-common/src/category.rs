//! Ticket categories known to the routing tables
//!
//! Classifier output is an opaque label. Labels that parse into a [`Category`]
//! get category-specific treatment; anything else falls back to generic
//! handling in the router.

use serde::{Deserialize, Serialize};

/// Closed set of support ticket categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Bug,
    Billing,
    Feature,
    Technical,
    Account,
}

impl Category {
    /// All categories in canonical order
    pub const ALL: [Category; 5] = [
        Category::Bug,
        Category::Billing,
        Category::Feature,
        Category::Technical,
        Category::Account,
    ];

    /// Label as produced by the classifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Bug => "Bug",
            Category::Billing => "Billing",
            Category::Feature => "Feature",
            Category::Technical => "Technical",
            Category::Account => "Account",
        }
    }

    /// Parse a classifier label; `None` for labels outside the closed set
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == label)
    }

    /// Categories that escalate urgency and priority (engineering-facing)
    pub fn is_engineering(&self) -> bool {
        matches!(self, Category::Bug | Category::Technical)
    }
}

/// True when `label` names Bug or Technical
pub fn is_engineering_label(label: &str) -> bool {
    Category::from_label(label).is_some_and(|c| c.is_engineering())
}

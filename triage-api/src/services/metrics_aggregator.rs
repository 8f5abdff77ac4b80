//! Prediction history and aggregate statistics
//!
//! One [`MetricsAggregator`] is created at startup and shared by every request
//! handler through [`crate::AppState`]. A single mutex guards the history and
//! the lifetime counters, so a snapshot never observes a half-applied record.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};
use triage_common::config::RoutingThresholds;
use triage_common::text::excerpt;

use super::confidence_router::ConfidenceLevel;

/// Characters of the subject retained per record
pub const SUBJECT_EXCERPT_CHARS: usize = 50;

/// Confidence weight in the performance score (0-70 points)
const CONFIDENCE_SCORE_WEIGHT: f64 = 70.0;

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Immutable snapshot of one classification event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionRecord {
    pub timestamp: DateTime<Utc>,
    pub subject_excerpt: String,
    pub category: String,
    pub confidence: f64,
    pub response_time_ms: Option<f64>,
    pub confidence_level: ConfidenceLevel,
}

/// Aggregate statistics, recomputed on every request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateStats {
    pub total_predictions: u64,
    pub high_confidence_predictions: u64,
    pub medium_confidence_predictions: u64,
    pub low_confidence_predictions: u64,
    pub auto_resolvable_percentage: f64,
    pub needs_human_review_percentage: f64,
    pub average_confidence: f64,
    pub average_response_time_ms: f64,
    pub category_distribution: BTreeMap<String, u64>,
    pub average_confidence_by_category: BTreeMap<String, f64>,
    pub confidence_level_distribution: BTreeMap<String, u64>,
    /// Seconds since the aggregator was created
    pub system_uptime: f64,
    pub performance_score: f64,
}

/// Overall health label derived from average confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SystemHealth {
    Excellent,
    Good,
    Fair,
    NeedsAttention,
    NoData,
}

impl SystemHealth {
    /// EXCELLENT ≥ 0.7, GOOD ≥ 0.6, FAIR ≥ 0.5, else NEEDS_ATTENTION
    pub fn from_stats(stats: &AggregateStats) -> Self {
        if stats.total_predictions == 0 {
            SystemHealth::NoData
        } else if stats.average_confidence >= 0.7 {
            SystemHealth::Excellent
        } else if stats.average_confidence >= 0.6 {
            SystemHealth::Good
        } else if stats.average_confidence >= 0.5 {
            SystemHealth::Fair
        } else {
            SystemHealth::NeedsAttention
        }
    }
}

#[derive(Debug, Default)]
struct AggregatorState {
    history: VecDeque<PredictionRecord>,
    total: u64,
    high_confidence: u64,
    low_confidence: u64,
}

/// Accumulates prediction records and derives running statistics
#[derive(Debug)]
pub struct MetricsAggregator {
    thresholds: RoutingThresholds,
    /// Maximum retained records; `None` keeps everything
    capacity: Option<NonZeroUsize>,
    started_at: DateTime<Utc>,
    state: Mutex<AggregatorState>,
}

impl MetricsAggregator {
    /// `capacity` of `None` or `Some(0)` keeps every record
    pub fn new(thresholds: RoutingThresholds, capacity: Option<usize>) -> Self {
        Self {
            thresholds,
            capacity: capacity.and_then(NonZeroUsize::new),
            started_at: Utc::now(),
            state: Mutex::new(AggregatorState::default()),
        }
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    // Records are append-only, so a panic mid-update cannot leave them torn
    fn lock(&self) -> MutexGuard<'_, AggregatorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append one prediction and bump the lifetime counters
    pub fn record(
        &self,
        category: &str,
        confidence: f64,
        response_time_ms: Option<f64>,
        subject: &str,
    ) {
        let record = PredictionRecord {
            timestamp: Utc::now(),
            subject_excerpt: excerpt(subject, SUBJECT_EXCERPT_CHARS),
            category: category.to_string(),
            confidence,
            response_time_ms,
            confidence_level: ConfidenceLevel::from_confidence(confidence),
        };

        let mut state = self.lock();

        state.total += 1;
        if confidence > self.thresholds.auto_resolve_threshold {
            state.high_confidence += 1;
        } else if confidence < self.thresholds.human_review_threshold {
            state.low_confidence += 1;
        }

        if let Some(capacity) = self.capacity {
            while state.history.len() >= capacity.get() {
                state.history.pop_front();
            }
        }
        state.history.push_back(record);
    }

    /// Statistics as of now
    pub fn snapshot(&self) -> AggregateStats {
        self.snapshot_at(Utc::now())
    }

    /// Statistics as of `now`; identical inputs give identical output
    pub fn snapshot_at(&self, now: DateTime<Utc>) -> AggregateStats {
        let state = self.lock();

        let total = state.total;
        let high = state.high_confidence;
        let low = state.low_confidence;
        let percentage = |count: u64| {
            if total == 0 {
                0.0
            } else {
                round_to(count as f64 / total as f64 * 100.0, 1)
            }
        };

        let retained = state.history.len();
        let average_confidence = if retained == 0 {
            0.0
        } else {
            state.history.iter().map(|r| r.confidence).sum::<f64>() / retained as f64
        };

        let timings: Vec<f64> = state
            .history
            .iter()
            .filter_map(|r| r.response_time_ms)
            .collect();
        let average_response_time = if timings.is_empty() {
            0.0
        } else {
            timings.iter().sum::<f64>() / timings.len() as f64
        };

        let mut category_distribution: BTreeMap<String, u64> = BTreeMap::new();
        let mut confidence_sums: BTreeMap<String, f64> = BTreeMap::new();
        let mut confidence_level_distribution: BTreeMap<String, u64> = BTreeMap::new();
        for record in &state.history {
            *category_distribution.entry(record.category.clone()).or_insert(0) += 1;
            *confidence_sums.entry(record.category.clone()).or_insert(0.0) += record.confidence;
            *confidence_level_distribution
                .entry(record.confidence_level.as_str().to_string())
                .or_insert(0) += 1;
        }

        let average_confidence_by_category = confidence_sums
            .into_iter()
            .map(|(category, sum)| {
                let count = category_distribution[&category] as f64;
                (category, round_to(sum / count, 3))
            })
            .collect();

        let uptime_ms = now
            .signed_duration_since(self.started_at)
            .num_milliseconds()
            .max(0);

        AggregateStats {
            total_predictions: total,
            high_confidence_predictions: high,
            medium_confidence_predictions: total - high - low,
            low_confidence_predictions: low,
            auto_resolvable_percentage: percentage(high),
            needs_human_review_percentage: percentage(low),
            average_confidence: round_to(average_confidence, 3),
            average_response_time_ms: round_to(average_response_time, 3),
            category_distribution,
            average_confidence_by_category,
            confidence_level_distribution,
            system_uptime: round_to(uptime_ms as f64 / 1000.0, 2),
            performance_score: performance_score(average_confidence, average_response_time, retained),
        }
    }
}

/// 70 × average confidence plus a response-time bucket score
pub fn performance_score(average_confidence: f64, average_response_time_ms: f64, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }

    let response_score = if average_response_time_ms <= 5.0 {
        30.0
    } else if average_response_time_ms <= 10.0 {
        25.0
    } else if average_response_time_ms <= 20.0 {
        20.0
    } else if average_response_time_ms <= 50.0 {
        15.0
    } else {
        10.0
    };

    round_to(average_confidence * CONFIDENCE_SCORE_WEIGHT + response_score, 1)
}

//! Classification endpoints
//!
//! `/classify` returns the bare prediction and is not recorded in metrics.
//! `/classify_smart` and `/batch_classify` run the full routing pipeline and
//! record every processed ticket.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use triage_common::text::excerpt;

use crate::error::{ApiError, ApiResult};
use crate::services::confidence_router::{AlternativeCategory, Priority, RoutingDecision};
use crate::services::metrics_aggregator::{round_to, SUBJECT_EXCERPT_CHARS};
use crate::services::smart_classifier::{PerformanceMetrics, SmartClassification};
use crate::AppState;

const NO_DATA_MESSAGE: &str = "No data provided";
const NO_TICKETS_MESSAGE: &str = "No tickets provided";

/// Ticket submitted for classification
///
/// Both fields are optional at the wire level so a missing field yields the
/// "provide both" message rather than a body rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TicketRequest {
    pub subject: Option<String>,
    pub description: Option<String>,
}

impl TicketRequest {
    /// Neither field supplied, as for `{}`
    fn is_empty(&self) -> bool {
        self.subject.is_none() && self.description.is_none()
    }

    /// Subject and description when both are present and non-empty
    fn fields(&self) -> Option<(&str, &str)> {
        match (self.subject.as_deref(), self.description.as_deref()) {
            (Some(subject), Some(description)) if !subject.is_empty() && !description.is_empty() => {
                Some((subject, description))
            }
            _ => None,
        }
    }

    fn require_fields(&self) -> ApiResult<(&str, &str)> {
        self.fields().ok_or(ApiError::MissingInput)
    }
}

fn ticket_body(payload: Result<Json<TicketRequest>, JsonRejection>) -> ApiResult<TicketRequest> {
    let ticket = payload.map(|Json(ticket)| ticket).map_err(|rejection| {
        debug!(error = %rejection, "Rejected classification body");
        ApiError::BadRequest(NO_DATA_MESSAGE.to_string())
    })?;

    if ticket.is_empty() {
        return Err(ApiError::BadRequest(NO_DATA_MESSAGE.to_string()));
    }
    Ok(ticket)
}

// ============================================================================
// POST /classify
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub ticket_category: String,
    pub confidence: f64,
    pub status: &'static str,
}

/// POST /classify
pub async fn classify(
    State(state): State<AppState>,
    payload: Result<Json<TicketRequest>, JsonRejection>,
) -> ApiResult<Json<ClassifyResponse>> {
    let ticket = ticket_body(payload)?;
    let (subject, description) = ticket.require_fields()?;

    let basic = state.triage.classify_basic(subject, description)?;

    Ok(Json(ClassifyResponse {
        ticket_category: basic.ticket_category,
        confidence: basic.confidence,
        status: "success",
    }))
}

// ============================================================================
// POST /classify_smart
// ============================================================================

/// Threshold documentation echoed with every smart response
#[derive(Debug, Serialize)]
pub struct ThresholdInfo {
    pub auto_resolve_threshold: f64,
    pub human_review_threshold: f64,
    pub medium_confidence_range: [f64; 2],
}

#[derive(Debug, Serialize)]
pub struct SmartClassifyResponse {
    pub status: &'static str,
    pub ticket_id: String,
    pub prediction: String,
    pub confidence: f64,
    pub response_time_ms: f64,
    pub smart_routing: RoutingDecision,
    pub should_auto_resolve: bool,
    pub needs_human_review: bool,
    pub suggested_priority: Priority,
    pub top_alternatives: Vec<AlternativeCategory>,
    pub performance_metrics: PerformanceMetrics,
    pub threshold_info: ThresholdInfo,
}

impl SmartClassifyResponse {
    fn new(result: SmartClassification, state: &AppState) -> Self {
        let thresholds = state.thresholds();
        Self {
            status: "success",
            ticket_id: result.ticket_id,
            prediction: result.ticket_category,
            confidence: result.confidence,
            response_time_ms: result.response_time_ms,
            smart_routing: result.smart_routing,
            should_auto_resolve: result.should_auto_resolve,
            needs_human_review: result.needs_human_review,
            suggested_priority: result.suggested_priority,
            top_alternatives: result.top_alternatives,
            performance_metrics: result.performance_metrics,
            threshold_info: ThresholdInfo {
                auto_resolve_threshold: thresholds.auto_resolve_threshold,
                human_review_threshold: thresholds.human_review_threshold,
                medium_confidence_range: [
                    thresholds.human_review_threshold,
                    thresholds.auto_resolve_threshold,
                ],
            },
        }
    }
}

/// POST /classify_smart
pub async fn classify_smart(
    State(state): State<AppState>,
    payload: Result<Json<TicketRequest>, JsonRejection>,
) -> ApiResult<Json<SmartClassifyResponse>> {
    let ticket = ticket_body(payload)?;
    let (subject, description) = ticket.require_fields()?;

    let result = state.triage.classify(subject, description)?;

    Ok(Json(SmartClassifyResponse::new(result, &state)))
}

// ============================================================================
// POST /batch_classify
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub tickets: Option<Vec<TicketRequest>>,
}

#[derive(Debug, Serialize)]
pub struct BatchItem {
    /// Position in the submitted list, counting skipped tickets
    pub ticket_index: usize,
    pub subject: String,
    pub result: SmartClassification,
}

#[derive(Debug, Serialize)]
pub struct BatchSummary {
    pub auto_resolvable: usize,
    pub needs_human_review: usize,
    pub average_confidence: f64,
}

impl BatchSummary {
    fn from_items(items: &[BatchItem]) -> Self {
        let average_confidence = if items.is_empty() {
            0.0
        } else {
            let sum: f64 = items.iter().map(|item| item.result.confidence).sum();
            round_to(sum / items.len() as f64, 3)
        };

        Self {
            auto_resolvable: items.iter().filter(|i| i.result.should_auto_resolve).count(),
            needs_human_review: items.iter().filter(|i| i.result.needs_human_review).count(),
            average_confidence,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub status: &'static str,
    pub total_tickets: usize,
    pub processed_tickets: usize,
    pub results: Vec<BatchItem>,
    pub batch_summary: BatchSummary,
}

/// POST /batch_classify
///
/// Tickets missing a subject or description are skipped. Any classifier
/// failure fails the whole batch.
pub async fn batch_classify(
    State(state): State<AppState>,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> ApiResult<Json<BatchResponse>> {
    let tickets = match payload {
        Ok(Json(BatchRequest { tickets: Some(tickets) })) => tickets,
        Ok(_) => return Err(ApiError::BadRequest(NO_TICKETS_MESSAGE.to_string())),
        Err(rejection) => {
            debug!(error = %rejection, "Rejected batch body");
            return Err(ApiError::BadRequest(NO_TICKETS_MESSAGE.to_string()));
        }
    };

    let total_tickets = tickets.len();
    let triage = state.triage.clone();

    // Whole batch is CPU-bound model work
    let results = tokio::task::spawn_blocking(move || {
        let mut items = Vec::with_capacity(tickets.len());
        for (index, ticket) in tickets.iter().enumerate() {
            let Some((subject, description)) = ticket.fields() else {
                warn!(ticket_index = index, "Skipping batch ticket without subject and description");
                continue;
            };
            let result = triage.classify(subject, description)?;
            items.push(BatchItem {
                ticket_index: index,
                subject: excerpt(subject, SUBJECT_EXCERPT_CHARS),
                result,
            });
        }
        Ok::<_, ApiError>(items)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Batch task failed: {}", e)))??;

    debug!(total_tickets, processed = results.len(), "Batch classified");

    Ok(Json(BatchResponse {
        status: "success",
        total_tickets,
        processed_tickets: results.len(),
        batch_summary: BatchSummary::from_items(&results),
        results,
    }))
}

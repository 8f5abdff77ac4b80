//! HTML pages: landing page and example requests

use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::Html,
};

use crate::AppState;

const INDEX_HTML: &str = include_str!("../ui/index.html");
const TEST_HTML: &str = include_str!("../ui/test.html");

/// Shown in examples when the request carries no Host header
const FALLBACK_ADDRESS: &str = "localhost:5000";

/// GET /
pub async fn serve_index(State(state): State<AppState>) -> Html<String> {
    let thresholds = state.thresholds();
    Html(
        INDEX_HTML
            .replace("{{AUTO_RESOLVE}}", &thresholds.auto_resolve_threshold.to_string())
            .replace("{{HUMAN_REVIEW}}", &thresholds.human_review_threshold.to_string())
            .replace("{{VERSION}}", env!("CARGO_PKG_VERSION")),
    )
}

/// GET /test
///
/// Example curl invocations addressed at the host the page was served from
pub async fn serve_test_page(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    let address = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or(FALLBACK_ADDRESS);
    let thresholds = state.thresholds();

    Html(
        TEST_HTML
            .replace("{{ADDRESS}}", address)
            .replace("{{AUTO_RESOLVE}}", &thresholds.auto_resolve_threshold.to_string())
            .replace("{{HUMAN_REVIEW}}", &thresholds.human_review_threshold.to_string()),
    )
}

//! HTTP API handlers for triage-api

pub mod buildinfo;
pub mod classify;
pub mod dashboard;
pub mod health;
pub mod ui;

pub use buildinfo::get_build_info;
pub use classify::{batch_classify, classify, classify_smart};
pub use dashboard::dashboard;
pub use health::health_routes;
pub use ui::{serve_index, serve_test_page};

//! # Ticket Triage Common Library
//!
//! Shared code for the ticket triage service including:
//! - Error types
//! - Configuration loading and validation
//! - Ticket category definitions
//! - Text normalization applied before classification

pub mod category;
pub mod config;
pub mod error;
pub mod text;

pub use category::Category;
pub use error::{Error, Result};

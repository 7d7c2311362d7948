//! Shared types for the POS back-office server
//!
//! Common types used across crates: data models, the unified error
//! system, API response envelopes, and pagination helpers.

pub mod error;
pub mod models;
pub mod query;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use query::Page;

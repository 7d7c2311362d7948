//! Utility helpers: validation, time conversion, query building, logging

pub mod logger;
pub mod query_builder;
pub mod time;
pub mod validation;

// Re-export error types from shared
pub use shared::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

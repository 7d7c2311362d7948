//! Repository Module
//!
//! Data access layer for the back-office entities. Each repository is a set
//! of free async functions over [`sqlx::SqlitePool`], returning [`RepoResult`].
//!
//! Multi-step writes (order creation, session close, report generation) run
//! inside a single transaction so partial state is never visible. Status
//! transitions use guarded UPDATEs (`WHERE id = ? AND status = ?`) and treat
//! zero affected rows as a conflict, so two racing requests cannot both win.

pub mod cash_session;
pub mod company;
pub mod dining_table;
pub mod order_point;
pub mod payment_method;
pub mod point_of_sale;
pub mod product;
pub mod z_report;

use shared::{AppError, ErrorCode};
use thiserror::Error;

/// Repository error
///
/// Carries the domain [`ErrorCode`] so conversion into [`AppError`] keeps
/// the precise code instead of collapsing everything to a generic failure.
#[derive(Debug, Error)]
pub enum RepoError {
    /// Requested row does not exist (or is not visible to the tenant)
    #[error("{1}")]
    NotFound(ErrorCode, String),

    /// State machine or uniqueness conflict
    #[error("{1}")]
    Conflict(ErrorCode, String),

    /// Input failed validation before touching the database
    #[error("{0}")]
    Validation(String),

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(String),
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// True when the error is a UNIQUE constraint violation
///
/// Used by the session/report number generators to distinguish a losable
/// race (retry with the next number) from a real database failure.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => {
                RepoError::NotFound(ErrorCode::NotFound, "Row not found".to_string())
            }
            _ if is_unique_violation(&err) => {
                RepoError::Conflict(ErrorCode::AlreadyExists, err.to_string())
            }
            _ => RepoError::Database(err.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(code, msg) => AppError::with_message(code, msg),
            RepoError::Conflict(code, msg) => AppError::with_message(code, msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Database(msg) => AppError::database(msg),
        }
    }
}

/// Append closure notes to any notes recorded while the record was open.
///
/// Used when closing a cash session or a Z report: the original notes are
/// kept and the closing remark goes on its own line.
pub(crate) fn append_closure_notes(existing: Option<&str>, notes: Option<&str>) -> Option<String> {
    match (existing, notes) {
        (Some(existing), Some(notes)) => Some(format!("{existing}\nClosure notes: {notes}")),
        (None, Some(notes)) => Some(format!("Closure notes: {notes}")),
        (existing, None) => existing.map(String::from),
    }
}

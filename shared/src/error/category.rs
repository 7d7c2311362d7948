//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 1xxx: Authentication errors
/// - 2xxx: Permission errors
/// - 3xxx: Company / point-of-sale errors
/// - 4xxx: Order errors
/// - 5xxx: Cash session errors
/// - 6xxx: Product errors
/// - 7xxx: Table errors
/// - 8xxx: Z report errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Authentication errors (1xxx)
    Auth,
    /// Permission errors (2xxx)
    Permission,
    /// Company / point-of-sale errors (3xxx)
    Company,
    /// Order errors (4xxx)
    Order,
    /// Cash session errors (5xxx)
    Session,
    /// Product errors (6xxx)
    Product,
    /// Table errors (7xxx)
    Table,
    /// Z report errors (8xxx)
    Report,
    /// System errors (9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Auth,
            2000..3000 => Self::Permission,
            3000..4000 => Self::Company,
            4000..5000 => Self::Order,
            5000..6000 => Self::Session,
            6000..7000 => Self::Product,
            7000..8000 => Self::Table,
            8000..9000 => Self::Report,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Auth => "auth",
            Self::Permission => "permission",
            Self::Company => "company",
            Self::Order => "order",
            Self::Session => "session",
            Self::Product => "product",
            Self::Table => "table",
            Self::Report => "report",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

//! Unified error codes for the back-office server
//!
//! This module defines all error codes used across the server and its clients.
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Company / point-of-sale errors
//! - 4xxx: Order errors
//! - 5xxx: Cash session errors
//! - 6xxx: Product errors
//! - 7xxx: Table errors
//! - 8xxx: Z report errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// Request carries no authenticated identity
    NotAuthenticated = 1001,
    /// Identity headers are present but malformed
    IdentityInvalid = 1002,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Entity belongs to a different company
    CompanyMismatch = 2002,

    // ==================== 3xxx: Company ====================
    /// Company not found
    CompanyNotFound = 3001,
    /// Point of sale not found
    PointOfSaleNotFound = 3002,
    /// Payment method not found
    PaymentMethodNotFound = 3003,

    // ==================== 4xxx: Order ====================
    /// Order point not found
    OrderNotFound = 4001,
    /// Order has already been paid
    OrderAlreadyPaid = 4002,
    /// Order has already been canceled
    OrderAlreadyCanceled = 4003,
    /// Order has no line items
    OrderEmpty = 4004,
    /// Order line not found
    OrderLineNotFound = 4005,
    /// No line items were eligible for the operation
    NoLinesEligible = 4006,

    // ==================== 5xxx: Cash session ====================
    /// Cash session not found
    SessionNotFound = 5001,
    /// An open cash session already exists for the point of sale
    SessionAlreadyOpen = 5002,
    /// Cash session has already been closed
    SessionAlreadyClosed = 5003,
    /// Cash session is still open (must be closed first)
    SessionNotClosed = 5004,
    /// Session number allocation exhausted its retries
    SessionNumberExhausted = 5005,

    // ==================== 6xxx: Product ====================
    /// Product not found
    ProductNotFound = 6001,
    /// Insufficient stock for the requested quantity
    InsufficientStock = 6002,

    // ==================== 7xxx: Table ====================
    /// Table not found
    TableNotFound = 7001,

    // ==================== 8xxx: Z report ====================
    /// Z report not found
    ReportNotFound = 8001,
    /// A Z report already exists for the session
    ReportAlreadyExists = 8002,
    /// Z report has already been closed
    ReportAlreadyClosed = 8003,
    /// Report number allocation exhausted its retries
    ReportNumberExhausted = 8004,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "Request is not authenticated",
            ErrorCode::IdentityInvalid => "Identity headers are invalid",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::CompanyMismatch => "Entity belongs to a different company",

            // Company
            ErrorCode::CompanyNotFound => "Company not found",
            ErrorCode::PointOfSaleNotFound => "Point of sale not found",
            ErrorCode::PaymentMethodNotFound => "Payment method not found",

            // Order
            ErrorCode::OrderNotFound => "Order point not found",
            ErrorCode::OrderAlreadyPaid => "Order has already been paid",
            ErrorCode::OrderAlreadyCanceled => "Order has already been canceled",
            ErrorCode::OrderEmpty => "Order has no line items",
            ErrorCode::OrderLineNotFound => "Order line not found",
            ErrorCode::NoLinesEligible => "No line items were eligible",

            // Cash session
            ErrorCode::SessionNotFound => "Cash session not found",
            ErrorCode::SessionAlreadyOpen => "An open cash session already exists",
            ErrorCode::SessionAlreadyClosed => "Cash session has already been closed",
            ErrorCode::SessionNotClosed => "Cash session is still open",
            ErrorCode::SessionNumberExhausted => "Could not allocate a session number",

            // Product
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::InsufficientStock => "Insufficient stock",

            // Table
            ErrorCode::TableNotFound => "Table not found",

            // Z report
            ErrorCode::ReportNotFound => "Z report not found",
            ErrorCode::ReportAlreadyExists => "A Z report already exists for this session",
            ErrorCode::ReportAlreadyClosed => "Z report has already been closed",
            ErrorCode::ReportNumberExhausted => "Could not allocate a report number",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::IdentityInvalid),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::CompanyMismatch),

            // Company
            3001 => Ok(ErrorCode::CompanyNotFound),
            3002 => Ok(ErrorCode::PointOfSaleNotFound),
            3003 => Ok(ErrorCode::PaymentMethodNotFound),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderAlreadyPaid),
            4003 => Ok(ErrorCode::OrderAlreadyCanceled),
            4004 => Ok(ErrorCode::OrderEmpty),
            4005 => Ok(ErrorCode::OrderLineNotFound),
            4006 => Ok(ErrorCode::NoLinesEligible),

            // Cash session
            5001 => Ok(ErrorCode::SessionNotFound),
            5002 => Ok(ErrorCode::SessionAlreadyOpen),
            5003 => Ok(ErrorCode::SessionAlreadyClosed),
            5004 => Ok(ErrorCode::SessionNotClosed),
            5005 => Ok(ErrorCode::SessionNumberExhausted),

            // Product
            6001 => Ok(ErrorCode::ProductNotFound),
            6002 => Ok(ErrorCode::InsufficientStock),

            // Table
            7001 => Ok(ErrorCode::TableNotFound),

            // Z report
            8001 => Ok(ErrorCode::ReportNotFound),
            8002 => Ok(ErrorCode::ReportAlreadyExists),
            8003 => Ok(ErrorCode::ReportAlreadyClosed),
            8004 => Ok(ErrorCode::ReportNumberExhausted),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        // General
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::Unknown.code(), 1);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::NotFound.code(), 3);
        assert_eq!(ErrorCode::AlreadyExists.code(), 4);
        assert_eq!(ErrorCode::InvalidRequest.code(), 5);
        assert_eq!(ErrorCode::InvalidFormat.code(), 6);
        assert_eq!(ErrorCode::RequiredField.code(), 7);
        assert_eq!(ErrorCode::ValueOutOfRange.code(), 8);

        // Auth
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::IdentityInvalid.code(), 1002);

        // Permission
        assert_eq!(ErrorCode::PermissionDenied.code(), 2001);
        assert_eq!(ErrorCode::CompanyMismatch.code(), 2002);

        // Company
        assert_eq!(ErrorCode::CompanyNotFound.code(), 3001);
        assert_eq!(ErrorCode::PointOfSaleNotFound.code(), 3002);
        assert_eq!(ErrorCode::PaymentMethodNotFound.code(), 3003);

        // Order
        assert_eq!(ErrorCode::OrderNotFound.code(), 4001);
        assert_eq!(ErrorCode::OrderAlreadyPaid.code(), 4002);
        assert_eq!(ErrorCode::OrderAlreadyCanceled.code(), 4003);
        assert_eq!(ErrorCode::OrderEmpty.code(), 4004);
        assert_eq!(ErrorCode::OrderLineNotFound.code(), 4005);
        assert_eq!(ErrorCode::NoLinesEligible.code(), 4006);

        // Cash session
        assert_eq!(ErrorCode::SessionNotFound.code(), 5001);
        assert_eq!(ErrorCode::SessionAlreadyOpen.code(), 5002);
        assert_eq!(ErrorCode::SessionAlreadyClosed.code(), 5003);
        assert_eq!(ErrorCode::SessionNotClosed.code(), 5004);
        assert_eq!(ErrorCode::SessionNumberExhausted.code(), 5005);

        // Product
        assert_eq!(ErrorCode::ProductNotFound.code(), 6001);
        assert_eq!(ErrorCode::InsufficientStock.code(), 6002);

        // Table
        assert_eq!(ErrorCode::TableNotFound.code(), 7001);

        // Z report
        assert_eq!(ErrorCode::ReportNotFound.code(), 8001);
        assert_eq!(ErrorCode::ReportAlreadyExists.code(), 8002);
        assert_eq!(ErrorCode::ReportAlreadyClosed.code(), 8003);
        assert_eq!(ErrorCode::ReportNumberExhausted.code(), 8004);

        // System
        assert_eq!(ErrorCode::InternalError.code(), 9001);
        assert_eq!(ErrorCode::DatabaseError.code(), 9002);
        assert_eq!(ErrorCode::ConfigError.code(), 9005);
    }

    #[test]
    fn test_is_success() {
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::Unknown.is_success());
        assert!(!ErrorCode::SessionNotFound.is_success());
        assert!(!ErrorCode::InternalError.is_success());
    }

    #[test]
    fn test_try_from_valid() {
        assert_eq!(ErrorCode::try_from(0), Ok(ErrorCode::Success));
        assert_eq!(ErrorCode::try_from(1001), Ok(ErrorCode::NotAuthenticated));
        assert_eq!(ErrorCode::try_from(4001), Ok(ErrorCode::OrderNotFound));
        assert_eq!(ErrorCode::try_from(5002), Ok(ErrorCode::SessionAlreadyOpen));
        assert_eq!(ErrorCode::try_from(6002), Ok(ErrorCode::InsufficientStock));
        assert_eq!(ErrorCode::try_from(8002), Ok(ErrorCode::ReportAlreadyExists));
        assert_eq!(ErrorCode::try_from(9001), Ok(ErrorCode::InternalError));
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
        assert_eq!(ErrorCode::try_from(10000), Err(InvalidErrorCode(10000)));
        assert_eq!(ErrorCode::try_from(1234), Err(InvalidErrorCode(1234)));
    }

    #[test]
    fn test_from_error_code_to_u16() {
        let code: u16 = ErrorCode::Success.into();
        assert_eq!(code, 0);

        let code: u16 = ErrorCode::NotAuthenticated.into();
        assert_eq!(code, 1001);

        let code: u16 = ErrorCode::InternalError.into();
        assert_eq!(code, 9001);
    }

    #[test]
    fn test_serialize() {
        let code = ErrorCode::NotFound;
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, "3");

        let code = ErrorCode::SessionNotFound;
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, "5001");

        let code = ErrorCode::Success;
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, "0");
    }

    #[test]
    fn test_deserialize() {
        let code: ErrorCode = serde_json::from_str("0").unwrap();
        assert_eq!(code, ErrorCode::Success);

        let code: ErrorCode = serde_json::from_str("3").unwrap();
        assert_eq!(code, ErrorCode::NotFound);

        let code: ErrorCode = serde_json::from_str("5001").unwrap();
        assert_eq!(code, ErrorCode::SessionNotFound);

        let code: ErrorCode = serde_json::from_str("9001").unwrap();
        assert_eq!(code, ErrorCode::InternalError);
    }

    #[test]
    fn test_deserialize_invalid() {
        let result: Result<ErrorCode, _> = serde_json::from_str("999");
        assert!(result.is_err());

        let result: Result<ErrorCode, _> = serde_json::from_str("10000");
        assert!(result.is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ErrorCode::Success), "0");
        assert_eq!(format!("{}", ErrorCode::NotFound), "3");
        assert_eq!(format!("{}", ErrorCode::SessionNotFound), "5001");
        assert_eq!(format!("{}", ErrorCode::InternalError), "9001");
    }

    #[test]
    fn test_message() {
        assert_eq!(
            ErrorCode::Success.message(),
            "Operation completed successfully"
        );
        assert_eq!(ErrorCode::NotFound.message(), "Resource not found");
        assert_eq!(ErrorCode::SessionNotFound.message(), "Cash session not found");
        assert_eq!(ErrorCode::InternalError.message(), "Internal server error");
    }

    #[test]
    fn test_invalid_error_code_display() {
        let err = InvalidErrorCode(999);
        assert_eq!(format!("{}", err), "invalid error code: 999");
    }

    #[test]
    fn test_roundtrip() {
        // Test that serialization -> deserialization roundtrip works
        let codes = [
            ErrorCode::Success,
            ErrorCode::NotAuthenticated,
            ErrorCode::PermissionDenied,
            ErrorCode::OrderNotFound,
            ErrorCode::SessionAlreadyOpen,
            ErrorCode::InsufficientStock,
            ErrorCode::ReportAlreadyExists,
            ErrorCode::InternalError,
        ];

        for code in codes {
            let json = serde_json::to_string(&code).unwrap();
            let parsed: ErrorCode = serde_json::from_str(&json).unwrap();
            assert_eq!(code, parsed);
        }
    }

    #[test]
    fn test_debug() {
        let debug_str = format!("{:?}", ErrorCode::Success);
        assert_eq!(debug_str, "Success");

        let debug_str = format!("{:?}", ErrorCode::SessionNotFound);
        assert_eq!(debug_str, "SessionNotFound");
    }

    #[test]
    fn test_hash() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(ErrorCode::Success);
        set.insert(ErrorCode::NotFound);
        set.insert(ErrorCode::Success); // Duplicate

        assert_eq!(set.len(), 2);
        assert!(set.contains(&ErrorCode::Success));
        assert!(set.contains(&ErrorCode::NotFound));
    }
}

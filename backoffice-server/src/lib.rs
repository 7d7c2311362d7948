//! POS Back-Office Server
//!
//! HTTP service for the cashier-facing back office of a point-of-sale
//! deployment: cash session lifecycle, table orders and end-of-day
//! Z reports, isolated per company.
//!
//! # Module structure
//!
//! ```text
//! backoffice-server/src/
//! ├── core/          # Configuration, shared state, HTTP server
//! ├── auth/          # Gateway identity headers, extractor, middleware
//! ├── api/           # HTTP routes and handlers
//! ├── db/            # Connection pool, migrations, repositories
//! └── utils/         # Validation, time, logging helpers
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod utils;

// Re-export public types
pub use auth::Identity;
pub use core::{AppState, Config, Server};

// Re-export unified error types from shared
pub use shared::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Audit logging macro - structured event on the "audit" target
#[macro_export]
macro_rules! audit_log {
    ($action:expr, $resource:expr, $id:expr $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::info!(
            target: "audit",
            action = $action,
            resource = $resource,
            id = %$id,
            $($key = $value),*
        );
    };
}

// Security logging macro - structured event on the "security" target
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

pub fn print_banner() {
    println!(
        r#"
    ____             __
   / __ )____ ______/ /__
  / __  / __ `/ ___/ //_/
 / /_/ / /_/ / /__/ ,<
/_____/\__,_/\___/_/|_|
   ____  _________
  / __ \/ __/ __(_)_______
 / / / / /_/ /_/ / ___/ _ \
/ /_/ / __/ __/ / /__/  __/
\____/_/ /_/ /_/\___/\___/
    "#
    );
}

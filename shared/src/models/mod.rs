//! Data models
//!
//! Shared between the back-office server and its API clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY), timestamps Unix millis.

pub mod cash_session;
pub mod company;
pub mod dining_table;
pub mod order_point;
pub mod payment_method;
pub mod point_of_sale;
pub mod product;
pub mod z_report;

// Re-exports
pub use cash_session::*;
pub use company::*;
pub use dining_table::*;
pub use order_point::*;
pub use payment_method::*;
pub use point_of_sale::*;
pub use product::*;
pub use z_report::*;

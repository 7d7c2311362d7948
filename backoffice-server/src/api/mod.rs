//! HTTP API
//!
//! One module per resource. Each exposes a `router()` that nests its
//! routes under the `/api` prefix; [`crate::core::build_app`] merges
//! them. Health is the exception: it lives outside `/api` and skips the
//! identity layer.

pub mod cash_sessions;
pub mod health;
pub mod order_points;
pub mod z_reports;

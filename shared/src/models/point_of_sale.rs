//! Point of Sale Model

use serde::{Deserialize, Serialize};

/// Point of sale entity (a till / register within a company)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PointOfSale {
    pub id: i64,
    pub company_id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Back-reference to the currently OPEN cash session, cleared on close.
    /// Advisory only; `cash_session.status` is the source of truth.
    pub active_session_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

//! Payment Method Model

use serde::{Deserialize, Serialize};

/// Payment method entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PaymentMethod {
    pub id: i64,
    pub company_id: i64,
    /// Method name ("cash", "card", ...). Cash-drawer reconciliation
    /// matches the method named "cash" case-insensitively.
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

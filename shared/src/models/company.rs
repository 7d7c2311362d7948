//! Company Model

use serde::{Deserialize, Serialize};

/// Company entity - the tenant root every other record hangs off
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Company {
    pub id: i64,
    pub name: String,
    /// When false, stock is never checked nor mutated by order flows
    pub is_stock_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

//! Dining Table Model

use serde::{Deserialize, Serialize};

/// Dining table status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum TableStatus {
    #[default]
    Free,
    InUse,
    Reserved,
}

impl TableStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableStatus::Free => "FREE",
            TableStatus::InUse => "IN_USE",
            TableStatus::Reserved => "RESERVED",
        }
    }
}

impl std::fmt::Display for TableStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Dining table entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DiningTable {
    pub id: i64,
    pub company_id: i64,
    pub point_of_sale_id: i64,
    /// Table number as shown on the floor plan
    pub number: i32,
    pub capacity: i32,
    pub status: TableStatus,
    /// Back-reference to the unpaid order occupying this table.
    /// Advisory only; order status is the source of truth.
    pub active_order_point_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

//! Product Model

use serde::{Deserialize, Serialize};

/// Product entity (catalog row consumed by order flows; no CRUD surface here)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,
    pub company_id: i64,
    pub name: String,
    /// Denormalized category name, used in report breakdowns
    pub category: Option<String>,
    /// Regular price
    pub price: f64,
    /// Price used by point-of-sale orders, before discount
    pub point_price: f64,
    /// Discount percentage (0-100) applied on top of `point_price`
    pub discount_rate: f64,
    pub stock: i64,
    pub is_sold_out: bool,
    pub is_deleted: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Product {
    /// Unit price an order line snapshots: `point_price` with
    /// `discount_rate` applied when the rate is positive.
    pub fn effective_point_price(&self) -> f64 {
        if self.discount_rate > 0.0 {
            self.point_price - (self.point_price * self.discount_rate / 100.0)
        } else {
            self.point_price
        }
    }
}

//! Order Point Model

use serde::{Deserialize, Serialize};

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum OrderPointStatus {
    #[default]
    Pending,
    Preparing,
    Ready,
    Served,
    Paid,
    Canceled,
}

impl OrderPointStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderPointStatus::Pending => "PENDING",
            OrderPointStatus::Preparing => "PREPARING",
            OrderPointStatus::Ready => "READY",
            OrderPointStatus::Served => "SERVED",
            OrderPointStatus::Paid => "PAID",
            OrderPointStatus::Canceled => "CANCELED",
        }
    }
}

impl std::fmt::Display for OrderPointStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kitchen status of a single line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum OrderLineStatus {
    #[default]
    Pending,
    InKitchen,
    Ready,
    Canceled,
}

impl OrderLineStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderLineStatus::Pending => "PENDING",
            OrderLineStatus::InKitchen => "IN_KITCHEN",
            OrderLineStatus::Ready => "READY",
            OrderLineStatus::Canceled => "CANCELED",
        }
    }
}

impl std::fmt::Display for OrderLineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Order line - one product on an order, with price/name/discount
/// snapshotted at the time the line was added
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderLine {
    pub id: i64,
    pub order_point_id: i64,
    pub product_id: i64,
    /// Product name at the time of ordering
    pub product_name: String,
    pub amount: i64,
    /// Effective unit price at the time of ordering (discount applied)
    pub price: f64,
    /// Discount rate snapshot, informational
    pub discount_rate: f64,
    pub status: OrderLineStatus,
    pub note: Option<String>,
    /// Selected options as a JSON array of strings, stored verbatim
    pub options_selected: Option<String>,
    pub sent_to_kitchen_at: Option<i64>,
}

impl OrderLine {
    /// Parsed `options_selected`; empty when absent or malformed.
    pub fn options(&self) -> Vec<String> {
        self.options_selected
            .as_deref()
            .and_then(|s| serde_json::from_str(s).ok())
            .unwrap_or_default()
    }
}

/// Order point entity - an order opened on a dining table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderPoint {
    pub id: i64,
    pub company_id: i64,
    pub point_of_sale_id: i64,
    pub table_id: i64,
    /// Cash session that was open on the point of sale at creation
    pub cash_session_id: Option<i64>,
    /// User who created the order
    pub user_id: i64,
    pub status: OrderPointStatus,
    /// Running sum of line amount * unit price
    pub subtotal: f64,
    /// Discount amount applied at payment (0 until processed)
    pub discount: f64,
    /// subtotal - discount, stamped at payment (0 until processed)
    pub total: f64,
    pub payment_method_id: Option<i64>,
    pub notes: Option<String>,
    pub processed_at: Option<i64>,
    /// User who took the payment
    pub processed_by: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,

    // -- Relations (populated by application code, skipped by FromRow) --
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub products: Vec<OrderLine>,
}

impl OrderPoint {
    /// PAID and CANCELED orders have frozen financial fields and reject
    /// every mutation.
    pub fn is_finalized(&self) -> bool {
        matches!(
            self.status,
            OrderPointStatus::Paid | OrderPointStatus::Canceled
        )
    }
}

/// Discount amount for a payment request: values up to 100 are a
/// percentage of the subtotal, larger values a fixed amount clamped to
/// the subtotal. Non-positive discounts yield 0.
pub fn discount_amount(subtotal: f64, discount: f64) -> f64 {
    if discount <= 0.0 {
        0.0
    } else if discount <= 100.0 {
        (subtotal * discount) / 100.0
    } else {
        discount.min(subtotal)
    }
}

/// One requested line on create/update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineInput {
    pub product_id: i64,
    pub amount: i64,
    pub note: Option<String>,
    pub options_selected: Option<Vec<String>>,
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPointCreate {
    pub table_id: i64,
    pub point_of_sale_id: i64,
    pub products: Vec<OrderLineInput>,
}

/// Add/merge products payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPointUpdate {
    pub products: Vec<OrderLineInput>,
}

/// Remove lines payload (by product id)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLinesRemove {
    pub product_ids: Vec<i64>,
}

/// Send lines to kitchen payload (by product id)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendToKitchen {
    pub product_ids: Vec<i64>,
}

/// Pay order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPointProcess {
    pub payment_method_id: i64,
    /// <= 100 percentage, > 100 fixed amount
    pub discount: Option<f64>,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&OrderLineStatus::InKitchen).unwrap(),
            "\"IN_KITCHEN\""
        );
        assert_eq!(
            serde_json::to_string(&OrderPointStatus::Canceled).unwrap(),
            "\"CANCELED\""
        );
        assert_eq!(OrderPointStatus::default(), OrderPointStatus::Pending);
        assert_eq!(OrderLineStatus::default(), OrderLineStatus::Pending);
    }

    #[test]
    fn test_discount_amount_percentage() {
        assert_eq!(discount_amount(200.0, 20.0), 40.0);
        assert_eq!(discount_amount(200.0, 100.0), 200.0);
    }

    #[test]
    fn test_discount_amount_fixed_clamped() {
        assert_eq!(discount_amount(200.0, 150.0), 150.0);
        assert_eq!(discount_amount(200.0, 250.0), 200.0);
    }

    #[test]
    fn test_discount_amount_non_positive() {
        assert_eq!(discount_amount(200.0, 0.0), 0.0);
        assert_eq!(discount_amount(200.0, -5.0), 0.0);
    }

    #[test]
    fn test_line_options_parsing() {
        let mut line = OrderLine {
            id: 1,
            order_point_id: 1,
            product_id: 1,
            product_name: "Burger".to_string(),
            amount: 1,
            price: 9.5,
            discount_rate: 0.0,
            status: OrderLineStatus::Pending,
            note: None,
            options_selected: Some(r#"["no onion","extra cheese"]"#.to_string()),
            sent_to_kitchen_at: None,
        };
        assert_eq!(line.options(), vec!["no onion", "extra cheese"]);

        line.options_selected = None;
        assert!(line.options().is_empty());

        line.options_selected = Some("not json".to_string());
        assert!(line.options().is_empty());
    }

    #[test]
    fn test_is_finalized() {
        let mut order = OrderPoint {
            id: 1,
            company_id: 1,
            point_of_sale_id: 1,
            table_id: 1,
            cash_session_id: None,
            user_id: 1,
            status: OrderPointStatus::Pending,
            subtotal: 0.0,
            discount: 0.0,
            total: 0.0,
            payment_method_id: None,
            notes: None,
            processed_at: None,
            processed_by: None,
            created_at: 0,
            updated_at: 0,
            products: vec![],
        };
        assert!(!order.is_finalized());
        order.status = OrderPointStatus::Served;
        assert!(!order.is_finalized());
        order.status = OrderPointStatus::Paid;
        assert!(order.is_finalized());
        order.status = OrderPointStatus::Canceled;
        assert!(order.is_finalized());
    }
}

//! Z Report Model

use serde::{Deserialize, Serialize};

use crate::util::round2;

/// Z report status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum ZReportStatus {
    #[default]
    Generated,
    Closed,
}

impl ZReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ZReportStatus::Generated => "GENERATED",
            ZReportStatus::Closed => "CLOSED",
        }
    }
}

impl std::fmt::Display for ZReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-payment-method breakdown row (child table)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ZReportPayment {
    pub id: i64,
    pub z_report_id: i64,
    pub payment_method_id: i64,
    /// Method name snapshot
    pub method_name: String,
    pub transaction_count: i64,
    pub total_amount: f64,
    /// Share of gross sales, 0-100, 2 decimals
    pub percentage: f64,
}

/// Top-product breakdown row (child table, stored in quantity rank order)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ZReportProduct {
    pub id: i64,
    pub z_report_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub category: String,
    pub quantity_sold: i64,
    pub revenue: f64,
    /// Mean of the line unit prices this product appeared with, 2 decimals
    pub average_price: f64,
}

/// Z report entity - immutable fiscal snapshot of a closed cash session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ZReport {
    pub id: i64,
    pub company_id: i64,
    pub point_of_sale_id: i64,
    pub cash_session_id: i64,
    /// `ZYYYYMMDD-NNNN`, per-company-per-day sequential
    pub report_number: String,
    pub report_date: i64,

    // Session snapshot
    pub session_number: String,
    /// User who ran the session
    pub cashier_id: i64,
    pub session_start_date: i64,
    pub session_end_date: Option<i64>,

    // Financial summary over the session's PAID orders
    pub total_transactions: i64,
    pub gross_sales: f64,
    pub net_sales: f64,
    pub total_tax: f64,
    pub total_discounts: f64,
    pub total_refunds: f64,

    // Cash control copied from the session
    pub initial_cash: f64,
    pub expected_cash: f64,
    pub actual_cash: f64,
    pub cash_difference: f64,

    pub total_items_sold: i64,
    pub voided_amount: f64,

    // Statistics
    pub average_order_value: f64,
    pub largest_transaction: f64,
    pub smallest_transaction: f64,

    pub status: ZReportStatus,
    pub generated_at: i64,
    pub generated_by: i64,
    pub closed_at: Option<i64>,
    pub closed_by: Option<i64>,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,

    // -- Relations (populated by application code, skipped by FromRow) --
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub payment_methods: Vec<ZReportPayment>,
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub top_products: Vec<ZReportProduct>,
}

/// Generate report payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZReportGenerate {
    pub cash_session_id: i64,
    pub notes: Option<String>,
}

/// Close report payload
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ZReportClose {
    pub notes: Option<String>,
}

/// Aggregate over a filtered set of reports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZReportsSummary {
    pub total_reports: u64,
    pub total_transactions: i64,
    pub total_gross_sales: f64,
    pub total_net_sales: f64,
    pub total_discounts: f64,
    pub total_cash_difference: f64,
    /// Gross sales over transactions, 2 decimals, 0 when no transactions
    pub average_order_value: f64,
}

impl ZReportsSummary {
    pub fn from_reports(reports: &[ZReport]) -> Self {
        let total_reports = reports.len() as u64;
        let total_transactions: i64 = reports.iter().map(|r| r.total_transactions).sum();
        let gross: f64 = reports.iter().map(|r| r.gross_sales).sum();
        let net: f64 = reports.iter().map(|r| r.net_sales).sum();
        let discounts: f64 = reports.iter().map(|r| r.total_discounts).sum();
        let cash_difference: f64 = reports.iter().map(|r| r.cash_difference).sum();
        let average = if total_transactions > 0 {
            gross / total_transactions as f64
        } else {
            0.0
        };

        Self {
            total_reports,
            total_transactions,
            total_gross_sales: round2(gross),
            total_net_sales: round2(net),
            total_discounts: round2(discounts),
            total_cash_difference: round2(cash_difference),
            average_order_value: round2(average),
        }
    }
}

/// Voided transaction entry. Void flows are not implemented; the
/// section always renders empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoidedTransaction {
    pub order_point_id: i64,
    pub amount: f64,
    pub voided_at: i64,
}

/// Print-ready document, a pure reshape of a stored report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZReportPrint {
    pub header: PrintHeader,
    pub financial_summary: PrintFinancialSummary,
    pub payment_methods: Vec<ZReportPayment>,
    pub cash_control: PrintCashControl,
    pub products_summary: PrintProductsSummary,
    pub statistics: PrintStatistics,
    pub voided_transactions: PrintVoided,
    pub footer: PrintFooter,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrintHeader {
    pub report_number: String,
    pub report_date: i64,
    pub point_of_sale: String,
    pub cashier_id: i64,
    pub session_number: String,
    pub session_period: SessionPeriod,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionPeriod {
    pub start: i64,
    pub end: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrintFinancialSummary {
    pub total_transactions: i64,
    pub gross_sales: f64,
    pub net_sales: f64,
    pub total_tax: f64,
    pub total_discounts: f64,
    pub total_refunds: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrintCashControl {
    pub initial_cash: f64,
    pub expected_cash: f64,
    pub actual_cash: f64,
    pub difference: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrintProductsSummary {
    pub total_items_sold: i64,
    pub top_products: Vec<ZReportProduct>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrintStatistics {
    pub average_order_value: f64,
    pub largest_transaction: f64,
    pub smallest_transaction: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrintVoided {
    pub count: u64,
    pub total_amount: f64,
    pub transactions: Vec<VoidedTransaction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrintFooter {
    pub generated_at: i64,
    pub generated_by: i64,
    pub status: ZReportStatus,
    pub notes: Option<String>,
}

impl ZReport {
    /// Reshape into the print document. `point_of_sale` is the resolved
    /// display name.
    pub fn print_document(&self, point_of_sale: &str) -> ZReportPrint {
        ZReportPrint {
            header: PrintHeader {
                report_number: self.report_number.clone(),
                report_date: self.report_date,
                point_of_sale: point_of_sale.to_string(),
                cashier_id: self.cashier_id,
                session_number: self.session_number.clone(),
                session_period: SessionPeriod {
                    start: self.session_start_date,
                    end: self.session_end_date,
                },
            },
            financial_summary: PrintFinancialSummary {
                total_transactions: self.total_transactions,
                gross_sales: self.gross_sales,
                net_sales: self.net_sales,
                total_tax: self.total_tax,
                total_discounts: self.total_discounts,
                total_refunds: self.total_refunds,
            },
            payment_methods: self.payment_methods.clone(),
            cash_control: PrintCashControl {
                initial_cash: self.initial_cash,
                expected_cash: self.expected_cash,
                actual_cash: self.actual_cash,
                difference: self.cash_difference,
            },
            products_summary: PrintProductsSummary {
                total_items_sold: self.total_items_sold,
                top_products: self.top_products.clone(),
            },
            statistics: PrintStatistics {
                average_order_value: self.average_order_value,
                largest_transaction: self.largest_transaction,
                smallest_transaction: self.smallest_transaction,
            },
            voided_transactions: PrintVoided {
                count: 0,
                total_amount: self.voided_amount,
                transactions: Vec::new(),
            },
            footer: PrintFooter {
                generated_at: self.generated_at,
                generated_by: self.generated_by,
                status: self.status,
                notes: self.notes.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(gross: f64, net: f64, discounts: f64, diff: f64, transactions: i64) -> ZReport {
        ZReport {
            id: 1,
            company_id: 1,
            point_of_sale_id: 1,
            cash_session_id: 1,
            report_number: "Z20250101-0001".to_string(),
            report_date: 1000,
            session_number: "20250101-001".to_string(),
            cashier_id: 7,
            session_start_date: 0,
            session_end_date: Some(900),
            total_transactions: transactions,
            gross_sales: gross,
            net_sales: net,
            total_tax: 0.0,
            total_discounts: discounts,
            total_refunds: 0.0,
            initial_cash: 100.0,
            expected_cash: 180.0,
            actual_cash: 185.0,
            cash_difference: diff,
            total_items_sold: 12,
            voided_amount: 0.0,
            average_order_value: 0.0,
            largest_transaction: 0.0,
            smallest_transaction: 0.0,
            status: ZReportStatus::Generated,
            generated_at: 1000,
            generated_by: 7,
            closed_at: None,
            closed_by: None,
            notes: None,
            created_at: 1000,
            updated_at: 1000,
            payment_methods: vec![],
            top_products: vec![],
        }
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&ZReportStatus::Generated).unwrap(),
            "\"GENERATED\""
        );
        assert_eq!(ZReportStatus::default(), ZReportStatus::Generated);
    }

    #[test]
    fn test_summary_totals() {
        let reports = vec![
            report(100.0, 90.0, 10.0, 5.0, 4),
            report(50.0, 50.0, 0.0, -2.5, 1),
        ];
        let summary = ZReportsSummary::from_reports(&reports);
        assert_eq!(summary.total_reports, 2);
        assert_eq!(summary.total_transactions, 5);
        assert_eq!(summary.total_gross_sales, 150.0);
        assert_eq!(summary.total_net_sales, 140.0);
        assert_eq!(summary.total_discounts, 10.0);
        assert_eq!(summary.total_cash_difference, 2.5);
        // 150 / 5
        assert_eq!(summary.average_order_value, 30.0);
    }

    #[test]
    fn test_summary_empty_and_zero_transactions() {
        let summary = ZReportsSummary::from_reports(&[]);
        assert_eq!(summary.total_reports, 0);
        assert_eq!(summary.average_order_value, 0.0);

        let summary = ZReportsSummary::from_reports(&[report(0.0, 0.0, 0.0, 0.0, 0)]);
        assert_eq!(summary.total_reports, 1);
        assert_eq!(summary.average_order_value, 0.0);
    }

    #[test]
    fn test_print_document_shape() {
        let mut r = report(150.0, 140.0, 10.0, 5.0, 5);
        r.payment_methods = vec![ZReportPayment {
            id: 1,
            z_report_id: 1,
            payment_method_id: 3,
            method_name: "cash".to_string(),
            transaction_count: 5,
            total_amount: 150.0,
            percentage: 100.0,
        }];
        let doc = r.print_document("Main Bar");
        assert_eq!(doc.header.point_of_sale, "Main Bar");
        assert_eq!(doc.header.report_number, "Z20250101-0001");
        assert_eq!(doc.header.session_period.start, 0);
        assert_eq!(doc.financial_summary.gross_sales, 150.0);
        assert_eq!(doc.cash_control.difference, 5.0);
        assert_eq!(doc.payment_methods.len(), 1);
        assert_eq!(doc.voided_transactions.count, 0);
        assert!(doc.voided_transactions.transactions.is_empty());
        assert_eq!(doc.footer.status, ZReportStatus::Generated);
    }
}

//! Z Report Repository
//!
//! A Z report is the immutable fiscal snapshot of one closed cash session:
//! financial totals over the session's PAID orders, a per-payment-method
//! breakdown, the top sold products and the session's cash reconciliation,
//! all frozen at generation time.
//!
//! Tax, refund and void amounts have no feeding flow and always store 0.
//! One report per session, enforced by the UNIQUE constraint on
//! `cash_session_id`.

use super::{RepoError, RepoResult};
use crate::utils::query_builder::QueryBuilder;
use crate::utils::time::date_stamp;
use shared::models::{
    CashSession, OrderPoint, PaymentMethod, ZReport, ZReportClose, ZReportPayment, ZReportProduct,
    ZReportStatus,
};
use shared::util::{now_millis, round2};
use shared::ErrorCode;
use sqlx::SqlitePool;
use std::collections::HashMap;

const COLUMNS: &str = "id, company_id, point_of_sale_id, cash_session_id, report_number, report_date, session_number, cashier_id, session_start_date, session_end_date, total_transactions, gross_sales, net_sales, total_tax, total_discounts, total_refunds, initial_cash, expected_cash, actual_cash, cash_difference, total_items_sold, voided_amount, average_order_value, largest_transaction, smallest_transaction, status, generated_at, generated_by, closed_at, closed_by, notes, created_at, updated_at";

/// Optional list filters; every field is independently combinable.
#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    pub point_of_sale_id: Option<i64>,
    pub status: Option<ZReportStatus>,
    /// Half-open `[start, end)` window on `report_date`, Unix millis
    pub date_range: Option<(i64, i64)>,
}

fn filter_builder(company_id: i64, filter: &ReportFilter) -> QueryBuilder {
    let mut builder = QueryBuilder::new();
    builder.add_condition("company_id = ?").bind_i64(company_id);
    if let Some(pos_id) = filter.point_of_sale_id {
        builder.add_condition("point_of_sale_id = ?").bind_i64(pos_id);
    }
    if let Some(status) = filter.status {
        builder
            .add_condition("status = ?")
            .bind_text(status.as_str().to_string());
    }
    if let Some((start, end)) = filter.date_range {
        builder
            .add_condition("report_date >= ?")
            .bind_i64(start)
            .add_condition("report_date < ?")
            .bind_i64(end);
    }
    builder
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<ZReport>> {
    let report =
        sqlx::query_as::<_, ZReport>(&format!("SELECT {COLUMNS} FROM z_report WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(report)
}

/// Report with its payment and product breakdowns populated.
pub async fn find_with_children(pool: &SqlitePool, id: i64) -> RepoResult<Option<ZReport>> {
    let Some(mut report) = find_by_id(pool, id).await? else {
        return Ok(None);
    };
    report.payment_methods = find_payments(pool, id).await?;
    report.top_products = find_products(pool, id).await?;
    Ok(Some(report))
}

pub async fn find_by_session(
    pool: &SqlitePool,
    cash_session_id: i64,
) -> RepoResult<Option<ZReport>> {
    let report = sqlx::query_as::<_, ZReport>(&format!(
        "SELECT {COLUMNS} FROM z_report WHERE cash_session_id = ?"
    ))
    .bind(cash_session_id)
    .fetch_optional(pool)
    .await?;
    Ok(report)
}

pub async fn find_payments(pool: &SqlitePool, z_report_id: i64) -> RepoResult<Vec<ZReportPayment>> {
    let payments = sqlx::query_as::<_, ZReportPayment>(
        "SELECT id, z_report_id, payment_method_id, method_name, transaction_count, total_amount, percentage FROM z_report_payment WHERE z_report_id = ? ORDER BY id",
    )
    .bind(z_report_id)
    .fetch_all(pool)
    .await?;
    Ok(payments)
}

pub async fn find_products(pool: &SqlitePool, z_report_id: i64) -> RepoResult<Vec<ZReportProduct>> {
    let products = sqlx::query_as::<_, ZReportProduct>(
        "SELECT id, z_report_id, product_id, product_name, category, quantity_sold, revenue, average_price FROM z_report_product WHERE z_report_id = ? ORDER BY id",
    )
    .bind(z_report_id)
    .fetch_all(pool)
    .await?;
    Ok(products)
}

/// Next `ZYYYYMMDD-NNNN` report number for the company.
///
/// Reads the current per-day maximum and increments. Not atomic with the
/// insert; `generate` retries on a number collision.
async fn next_report_number(pool: &SqlitePool, company_id: i64, now: i64) -> RepoResult<String> {
    let stamp = date_stamp(now);
    let last: Option<String> = sqlx::query_scalar(
        "SELECT report_number FROM z_report WHERE company_id = ? AND report_number LIKE ? ORDER BY report_number DESC LIMIT 1",
    )
    .bind(company_id)
    .bind(format!("Z{stamp}-%"))
    .fetch_optional(pool)
    .await?;

    let seq = last
        .as_deref()
        .and_then(|n| n.rsplit_once('-'))
        .and_then(|(_, suffix)| suffix.parse::<u32>().ok())
        .unwrap_or(0)
        + 1;
    Ok(format!("Z{stamp}-{seq:04}"))
}

struct ReportMetrics {
    total_transactions: i64,
    gross_sales: f64,
    net_sales: f64,
    total_discounts: f64,
    total_items_sold: i64,
    average_order_value: f64,
    largest_transaction: f64,
    smallest_transaction: f64,
}

/// Financial totals over the session's PAID orders.
///
/// `smallest_transaction` only considers orders with a positive subtotal,
/// so fully waived orders do not drag it to zero.
fn compute_metrics(orders: &[OrderPoint]) -> ReportMetrics {
    let total_transactions = orders.len() as i64;
    let gross_sales: f64 = orders.iter().map(|o| o.subtotal).sum();
    let total_discounts: f64 = orders.iter().map(|o| o.discount).sum();
    let total_items_sold: i64 = orders
        .iter()
        .flat_map(|o| &o.products)
        .map(|line| line.amount)
        .sum();
    let largest_transaction = orders.iter().map(|o| o.subtotal).fold(0.0, f64::max);
    let smallest_transaction = orders
        .iter()
        .map(|o| o.subtotal)
        .filter(|s| *s > 0.0)
        .fold(f64::INFINITY, f64::min);
    let smallest_transaction = if smallest_transaction.is_finite() {
        smallest_transaction
    } else {
        0.0
    };
    let average_order_value = if total_transactions > 0 {
        round2(gross_sales / total_transactions as f64)
    } else {
        0.0
    };

    ReportMetrics {
        total_transactions,
        gross_sales,
        net_sales: gross_sales - total_discounts,
        total_discounts,
        total_items_sold,
        average_order_value,
        largest_transaction,
        smallest_transaction,
    }
}

struct PaymentRow {
    payment_method_id: i64,
    method_name: String,
    transaction_count: i64,
    total_amount: f64,
    percentage: f64,
}

/// Per-method transaction counts and totals, in the company's method
/// order. Methods that took no order are dropped. Percentages are shares
/// of gross sales, so orders paid with a method missing from the active
/// list still count toward the denominator.
fn payment_breakdown(methods: &[PaymentMethod], orders: &[OrderPoint]) -> Vec<PaymentRow> {
    let grand_total: f64 = orders.iter().map(|o| o.subtotal).sum();
    let mut rows = Vec::new();
    for method in methods {
        let taken: Vec<&OrderPoint> = orders
            .iter()
            .filter(|o| o.payment_method_id == Some(method.id))
            .collect();
        if taken.is_empty() {
            continue;
        }
        let total_amount: f64 = taken.iter().map(|o| o.subtotal).sum();
        let percentage = if grand_total > 0.0 {
            round2(total_amount / grand_total * 100.0)
        } else {
            0.0
        };
        rows.push(PaymentRow {
            payment_method_id: method.id,
            method_name: method.name.clone(),
            transaction_count: taken.len() as i64,
            total_amount,
            percentage,
        });
    }
    rows
}

struct ProductRow {
    product_id: i64,
    product_name: String,
    quantity_sold: i64,
    revenue: f64,
    average_price: f64,
}

/// Top products by quantity sold, at most ten.
///
/// `average_price` is the mean of the unit prices the product appeared
/// with on the session's lines, one sample per line. Ties keep the order
/// the products first appeared in.
fn top_products(orders: &[OrderPoint]) -> Vec<ProductRow> {
    struct Acc {
        product_id: i64,
        product_name: String,
        quantity: i64,
        revenue: f64,
        price_sum: f64,
        lines: i64,
    }
    let mut acc: Vec<Acc> = Vec::new();
    for line in orders.iter().flat_map(|o| &o.products) {
        match acc.iter_mut().find(|a| a.product_id == line.product_id) {
            Some(entry) => {
                entry.quantity += line.amount;
                entry.revenue += line.amount as f64 * line.price;
                entry.price_sum += line.price;
                entry.lines += 1;
            }
            None => acc.push(Acc {
                product_id: line.product_id,
                product_name: line.product_name.clone(),
                quantity: line.amount,
                revenue: line.amount as f64 * line.price,
                price_sum: line.price,
                lines: 1,
            }),
        }
    }
    acc.sort_by(|a, b| b.quantity.cmp(&a.quantity));
    acc.truncate(10);
    acc.into_iter()
        .map(|a| ProductRow {
            product_id: a.product_id,
            product_name: a.product_name,
            quantity_sold: a.quantity,
            revenue: round2(a.revenue),
            average_price: round2(a.price_sum / a.lines as f64),
        })
        .collect()
}

/// Generate the report for a closed session.
///
/// Aggregates the session's PAID orders, copies the session's cash
/// reconciliation verbatim and inserts the report with its payment and
/// product breakdowns in one transaction. Retries with the next number on
/// a same-day number race, up to `retry_max` attempts.
pub async fn generate(
    pool: &SqlitePool,
    session: &CashSession,
    notes: Option<String>,
    generated_by: i64,
    retry_max: u32,
) -> RepoResult<ZReport> {
    if session.is_open() {
        return Err(RepoError::Conflict(
            ErrorCode::SessionNotClosed,
            format!("Cash session {} must be closed before generating a report", session.id),
        ));
    }
    if find_by_session(pool, session.id).await?.is_some() {
        return Err(RepoError::Conflict(
            ErrorCode::ReportAlreadyExists,
            format!("A report already exists for cash session {}", session.id),
        ));
    }

    let orders = super::order_point::find_paid_by_session(pool, session.id).await?;
    let methods = super::payment_method::find_active(pool, session.company_id).await?;
    let metrics = compute_metrics(&orders);
    let payments = payment_breakdown(&methods, &orders);
    let products = top_products(&orders);

    // Category names resolve against the current catalog, soft-deleted
    // rows included, so renamed or retired products still label correctly.
    let product_ids: Vec<i64> = products.iter().map(|p| p.product_id).collect();
    let categories: HashMap<i64, Option<String>> =
        super::product::find_categories_by_ids(pool, &product_ids)
            .await?
            .into_iter()
            .collect();

    let now = now_millis();
    for _ in 0..retry_max {
        let number = next_report_number(pool, session.company_id, now).await?;
        let mut tx = pool.begin().await?;

        let inserted = sqlx::query_scalar::<_, i64>(
            "INSERT INTO z_report (company_id, point_of_sale_id, cash_session_id, report_number, report_date, session_number, cashier_id, session_start_date, session_end_date, total_transactions, gross_sales, net_sales, total_discounts, initial_cash, expected_cash, actual_cash, cash_difference, total_items_sold, average_order_value, largest_transaction, smallest_transaction, status, generated_at, generated_by, notes, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, 'GENERATED', ?5, ?22, ?23, ?5, ?5) RETURNING id",
        )
        .bind(session.company_id)
        .bind(session.point_of_sale_id)
        .bind(session.id)
        .bind(&number)
        .bind(now)
        .bind(&session.session_number)
        .bind(session.user_id)
        .bind(session.start_date)
        .bind(session.end_date)
        .bind(metrics.total_transactions)
        .bind(metrics.gross_sales)
        .bind(metrics.net_sales)
        .bind(metrics.total_discounts)
        .bind(session.initial_cash)
        .bind(session.expected_cash.unwrap_or(0.0))
        .bind(session.final_cash.unwrap_or(0.0))
        .bind(session.cash_difference.unwrap_or(0.0))
        .bind(metrics.total_items_sold)
        .bind(metrics.average_order_value)
        .bind(metrics.largest_transaction)
        .bind(metrics.smallest_transaction)
        .bind(generated_by)
        .bind(&notes)
        .fetch_one(&mut *tx)
        .await;

        match inserted {
            Ok(id) => {
                for row in &payments {
                    sqlx::query(
                        "INSERT INTO z_report_payment (z_report_id, payment_method_id, method_name, transaction_count, total_amount, percentage) VALUES (?, ?, ?, ?, ?, ?)",
                    )
                    .bind(id)
                    .bind(row.payment_method_id)
                    .bind(&row.method_name)
                    .bind(row.transaction_count)
                    .bind(row.total_amount)
                    .bind(row.percentage)
                    .execute(&mut *tx)
                    .await?;
                }
                for row in &products {
                    let category = categories
                        .get(&row.product_id)
                        .and_then(|c| c.clone())
                        .unwrap_or_else(|| "Uncategorized".to_string());
                    sqlx::query(
                        "INSERT INTO z_report_product (z_report_id, product_id, product_name, category, quantity_sold, revenue, average_price) VALUES (?, ?, ?, ?, ?, ?, ?)",
                    )
                    .bind(id)
                    .bind(row.product_id)
                    .bind(&row.product_name)
                    .bind(category)
                    .bind(row.quantity_sold)
                    .bind(row.revenue)
                    .bind(row.average_price)
                    .execute(&mut *tx)
                    .await?;
                }
                tx.commit().await?;
                return find_with_children(pool, id)
                    .await?
                    .ok_or_else(|| RepoError::Database("Failed to create report".to_string()));
            }
            Err(e) if super::is_unique_violation(&e) => {
                tx.rollback().await?;
                // One report per session is not retryable; a number
                // collision is.
                if e.to_string().contains("cash_session_id") {
                    return Err(RepoError::Conflict(
                        ErrorCode::ReportAlreadyExists,
                        format!("A report already exists for cash session {}", session.id),
                    ));
                }
                tracing::warn!("Report number {number} already taken, retrying");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(RepoError::Conflict(
        ErrorCode::ReportNumberExhausted,
        format!("Could not allocate a report number after {retry_max} attempts"),
    ))
}

/// Close a report: stamp who closed it and when. The UPDATE is guarded,
/// so a second close loses.
pub async fn close(
    pool: &SqlitePool,
    report: &ZReport,
    data: ZReportClose,
    closed_by: i64,
) -> RepoResult<ZReport> {
    let now = now_millis();
    let notes = super::append_closure_notes(report.notes.as_deref(), data.notes.as_deref());

    let rows = sqlx::query(
        "UPDATE z_report SET status = 'CLOSED', closed_at = ?1, closed_by = ?2, notes = ?3, updated_at = ?1 WHERE id = ?4 AND status = 'GENERATED'",
    )
    .bind(now)
    .bind(closed_by)
    .bind(&notes)
    .bind(report.id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::Conflict(
            ErrorCode::ReportAlreadyClosed,
            format!("Z report {} is already closed", report.id),
        ));
    }

    find_with_children(pool, report.id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to reload report".to_string()))
}

/// One page of reports plus the total match count, newest first.
pub async fn find_with_pagination(
    pool: &SqlitePool,
    company_id: i64,
    filter: &ReportFilter,
    page: u32,
    limit: u32,
) -> RepoResult<(Vec<ZReport>, u64)> {
    let builder = filter_builder(company_id, filter);
    let where_clause = builder.build_where_clause();

    let count_sql = format!("SELECT COUNT(*) FROM z_report{where_clause}");
    let total = builder
        .apply_bindings_scalar(sqlx::query_scalar::<_, i64>(&count_sql))
        .fetch_one(pool)
        .await? as u64;

    let items_sql = format!(
        "SELECT {COLUMNS} FROM z_report{where_clause} ORDER BY report_date DESC, id DESC LIMIT ? OFFSET ?"
    );
    let reports = builder
        .apply_bindings(sqlx::query_as::<_, ZReport>(&items_sql))
        .bind(limit as i64)
        .bind(((page - 1) * limit) as i64)
        .fetch_all(pool)
        .await?;

    Ok((reports, total))
}

/// Every report matching the filter, newest first. The summary endpoint
/// aggregates over this full set.
pub async fn list_filtered(
    pool: &SqlitePool,
    company_id: i64,
    filter: &ReportFilter,
) -> RepoResult<Vec<ZReport>> {
    let builder = filter_builder(company_id, filter);
    let sql = format!(
        "SELECT {COLUMNS} FROM z_report{} ORDER BY report_date DESC, id DESC",
        builder.build_where_clause()
    );
    let reports = builder
        .apply_bindings(sqlx::query_as::<_, ZReport>(&sql))
        .fetch_all(pool)
        .await?;
    Ok(reports)
}

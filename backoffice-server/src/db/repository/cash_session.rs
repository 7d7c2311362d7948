//! Cash Session Repository
//!
//! One drawer count cycle per point of sale: opened with an initial cash
//! float, tagged by paid orders, closed with a reconciliation against the
//! company's cash-method sales.
//!
//! The at-most-one-OPEN-session-per-point-of-sale invariant is enforced
//! twice: a pre-check here for a clean error, and the partial unique
//! index `idx_cash_session_open_pos` for racing creates.

use super::{RepoError, RepoResult};
use crate::utils::query_builder::QueryBuilder;
use crate::utils::time::date_stamp;
use shared::models::{
    CashCloseSummary, CashSession, CashSessionClose, CashSessionCreate, CashSessionStatus,
};
use shared::util::now_millis;
use shared::ErrorCode;
use sqlx::SqlitePool;

const COLUMNS: &str = "id, company_id, point_of_sale_id, user_id, session_number, status, start_date, end_date, initial_cash, final_cash, expected_cash, cash_difference, notes, closed_by, created_at, updated_at";

/// Optional list filters; every field is independently combinable.
#[derive(Debug, Clone, Default)]
pub struct SessionFilter {
    pub point_of_sale_id: Option<i64>,
    pub user_id: Option<i64>,
    pub status: Option<CashSessionStatus>,
    /// Half-open `[start, end)` window on `start_date`, Unix millis
    pub date_range: Option<(i64, i64)>,
}

fn filter_builder(company_id: i64, filter: &SessionFilter) -> QueryBuilder {
    let mut builder = QueryBuilder::new();
    builder.add_condition("company_id = ?").bind_i64(company_id);
    if let Some(pos_id) = filter.point_of_sale_id {
        builder.add_condition("point_of_sale_id = ?").bind_i64(pos_id);
    }
    if let Some(user_id) = filter.user_id {
        builder.add_condition("user_id = ?").bind_i64(user_id);
    }
    if let Some(status) = filter.status {
        builder
            .add_condition("status = ?")
            .bind_text(status.as_str().to_string());
    }
    if let Some((start, end)) = filter.date_range {
        builder
            .add_condition("start_date >= ?")
            .bind_i64(start)
            .add_condition("start_date < ?")
            .bind_i64(end);
    }
    builder
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<CashSession>> {
    let session = sqlx::query_as::<_, CashSession>(&format!(
        "SELECT {COLUMNS} FROM cash_session WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(session)
}

/// The OPEN session on a point of sale, optionally scoped to the user
/// who opened it.
pub async fn find_active(
    pool: &SqlitePool,
    point_of_sale_id: i64,
    user_id: Option<i64>,
) -> RepoResult<Option<CashSession>> {
    let mut sql = format!(
        "SELECT {COLUMNS} FROM cash_session WHERE point_of_sale_id = ? AND status = 'OPEN'"
    );
    if user_id.is_some() {
        sql.push_str(" AND user_id = ?");
    }
    sql.push_str(" LIMIT 1");

    let mut query = sqlx::query_as::<_, CashSession>(&sql).bind(point_of_sale_id);
    if let Some(uid) = user_id {
        query = query.bind(uid);
    }
    let session = query.fetch_optional(pool).await?;
    Ok(session)
}

/// Next `YYYYMMDD-NNN` session number for the company.
///
/// Reads the current per-day maximum and increments. Not atomic with the
/// insert; `create` retries on a number collision.
async fn next_session_number(pool: &SqlitePool, company_id: i64, now: i64) -> RepoResult<String> {
    let stamp = date_stamp(now);
    let last: Option<String> = sqlx::query_scalar(
        "SELECT session_number FROM cash_session WHERE company_id = ? AND session_number LIKE ? ORDER BY session_number DESC LIMIT 1",
    )
    .bind(company_id)
    .bind(format!("{stamp}-%"))
    .fetch_optional(pool)
    .await?;

    let seq = last
        .as_deref()
        .and_then(|n| n.rsplit_once('-'))
        .and_then(|(_, suffix)| suffix.parse::<u32>().ok())
        .unwrap_or(0)
        + 1;
    Ok(format!("{stamp}-{seq:03}"))
}

/// Open a session. Inserts the OPEN row and links the point of sale's
/// `active_session_id` in one transaction; retries with the next number
/// on a same-day number race, up to `retry_max` attempts.
pub async fn create(
    pool: &SqlitePool,
    company_id: i64,
    user_id: i64,
    data: CashSessionCreate,
    retry_max: u32,
) -> RepoResult<CashSession> {
    if find_active(pool, data.point_of_sale_id, None).await?.is_some() {
        return Err(RepoError::Conflict(
            ErrorCode::SessionAlreadyOpen,
            format!(
                "An open cash session already exists for point of sale {}",
                data.point_of_sale_id
            ),
        ));
    }

    let now = now_millis();
    for _ in 0..retry_max {
        let number = next_session_number(pool, company_id, now).await?;
        let mut tx = pool.begin().await?;

        let inserted = sqlx::query_scalar::<_, i64>(
            "INSERT INTO cash_session (company_id, point_of_sale_id, user_id, session_number, status, start_date, initial_cash, notes, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, 'OPEN', ?5, ?6, ?7, ?5, ?5) RETURNING id",
        )
        .bind(company_id)
        .bind(data.point_of_sale_id)
        .bind(user_id)
        .bind(&number)
        .bind(now)
        .bind(data.initial_cash)
        .bind(&data.notes)
        .fetch_one(&mut *tx)
        .await;

        match inserted {
            Ok(id) => {
                super::point_of_sale::link_active_session(
                    &mut tx,
                    data.point_of_sale_id,
                    Some(id),
                    now,
                )
                .await?;
                tx.commit().await?;
                return find_by_id(pool, id)
                    .await?
                    .ok_or_else(|| RepoError::Database("Failed to create cash session".into()));
            }
            Err(e) if super::is_unique_violation(&e) => {
                tx.rollback().await?;
                let msg = e.to_string();
                // The open-session index and the number both surface as
                // unique violations; only the number race is retryable.
                if msg.contains("idx_cash_session_open_pos") || msg.contains("point_of_sale_id") {
                    return Err(RepoError::Conflict(
                        ErrorCode::SessionAlreadyOpen,
                        format!(
                            "An open cash session already exists for point of sale {}",
                            data.point_of_sale_id
                        ),
                    ));
                }
                tracing::warn!("Session number {number} already taken, retrying");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(RepoError::Conflict(
        ErrorCode::SessionNumberExhausted,
        format!("Could not allocate a session number after {retry_max} attempts"),
    ))
}

/// Close a session: reconcile the drawer against cash-method PAID order
/// subtotals, stamp the closing fields, and clear the point of sale's
/// active-session pointer, all in one transaction.
///
/// `expected_cash` counts only orders paid with the company's cash
/// method; `cash_difference = final_cash - expected_cash`, signed and
/// never clamped.
pub async fn close(
    pool: &SqlitePool,
    session: &CashSession,
    data: CashSessionClose,
    closed_by: i64,
) -> RepoResult<(CashSession, CashCloseSummary)> {
    let now = now_millis();
    let cash_method = super::payment_method::find_cash_method(pool, session.company_id).await?;

    let mut tx = pool.begin().await?;

    let expected_cash = match cash_method {
        Some(method) => sqlx::query_scalar::<_, Option<f64>>(
            "SELECT SUM(subtotal) FROM order_point WHERE cash_session_id = ? AND payment_method_id = ? AND status = 'PAID'",
        )
        .bind(session.id)
        .bind(method.id)
        .fetch_one(&mut *tx)
        .await?
        .unwrap_or(0.0),
        None => 0.0,
    };
    let cash_difference = data.final_cash - expected_cash;
    let notes = super::append_closure_notes(session.notes.as_deref(), data.notes.as_deref());

    let rows = sqlx::query(
        "UPDATE cash_session SET status = 'CLOSED', end_date = ?1, final_cash = ?2, expected_cash = ?3, cash_difference = ?4, closed_by = ?5, notes = ?6, updated_at = ?1 WHERE id = ?7 AND status = 'OPEN'",
    )
    .bind(now)
    .bind(data.final_cash)
    .bind(expected_cash)
    .bind(cash_difference)
    .bind(closed_by)
    .bind(&notes)
    .bind(session.id)
    .execute(&mut *tx)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::Conflict(
            ErrorCode::SessionAlreadyClosed,
            format!("Cash session {} is already closed", session.id),
        ));
    }

    super::point_of_sale::link_active_session(&mut tx, session.point_of_sale_id, None, now).await?;
    tx.commit().await?;

    let closed = find_by_id(pool, session.id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to reload cash session".into()))?;
    let summary = CashCloseSummary {
        initial_cash: closed.initial_cash,
        final_cash: data.final_cash,
        expected_cash,
        cash_difference,
        session_duration: closed.duration_hours(now),
    };
    Ok((closed, summary))
}

/// One page of sessions plus the total match count, newest first.
pub async fn find_with_pagination(
    pool: &SqlitePool,
    company_id: i64,
    filter: &SessionFilter,
    page: u32,
    limit: u32,
) -> RepoResult<(Vec<CashSession>, u64)> {
    let builder = filter_builder(company_id, filter);
    let where_clause = builder.build_where_clause();

    let count_sql = format!("SELECT COUNT(*) FROM cash_session{where_clause}");
    let total = builder
        .apply_bindings_scalar(sqlx::query_scalar::<_, i64>(&count_sql))
        .fetch_one(pool)
        .await? as u64;

    let items_sql = format!(
        "SELECT {COLUMNS} FROM cash_session{where_clause} ORDER BY start_date DESC LIMIT ? OFFSET ?"
    );
    let sessions = builder
        .apply_bindings(sqlx::query_as::<_, CashSession>(&items_sql))
        .bind(limit as i64)
        .bind(((page - 1) * limit) as i64)
        .fetch_all(pool)
        .await?;

    Ok((sessions, total))
}

/// Every session matching the filter, newest first. The summary endpoint
/// aggregates over this full set.
pub async fn list_filtered(
    pool: &SqlitePool,
    company_id: i64,
    filter: &SessionFilter,
) -> RepoResult<Vec<CashSession>> {
    let builder = filter_builder(company_id, filter);
    let sql = format!(
        "SELECT {COLUMNS} FROM cash_session{} ORDER BY start_date DESC",
        builder.build_where_clause()
    );
    let sessions = builder
        .apply_bindings(sqlx::query_as::<_, CashSession>(&sql))
        .fetch_all(pool)
        .await?;
    Ok(sessions)
}

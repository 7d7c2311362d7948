//! Dining Table Repository
//!
//! Tables are provisioned outside this server. Order flows flip them
//! between FREE and IN_USE and maintain the advisory
//! `active_order_point_id` back-reference.

use super::RepoResult;
use shared::models::DiningTable;
use sqlx::SqlitePool;

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<DiningTable>> {
    let table = sqlx::query_as::<_, DiningTable>(
        "SELECT id, company_id, point_of_sale_id, number, capacity, status, active_order_point_id, created_at, updated_at FROM dining_table WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(table)
}

/// Mark a table IN_USE with a back-reference to the order occupying it.
/// Runs on the order-creation transaction.
pub async fn occupy(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    table_id: i64,
    order_point_id: i64,
    now: i64,
) -> RepoResult<()> {
    sqlx::query(
        "UPDATE dining_table SET status = 'IN_USE', active_order_point_id = ?, updated_at = ? WHERE id = ?",
    )
    .bind(order_point_id)
    .bind(now)
    .bind(table_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Free a table after its order is paid. Runs on the payment transaction.
pub async fn free(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    table_id: i64,
    now: i64,
) -> RepoResult<()> {
    sqlx::query(
        "UPDATE dining_table SET status = 'FREE', active_order_point_id = NULL, updated_at = ? WHERE id = ?",
    )
    .bind(now)
    .bind(table_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

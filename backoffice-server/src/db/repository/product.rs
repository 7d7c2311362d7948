//! Product Repository
//!
//! The catalog is administered outside this server; order flows read
//! products for price snapshots and mutate only `stock`. Stock moves are
//! atomic conditional UPDATEs, never read-modify-write.

use super::RepoResult;
use shared::models::Product;
use sqlx::SqlitePool;

const COLUMNS: &str = "id, company_id, name, category, price, point_price, discount_rate, stock, is_sold_out, is_deleted, created_at, updated_at";

/// Load the non-deleted products among `ids` for a company. Unknown and
/// soft-deleted ids are simply absent from the result; order creation
/// skips them.
pub async fn find_active_by_ids(
    pool: &SqlitePool,
    company_id: i64,
    ids: &[i64],
) -> RepoResult<Vec<Product>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; ids.len()].join(", ");
    let sql = format!(
        "SELECT {COLUMNS} FROM product WHERE company_id = ? AND is_deleted = 0 AND id IN ({placeholders})"
    );

    let mut query = sqlx::query_as::<_, Product>(&sql).bind(company_id);
    for id in ids {
        query = query.bind(id);
    }
    let products = query.fetch_all(pool).await?;
    Ok(products)
}

/// Category names for report breakdowns, keyed by product id. Includes
/// soft-deleted products so historical lines still resolve.
pub async fn find_categories_by_ids(
    pool: &SqlitePool,
    ids: &[i64],
) -> RepoResult<Vec<(i64, Option<String>)>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; ids.len()].join(", ");
    let sql = format!("SELECT id, category FROM product WHERE id IN ({placeholders})");

    let mut query = sqlx::query_as::<_, (i64, Option<String>)>(&sql);
    for id in ids {
        query = query.bind(id);
    }
    let rows = query.fetch_all(pool).await?;
    Ok(rows)
}

/// Atomically take `amount` units of stock. Returns false when fewer
/// than `amount` units remain, without changing the row.
pub async fn take_stock(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    product_id: i64,
    amount: i64,
    now: i64,
) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE product SET stock = stock - ?1, updated_at = ?2 WHERE id = ?3 AND stock >= ?1",
    )
    .bind(amount)
    .bind(now)
    .bind(product_id)
    .execute(&mut **tx)
    .await?;
    Ok(rows.rows_affected() == 1)
}

/// Return `amount` units of stock after a line is removed.
pub async fn restore_stock(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    product_id: i64,
    amount: i64,
    now: i64,
) -> RepoResult<()> {
    sqlx::query("UPDATE product SET stock = stock + ?, updated_at = ? WHERE id = ?")
        .bind(amount)
        .bind(now)
        .bind(product_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

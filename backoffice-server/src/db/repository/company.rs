//! Company Repository
//!
//! Read-only: companies are provisioned outside this server. The order
//! flows only need `is_stock_active` to decide whether stock is checked
//! and mutated.

use super::RepoResult;
use shared::models::Company;
use sqlx::SqlitePool;

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Company>> {
    let company = sqlx::query_as::<_, Company>(
        "SELECT id, name, is_stock_active, created_at, updated_at FROM company WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(company)
}

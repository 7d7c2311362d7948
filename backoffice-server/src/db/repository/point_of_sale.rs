//! Point of Sale Repository
//!
//! Points of sale are provisioned outside this server; this module reads
//! them for ownership checks and maintains the advisory
//! `active_session_id` back-reference from the session lifecycle.

use super::RepoResult;
use shared::models::PointOfSale;
use sqlx::SqlitePool;

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<PointOfSale>> {
    let pos = sqlx::query_as::<_, PointOfSale>(
        "SELECT id, company_id, name, description, active_session_id, created_at, updated_at FROM point_of_sale WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(pos)
}

/// Set or clear the `active_session_id` back-reference.
///
/// Runs on the caller's transaction so the pointer changes together with
/// the session row it refers to. The pointer is advisory; session status
/// is the source of truth.
pub async fn link_active_session(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    point_of_sale_id: i64,
    session_id: Option<i64>,
    now: i64,
) -> RepoResult<()> {
    sqlx::query("UPDATE point_of_sale SET active_session_id = ?, updated_at = ? WHERE id = ?")
        .bind(session_id)
        .bind(now)
        .bind(point_of_sale_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

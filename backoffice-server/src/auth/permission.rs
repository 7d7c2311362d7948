//! Company-level authorization
//!
//! Mutations reach their resources through a point of sale. The check
//! resolves the point of sale and compares its company against the
//! caller's identity; a mismatch is rejected before any state changes.

use sqlx::SqlitePool;

use crate::auth::Identity;
use crate::db::repository::point_of_sale;
use shared::models::PointOfSale;
use shared::{AppError, AppResult, ErrorCode};

/// Resolve a point of sale and verify it belongs to the caller's company.
///
/// Returns the loaded row so callers don't have to fetch it again.
pub async fn check_point_of_sale(
    pool: &SqlitePool,
    identity: &Identity,
    point_of_sale_id: i64,
) -> AppResult<PointOfSale> {
    let pos = point_of_sale::find_by_id(pool, point_of_sale_id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(
                ErrorCode::PointOfSaleNotFound,
                format!("Point of sale {point_of_sale_id} not found"),
            )
        })?;

    if pos.company_id != identity.company_id {
        return Err(AppError::with_message(
            ErrorCode::CompanyMismatch,
            "Point of sale belongs to another company",
        ));
    }

    Ok(pos)
}

//! Payment Method Repository
//!
//! Methods are configured outside this server. Payment processing
//! validates against them, session close resolves the company's cash
//! method, and report generation resolves method names.

use super::RepoResult;
use shared::models::PaymentMethod;
use sqlx::SqlitePool;

const COLUMNS: &str = "id, company_id, name, description, is_active, created_at, updated_at";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<PaymentMethod>> {
    let method = sqlx::query_as::<_, PaymentMethod>(&format!(
        "SELECT {COLUMNS} FROM payment_method WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(method)
}

/// Active methods for a company, in id order (report breakdown rows
/// follow this order).
pub async fn find_active(pool: &SqlitePool, company_id: i64) -> RepoResult<Vec<PaymentMethod>> {
    let methods = sqlx::query_as::<_, PaymentMethod>(&format!(
        "SELECT {COLUMNS} FROM payment_method WHERE company_id = ? AND is_active = 1 ORDER BY id"
    ))
    .bind(company_id)
    .fetch_all(pool)
    .await?;
    Ok(methods)
}

/// The company's cash method: an active method named "cash", matched
/// case-insensitively. Drawer reconciliation counts only orders paid
/// with this method.
pub async fn find_cash_method(
    pool: &SqlitePool,
    company_id: i64,
) -> RepoResult<Option<PaymentMethod>> {
    let method = sqlx::query_as::<_, PaymentMethod>(&format!(
        "SELECT {COLUMNS} FROM payment_method WHERE company_id = ? AND is_active = 1 AND LOWER(name) = 'cash' LIMIT 1"
    ))
    .bind(company_id)
    .fetch_optional(pool)
    .await?;
    Ok(method)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();

        sqlx::query("INSERT INTO company (id, name) VALUES (1, 'Demo Co'), (2, 'Other Co')")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO payment_method (id, company_id, name, is_active) VALUES
                (1, 1, 'Cash', 1),
                (2, 1, 'card', 1),
                (3, 2, 'cash', 0)",
        )
        .execute(&pool)
        .await
        .unwrap();

        pool
    }

    #[tokio::test]
    async fn test_find_cash_method_case_insensitive() {
        let pool = test_pool().await;
        let method = find_cash_method(&pool, 1).await.unwrap().unwrap();
        assert_eq!(method.id, 1);
        assert_eq!(method.name, "Cash");
    }

    #[tokio::test]
    async fn test_find_cash_method_ignores_inactive() {
        let pool = test_pool().await;
        // Company 2's only "cash" method is inactive
        assert!(find_cash_method(&pool, 2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_active_is_company_scoped() {
        let pool = test_pool().await;
        let methods = find_active(&pool, 1).await.unwrap();
        assert_eq!(methods.len(), 2);
        assert!(methods.iter().all(|m| m.company_id == 1));
    }
}

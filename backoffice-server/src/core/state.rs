//! Shared application state

use sqlx::SqlitePool;

use crate::core::Config;
use shared::AppError;

/// Shared application state, cloned into every handler
///
/// Cheap to clone: the pool is internally reference-counted.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration
    pub config: Config,
    /// SQLite connection pool
    pub pool: SqlitePool,
}

impl AppState {
    /// Open the database, run migrations and assemble the state
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        let pool = crate::db::connect(&config.database_path).await?;

        Ok(Self {
            config: config.clone(),
            pool,
        })
    }
}

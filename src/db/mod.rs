//! Database module providing connection management and queries.

pub mod companies;
pub mod documents;
pub mod upload_tokens;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::time::Duration;

use crate::error::{AppError, AppResult};

/// Database connection pool wrapper around a SeaORM connection.
#[derive(Clone)]
pub struct DbPool {
    conn: DatabaseConnection,
}

impl DbPool {
    /// Connect to Postgres using the backend-privileged DATABASE_URL.
    ///
    /// The credential contract is enforced earlier, at config load: by the
    /// time this runs there is exactly one URL and no restricted fallback.
    pub async fn connect(database_url: &str) -> AppResult<Self> {
        let mut options = ConnectOptions::new(database_url.to_owned());
        options
            .max_connections(20)
            .min_connections(2)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        let conn = Database::connect(options)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to database: {}", e)))?;

        Ok(DbPool { conn })
    }

    /// Get access to the underlying connection for executing queries.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }
}

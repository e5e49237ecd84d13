use anyhow::{Context, Result};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use tokio::fs;
use tracing::info;

/// Shared SQLite connection pool with the prediction history schema applied
#[derive(Clone)]
pub struct Database {
    pub pool: SqlitePool,
}

impl Database {
    pub async fn new(db_url: &str) -> Result<Self> {
        // Ensure the directory exists if it's a file path
        if let Some(path_part) = db_url.strip_prefix("sqlite://") {
            let path = Path::new(path_part);
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
                && !parent.exists()
            {
                fs::create_dir_all(parent)
                    .await
                    .context("Failed to create database directory")?;
            }
        }

        let options = SqliteConnectOptions::from_str(db_url)?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal); // Better for concurrency

        // Every connection to `:memory:` opens its own database, so the pool
        // must hold exactly one connection that is never recycled.
        let pool_options = if db_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .context("Failed to connect to SQLite database")?;

        info!("Connected to database: {}", db_url);

        let db = Self { pool };
        db.init().await?;

        Ok(db)
    }

    /// Fresh private in-memory database
    pub async fn in_memory() -> Result<Self> {
        Self::new("sqlite::memory:").await
    }

    /// Initialize database schema
    async fn init(&self) -> Result<()> {
        let mut conn = self.pool.acquire().await?;

        // created_at holds Unix milliseconds
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS prediction_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                customer_id TEXT NOT NULL,
                subscription_type TEXT NOT NULL,
                payment_method TEXT NOT NULL,
                monthly_fee REAL NOT NULL,
                watch_hours REAL NOT NULL,
                last_login_days INTEGER NOT NULL,
                number_of_profiles INTEGER NOT NULL,
                avg_watch_time_per_day REAL NOT NULL,
                probability REAL NOT NULL,
                label TEXT NOT NULL,
                prediction_label TEXT NOT NULL,
                created_at INTEGER NOT NULL
            );
            "#,
        )
        .execute(&mut *conn)
        .await
        .context("Failed to create prediction_history table")?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_history_customer_created
            ON prediction_history (customer_id, created_at);
            "#,
        )
        .execute(&mut *conn)
        .await
        .context("Failed to create customer index")?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_history_created
            ON prediction_history (created_at);
            "#,
        )
        .execute(&mut *conn)
        .await
        .context("Failed to create created_at index")?;

        Ok(())
    }
}

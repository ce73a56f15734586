use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use tracing::info;

use crate::config::Config;

/// Process-wide handle on the glossary database.
///
/// Opened once in `main`, cloned into every component that needs it and
/// closed explicitly on shutdown.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub async fn connect(config: &Config) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&config.database_url)
            .with_context(|| format!("invalid DATABASE_URL {:?}", config.database_url))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await
            .context("failed to open SQLite database")?;

        let store = Self { pool };
        store.migrate().await?;
        info!(url = %config.database_url, "database ready");
        Ok(store)
    }

    /// Private in-memory database. A single connection that never expires,
    /// since every new `:memory:` connection would see an empty database.
    #[cfg(test)]
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .context("invalid in-memory database url")?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .context("failed to open in-memory database")?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("failed to run database migrations")?;
        Ok(())
    }

    pub fn pool_ref(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn file_database_survives_reopen() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("glossary.db");
        let config = Config {
            database_url: format!("sqlite:{}", path.display()),
            ..Config::default()
        };

        let store = Store::connect(&config).await.expect("open");
        sqlx::query(
            "INSERT INTO glossary_languages (name, is_primary) VALUES ('English', 1)",
        )
        .execute(store.pool_ref())
        .await
        .expect("insert language");
        store.close().await;

        let reopened = Store::connect(&config).await.expect("reopen");
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM glossary_languages")
            .fetch_one(reopened.pool_ref())
            .await
            .expect("count");
        assert_eq!(count, 1);
        reopened.close().await;
    }
}

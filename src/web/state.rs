use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::info;

use crate::{config::Config, db::Store, glossary};

#[derive(Clone)]
pub struct AppState {
    store: Store,
}

impl AppState {
    pub async fn new(config: &Config) -> Result<Self> {
        let store = Store::connect(config)
            .await
            .context("failed to open glossary database")?;
        Ok(Self::from_store(store))
    }

    pub fn from_store(store: Store) -> Self {
        Self { store }
    }

    /// Seeds default data when the glossary is empty; a populated glossary
    /// is left alone.
    pub async fn ensure_seed_data(&self) {
        let result = glossary::seed_if_empty(self.pool_ref()).await;
        info!(success = result.success, message = %result.message, "startup seeding");
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn pool_ref(&self) -> &SqlitePool {
        self.store.pool_ref()
    }
}

use error_stack::{Result, ResultExt};
use std::sync::Arc;
use thiserror::Error;

use crate::{
    config, database,
    store::{PgStore, Store},
};

#[derive(Debug, Clone)]
pub struct App {
    pub config: Arc<config::Server>,
    pub store: Arc<dyn Store>,
}

#[derive(Debug, Error)]
#[error("Failed to initialize App struct")]
pub struct AppError;

impl App {
    /// Connects to the primary database and applies pending
    /// migrations before anything is served.
    #[tracing::instrument(skip_all)]
    pub async fn new(cfg: config::Server) -> Result<Self, AppError> {
        let pool = database::Pool::new(&cfg.db, &cfg.db.primary)
            .await
            .change_context(AppError)?;

        if pool.is_readonly() {
            tracing::warn!("Primary database is in read-only mode, skipping migrations");
        } else {
            pool.migrate().await.change_context(AppError)?;
        }

        Ok(Self::with_store(cfg, PgStore::new(pool)))
    }

    #[must_use]
    pub fn with_store(cfg: config::Server, store: impl Store + 'static) -> Self {
        Self {
            config: Arc::new(cfg),
            store: Arc::new(store),
        }
    }

    #[must_use]
    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }
}

//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AdminConfig;
use crate::db::PgCatalogStore;
use crate::services::CatalogStore;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    catalogs: Arc<dyn CatalogStore>,
}

impl AppState {
    /// Create application state backed by `PostgreSQL`.
    #[must_use]
    pub fn new(config: AdminConfig, pool: PgPool) -> Self {
        Self::with_catalogs(config, Arc::new(PgCatalogStore::new(pool)))
    }

    /// Create application state over any catalog store.
    #[must_use]
    pub fn with_catalogs(config: AdminConfig, catalogs: Arc<dyn CatalogStore>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, catalogs }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn catalogs(&self) -> &dyn CatalogStore {
        self.inner.catalogs.as_ref()
    }
}

//! Catalog store trait and in-memory implementation.
//!
//! The `PostgreSQL` implementation lives in [`crate::db::catalogs`].

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use tidewater_core::CatalogId;

use crate::db::RepositoryError;
use crate::models::{Catalog, CatalogInput};

/// Reads and writes catalogs.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// All catalogs ordered by title.
    async fn list(&self) -> Result<Vec<Catalog>, RepositoryError>;

    /// The catalog with `id`, if it exists.
    async fn get(&self, id: CatalogId) -> Result<Option<Catalog>, RepositoryError>;

    /// Store a new catalog.
    async fn create(&self, input: &CatalogInput) -> Result<Catalog, RepositoryError>;

    /// Overwrite the title and season flag of catalog `id`.
    ///
    /// Returns [`RepositoryError::NotFound`] if there is no such catalog.
    async fn update(&self, id: CatalogId, input: &CatalogInput) -> Result<Catalog, RepositoryError>;
}

/// In-memory catalog store for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalogStore {
    catalogs: Arc<Mutex<Vec<Catalog>>>,
}

impl InMemoryCatalogStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an existing catalog.
    #[must_use]
    pub fn with_catalog(self, id: i32, title: &str, in_season: bool) -> Self {
        self.catalogs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Catalog {
                id: CatalogId::new(id),
                title: title.to_owned(),
                in_season,
            });
        self
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn list(&self) -> Result<Vec<Catalog>, RepositoryError> {
        let mut catalogs = self
            .catalogs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        catalogs.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(catalogs)
    }

    async fn get(&self, id: CatalogId) -> Result<Option<Catalog>, RepositoryError> {
        Ok(self
            .catalogs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|catalog| catalog.id == id)
            .cloned())
    }

    async fn create(&self, input: &CatalogInput) -> Result<Catalog, RepositoryError> {
        let mut catalogs = self.catalogs.lock().unwrap_or_else(PoisonError::into_inner);
        let next = catalogs.iter().map(|c| c.id.as_i32()).max().unwrap_or(0) + 1;
        let catalog = Catalog {
            id: CatalogId::new(next),
            title: input.title.clone(),
            in_season: input.in_season,
        };
        catalogs.push(catalog.clone());
        Ok(catalog)
    }

    async fn update(&self, id: CatalogId, input: &CatalogInput) -> Result<Catalog, RepositoryError> {
        let mut catalogs = self.catalogs.lock().unwrap_or_else(PoisonError::into_inner);
        let catalog = catalogs
            .iter_mut()
            .find(|catalog| catalog.id == id)
            .ok_or(RepositoryError::NotFound)?;
        catalog.title.clone_from(&input.title);
        catalog.in_season = input.in_season;
        Ok(catalog.clone())
    }
}

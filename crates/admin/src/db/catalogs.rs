//! Catalog repository.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use tidewater_core::CatalogId;

use super::RepositoryError;
use crate::models::{Catalog, CatalogInput};
use crate::services::CatalogStore;

/// `PostgreSQL`-backed [`CatalogStore`].
#[derive(Debug, Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Catalog>, RepositoryError> {
        let catalogs = sqlx::query_as::<_, Catalog>(
            "SELECT id, title, in_season FROM catalog ORDER BY title, id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(catalogs)
    }

    #[instrument(skip(self))]
    async fn get(&self, id: CatalogId) -> Result<Option<Catalog>, RepositoryError> {
        let catalog = sqlx::query_as::<_, Catalog>(
            "SELECT id, title, in_season FROM catalog WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(catalog)
    }

    #[instrument(skip(self))]
    async fn create(&self, input: &CatalogInput) -> Result<Catalog, RepositoryError> {
        let catalog = sqlx::query_as::<_, Catalog>(
            r"
            INSERT INTO catalog (title, in_season)
            VALUES ($1, $2)
            RETURNING id, title, in_season
            ",
        )
        .bind(&input.title)
        .bind(input.in_season)
        .fetch_one(&self.pool)
        .await?;

        Ok(catalog)
    }

    #[instrument(skip(self))]
    async fn update(&self, id: CatalogId, input: &CatalogInput) -> Result<Catalog, RepositoryError> {
        sqlx::query_as::<_, Catalog>(
            r"
            UPDATE catalog
            SET title = $2, in_season = $3
            WHERE id = $1
            RETURNING id, title, in_season
            ",
        )
        .bind(id)
        .bind(&input.title)
        .bind(input.in_season)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }
}

//! `PostgreSQL` item lookup.
//!
//! An item is visible in a region when it has an enabled `item_region` row
//! there. Item option lists for the quick order selector are cached with
//! `moka` because the widget asks for the same SKU on every keystroke pause.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use tracing::instrument;

use tidewater_core::{
    CatalogId, CurrencyCode, ItemAliasId, ItemId, ItemStatus, Price, ProductId, RegionId, Sku,
};

use super::RepositoryError;
use crate::models::{CartItem, ItemAlias, ItemOption, ProductSummary};
use crate::services::ItemLookup;

/// Matches an item by own SKU or alias SKU within a region. `$1` is the
/// region, `$2` the lower-cased lookup key.
const VISIBLE_MATCH: &str = r"
    FROM item i
    INNER JOIN product p ON p.id = i.product
    INNER JOIN item_region ir ON ir.item = i.id AND ir.region = $1 AND ir.enabled
    WHERE lower(i.sku) = $2
       OR i.id IN (SELECT item FROM item_alias WHERE lower(sku) = $2)
";

#[derive(Debug, FromRow)]
struct ItemOptionRow {
    id: ItemId,
    sku: String,
    product_title: String,
    description: String,
}

#[derive(Debug, FromRow)]
pub(crate) struct CartItemRow {
    pub id: ItemId,
    pub sku: String,
    pub description: String,
    pub status: String,
    pub part_count: i32,
    pub price: Decimal,
    pub currency_code: String,
    pub product_id: ProductId,
    pub product_title: String,
    pub product_shortname: String,
    pub product_path: String,
    pub product_catalog: CatalogId,
}

impl TryFrom<CartItemRow> for CartItem {
    type Error = RepositoryError;

    fn try_from(row: CartItemRow) -> Result<Self, Self::Error> {
        let status = ItemStatus::from_str(&row.status).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid item status in database: {e}"))
        })?;
        let currency_code = CurrencyCode::from_str(&row.currency_code).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid currency in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            sku: row.sku,
            description: row.description,
            status,
            price: Price::new(row.price, currency_code),
            part_count: row.part_count,
            product: ProductSummary {
                id: row.product_id,
                title: row.product_title,
                shortname: row.product_shortname,
                path: row.product_path,
                catalog: row.product_catalog,
            },
        })
    }
}

/// Columns selected into [`CartItemRow`]; the query must join `item i`,
/// `product p`, `item_region ir` and `region r`.
pub(crate) const CART_ITEM_COLUMNS: &str = r"
    i.id, i.sku, i.description, i.status, i.part_count,
    ir.price, r.currency_code,
    p.id AS product_id, p.title AS product_title, p.shortname AS product_shortname,
    p.path AS product_path, p.catalog AS product_catalog
";

/// Item lookup backed by `PostgreSQL`.
#[derive(Clone)]
pub struct PgItemLookup {
    inner: Arc<PgItemLookupInner>,
}

struct PgItemLookupInner {
    pool: PgPool,
    options: Cache<(RegionId, String), Vec<ItemOption>>,
}

impl PgItemLookup {
    /// Create a lookup with a 5 minute option cache.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        let options = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300))
            .build();

        Self {
            inner: Arc::new(PgItemLookupInner { pool, options }),
        }
    }
}

#[async_trait]
impl ItemLookup for PgItemLookup {
    #[instrument(skip(self), fields(sku = %sku))]
    async fn item_options(
        &self,
        sku: &Sku,
        region: RegionId,
    ) -> Result<Vec<ItemOption>, RepositoryError> {
        let key = (region, sku.lookup_key());
        if let Some(options) = self.inner.options.get(&key).await {
            return Ok(options);
        }

        let sql = format!(
            "SELECT i.id, i.sku, p.title AS product_title, i.description {VISIBLE_MATCH} \
             ORDER BY i.part_count ASC, i.id ASC"
        );
        let rows = sqlx::query_as::<_, ItemOptionRow>(&sql)
            .bind(region)
            .bind(&key.1)
            .fetch_all(&self.inner.pool)
            .await?;

        let options: Vec<ItemOption> = rows
            .into_iter()
            .map(|row| ItemOption {
                id: row.id,
                sku: row.sku,
                description: [row.product_title, row.description]
                    .into_iter()
                    .filter(|part| !part.trim().is_empty())
                    .collect::<Vec<_>>()
                    .join(" - "),
            })
            .collect();

        self.inner.options.insert(key, options.clone()).await;
        Ok(options)
    }

    #[instrument(skip(self))]
    async fn find_item_id(
        &self,
        lookup_key: &str,
        region: RegionId,
    ) -> Result<Option<ItemId>, RepositoryError> {
        let sql =
            format!("SELECT i.id {VISIBLE_MATCH} ORDER BY i.part_count ASC, i.id ASC LIMIT 1");
        let id = sqlx::query_scalar::<_, ItemId>(&sql)
            .bind(region)
            .bind(lookup_key.to_lowercase())
            .fetch_optional(&self.inner.pool)
            .await?;

        Ok(id)
    }

    #[instrument(skip(self))]
    async fn load_item(
        &self,
        id: ItemId,
        region: RegionId,
    ) -> Result<Option<CartItem>, RepositoryError> {
        let sql = format!(
            r"
            SELECT {CART_ITEM_COLUMNS}
            FROM item i
            INNER JOIN product p ON p.id = i.product
            INNER JOIN item_region ir ON ir.item = i.id AND ir.region = $2
            INNER JOIN region r ON r.id = ir.region
            WHERE i.id = $1
            "
        );
        let row = sqlx::query_as::<_, CartItemRow>(&sql)
            .bind(id)
            .bind(region)
            .fetch_optional(&self.inner.pool)
            .await?;

        row.map(CartItem::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_alias(
        &self,
        item: ItemId,
        sku: &str,
    ) -> Result<Option<ItemAlias>, RepositoryError> {
        let row = sqlx::query_as::<_, (ItemAliasId, ItemId, String)>(
            "SELECT id, item, sku FROM item_alias WHERE item = $1 AND lower(sku) = lower($2)",
        )
        .bind(item)
        .bind(sku)
        .fetch_optional(&self.inner.pool)
        .await?;

        Ok(row.map(|(id, item, sku)| ItemAlias { id, item, sku }))
    }
}

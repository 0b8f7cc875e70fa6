//! Item lookup trait and in-memory implementation.
//!
//! Resolves shopper-entered SKUs to purchasable items within a region. The
//! `PostgreSQL` implementation lives in [`crate::db::items`].

use std::sync::Arc;

use async_trait::async_trait;

use tidewater_core::{ItemAliasId, ItemId, RegionId, Sku};

use crate::db::RepositoryError;
use crate::models::{CartItem, ItemAlias, ItemOption};

/// SKU and item lookups against the merchandise tables.
#[async_trait]
pub trait ItemLookup: Send + Sync {
    /// Items offered by the quick order item selector for `sku`, fewest parts
    /// first.
    async fn item_options(
        &self,
        sku: &Sku,
        region: RegionId,
    ) -> Result<Vec<ItemOption>, RepositoryError>;

    /// Id of the visible item whose own SKU or alias SKU equals `lookup_key`
    /// (case-insensitively), preferring the item with the fewest parts.
    async fn find_item_id(
        &self,
        lookup_key: &str,
        region: RegionId,
    ) -> Result<Option<ItemId>, RepositoryError>;

    /// Load an item, priced for `region`, with its parent product.
    async fn load_item(
        &self,
        id: ItemId,
        region: RegionId,
    ) -> Result<Option<CartItem>, RepositoryError>;

    /// Alias of `item` whose SKU equals `sku` (case-insensitively).
    async fn find_alias(
        &self,
        item: ItemId,
        sku: &str,
    ) -> Result<Option<ItemAlias>, RepositoryError>;
}

#[derive(Debug, Clone, Default)]
struct InMemoryCatalog {
    items: Vec<CartItem>,
    aliases: Vec<ItemAlias>,
}

impl InMemoryCatalog {
    /// Items matching by own SKU or alias, in insertion order.
    fn matching(&self, lookup_key: &str) -> impl Iterator<Item = &CartItem> {
        let lookup_key = lookup_key.to_lowercase();
        self.items.iter().filter(move |item| {
            item.sku.to_lowercase() == lookup_key
                || self
                    .aliases
                    .iter()
                    .any(|alias| alias.item == item.id && alias.sku.to_lowercase() == lookup_key)
        })
    }
}

/// In-memory item lookup for testing.
///
/// Every item is visible in every region.
#[derive(Debug, Clone, Default)]
pub struct InMemoryItemLookup {
    catalog: Arc<InMemoryCatalog>,
}

impl InMemoryItemLookup {
    /// Creates a lookup with no items.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an item.
    #[must_use]
    pub fn with_item(mut self, item: CartItem) -> Self {
        Arc::make_mut(&mut self.catalog).items.push(item);
        self
    }

    /// Registers `sku` as an alias of `item`.
    #[must_use]
    pub fn with_alias(mut self, item: ItemId, sku: &str) -> Self {
        let catalog = Arc::make_mut(&mut self.catalog);
        let id = ItemAliasId::new(i32::try_from(catalog.aliases.len()).unwrap_or(i32::MAX) + 1);
        catalog.aliases.push(ItemAlias {
            id,
            item,
            sku: sku.to_owned(),
        });
        self
    }
}

#[async_trait]
impl ItemLookup for InMemoryItemLookup {
    async fn item_options(
        &self,
        sku: &Sku,
        _region: RegionId,
    ) -> Result<Vec<ItemOption>, RepositoryError> {
        let mut items: Vec<&CartItem> = self.catalog.matching(&sku.lookup_key()).collect();
        items.sort_by_key(|item| item.part_count);

        Ok(items
            .into_iter()
            .map(|item| ItemOption {
                id: item.id,
                sku: item.sku.clone(),
                description: item.description_parts().join(" - "),
            })
            .collect())
    }

    async fn find_item_id(
        &self,
        lookup_key: &str,
        _region: RegionId,
    ) -> Result<Option<ItemId>, RepositoryError> {
        Ok(self
            .catalog
            .matching(lookup_key)
            .min_by_key(|item| item.part_count)
            .map(|item| item.id))
    }

    async fn load_item(
        &self,
        id: ItemId,
        _region: RegionId,
    ) -> Result<Option<CartItem>, RepositoryError> {
        Ok(self.catalog.items.iter().find(|item| item.id == id).cloned())
    }

    async fn find_alias(
        &self,
        item: ItemId,
        sku: &str,
    ) -> Result<Option<ItemAlias>, RepositoryError> {
        let sku = sku.to_lowercase();
        Ok(self
            .catalog
            .aliases
            .iter()
            .find(|alias| alias.item == item && alias.sku.to_lowercase() == sku)
            .cloned())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tidewater_core::ItemStatus;

    use super::*;
    use crate::models::cart::fixtures;

    const REGION: RegionId = RegionId::new(1);

    fn lookup() -> InMemoryItemLookup {
        InMemoryItemLookup::new()
            .with_item(fixtures::item(1, "KIT-9", 4, ItemStatus::Available))
            .with_item(fixtures::item(2, "SAW-1", 1, ItemStatus::Available))
            .with_alias(ItemId::new(2), "KIT-9")
    }

    #[tokio::test]
    async fn test_find_by_own_sku_case_insensitive() {
        let id = lookup().find_item_id("saw-1", REGION).await.unwrap();
        assert_eq!(id, Some(ItemId::new(2)));
    }

    #[tokio::test]
    async fn test_fewest_parts_wins_over_match_type() {
        // Item 1 matches on its own SKU with 4 parts, item 2 through an alias
        // with 1 part.
        let id = lookup().find_item_id("kit-9", REGION).await.unwrap();
        assert_eq!(id, Some(ItemId::new(2)));
    }

    #[tokio::test]
    async fn test_unknown_sku() {
        assert_eq!(lookup().find_item_id("nope", REGION).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_item_options_sorted_by_parts() {
        let sku = Sku::parse("KIT-9").unwrap();
        let options = lookup().item_options(&sku, REGION).await.unwrap();
        let ids: Vec<ItemId> = options.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![ItemId::new(2), ItemId::new(1)]);
    }

    #[tokio::test]
    async fn test_find_alias_is_scoped_to_item() {
        let lookup = lookup();
        assert!(
            lookup
                .find_alias(ItemId::new(2), "kit-9")
                .await
                .unwrap()
                .is_some()
        );
        assert!(
            lookup
                .find_alias(ItemId::new(1), "KIT-9")
                .await
                .unwrap()
                .is_none()
        );
    }
}

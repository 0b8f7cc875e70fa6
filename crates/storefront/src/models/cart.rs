//! Cart domain types.
//!
//! A shopper has two sub-carts: the checkout cart, holding what will be
//! purchased, and the saved-for-later cart, holding items that cannot be bought
//! right now. Both are keyed by a [`CartOwner`].

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tidewater_core::{
    AccountId, CartEntryId, CatalogId, EntrySource, ItemAliasId, ItemId, ItemStatus, Price,
    ProductId,
};

/// Which sub-cart an entry lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CartKind {
    /// Entries that go through checkout.
    Checkout,
    /// Entries saved for later.
    Saved,
}

impl CartKind {
    /// Database representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Checkout => "checkout",
            Self::Saved => "saved",
        }
    }
}

/// Who a cart belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CartOwner {
    /// A logged-in account.
    Account(AccountId),
    /// An anonymous visitor, identified by the token stored in their session.
    Session(Uuid),
}

/// Parent product of an item, loaded for navigation links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: ProductId,
    pub title: String,
    pub shortname: String,
    /// Category path relative to the store root, e.g. `tools/saws/hand-saw`.
    pub path: String,
    pub catalog: CatalogId,
}

/// A purchasable item as priced in the current region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ItemId,
    /// Canonical SKU.
    pub sku: String,
    pub description: String,
    pub status: ItemStatus,
    pub price: Price,
    /// Number of constituent parts; kits have more than one.
    pub part_count: i32,
    pub product: ProductSummary,
}

impl CartItem {
    /// Whether the item can go into the checkout cart.
    #[must_use]
    pub const fn has_available_status(&self) -> bool {
        self.status.is_available()
    }

    /// Product title and item description, skipping blanks.
    #[must_use]
    pub fn description_parts(&self) -> Vec<&str> {
        [self.product.title.as_str(), self.description.as_str()]
            .into_iter()
            .filter(|part| !part.trim().is_empty())
            .collect()
    }
}

/// An alternate SKU registered for an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAlias {
    pub id: ItemAliasId,
    pub item: ItemId,
    pub sku: String,
}

/// An entry about to be added to a cart.
#[derive(Debug, Clone)]
pub struct NewCartEntry {
    pub item: CartItem,
    pub quantity: u32,
    pub alias: Option<ItemAlias>,
    pub source: EntrySource,
}

/// An entry held by a cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartEntry {
    pub id: CartEntryId,
    pub item: CartItem,
    pub quantity: u32,
    pub alias: Option<ItemAlias>,
    pub source: EntrySource,
}

impl CartEntry {
    /// Build a stored entry from a new one.
    #[must_use]
    pub fn from_new(id: CartEntryId, entry: NewCartEntry) -> Self {
        Self {
            id,
            item: entry.item,
            quantity: entry.quantity,
            alias: entry.alias,
            source: entry.source,
        }
    }

    /// SKU shown to the shopper: `CANONICAL (ALIAS)` when ordered by alias.
    #[must_use]
    pub fn display_sku(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{} ({})", self.item.sku, alias.sku),
            None => self.item.sku.clone(),
        }
    }

    /// Description parts joined for display.
    #[must_use]
    pub fn description(&self) -> String {
        self.item.description_parts().join(" - ")
    }

    /// Unit price.
    #[must_use]
    pub const fn calculated_item_price(&self) -> Price {
        self.item.price
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn extension(&self) -> Price {
        self.item.price.extend(self.quantity)
    }
}

/// A notice produced by the cart while it was being modified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartMessage {
    pub text: String,
}

impl CartMessage {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// One choice offered by the quick order item selector for a SKU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemOption {
    pub id: ItemId,
    pub sku: String,
    pub description: String,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use rust_decimal::Decimal;
    use tidewater_core::CurrencyCode;

    use super::*;

    /// An item priced at $10.00 in product "Widget".
    pub fn item(id: i32, sku: &str, part_count: i32, status: ItemStatus) -> CartItem {
        CartItem {
            id: ItemId::new(id),
            sku: sku.to_owned(),
            description: format!("Item {id}"),
            status,
            price: Price::new(Decimal::new(1000, 2), CurrencyCode::USD),
            part_count,
            product: ProductSummary {
                id: ProductId::new(id * 10),
                title: "Widget".to_owned(),
                shortname: "widget".to_owned(),
                path: "widgets/widget".to_owned(),
                catalog: CatalogId::new(1),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(alias: Option<&str>) -> CartEntry {
        let item = fixtures::item(1, "ABC1", 1, ItemStatus::Available);
        CartEntry {
            id: CartEntryId::new(1),
            alias: alias.map(|sku| ItemAlias {
                id: ItemAliasId::new(9),
                item: item.id,
                sku: sku.to_owned(),
            }),
            item,
            quantity: 3,
            source: EntrySource::QuickOrder,
        }
    }

    #[test]
    fn test_display_sku_without_alias() {
        assert_eq!(entry(None).display_sku(), "ABC1");
    }

    #[test]
    fn test_display_sku_with_alias() {
        assert_eq!(entry(Some("OLD-1")).display_sku(), "ABC1 (OLD-1)");
    }

    #[test]
    fn test_extension() {
        assert_eq!(entry(None).extension().display(), "$30.00");
    }

    #[test]
    fn test_description_skips_blank_parts() {
        let mut e = entry(None);
        assert_eq!(e.description(), "Widget - Item 1");
        e.item.description = "  ".to_owned();
        assert_eq!(e.description(), "Widget");
    }
}

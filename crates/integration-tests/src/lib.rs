//! Shared fixtures for the Tidewater integration tests.

use rust_decimal::Decimal;

use tidewater_core::{CatalogId, CurrencyCode, ItemId, ItemStatus, Price, ProductId};
use tidewater_storefront::models::{CartItem, ProductSummary};

/// An item of product "Hand Saw" priced at `cents` US cents.
#[must_use]
pub fn item(id: i32, sku: &str, part_count: i32, status: ItemStatus, cents: i64) -> CartItem {
    CartItem {
        id: ItemId::new(id),
        sku: sku.to_owned(),
        description: format!("Blade {id}"),
        status,
        price: Price::new(Decimal::new(cents, 2), CurrencyCode::USD),
        part_count,
        product: ProductSummary {
            id: ProductId::new(100 + id),
            title: "Hand Saw".to_owned(),
            shortname: "hand-saw".to_owned(),
            path: "tools/saws/hand-saw".to_owned(),
            catalog: CatalogId::new(1),
        },
    }
}

//! Cart page.
//!
//! Shows the checkout cart and the saved-for-later cart of the visitor. The
//! page never activates the session: a visitor without a cart sees an empty
//! one.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use rust_decimal::Decimal;
use tracing::instrument;

use tidewater_core::Price;

use crate::config::StoreConfig;
use crate::error::Result;
use crate::filters;
use crate::middleware::StoreSession;
use crate::models::{CartEntry, CartKind};
use crate::state::AppState;

/// Cart entry display data for templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryView {
    pub sku: String,
    pub description: String,
    pub link: String,
    pub quantity: u32,
    pub price: String,
    pub extension: String,
    pub available: bool,
}

impl EntryView {
    #[must_use]
    pub fn new(entry: &CartEntry, store: &StoreConfig) -> Self {
        Self {
            sku: entry.display_sku(),
            description: entry.description(),
            link: store.product_link(&entry.item.product.path),
            quantity: entry.quantity,
            price: entry.calculated_item_price().display(),
            extension: entry.extension().display(),
            available: entry.item.has_available_status(),
        }
    }
}

/// Views for `entries`, in cart order.
#[must_use]
pub fn entry_views(entries: &[CartEntry], store: &StoreConfig) -> Vec<EntryView> {
    entries
        .iter()
        .map(|entry| EntryView::new(entry, store))
        .collect()
}

/// Sum of the extensions of the purchasable entries, formatted.
#[must_use]
pub fn subtotal(entries: &[CartEntry]) -> String {
    let available = entries
        .iter()
        .filter(|entry| entry.item.has_available_status());
    let currency = entries
        .first()
        .map(|entry| entry.item.price.currency_code)
        .unwrap_or_default();
    let amount: Decimal = available.map(|entry| entry.extension().amount).sum();
    Price::new(amount, currency).display()
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub checkout: Vec<EntryView>,
    pub saved: Vec<EntryView>,
    pub subtotal: String,
    pub can_checkout: bool,
    pub logged_in: bool,
}

/// Display cart page.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: StoreSession) -> Result<impl IntoResponse> {
    let logged_in = session.is_logged_in().await?;
    let Some(owner) = session.cart_owner().await? else {
        return Ok(CartShowTemplate {
            checkout: Vec::new(),
            saved: Vec::new(),
            subtotal: subtotal(&[]),
            can_checkout: false,
            logged_in,
        });
    };

    let cart = state.open_cart(owner);
    let checkout = cart.entries(CartKind::Checkout).await?;
    let saved = cart.entries(CartKind::Saved).await?;
    let store = &state.config().store;

    Ok(CartShowTemplate {
        checkout: entry_views(&checkout, store),
        saved: entry_views(&saved, store),
        subtotal: subtotal(&checkout),
        can_checkout: checkout.iter().any(|entry| entry.item.has_available_status()),
        logged_in,
    })
}

#[cfg(test)]
mod tests {
    use tidewater_core::{CartEntryId, EntrySource, ItemStatus};

    use super::*;
    use crate::models::cart::fixtures;

    fn entry(id: i32, quantity: u32, status: ItemStatus) -> CartEntry {
        CartEntry {
            id: CartEntryId::new(id),
            item: fixtures::item(id, &format!("SKU{id}"), 1, status),
            quantity,
            alias: None,
            source: EntrySource::Cart,
        }
    }

    #[test]
    fn test_subtotal_skips_unavailable() {
        let entries = vec![
            entry(1, 2, ItemStatus::Available),
            entry(2, 5, ItemStatus::OutOfStock),
        ];
        assert_eq!(subtotal(&entries), "$20.00");
    }

    #[test]
    fn test_subtotal_empty() {
        assert_eq!(subtotal(&[]), "$0.00");
    }

    #[test]
    fn test_entry_view() {
        let view = EntryView::new(&entry(1, 3, ItemStatus::Available), &StoreConfig::default());
        assert_eq!(view.sku, "SKU1");
        assert_eq!(view.link, "/store/widgets/widget");
        assert_eq!(view.price, "$10.00");
        assert_eq!(view.extension, "$30.00");
        assert!(view.available);
    }
}

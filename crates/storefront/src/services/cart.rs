//! Cart service trait and in-memory implementation.
//!
//! A [`CartService`] is opened per request for a single [`CartOwner`]. The
//! `PostgreSQL` implementation lives in [`crate::db::cart`].

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use tidewater_core::CartEntryId;

use crate::db::RepositoryError;
use crate::models::{CartEntry, CartKind, CartMessage, NewCartEntry};

/// Default cap on distinct entries per sub-cart.
pub const DEFAULT_MAX_ENTRIES: usize = 100;

/// Largest quantity a single cart entry can hold; the `integer` column limit.
pub const MAX_QUANTITY: u32 = 2_147_483_647;

/// Quantity after merging `added` into `existing`, or `None` past
/// [`MAX_QUANTITY`].
#[must_use]
pub fn merged_quantity(existing: u32, added: u32) -> Option<u32> {
    existing
        .checked_add(added)
        .filter(|total| *total <= MAX_QUANTITY)
}

/// Pending cart entries for one owner.
#[async_trait]
pub trait CartService: Send + Sync {
    /// Checkout cart entries whose item can currently be purchased.
    async fn available_entries(&self) -> Result<Vec<CartEntry>, RepositoryError>;

    /// Add an entry to a sub-cart.
    ///
    /// An entry for an item (and alias) already in that sub-cart is merged by
    /// adding quantities, which produces a [`CartMessage`]. Returns `None` if
    /// the sub-cart refuses the entry, e.g. because it is full, the merged
    /// quantity would exceed [`MAX_QUANTITY`] or the saved cart is not
    /// supported.
    async fn add_entry(
        &self,
        kind: CartKind,
        entry: NewCartEntry,
    ) -> Result<Option<CartEntry>, RepositoryError>;

    /// All entries of a sub-cart, oldest first.
    async fn entries(&self, kind: CartKind) -> Result<Vec<CartEntry>, RepositoryError>;

    /// Remove every entry of a sub-cart.
    async fn clear(&self, kind: CartKind) -> Result<(), RepositoryError>;

    /// Whether this cart has a saved-for-later sub-cart.
    fn has_saved_cart(&self) -> bool;

    /// Drain the notices produced since the last call.
    fn take_messages(&self) -> Vec<CartMessage>;
}

/// Notice for an entry merged into an existing one.
pub(crate) fn merged_message(entry: &CartEntry) -> CartMessage {
    CartMessage::new(format!(
        "“{}” was already in your cart. The quantity is now {}.",
        entry.display_sku(),
        entry.quantity
    ))
}

#[derive(Debug, Default)]
struct InMemoryCartState {
    checkout: Vec<CartEntry>,
    saved: Vec<CartEntry>,
    messages: Vec<CartMessage>,
    next_id: i32,
}

impl InMemoryCartState {
    const fn entries_mut(&mut self, kind: CartKind) -> &mut Vec<CartEntry> {
        match kind {
            CartKind::Checkout => &mut self.checkout,
            CartKind::Saved => &mut self.saved,
        }
    }
}

/// In-memory cart for testing.
#[derive(Debug, Clone)]
pub struct InMemoryCart {
    state: Arc<Mutex<InMemoryCartState>>,
    max_entries: usize,
    saved_cart: bool,
}

impl Default for InMemoryCart {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCart {
    /// Creates an empty cart with a saved-for-later sub-cart.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::default(),
            max_entries: DEFAULT_MAX_ENTRIES,
            saved_cart: true,
        }
    }

    /// Caps each sub-cart at `max_entries` distinct entries.
    #[must_use]
    pub const fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Removes the saved-for-later sub-cart.
    #[must_use]
    pub const fn without_saved_cart(mut self) -> Self {
        self.saved_cart = false;
        self
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut InMemoryCartState) -> T) -> T {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }
}

#[async_trait]
impl CartService for InMemoryCart {
    async fn available_entries(&self) -> Result<Vec<CartEntry>, RepositoryError> {
        Ok(self.with_state(|state| {
            state
                .checkout
                .iter()
                .filter(|entry| entry.item.has_available_status())
                .cloned()
                .collect()
        }))
    }

    async fn add_entry(
        &self,
        kind: CartKind,
        entry: NewCartEntry,
    ) -> Result<Option<CartEntry>, RepositoryError> {
        if (kind == CartKind::Saved && !self.saved_cart) || entry.quantity > MAX_QUANTITY {
            return Ok(None);
        }

        let max_entries = self.max_entries;
        Ok(self.with_state(|state| {
            let alias_id = entry.alias.as_ref().map(|alias| alias.id);
            let entries = state.entries_mut(kind);

            if let Some(existing) = entries.iter_mut().find(|existing| {
                existing.item.id == entry.item.id
                    && existing.alias.as_ref().map(|alias| alias.id) == alias_id
            }) {
                existing.quantity = merged_quantity(existing.quantity, entry.quantity)?;
                let merged = existing.clone();
                state.messages.push(merged_message(&merged));
                return Some(merged);
            }

            if entries.len() >= max_entries {
                return None;
            }

            state.next_id += 1;
            let added = CartEntry::from_new(CartEntryId::new(state.next_id), entry);
            state.entries_mut(kind).push(added.clone());
            Some(added)
        }))
    }

    async fn entries(&self, kind: CartKind) -> Result<Vec<CartEntry>, RepositoryError> {
        Ok(self.with_state(|state| state.entries_mut(kind).clone()))
    }

    async fn clear(&self, kind: CartKind) -> Result<(), RepositoryError> {
        self.with_state(|state| state.entries_mut(kind).clear());
        Ok(())
    }

    fn has_saved_cart(&self) -> bool {
        self.saved_cart
    }

    fn take_messages(&self) -> Vec<CartMessage> {
        self.with_state(|state| std::mem::take(&mut state.messages))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tidewater_core::{EntrySource, ItemStatus};

    use super::*;
    use crate::models::cart::fixtures;

    fn new_entry(id: i32, quantity: u32, status: ItemStatus) -> NewCartEntry {
        NewCartEntry {
            item: fixtures::item(id, &format!("SKU{id}"), 1, status),
            quantity,
            alias: None,
            source: EntrySource::QuickOrder,
        }
    }

    #[tokio::test]
    async fn test_add_and_list() {
        let cart = InMemoryCart::new();
        let added = cart
            .add_entry(CartKind::Checkout, new_entry(1, 2, ItemStatus::Available))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(added.quantity, 2);

        let entries = cart.entries(CartKind::Checkout).await.unwrap();
        assert_eq!(entries, vec![added]);
        assert!(cart.entries(CartKind::Saved).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_merge_adds_quantity_and_reports() {
        let cart = InMemoryCart::new();
        cart.add_entry(CartKind::Checkout, new_entry(1, 2, ItemStatus::Available))
            .await
            .unwrap();
        let merged = cart
            .add_entry(CartKind::Checkout, new_entry(1, 3, ItemStatus::Available))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(merged.quantity, 5);
        assert_eq!(cart.entries(CartKind::Checkout).await.unwrap().len(), 1);

        let messages = cart.take_messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].text.contains("quantity is now 5"));
        assert!(cart.take_messages().is_empty());
    }

    #[tokio::test]
    async fn test_full_cart_refuses() {
        let cart = InMemoryCart::new().with_max_entries(1);
        cart.add_entry(CartKind::Checkout, new_entry(1, 1, ItemStatus::Available))
            .await
            .unwrap();
        let refused = cart
            .add_entry(CartKind::Checkout, new_entry(2, 1, ItemStatus::Available))
            .await
            .unwrap();
        assert!(refused.is_none());
    }

    #[tokio::test]
    async fn test_available_entries_skip_unavailable_items() {
        let cart = InMemoryCart::new();
        cart.add_entry(CartKind::Checkout, new_entry(1, 1, ItemStatus::Available))
            .await
            .unwrap();
        cart.add_entry(CartKind::Checkout, new_entry(2, 1, ItemStatus::OutOfStock))
            .await
            .unwrap();

        let available = cart.available_entries().await.unwrap();
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].item.sku, "SKU1");
    }

    #[test]
    fn test_merged_quantity() {
        assert_eq!(merged_quantity(2, 3), Some(5));
        assert_eq!(merged_quantity(MAX_QUANTITY - 1, 1), Some(MAX_QUANTITY));
        assert_eq!(merged_quantity(MAX_QUANTITY, 1), None);
        assert_eq!(merged_quantity(u32::MAX, 1), None);
    }

    #[tokio::test]
    async fn test_merge_past_max_quantity_refuses_and_keeps_entry() {
        let cart = InMemoryCart::new();
        cart.add_entry(
            CartKind::Checkout,
            new_entry(1, MAX_QUANTITY, ItemStatus::Available),
        )
        .await
        .unwrap();
        let refused = cart
            .add_entry(CartKind::Checkout, new_entry(1, 1, ItemStatus::Available))
            .await
            .unwrap();

        assert!(refused.is_none());
        let entries = cart.entries(CartKind::Checkout).await.unwrap();
        assert_eq!(entries[0].quantity, MAX_QUANTITY);
        assert!(cart.take_messages().is_empty());
    }

    #[tokio::test]
    async fn test_without_saved_cart_refuses_saved_entries() {
        let cart = InMemoryCart::new().without_saved_cart();
        assert!(!cart.has_saved_cart());
        let refused = cart
            .add_entry(CartKind::Saved, new_entry(1, 1, ItemStatus::OutOfStock))
            .await
            .unwrap();
        assert!(refused.is_none());
    }

    #[tokio::test]
    async fn test_clear() {
        let cart = InMemoryCart::new();
        cart.add_entry(CartKind::Checkout, new_entry(1, 1, ItemStatus::Available))
            .await
            .unwrap();
        cart.clear(CartKind::Checkout).await.unwrap();
        assert!(cart.entries(CartKind::Checkout).await.unwrap().is_empty());
    }
}

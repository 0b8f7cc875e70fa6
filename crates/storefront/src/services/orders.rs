//! Order placement trait and in-memory implementation.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use tidewater_core::OrderId;

use crate::db::RepositoryError;
use crate::models::{Account, CartEntry, WorkingOrder};

/// Persists a finished checkout as an order.
#[async_trait]
pub trait OrderService: Send + Sync {
    /// Store `order` with its `entries` and return the new order id.
    ///
    /// Implementations that share storage with the cart remove `entries`
    /// from it in the same unit of work.
    async fn place_order(
        &self,
        order: &WorkingOrder,
        account: &Account,
        entries: &[CartEntry],
    ) -> Result<OrderId, RepositoryError>;
}

/// An order recorded by [`InMemoryOrderService`].
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub id: OrderId,
    pub order: WorkingOrder,
    pub account: Account,
    pub entries: Vec<CartEntry>,
}

/// In-memory order service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderService {
    placed: Arc<Mutex<Vec<PlacedOrder>>>,
}

impl InMemoryOrderService {
    /// Creates a service with no orders.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Orders placed so far.
    #[must_use]
    pub fn placed(&self) -> Vec<PlacedOrder> {
        self.placed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl OrderService for InMemoryOrderService {
    async fn place_order(
        &self,
        order: &WorkingOrder,
        account: &Account,
        entries: &[CartEntry],
    ) -> Result<OrderId, RepositoryError> {
        if entries.is_empty() && !order.is_from_invoice() {
            return Err(RepositoryError::Conflict("order has no entries".to_owned()));
        }

        let mut placed = self.placed.lock().unwrap_or_else(PoisonError::into_inner);
        let id = OrderId::new(i32::try_from(placed.len()).unwrap_or(i32::MAX) + 1);
        placed.push(PlacedOrder {
            id,
            order: order.clone(),
            account: account.clone(),
            entries: entries.to_vec(),
        });
        Ok(id)
    }
}

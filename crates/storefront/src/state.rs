//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::db::{PgCart, PgItemLookup, PgOrderService};
use crate::models::{CartOwner, CheckoutFactory};
use crate::services::{CartService, ItemLookup, OrderService};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    lookup: Arc<dyn ItemLookup>,
    orders: Arc<dyn OrderService>,
    factory: CheckoutFactory,
}

impl AppState {
    /// Create a new application state backed by `PostgreSQL`.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `pool` - `PostgreSQL` connection pool
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let lookup = Arc::new(PgItemLookup::new(pool.clone()));
        let orders = Arc::new(PgOrderService::new(pool.clone()));

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                lookup,
                orders,
                factory: CheckoutFactory::default(),
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Item lookup for the configured region.
    #[must_use]
    pub fn lookup(&self) -> &dyn ItemLookup {
        self.inner.lookup.as_ref()
    }

    /// Order persistence.
    #[must_use]
    pub fn orders(&self) -> &dyn OrderService {
        self.inner.orders.as_ref()
    }

    /// Constructors for checkout working objects.
    #[must_use]
    pub fn checkout_factory(&self) -> &CheckoutFactory {
        &self.inner.factory
    }

    /// Open the cart of `owner` for the duration of a request.
    #[must_use]
    pub fn open_cart(&self, owner: CartOwner) -> Box<dyn CartService> {
        let store = &self.inner.config.store;
        Box::new(PgCart::new(
            self.inner.pool.clone(),
            owner,
            store.region,
            store.cart_max_entries,
        ))
    }
}

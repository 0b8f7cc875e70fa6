//! Database operations for storefront `PostgreSQL`.
//!
//! # Database: `tidewater`
//!
//! ## Tables
//!
//! - `region` - Selling regions (currency)
//! - `catalog`, `product`, `item` - Merchandise (catalogs are edited in admin)
//! - `item_region` - Per-region price and visibility of each item
//! - `item_alias` - Alternate SKUs accepted on the quick order page
//! - `account` - Customer accounts (argon2 password hashes)
//! - `cart_entry` - Checkout and saved-for-later cart entries
//! - `orders`, `order_item` - Placed orders
//! - `tower_sessions.session` - Tower-sessions storage
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p tidewater-cli -- migrate
//! ```

pub mod accounts;
pub mod cart;
pub mod items;
pub mod orders;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use accounts::AccountRepository;
pub use cart::PgCart;
pub use items::PgItemLookup;
pub use orders::PgOrderService;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

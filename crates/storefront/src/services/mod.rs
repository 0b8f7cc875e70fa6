//! Business logic services for storefront.
//!
//! # Services
//!
//! - `cart` - [`CartService`] trait and in-memory cart
//! - `lookup` - [`ItemLookup`] trait for SKU resolution
//! - `orders` - [`OrderService`] trait for placing orders
//! - `checkout` - Checkout step gating and step completion
//! - `quick_order` - Bulk add-to-cart by SKU
//! - `auth` - Customer password authentication
//!
//! The collaborator traits have `PostgreSQL` implementations in [`crate::db`]
//! and in-memory implementations here for tests.

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod lookup;
pub mod orders;
pub mod quick_order;

pub use auth::{AuthError, AuthService, hash_password};
pub use cart::{CartService, DEFAULT_MAX_ENTRIES, InMemoryCart, MAX_QUANTITY};
pub use checkout::{CheckoutError, ContactDetails, ContactErrors, Entry};
pub use lookup::{InMemoryItemLookup, ItemLookup};
pub use orders::{InMemoryOrderService, OrderService, PlacedOrder};
pub use quick_order::{QuickOrderOutcome, QuickOrderResolver, QuickOrderRow, RowOutcome};

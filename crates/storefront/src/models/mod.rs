//! Domain models for storefront.

pub mod cart;
pub mod checkout;
pub mod session;

pub use cart::{
    CartEntry, CartItem, CartKind, CartMessage, CartOwner, ItemAlias, ItemOption, NewCartEntry,
    ProductSummary,
};
pub use checkout::{
    Account, CheckoutFactory, CheckoutRedirect, CheckoutSession, CheckoutStep, WorkingOrder,
};
pub use session::{CurrentCustomer, keys as session_keys};

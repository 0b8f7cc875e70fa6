//! Core types for the Tidewater store.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod checkout;
pub mod id;
pub mod price;
pub mod sku;
pub mod status;

pub use checkout::CheckoutProgress;
pub use id::*;
pub use price::{CurrencyCode, Price};
pub use sku::{Sku, SkuError};
pub use status::*;

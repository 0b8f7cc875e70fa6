//! Tidewater Core - Shared types library.
//!
//! This crate provides common types used across all Tidewater components:
//! - `storefront` - Public-facing store (cart, quick order, checkout)
//! - `admin` - Internal administration console (catalog editing)
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure state - no I/O, no database
//! access, no HTTP. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, SKUs, item statuses, prices and checkout progress

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

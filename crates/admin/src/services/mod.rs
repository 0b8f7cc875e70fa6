//! Business logic services for admin.

pub mod catalogs;

pub use catalogs::{CatalogStore, InMemoryCatalogStore};

//! Domain models for admin.

pub mod catalog;
pub mod session;

pub use catalog::{Catalog, CatalogErrors, CatalogForm, CatalogInput};
pub use session::keys as session_keys;

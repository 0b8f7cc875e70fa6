//! HTTP middleware for admin.

pub mod session;

pub use session::{create_session_layer, set_flash, take_flash};

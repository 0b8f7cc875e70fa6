//! Session keys used by the admin console.

/// Session keys for admin data.
pub mod keys {
    /// One-time notice shown on the next page that displays flashes.
    pub const FLASH: &str = "flash";
}

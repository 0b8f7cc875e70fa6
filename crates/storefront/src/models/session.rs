//! Session-related types.
//!
//! Types stored in the session for identity, cart ownership and checkout.

use serde::{Deserialize, Serialize};

use tidewater_core::AccountId;

/// Session-stored customer identity.
///
/// Minimal data stored in the session to identify the logged-in customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentCustomer {
    /// Account database ID.
    pub id: AccountId,
    /// Account email address.
    pub email: String,
    /// Display name.
    pub fullname: Option<String>,
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in customer.
    pub const CURRENT_CUSTOMER: &str = "current_customer";

    /// Key for the anonymous cart token. Its presence marks the session active.
    pub const CART_TOKEN: &str = "cart_token";

    /// Key for the serialized checkout state.
    pub const CHECKOUT: &str = "checkout";

    /// Key for the id of the order placed most recently.
    pub const LAST_ORDER_ID: &str = "last_order_id";
}

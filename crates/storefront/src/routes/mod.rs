//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//! GET  /health/ready           - Readiness check (database)
//!
//! # Cart
//! GET  /cart                   - Checkout and saved-for-later carts
//!
//! # Quick order
//! GET  /quick-order            - Quick order form
//! POST /quick-order            - Add rows to the cart
//! GET  /quick-order/items      - Item selector options (JSON)
//!
//! # Checkout (gated)
//! GET  /checkout               - Guest or account checkout
//! POST /checkout               - Continue
//! GET  /checkout/first         - Contact details
//! POST /checkout/first         - Save contact details
//! GET  /checkout/confirmation  - Review order
//! POST /checkout/confirmation  - Place order
//! GET  /checkout/thankyou      - Order placed
//!
//! # Account
//! GET  /account/login          - Login page
//! POST /account/login          - Login action
//! POST /account/logout         - Logout action
//! ```

pub mod account;
pub mod cart;
pub mod checkout;
pub mod quick_order;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the quick order routes router.
pub fn quick_order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(quick_order::show).post(quick_order::submit))
        .route("/items", get(quick_order::items))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::front).post(checkout::submit_front))
        .route("/first", get(checkout::first).post(checkout::submit_first))
        .route(
            "/confirmation",
            get(checkout::confirmation).post(checkout::submit_confirmation),
        )
        .route("/thankyou", get(checkout::thankyou))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(account::login_page).post(account::login))
        .route("/logout", post(account::logout))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cart", get(cart::show))
        .nest("/quick-order", quick_order_routes())
        .nest("/checkout", checkout_routes())
        .nest("/account", account_routes())
}

//! Checkout step gating.
//!
//! Every gated checkout page calls [`enter`] before doing anything else. It
//! either hands back the loaded [`CheckoutSession`] and the shopper's cart, or
//! a [`CheckoutRedirect`] to the cart or to the first unfinished step.

use thiserror::Error;
use tracing::instrument;

use tidewater_core::OrderId;

use crate::db::RepositoryError;
use crate::middleware::StoreSession;
use crate::models::{
    CartKind, CartOwner, CheckoutFactory, CheckoutRedirect, CheckoutSession, CheckoutStep,
};
use crate::services::{CartService, OrderService};

/// Errors raised while loading or advancing checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("Checkout has no working {0}")]
    MissingWorkingObject(&'static str),
}

/// Result of entering a gated checkout page.
pub enum Entry {
    /// Render the page with this state and cart.
    Proceed {
        checkout: CheckoutSession,
        cart: Box<dyn CartService>,
    },
    /// Send the shopper elsewhere.
    Redirect(CheckoutRedirect),
}

/// Whether checkout may start at all.
///
/// # Errors
///
/// Returns [`CheckoutRedirect::Cart`] for an inactive session, or for an empty
/// checkout cart unless the order settles an invoice.
pub const fn check_cart(
    session_active: bool,
    has_available_entries: bool,
    from_invoice: bool,
) -> Result<(), CheckoutRedirect> {
    if !session_active || (!has_available_entries && !from_invoice) {
        return Err(CheckoutRedirect::Cart);
    }
    Ok(())
}

/// Bring checkout state up to date for `step` and check its prerequisites.
///
/// # Errors
///
/// Returns a redirect to the first prerequisite of `step` not yet completed.
pub fn prepare(
    checkout: &mut CheckoutSession,
    logged_in: bool,
    factory: &CheckoutFactory,
    step: CheckoutStep,
) -> Result<(), CheckoutRedirect> {
    checkout.ensure_progress();
    if logged_in {
        checkout.set_with_account();
    }
    checkout.ensure_working_objects(factory);
    checkout.require_dependencies(step.dependencies())
}

/// Run the checkout gate for `step`.
///
/// The session is only activated once the cart check passes, and the updated
/// checkout state is written back even when a prerequisite redirect follows.
///
/// # Errors
///
/// Returns an error if the session or the cart cannot be read or written.
#[instrument(skip(session, open_cart, factory), fields(step = step.id()))]
pub async fn enter<F>(
    session: &StoreSession,
    open_cart: F,
    factory: &CheckoutFactory,
    step: CheckoutStep,
) -> Result<Entry, CheckoutError>
where
    F: FnOnce(CartOwner) -> Box<dyn CartService>,
{
    let Some(owner) = session.cart_owner().await? else {
        tracing::debug!("Inactive session, back to cart");
        return Ok(Entry::Redirect(CheckoutRedirect::Cart));
    };

    let cart = open_cart(owner);
    let mut checkout = session.checkout().await?;
    let has_available = !cart.available_entries().await?.is_empty();
    let from_invoice = checkout
        .order()
        .is_some_and(crate::models::WorkingOrder::is_from_invoice);

    if let Err(redirect) = check_cart(true, has_available, from_invoice) {
        tracing::debug!("Nothing to check out, back to cart");
        return Ok(Entry::Redirect(redirect));
    }

    session.activate().await?;
    let logged_in = session.is_logged_in().await?;
    let gate = prepare(&mut checkout, logged_in, factory, step);
    session.save_checkout(&checkout).await?;

    match gate {
        Ok(()) => Ok(Entry::Proceed { checkout, cart }),
        Err(redirect) => {
            tracing::debug!(location = %redirect.location(), "Unmet checkout prerequisite");
            Ok(Entry::Redirect(redirect))
        }
    }
}

/// Contact details collected by the first checkout step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactDetails {
    pub email: String,
    pub fullname: String,
    pub notes: String,
}

/// Field errors for [`ContactDetails`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactErrors {
    pub email: Option<&'static str>,
    pub fullname: Option<&'static str>,
}

impl ContactErrors {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.email.is_none() && self.fullname.is_none()
    }
}

impl ContactDetails {
    /// Check the submitted fields.
    ///
    /// # Errors
    ///
    /// Returns the per-field messages when a field is blank or malformed.
    pub fn validate(&self) -> Result<(), ContactErrors> {
        let email = self.email.trim();
        let errors = ContactErrors {
            email: if email.is_empty() {
                Some("Email address is required.")
            } else if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
                Some("Enter a valid email address.")
            } else {
                None
            },
            fullname: self
                .fullname
                .trim()
                .is_empty()
                .then_some("Full name is required."),
        };

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Complete the front step: the shopper chose to continue.
pub fn complete_front(checkout: &mut CheckoutSession) {
    checkout.record_completion(CheckoutStep::Front.id());
}

/// Complete the contact step, copying the details onto the account and order.
///
/// # Errors
///
/// Returns the field errors without recording the step.
pub fn complete_first(
    checkout: &mut CheckoutSession,
    details: &ContactDetails,
) -> Result<(), ContactErrors> {
    details.validate()?;

    let email = details.email.trim().to_owned();
    let fullname = details.fullname.trim().to_owned();
    let notes = Some(details.notes.trim().to_owned()).filter(|notes| !notes.is_empty());

    if let Some(account) = checkout.account_mut() {
        account.email = Some(email.clone());
        account.fullname = Some(fullname.clone());
    }
    if let Some(order) = checkout.order_mut() {
        order.email = Some(email);
        order.fullname = Some(fullname);
        order.notes = notes;
    }

    checkout.record_completion(CheckoutStep::First.id());
    Ok(())
}

/// Place the working order from the checkout cart.
///
/// Stamps the new id on the working order and records the step as soon as
/// the order exists, so the next gated page starts a fresh checkout. The
/// checkout cart is then emptied; failing to do so is logged rather than
/// returned, since the order has already been placed.
///
/// # Errors
///
/// Returns an error if the working objects are missing or the order cannot
/// be placed.
#[instrument(skip_all)]
pub async fn place_order(
    checkout: &mut CheckoutSession,
    cart: &dyn CartService,
    orders: &dyn OrderService,
) -> Result<OrderId, CheckoutError> {
    let entries = cart.available_entries().await?;
    let order = checkout
        .order()
        .ok_or(CheckoutError::MissingWorkingObject("order"))?;
    let account = checkout
        .account()
        .ok_or(CheckoutError::MissingWorkingObject("account"))?;

    let id = orders.place_order(order, account, &entries).await?;
    if let Some(order) = checkout.order_mut() {
        order.id = Some(id);
    }
    checkout.record_completion(CheckoutStep::Confirmation.id());

    if let Err(e) = cart.clear(CartKind::Checkout).await {
        tracing::warn!(order_id = %id, error = %e, "Failed to clear checkout cart after order");
    }

    tracing::info!(order_id = %id, entries = entries.len(), "Order placed");
    Ok(id)
}

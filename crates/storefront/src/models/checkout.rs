//! Checkout state held in the visitor's session.
//!
//! [`CheckoutSession`] owns the working account and order objects together
//! with the [`CheckoutProgress`] that gates navigation between checkout steps.
//! It is loaded from the session at the start of a checkout request, mutated,
//! and written back before the response is sent.

use serde::{Deserialize, Serialize};

use tidewater_core::{AccountId, CheckoutProgress, InvoiceId, OrderId};

/// A checkout step, identified by its page path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CheckoutStep {
    /// Choose between guest checkout and signing in.
    Front,
    /// Contact details.
    First,
    /// Review and place the order.
    Confirmation,
}

impl CheckoutStep {
    /// Progress identifier, which doubles as the page path.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Front => "checkout",
            Self::First => "checkout/first",
            Self::Confirmation => "checkout/confirmation",
        }
    }

    /// Steps that must be completed before this one can be shown.
    #[must_use]
    pub const fn dependencies(self) -> &'static [&'static str] {
        match self {
            Self::Front => &[],
            Self::First => &["checkout"],
            Self::Confirmation => &["checkout", "checkout/first"],
        }
    }
}

/// Where a checkout page sends the shopper instead of rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutRedirect {
    /// Back to the cart page.
    Cart,
    /// To an unmet prerequisite step.
    Step(&'static str),
}

impl CheckoutRedirect {
    /// Absolute path to redirect to.
    #[must_use]
    pub fn location(self) -> String {
        match self {
            Self::Cart => "/cart".to_owned(),
            Self::Step(id) => format!("/{id}"),
        }
    }
}

/// The shopper's account as known to checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Set for logged-in shoppers.
    pub id: Option<AccountId>,
    pub email: Option<String>,
    pub fullname: Option<String>,
}

/// The order being assembled by checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingOrder {
    /// Set once the order has been placed.
    pub id: Option<OrderId>,
    /// Set when paying an existing invoice rather than buying from the cart.
    pub invoice: Option<InvoiceId>,
    pub email: Option<String>,
    pub fullname: Option<String>,
    pub notes: Option<String>,
}

impl WorkingOrder {
    /// Whether this order settles an invoice.
    #[must_use]
    pub const fn is_from_invoice(&self) -> bool {
        self.invoice.is_some()
    }

    /// Whether this order has already been placed.
    #[must_use]
    pub const fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}

/// Constructors for the checkout working objects, keyed by entity kind.
///
/// Sites that extend the account or order with their own defaults swap the
/// function pointers instead of subclassing.
#[derive(Debug, Clone, Copy)]
pub struct CheckoutFactory {
    pub account: fn() -> Account,
    pub order: fn() -> WorkingOrder,
}

impl Default for CheckoutFactory {
    fn default() -> Self {
        Self {
            account: Account::default,
            order: WorkingOrder::default,
        }
    }
}

/// Per-session checkout state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    account: Option<Account>,
    order: Option<WorkingOrder>,
    progress: Option<CheckoutProgress>,
}

impl CheckoutSession {
    /// Whether checkout has begun in this session.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.progress.is_some()
    }

    /// Whether `step` has been completed.
    #[must_use]
    pub fn has_completed(&self, step: &str) -> bool {
        self.progress
            .as_ref()
            .is_some_and(|progress| progress.has_completed(step))
    }

    /// Record `step` as completed, starting progress tracking if needed.
    pub fn record_completion(&mut self, step: &str) {
        self.progress
            .get_or_insert_with(CheckoutProgress::new)
            .record_completion(step);
    }

    /// Start over: no completed steps, guest checkout.
    pub fn reset(&mut self) {
        match &mut self.progress {
            Some(progress) => progress.reset(),
            None => self.progress = Some(CheckoutProgress::new()),
        }
    }

    /// Initialise progress tracking if it is absent.
    pub fn ensure_progress(&mut self) {
        if self.progress.is_none() {
            self.reset();
        }
    }

    /// Mark that the shopper is checking out with an account.
    pub fn set_with_account(&mut self) {
        self.progress
            .get_or_insert_with(CheckoutProgress::new)
            .with_account = true;
    }

    /// Whether the shopper is checking out with an account.
    #[must_use]
    pub fn with_account(&self) -> bool {
        self.progress
            .as_ref()
            .is_some_and(|progress| progress.with_account)
    }

    /// First prerequisite of `dependencies` not yet completed.
    ///
    /// # Errors
    ///
    /// Returns a redirect to the first missing step.
    pub fn require_dependencies(
        &self,
        dependencies: &[&'static str],
    ) -> Result<(), CheckoutRedirect> {
        let missing = match &self.progress {
            Some(progress) => progress.first_missing(dependencies),
            None => dependencies.first().copied(),
        };

        missing.map_or(Ok(()), |step| Err(CheckoutRedirect::Step(step)))
    }

    /// Create missing or stale working objects, resetting progress whenever
    /// one is (re)created.
    ///
    /// An order that already has a persisted id belongs to a finished checkout
    /// and is replaced by a blank one.
    pub fn ensure_working_objects(&mut self, factory: &CheckoutFactory) {
        if self.account.is_none() {
            self.account = Some((factory.account)());
            self.reset();
        }

        if self.order.as_ref().is_none_or(WorkingOrder::is_persisted) {
            self.order = Some((factory.order)());
            self.reset();
        }
    }

    /// Replace the working order, resetting progress.
    pub fn replace_order(&mut self, order: WorkingOrder) {
        self.order = Some(order);
        self.reset();
    }

    /// Drop the working account so the next checkout visit starts over.
    ///
    /// Called when the login state changes.
    pub fn forget_account(&mut self) {
        self.account = None;
    }

    #[must_use]
    pub const fn account(&self) -> Option<&Account> {
        self.account.as_ref()
    }

    pub const fn account_mut(&mut self) -> Option<&mut Account> {
        self.account.as_mut()
    }

    #[must_use]
    pub const fn order(&self) -> Option<&WorkingOrder> {
        self.order.as_ref()
    }

    pub const fn order_mut(&mut self) -> Option<&mut WorkingOrder> {
        self.order.as_mut()
    }

    #[must_use]
    pub const fn progress(&self) -> Option<&CheckoutProgress> {
        self.progress.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_inactive() {
        let checkout = CheckoutSession::default();
        assert!(!checkout.is_active());
        assert!(!checkout.has_completed("checkout"));
    }

    #[test]
    fn test_record_completion_activates() {
        let mut checkout = CheckoutSession::default();
        checkout.record_completion("checkout");
        assert!(checkout.is_active());
        assert!(checkout.has_completed("checkout"));
    }

    #[test]
    fn test_reset_after_record() {
        let mut checkout = CheckoutSession::default();
        checkout.record_completion("checkout");
        checkout.set_with_account();
        checkout.reset();
        assert!(!checkout.has_completed("checkout"));
        assert!(!checkout.with_account());
        assert!(checkout.is_active());
    }

    #[test]
    fn test_require_dependencies_without_progress() {
        let checkout = CheckoutSession::default();
        assert_eq!(
            checkout.require_dependencies(CheckoutStep::Confirmation.dependencies()),
            Err(CheckoutRedirect::Step("checkout"))
        );
        assert_eq!(checkout.require_dependencies(&[]), Ok(()));
    }

    #[test]
    fn test_require_dependencies_reports_first_missing() {
        let mut checkout = CheckoutSession::default();
        checkout.record_completion("checkout");
        assert_eq!(
            checkout.require_dependencies(CheckoutStep::Confirmation.dependencies()),
            Err(CheckoutRedirect::Step("checkout/first"))
        );
    }

    #[test]
    fn test_ensure_working_objects_creates_and_resets() {
        let mut checkout = CheckoutSession::default();
        checkout.record_completion("checkout");
        checkout.ensure_working_objects(&CheckoutFactory::default());

        assert!(checkout.account().is_some());
        assert!(checkout.order().is_some());
        assert!(!checkout.has_completed("checkout"));
    }

    #[test]
    fn test_ensure_working_objects_keeps_fresh_objects() {
        let mut checkout = CheckoutSession::default();
        checkout.ensure_working_objects(&CheckoutFactory::default());
        checkout.record_completion("checkout");

        checkout.ensure_working_objects(&CheckoutFactory::default());
        assert!(checkout.has_completed("checkout"));
    }

    #[test]
    fn test_persisted_order_is_replaced() {
        let mut checkout = CheckoutSession::default();
        checkout.ensure_working_objects(&CheckoutFactory::default());
        checkout.record_completion("checkout");
        if let Some(order) = checkout.order_mut() {
            order.id = Some(OrderId::new(12));
        }

        checkout.ensure_working_objects(&CheckoutFactory::default());
        assert_eq!(checkout.order().and_then(|o| o.id), None);
        assert!(!checkout.has_completed("checkout"));
    }

    #[test]
    fn test_factory_supplies_defaults() {
        let factory = CheckoutFactory {
            account: Account::default,
            order: || WorkingOrder {
                notes: Some("gift".to_owned()),
                ..WorkingOrder::default()
            },
        };
        let mut checkout = CheckoutSession::default();
        checkout.ensure_working_objects(&factory);
        assert_eq!(
            checkout.order().and_then(|o| o.notes.as_deref()),
            Some("gift")
        );
    }

    #[test]
    fn test_redirect_locations() {
        assert_eq!(CheckoutRedirect::Cart.location(), "/cart");
        assert_eq!(
            CheckoutRedirect::Step("checkout/first").location(),
            "/checkout/first"
        );
    }
}

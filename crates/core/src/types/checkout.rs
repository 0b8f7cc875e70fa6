//! Checkout progress tracking.
//!
//! A checkout is a sequence of pages ("steps"), each identified by its path
//! (`checkout`, `checkout/first`, ...). Completing a step records its id here;
//! later steps declare the ids they depend on and send the shopper back to the
//! first one missing.

use serde::{Deserialize, Serialize};

/// Steps completed in the current session, in completion order.
///
/// Recording is idempotent: a step id appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutProgress {
    steps: Vec<String>,
    /// Whether the shopper is checking out with an account.
    pub with_account: bool,
}

impl CheckoutProgress {
    /// Empty progress, checking out as a guest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `step` has been completed.
    #[must_use]
    pub fn has_completed(&self, step: &str) -> bool {
        self.steps.iter().any(|s| s == step)
    }

    /// Record `step` as completed.
    pub fn record_completion(&mut self, step: &str) {
        if !self.has_completed(step) {
            self.steps.push(step.to_owned());
        }
    }

    /// Forget every completed step and the account flag.
    pub fn reset(&mut self) {
        self.steps.clear();
        self.with_account = false;
    }

    /// First entry of `dependencies` that has not been completed.
    #[must_use]
    pub fn first_missing<'a>(&self, dependencies: &[&'a str]) -> Option<&'a str> {
        dependencies
            .iter()
            .copied()
            .find(|step| !self.has_completed(step))
    }

    /// Completed steps, oldest first.
    #[must_use]
    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    /// Whether nothing has been completed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_record_then_reset() {
        let mut progress = CheckoutProgress::new();
        progress.record_completion("checkout");
        assert!(progress.has_completed("checkout"));

        progress.reset();
        assert!(!progress.has_completed("checkout"));
        assert!(progress.is_empty());
    }

    #[test]
    fn test_reset_clears_account_flag() {
        let mut progress = CheckoutProgress::new();
        progress.with_account = true;
        progress.reset();
        assert!(!progress.with_account);
    }

    #[test]
    fn test_record_twice_keeps_single_entry() {
        let mut progress = CheckoutProgress::new();
        progress.record_completion("checkout/first");
        progress.record_completion("checkout/first");
        assert!(progress.has_completed("checkout/first"));
        assert_eq!(progress.steps().len(), 1);
    }

    #[test]
    fn test_first_missing_respects_declaration_order() {
        let mut progress = CheckoutProgress::new();
        progress.record_completion("checkout/first");

        let missing = progress.first_missing(&["checkout", "checkout/first", "checkout/extra"]);
        assert_eq!(missing, Some("checkout"));
    }

    #[test]
    fn test_first_missing_none_when_satisfied() {
        let mut progress = CheckoutProgress::new();
        progress.record_completion("checkout");
        assert_eq!(progress.first_missing(&["checkout"]), None);
        assert_eq!(progress.first_missing(&[]), None);
    }

    #[test]
    fn test_serde_shape() {
        let mut progress = CheckoutProgress::new();
        progress.record_completion("checkout");
        let json = serde_json::to_value(&progress).unwrap();
        assert_eq!(json["steps"][0], "checkout");
        assert_eq!(json["with_account"], false);
    }
}

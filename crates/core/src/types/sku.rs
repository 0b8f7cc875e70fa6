//! Stock keeping unit (SKU) handling.
//!
//! Shoppers type SKUs by hand on the quick order page, often copied from a
//! printed catalog where they appear as `#ABC123`. Two normalisation stages
//! exist:
//!
//! 1. [`Sku::parse`] trims whitespace and drops one leading `#`. The result is
//!    what the shopper "meant" and is compared against the canonical item SKU.
//! 2. [`Sku::lookup_key`] lower-cases that value and drops one more leading
//!    `#`, producing the key used for case-insensitive database matching.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Sku`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SkuError {
    /// Nothing left after trimming and stripping the `#` prefix.
    #[error("sku cannot be empty")]
    Empty,
    /// The input is longer than any SKU we store.
    #[error("sku must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// A normalised, user-entered SKU.
///
/// ## Examples
///
/// ```
/// use tidewater_core::Sku;
///
/// assert_eq!(Sku::parse("#ABC1").unwrap().as_str(), "ABC1");
/// assert_eq!(Sku::parse("  abc1  ").unwrap().as_str(), "abc1");
/// assert_eq!(Sku::parse("#").unwrap().as_str(), "#");
/// assert!(Sku::parse("   ").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Sku(String);

impl Sku {
    /// Maximum length of a SKU in characters.
    pub const MAX_LENGTH: usize = 64;

    /// Parse a `Sku` from raw form input.
    ///
    /// # Errors
    ///
    /// Returns [`SkuError::Empty`] if nothing remains after normalisation and
    /// [`SkuError::TooLong`] if the result exceeds [`Sku::MAX_LENGTH`].
    pub fn parse(raw: &str) -> Result<Self, SkuError> {
        let normalized = strip_hash_prefix(raw.trim());

        if normalized.is_empty() {
            return Err(SkuError::Empty);
        }

        if normalized.chars().count() > Self::MAX_LENGTH {
            return Err(SkuError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        Ok(Self(normalized.to_owned()))
    }

    /// Returns the SKU as entered, minus whitespace and `#` prefix.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key for case-insensitive matching against item and alias SKUs.
    #[must_use]
    pub fn lookup_key(&self) -> String {
        strip_hash_prefix(&self.0.to_lowercase()).to_owned()
    }

    /// Whether this SKU names `canonical` (ignoring case).
    #[must_use]
    pub fn matches(&self, canonical: &str) -> bool {
        self.0.to_lowercase() == canonical.to_lowercase()
    }
}

/// Drop a single leading `#` unless it is the whole string.
fn strip_hash_prefix(value: &str) -> &str {
    match value.strip_prefix('#') {
        Some(rest) if !rest.is_empty() => rest,
        _ => value,
    }
}

impl fmt::Display for Sku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Sku {
    type Err = SkuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Sku {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strips_hash_prefix() {
        assert_eq!(Sku::parse("#ABC1").unwrap().as_str(), "ABC1");
    }

    #[test]
    fn test_parse_keeps_lone_hash() {
        assert_eq!(Sku::parse("#").unwrap().as_str(), "#");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(Sku::parse("  abc1  ").unwrap().as_str(), "abc1");
        assert_eq!(Sku::parse("  #abc1").unwrap().as_str(), "abc1");
    }

    #[test]
    fn test_parse_only_strips_one_hash() {
        assert_eq!(Sku::parse("##A").unwrap().as_str(), "#A");
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Sku::parse(""), Err(SkuError::Empty));
        assert_eq!(Sku::parse("   "), Err(SkuError::Empty));
    }

    #[test]
    fn test_parse_too_long() {
        let long = "A".repeat(Sku::MAX_LENGTH + 1);
        assert!(matches!(Sku::parse(&long), Err(SkuError::TooLong { .. })));
    }

    #[test]
    fn test_lookup_key_lowercases() {
        assert_eq!(Sku::parse("ABC1").unwrap().lookup_key(), "abc1");
    }

    #[test]
    fn test_lookup_key_strips_second_hash() {
        assert_eq!(Sku::parse("##Ab").unwrap().lookup_key(), "ab");
        assert_eq!(Sku::parse("#").unwrap().lookup_key(), "#");
    }

    #[test]
    fn test_matches_is_case_insensitive() {
        let sku = Sku::parse("abc1").unwrap();
        assert!(sku.matches("ABC1"));
        assert!(!sku.matches("ABC2"));
    }
}

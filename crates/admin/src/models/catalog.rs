//! Catalog domain types.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use tidewater_core::CatalogId;

/// A catalog of products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Catalog {
    pub id: CatalogId,
    pub title: String,
    /// Whether the catalog is currently being sold.
    pub in_season: bool,
}

/// Validated fields for creating or updating a catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogInput {
    pub title: String,
    pub in_season: bool,
}

/// Per-field validation messages for the catalog form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogErrors {
    pub title: Option<&'static str>,
}

/// Message shown when the title is left blank.
pub const TITLE_REQUIRED: &str = "Title is required.";

/// Catalog form as submitted.
///
/// Browsers omit unchecked checkboxes, so a missing `in_season` means false.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub in_season: Option<String>,
}

impl CatalogForm {
    /// Form pre-filled from an existing catalog.
    #[must_use]
    pub fn from_catalog(catalog: &Catalog) -> Self {
        Self {
            title: catalog.title.clone(),
            in_season: catalog.in_season.then(|| "on".to_owned()),
        }
    }

    /// Whether the in-season box is ticked.
    #[must_use]
    pub fn in_season(&self) -> bool {
        self.in_season
            .as_deref()
            .is_some_and(|value| !value.is_empty() && value != "false")
    }

    /// Check the form and return the values to store.
    ///
    /// # Errors
    ///
    /// Returns the field messages when the title is blank.
    pub fn validate(&self) -> Result<CatalogInput, CatalogErrors> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(CatalogErrors {
                title: Some(TITLE_REQUIRED),
            });
        }

        Ok(CatalogInput {
            title: title.to_owned(),
            in_season: self.in_season(),
        })
    }
}

/// Message for an edit of a catalog id that does not exist.
#[must_use]
pub fn not_found_message(id: CatalogId) -> String {
    format!("Catalog with id “{id}” not found.")
}

/// Flash shown after a catalog is saved.
#[must_use]
pub fn saved_message(title: &str) -> String {
    format!("“{title}” has been saved.")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(title: &str, in_season: Option<&str>) -> CatalogForm {
        CatalogForm {
            title: title.to_owned(),
            in_season: in_season.map(str::to_owned),
        }
    }

    #[test]
    fn test_validate_trims_title() {
        let input = form("  Spring Tools ", Some("on")).validate().unwrap();
        assert_eq!(input.title, "Spring Tools");
        assert!(input.in_season);
    }

    #[test]
    fn test_validate_blank_title() {
        let errors = form("   ", None).validate().unwrap_err();
        assert_eq!(errors.title, Some(TITLE_REQUIRED));
    }

    #[test]
    fn test_missing_checkbox_is_off() {
        assert!(!form("Winter", None).validate().unwrap().in_season);
        assert!(!form("Winter", Some("false")).in_season());
    }

    #[test]
    fn test_from_catalog() {
        let catalog = Catalog {
            id: CatalogId::new(3),
            title: "Garden".to_owned(),
            in_season: true,
        };
        let form = CatalogForm::from_catalog(&catalog);
        assert_eq!(form.title, "Garden");
        assert!(form.in_season());
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            not_found_message(CatalogId::new(42)),
            "Catalog with id “42” not found."
        );
        assert_eq!(saved_message("Garden"), "“Garden” has been saved.");
    }
}

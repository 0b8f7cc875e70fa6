//! Custom Askama template filters.

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Renders a dash in place of a blank value.
///
/// Usage in templates: `{{ order.notes|or_dash }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn or_dash(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    let value = value.to_string();
    if value.trim().is_empty() {
        Ok("–".to_owned())
    } else {
        Ok(value)
    }
}

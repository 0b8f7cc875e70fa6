//! Quick order page and item selector API.
//!
//! The form has a fixed number of rows named `sku_{n}`, `quantity_{n}` and
//! `item_{n}`. The item selector fills `item_{n}` from
//! `GET /quick-order/items?sku=...` once the shopper has typed a SKU.

use std::collections::HashMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use tidewater_core::{ItemId, RegionId, Sku};

use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::StoreSession;
use crate::models::{CartOwner, ItemOption};
use crate::routes::cart::{EntryView, entry_views};
use crate::services::{
    CartService, ItemLookup, QuickOrderOutcome, QuickOrderResolver, QuickOrderRow,
};
use crate::state::AppState;

/// Quick order page template.
#[derive(Template, WebTemplate)]
#[template(path = "quick_order/show.html")]
pub struct QuickOrderTemplate {
    pub rows: Vec<QuickOrderRow>,
    pub summary: Option<(&'static str, &'static str)>,
    pub messages: Vec<String>,
    pub added_heading: Option<&'static str>,
    pub added: Vec<EntryView>,
    pub saved_message: Option<String>,
}

impl QuickOrderTemplate {
    fn blank(rows: usize) -> Self {
        Self {
            rows: (0..rows).map(QuickOrderRow::blank).collect(),
            summary: None,
            messages: Vec::new(),
            added_heading: None,
            added: Vec::new(),
            saved_message: None,
        }
    }

    fn from_outcome(outcome: &QuickOrderOutcome, state: &AppState) -> Self {
        Self {
            rows: outcome.rows.clone(),
            summary: outcome.summary_error(),
            messages: outcome.messages.iter().map(|m| m.text.clone()).collect(),
            added_heading: outcome.added_heading(),
            added: entry_views(&outcome.added, &state.config().store),
            saved_message: outcome.saved_message(),
        }
    }
}

/// Build rows from the submitted form fields.
///
/// Missing fields count as blank; an `item_{n}` that is not an id is ignored.
#[must_use]
pub fn parse_rows(fields: &[(String, String)], count: usize) -> Vec<QuickOrderRow> {
    let fields: HashMap<&str, &str> = fields
        .iter()
        .map(|(name, value)| (name.as_str(), value.as_str()))
        .collect();
    let field = |name: String| fields.get(name.as_str()).copied().unwrap_or_default();

    (0..count)
        .map(|n| {
            let hint = field(format!("item_{n}"))
                .trim()
                .parse::<i32>()
                .ok()
                .map(ItemId::new);
            QuickOrderRow::submitted(
                n,
                field(format!("sku_{n}")),
                field(format!("quantity_{n}")),
                hint,
            )
        })
        .collect()
}

/// Resolve submitted rows into the visitor's cart.
///
/// The cart is opened for the owner the session will have once active, and
/// the session is only activated when some row resolves to an item.
///
/// # Errors
///
/// Returns an error if the session store, a lookup or the cart fails.
pub async fn resolve_rows<F>(
    session: &StoreSession,
    lookup: &dyn ItemLookup,
    open_cart: F,
    region: RegionId,
    rows: Vec<QuickOrderRow>,
) -> Result<QuickOrderOutcome>
where
    F: FnOnce(CartOwner) -> Box<dyn CartService>,
{
    if !rows.iter().any(QuickOrderRow::has_sku) {
        return Ok(QuickOrderOutcome::without_items(rows));
    }

    let owner = session.prospective_owner().await?;
    let cart = open_cart(owner);
    let outcome = QuickOrderResolver::new(lookup, cart.as_ref(), region)
        .process(rows)
        .await?;

    if outcome.resolved_any() {
        session.activate_for(owner).await?;
    }
    Ok(outcome)
}

/// Display the empty quick order form.
pub async fn show(State(state): State<AppState>) -> impl IntoResponse {
    QuickOrderTemplate::blank(state.config().store.quick_order_rows)
}

/// Process a quick order submission.
#[instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    session: StoreSession,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<impl IntoResponse> {
    let rows = parse_rows(&fields, state.config().store.quick_order_rows);

    let outcome = resolve_rows(
        &session,
        state.lookup(),
        |owner| state.open_cart(owner),
        state.config().store.region,
        rows,
    )
    .await?;

    let added = outcome.added.len().to_string();
    let saved = outcome.saved.len().to_string();
    add_breadcrumb(
        "cart",
        "Quick order submitted",
        Some(&[("added", added.as_str()), ("saved", saved.as_str())]),
    );

    Ok(QuickOrderTemplate::from_outcome(&outcome, &state))
}

/// Query for the item selector.
#[derive(Debug, Deserialize)]
pub struct ItemsQuery {
    #[serde(default)]
    pub sku: String,
}

/// Items offered for a SKU, fewest parts first.
#[instrument(skip(state))]
pub async fn items(
    State(state): State<AppState>,
    Query(query): Query<ItemsQuery>,
) -> Result<Json<Vec<ItemOption>>> {
    let Ok(sku) = Sku::parse(&query.sku) else {
        return Ok(Json(Vec::new()));
    };

    let options = state
        .lookup()
        .item_options(&sku, state.config().store.region)
        .await?;
    Ok(Json(options))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_parse_rows() {
        let rows = parse_rows(
            &fields(&[
                ("sku_0", "ABC1"),
                ("quantity_0", "2"),
                ("item_0", "17"),
                ("sku_1", "#XYZ"),
                ("quantity_1", "1"),
                ("item_1", ""),
            ]),
            3,
        );

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].sku, "ABC1");
        assert_eq!(rows[0].quantity_text, "2");
        assert_eq!(rows[0].hint, Some(ItemId::new(17)));
        assert_eq!(rows[1].hint, None);
        assert_eq!(rows[2].sku, "");
        assert!(!rows[2].has_sku());
    }

    #[test]
    fn test_parse_rows_ignores_extra_rows() {
        let rows = parse_rows(&fields(&[("sku_5", "ABC1")]), 2);
        assert!(rows.iter().all(|row| row.sku.is_empty()));
    }

    #[test]
    fn test_blank_template_rows() {
        let template = QuickOrderTemplate::blank(4);
        assert_eq!(template.rows.len(), 4);
        assert!(template.rows.iter().all(|row| row.quantity_text == "1"));
    }
}

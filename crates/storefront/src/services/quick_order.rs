//! Quick order: add many items to the cart by SKU in one submission.
//!
//! Each row is resolved on its own and in submission order. A row that fails
//! keeps its values and carries a field error; the rest of the batch carries
//! on. Rows that were added are cleared so the form can be reused.

use std::num::{IntErrorKind, ParseIntError};

use tracing::instrument;

use tidewater_core::{EntrySource, ItemId, RegionId, Sku, SkuError};

use crate::db::RepositoryError;
use crate::models::{CartEntry, CartKind, CartMessage, NewCartEntry};
use crate::services::{CartService, ItemLookup, MAX_QUANTITY};

/// Default number of rows on the quick order form.
pub const DEFAULT_ROWS: usize = 10;

pub const QUANTITY_REQUIRED: &str = "Quantity is required.";
pub const QUANTITY_NOT_WHOLE: &str = "Quantity must be a whole number.";
pub const QUANTITY_TOO_SMALL: &str = "Quantity must be at least 1.";
pub const QUANTITY_TOO_LARGE: &str = "Quantity is too large.";

/// Error shown above the form when any row has a problem.
pub const SUMMARY_PRIMARY: &str = "There is a problem with one or more of the items you requested.";
pub const SUMMARY_SECONDARY: &str = "Please address the fields highlighted below and re-submit the form.";

/// Field error for a SKU that does not resolve to a visible item.
#[must_use]
pub fn not_found_message(sku: &str) -> String {
    format!("“{sku}” is not an available item.")
}

/// Parse the quantity field.
///
/// A blank quantity is only an error when the row has a SKU.
///
/// # Errors
///
/// Returns the field message for a blank, non-integer, non-positive or
/// oversized value.
pub fn parse_quantity(text: &str, has_sku: bool) -> Result<Option<u32>, &'static str> {
    let text = text.trim();
    if text.is_empty() {
        return if has_sku {
            Err(QUANTITY_REQUIRED)
        } else {
            Ok(None)
        };
    }

    let value: i64 = text.parse().map_err(|e: ParseIntError| match e.kind() {
        IntErrorKind::PosOverflow => QUANTITY_TOO_LARGE,
        IntErrorKind::NegOverflow => QUANTITY_TOO_SMALL,
        _ => QUANTITY_NOT_WHOLE,
    })?;
    if value < 1 {
        return Err(QUANTITY_TOO_SMALL);
    }
    u32::try_from(value)
        .ok()
        .filter(|quantity| *quantity <= MAX_QUANTITY)
        .map(Some)
        .ok_or(QUANTITY_TOO_LARGE)
}

/// What happened to a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowOutcome {
    /// No SKU entered.
    #[default]
    Empty,
    /// The quantity field has an error.
    Invalid,
    /// The SKU did not resolve.
    NotFound,
    /// Added to the checkout cart.
    Added,
    /// Added to the saved-for-later cart.
    Saved,
    /// Resolved, but no cart would take it.
    Refused,
}

/// One row of the quick order form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickOrderRow {
    /// Position on the form; field names are suffixed with it.
    pub id: usize,
    /// SKU as typed.
    pub sku: String,
    /// Quantity as typed.
    pub quantity_text: String,
    /// Item picked in the item selector, if the widget loaded.
    pub hint: Option<ItemId>,
    pub sku_error: Option<String>,
    pub quantity_error: Option<&'static str>,
    pub outcome: RowOutcome,
}

impl QuickOrderRow {
    /// An empty row with quantity 1.
    #[must_use]
    pub fn blank(id: usize) -> Self {
        Self {
            id,
            sku: String::new(),
            quantity_text: "1".to_owned(),
            hint: None,
            sku_error: None,
            quantity_error: None,
            outcome: RowOutcome::Empty,
        }
    }

    /// A row as submitted.
    #[must_use]
    pub fn submitted(
        id: usize,
        sku: impl Into<String>,
        quantity_text: impl Into<String>,
        hint: Option<ItemId>,
    ) -> Self {
        Self {
            sku: sku.into(),
            quantity_text: quantity_text.into(),
            hint,
            ..Self::blank(id)
        }
    }

    /// Whether the shopper typed a SKU into this row.
    #[must_use]
    pub fn has_sku(&self) -> bool {
        !matches!(Sku::parse(&self.sku), Err(SkuError::Empty))
    }

    #[must_use]
    pub const fn has_error(&self) -> bool {
        self.sku_error.is_some() || self.quantity_error.is_some()
    }

    /// Validate the fields that need no lookup.
    ///
    /// Returns the normalised SKU and quantity when the row should be
    /// resolved, recording errors and the outcome otherwise.
    fn check(&mut self) -> Option<(Sku, Option<u32>)> {
        let sku = match Sku::parse(&self.sku) {
            Ok(sku) => Some(sku),
            Err(SkuError::Empty) => None,
            Err(SkuError::TooLong { .. }) => {
                self.sku_error = Some(not_found_message(self.sku.trim()));
                self.outcome = RowOutcome::NotFound;
                None
            }
        };

        let quantity = match parse_quantity(&self.quantity_text, self.has_sku()) {
            Ok(quantity) => quantity,
            Err(message) => {
                self.quantity_error = Some(message);
                if self.outcome == RowOutcome::Empty {
                    self.outcome = RowOutcome::Invalid;
                }
                None
            }
        };

        sku.map(|sku| (sku, quantity))
    }

    fn clear(&mut self) {
        self.sku.clear();
        self.quantity_text = "1".to_owned();
        self.hint = None;
    }
}

/// Result of processing a quick order submission.
#[derive(Debug, Clone, Default)]
pub struct QuickOrderOutcome {
    pub rows: Vec<QuickOrderRow>,
    /// Checkout cart entries touched by this submission, in submission order.
    pub added: Vec<CartEntry>,
    /// Saved-for-later entries touched by this submission.
    pub saved: Vec<CartEntry>,
    /// Notices from the cart, e.g. merged quantities.
    pub messages: Vec<CartMessage>,
}

impl QuickOrderOutcome {
    /// Validate rows without touching the cart, for submissions with no SKUs.
    #[must_use]
    pub fn without_items(mut rows: Vec<QuickOrderRow>) -> Self {
        for row in &mut rows {
            row.check();
        }
        Self {
            rows,
            ..Self::default()
        }
    }

    /// Whether any row resolved to an item, added or not.
    #[must_use]
    pub fn resolved_any(&self) -> bool {
        self.rows.iter().any(|row| {
            matches!(
                row.outcome,
                RowOutcome::Added | RowOutcome::Saved | RowOutcome::Refused
            )
        })
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.rows.iter().any(QuickOrderRow::has_error)
    }

    /// Summary error (primary, secondary) when any row has a problem.
    #[must_use]
    pub fn summary_error(&self) -> Option<(&'static str, &'static str)> {
        self.has_errors()
            .then_some((SUMMARY_PRIMARY, SUMMARY_SECONDARY))
    }

    /// Heading for the added-items summary.
    #[must_use]
    pub fn added_heading(&self) -> Option<&'static str> {
        match self.added.len() {
            0 => None,
            1 => Some("The following item was added to your cart:"),
            _ => Some("The following items were added to your cart:"),
        }
    }

    /// e.g. "Two items have been saved for later."
    #[must_use]
    pub fn saved_message(&self) -> Option<String> {
        match self.saved.len() {
            0 => None,
            1 => Some("One item has been saved for later.".to_owned()),
            n => Some(format!("{} items have been saved for later.", number_word(n))),
        }
    }
}

fn push_touched(entries: &mut Vec<CartEntry>, entry: CartEntry) {
    match entries.iter_mut().find(|existing| existing.id == entry.id) {
        Some(existing) => *existing = entry,
        None => entries.push(entry),
    }
}

/// Capitalised English words for `n` below 100, digits otherwise.
fn number_word(n: usize) -> String {
    const ONES: [&str; 20] = [
        "Zero", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten",
        "Eleven", "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen", "Eighteen",
        "Nineteen",
    ];
    const TENS: [&str; 10] = [
        "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
    ];

    if let Some(word) = ONES.get(n) {
        return (*word).to_owned();
    }
    match (TENS.get(n / 10), n % 10) {
        (Some(tens), 0) => (*tens).to_owned(),
        (Some(tens), ones) => ONES
            .get(ones)
            .map_or_else(|| n.to_string(), |ones| format!("{tens}-{}", ones.to_lowercase())),
        (None, _) => n.to_string(),
    }
}

/// Resolves quick order rows into cart entries.
pub struct QuickOrderResolver<'a> {
    lookup: &'a dyn ItemLookup,
    cart: &'a dyn CartService,
    region: RegionId,
}

impl<'a> QuickOrderResolver<'a> {
    #[must_use]
    pub const fn new(lookup: &'a dyn ItemLookup, cart: &'a dyn CartService, region: RegionId) -> Self {
        Self {
            lookup,
            cart,
            region,
        }
    }

    /// Process a submission.
    ///
    /// # Errors
    ///
    /// Returns an error if a lookup or cart operation fails; row-level
    /// problems are reported on the rows instead.
    #[instrument(skip_all, fields(rows = rows.len(), region = %self.region))]
    pub async fn process(
        &self,
        rows: Vec<QuickOrderRow>,
    ) -> Result<QuickOrderOutcome, RepositoryError> {
        let mut outcome = QuickOrderOutcome::default();

        for mut row in rows {
            if let Some((kind, entry)) = self.process_row(&mut row).await? {
                match kind {
                    CartKind::Checkout => push_touched(&mut outcome.added, entry),
                    CartKind::Saved => push_touched(&mut outcome.saved, entry),
                }
            }
            outcome.rows.push(row);
        }

        outcome.messages = self.cart.take_messages();
        tracing::info!(
            added = outcome.added.len(),
            saved = outcome.saved.len(),
            errors = outcome.has_errors(),
            "Quick order processed"
        );
        Ok(outcome)
    }

    async fn process_row(
        &self,
        row: &mut QuickOrderRow,
    ) -> Result<Option<(CartKind, CartEntry)>, RepositoryError> {
        let Some((sku, quantity)) = row.check() else {
            return Ok(None);
        };

        let Some(item_id) = self.resolve(&sku, row.hint).await? else {
            row.sku_error = Some(not_found_message(row.sku.trim()));
            row.outcome = RowOutcome::NotFound;
            return Ok(None);
        };

        let Some(quantity) = quantity.filter(|_| !row.has_error()) else {
            row.outcome = RowOutcome::Invalid;
            return Ok(None);
        };

        let Some(item) = self.lookup.load_item(item_id, self.region).await? else {
            row.sku_error = Some(not_found_message(row.sku.trim()));
            row.outcome = RowOutcome::NotFound;
            return Ok(None);
        };

        let alias = if sku.matches(&item.sku) {
            None
        } else {
            self.lookup.find_alias(item.id, sku.as_str()).await?
        };

        let entry = NewCartEntry {
            item,
            quantity,
            alias,
            source: EntrySource::QuickOrder,
        };

        let added = self.add(entry).await?;
        row.outcome = match &added {
            Some((CartKind::Checkout, _)) => RowOutcome::Added,
            Some((CartKind::Saved, _)) => RowOutcome::Saved,
            None => RowOutcome::Refused,
        };
        if added.is_some() {
            row.clear();
        }
        Ok(added)
    }

    /// Item id for `sku`, preferring the selector's pick when it is one of
    /// the offered items.
    async fn resolve(
        &self,
        sku: &Sku,
        hint: Option<ItemId>,
    ) -> Result<Option<ItemId>, RepositoryError> {
        if let Some(hint) = hint {
            let options = self.lookup.item_options(sku, self.region).await?;
            if options.iter().any(|option| option.id == hint) {
                return Ok(Some(hint));
            }
        }

        self.lookup.find_item_id(&sku.lookup_key(), self.region).await
    }

    /// Add to the checkout cart, or to the saved cart when the item cannot be
    /// bought now or the checkout cart refuses it.
    async fn add(
        &self,
        entry: NewCartEntry,
    ) -> Result<Option<(CartKind, CartEntry)>, RepositoryError> {
        if entry.item.has_available_status() {
            if let Some(added) = self.cart.add_entry(CartKind::Checkout, entry.clone()).await? {
                return Ok(Some((CartKind::Checkout, added)));
            }
            tracing::debug!(sku = %entry.item.sku, "Checkout cart refused entry");
        }

        if self.cart.has_saved_cart()
            && let Some(saved) = self.cart.add_entry(CartKind::Saved, entry).await?
        {
            return Ok(Some((CartKind::Saved, saved)));
        }

        Ok(None)
    }
}

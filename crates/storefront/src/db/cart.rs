//! `PostgreSQL` cart.
//!
//! A [`PgCart`] is opened per request for one [`CartOwner`]. Entries owned by
//! an anonymous session carry its cart token; entries owned by a customer
//! carry the account id. Logging in moves the former onto the latter with
//! [`claim_session_entries`].

use std::str::FromStr;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tracing::instrument;
use uuid::Uuid;

use tidewater_core::{AccountId, CartEntryId, EntrySource, ItemAliasId, RegionId};

use super::RepositoryError;
use super::items::{CART_ITEM_COLUMNS, CartItemRow};
use crate::models::{CartEntry, CartItem, CartKind, CartMessage, CartOwner, ItemAlias, NewCartEntry};
use crate::services::cart::{CartService, merged_message, merged_quantity};

#[derive(Debug, FromRow)]
struct CartEntryRow {
    entry_id: CartEntryId,
    quantity: i32,
    source: String,
    alias_id: Option<ItemAliasId>,
    alias_sku: Option<String>,
    #[sqlx(flatten)]
    item: CartItemRow,
}

impl TryFrom<CartEntryRow> for CartEntry {
    type Error = RepositoryError;

    fn try_from(row: CartEntryRow) -> Result<Self, Self::Error> {
        let quantity = u32::try_from(row.quantity).map_err(|_| {
            RepositoryError::DataCorruption(format!("invalid cart quantity {}", row.quantity))
        })?;
        let source = EntrySource::from_str(&row.source).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid entry source in database: {e}"))
        })?;
        let item = CartItem::try_from(row.item)?;
        let alias = match (row.alias_id, row.alias_sku) {
            (Some(id), Some(sku)) => Some(ItemAlias {
                id,
                item: item.id,
                sku,
            }),
            _ => None,
        };

        Ok(Self {
            id: row.entry_id,
            item,
            quantity,
            alias,
            source,
        })
    }
}

fn owner_columns(owner: CartOwner) -> (Option<AccountId>, Option<Uuid>) {
    match owner {
        CartOwner::Account(id) => (Some(id), None),
        CartOwner::Session(token) => (None, Some(token)),
    }
}

fn to_db_quantity(quantity: u32) -> Option<i32> {
    i32::try_from(quantity).ok()
}

/// Cart of one owner, backed by `PostgreSQL`.
pub struct PgCart {
    pool: PgPool,
    owner: CartOwner,
    region: RegionId,
    max_entries: usize,
    messages: Mutex<Vec<CartMessage>>,
}

impl PgCart {
    #[must_use]
    pub const fn new(pool: PgPool, owner: CartOwner, region: RegionId, max_entries: usize) -> Self {
        Self {
            pool,
            owner,
            region,
            max_entries,
            messages: Mutex::new(Vec::new()),
        }
    }

    fn push_message(&self, message: CartMessage) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message);
    }
}

#[async_trait]
impl CartService for PgCart {
    async fn available_entries(&self) -> Result<Vec<CartEntry>, RepositoryError> {
        let mut entries = self.entries(CartKind::Checkout).await?;
        entries.retain(|entry| entry.item.has_available_status());
        Ok(entries)
    }

    #[instrument(skip(self, entry), fields(kind = kind.as_str(), item = %entry.item.id))]
    async fn add_entry(
        &self,
        kind: CartKind,
        entry: NewCartEntry,
    ) -> Result<Option<CartEntry>, RepositoryError> {
        let (account, token) = owner_columns(self.owner);
        let alias_id = entry.alias.as_ref().map(|alias| alias.id);
        let Some(quantity) = to_db_quantity(entry.quantity) else {
            tracing::info!(quantity = entry.quantity, "Quantity too large, entry refused");
            return Ok(None);
        };

        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_as::<_, (CartEntryId, i32)>(
            r"
            SELECT id, quantity FROM cart_entry
            WHERE account IS NOT DISTINCT FROM $1
              AND session_token IS NOT DISTINCT FROM $2
              AND kind = $3
              AND item = $4
              AND alias IS NOT DISTINCT FROM $5
            FOR UPDATE
            ",
        )
        .bind(account)
        .bind(token)
        .bind(kind.as_str())
        .bind(entry.item.id)
        .bind(alias_id)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some((id, current)) = existing {
            let current = u32::try_from(current).map_err(|_| {
                RepositoryError::DataCorruption(format!("invalid cart quantity {current}"))
            })?;
            let Some((total, db_total)) = merged_quantity(current, entry.quantity)
                .and_then(|total| to_db_quantity(total).map(|db_total| (total, db_total)))
            else {
                tracing::info!(
                    current,
                    added = entry.quantity,
                    "Merged quantity too large, entry refused"
                );
                return Ok(None);
            };

            sqlx::query("UPDATE cart_entry SET quantity = $2 WHERE id = $1")
                .bind(id)
                .bind(db_total)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;

            let mut stored = CartEntry::from_new(id, entry);
            stored.quantity = total;
            self.push_message(merged_message(&stored));
            return Ok(Some(stored));
        }

        let count: i64 = sqlx::query_scalar(
            r"
            SELECT count(*) FROM cart_entry
            WHERE account IS NOT DISTINCT FROM $1
              AND session_token IS NOT DISTINCT FROM $2
              AND kind = $3
            ",
        )
        .bind(account)
        .bind(token)
        .bind(kind.as_str())
        .fetch_one(&mut *tx)
        .await?;

        if usize::try_from(count).unwrap_or(usize::MAX) >= self.max_entries {
            tracing::info!(count, "Cart is full, entry refused");
            return Ok(None);
        }

        let id = sqlx::query_scalar::<_, CartEntryId>(
            r"
            INSERT INTO cart_entry (account, session_token, kind, item, alias, quantity, source)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            ",
        )
        .bind(account)
        .bind(token)
        .bind(kind.as_str())
        .bind(entry.item.id)
        .bind(alias_id)
        .bind(quantity)
        .bind(entry.source.as_str())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(CartEntry::from_new(id, entry)))
    }

    #[instrument(skip(self), fields(kind = kind.as_str()))]
    async fn entries(&self, kind: CartKind) -> Result<Vec<CartEntry>, RepositoryError> {
        let (account, token) = owner_columns(self.owner);
        let sql = format!(
            r"
            SELECT ce.id AS entry_id, ce.quantity, ce.source,
                   a.id AS alias_id, a.sku AS alias_sku,
                   {CART_ITEM_COLUMNS}
            FROM cart_entry ce
            INNER JOIN item i ON i.id = ce.item
            INNER JOIN product p ON p.id = i.product
            INNER JOIN item_region ir ON ir.item = i.id AND ir.region = $4
            INNER JOIN region r ON r.id = ir.region
            LEFT JOIN item_alias a ON a.id = ce.alias
            WHERE ce.account IS NOT DISTINCT FROM $1
              AND ce.session_token IS NOT DISTINCT FROM $2
              AND ce.kind = $3
            ORDER BY ce.id ASC
            "
        );

        let rows = sqlx::query_as::<_, CartEntryRow>(&sql)
            .bind(account)
            .bind(token)
            .bind(kind.as_str())
            .bind(self.region)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(CartEntry::try_from).collect()
    }

    #[instrument(skip(self), fields(kind = kind.as_str()))]
    async fn clear(&self, kind: CartKind) -> Result<(), RepositoryError> {
        let (account, token) = owner_columns(self.owner);
        sqlx::query(
            r"
            DELETE FROM cart_entry
            WHERE account IS NOT DISTINCT FROM $1
              AND session_token IS NOT DISTINCT FROM $2
              AND kind = $3
            ",
        )
        .bind(account)
        .bind(token)
        .bind(kind.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    fn has_saved_cart(&self) -> bool {
        true
    }

    fn take_messages(&self) -> Vec<CartMessage> {
        std::mem::take(&mut *self.messages.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

/// Move an anonymous session's entries onto an account.
///
/// Entries for an item the account already holds are merged by adding
/// quantities, capped at [`MAX_QUANTITY`](crate::services::MAX_QUANTITY).
/// Returns the number of entries moved or merged.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if any statement fails.
#[instrument(skip(pool))]
pub async fn claim_session_entries(
    pool: &PgPool,
    token: Uuid,
    account: AccountId,
) -> Result<u64, RepositoryError> {
    let mut tx = pool.begin().await?;

    let merged = sqlx::query(
        r"
        UPDATE cart_entry a
        SET quantity = LEAST(a.quantity::bigint + s.quantity, 2147483647)::integer
        FROM cart_entry s
        WHERE a.account = $1
          AND s.session_token = $2
          AND a.kind = s.kind
          AND a.item = s.item
          AND a.alias IS NOT DISTINCT FROM s.alias
        ",
    )
    .bind(account)
    .bind(token)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    sqlx::query(
        r"
        DELETE FROM cart_entry s
        USING cart_entry a
        WHERE s.session_token = $2
          AND a.account = $1
          AND a.kind = s.kind
          AND a.item = s.item
          AND a.alias IS NOT DISTINCT FROM s.alias
        ",
    )
    .bind(account)
    .bind(token)
    .execute(&mut *tx)
    .await?;

    let moved = sqlx::query(
        "UPDATE cart_entry SET account = $1, session_token = NULL WHERE session_token = $2",
    )
    .bind(account)
    .bind(token)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    tx.commit().await?;

    tracing::debug!(merged, moved, "Claimed session cart");
    Ok(merged + moved)
}

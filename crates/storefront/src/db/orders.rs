//! `PostgreSQL` order placement.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use tidewater_core::{CurrencyCode, OrderId};

use super::RepositoryError;
use crate::models::{Account, CartEntry, WorkingOrder};
use crate::services::OrderService;

/// Writes orders and their lines in one transaction.
///
/// The cart entries an order is built from are deleted in the same
/// transaction, so a placed order never leaves them behind.
#[derive(Clone)]
pub struct PgOrderService {
    pool: PgPool,
}

impl PgOrderService {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderService for PgOrderService {
    #[instrument(skip_all, fields(entries = entries.len()))]
    async fn place_order(
        &self,
        order: &WorkingOrder,
        account: &Account,
        entries: &[CartEntry],
    ) -> Result<OrderId, RepositoryError> {
        if entries.is_empty() && !order.is_from_invoice() {
            return Err(RepositoryError::Conflict("order has no entries".to_owned()));
        }

        let currency = entries
            .first()
            .map_or(CurrencyCode::default(), |entry| {
                entry.item.price.currency_code
            });
        let total: Decimal = entries.iter().map(|entry| entry.extension().amount).sum();

        let mut tx = self.pool.begin().await?;

        let id = sqlx::query_scalar::<_, OrderId>(
            r"
            INSERT INTO orders (account, invoice, email, fullname, notes, total, currency_code)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            ",
        )
        .bind(account.id)
        .bind(order.invoice)
        .bind(order.email.as_deref().or(account.email.as_deref()))
        .bind(order.fullname.as_deref().or(account.fullname.as_deref()))
        .bind(order.notes.as_deref())
        .bind(total)
        .bind(currency.as_str())
        .fetch_one(&mut *tx)
        .await?;

        for entry in entries {
            let quantity = i32::try_from(entry.quantity).map_err(|_| {
                RepositoryError::Conflict(format!("quantity {} is too large", entry.quantity))
            })?;

            sqlx::query(
                r"
                INSERT INTO order_item
                    (orders, item, sku, alias_sku, description, quantity, price, extension, source)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                ",
            )
            .bind(id)
            .bind(entry.item.id)
            .bind(&entry.item.sku)
            .bind(entry.alias.as_ref().map(|alias| alias.sku.as_str()))
            .bind(entry.description())
            .bind(quantity)
            .bind(entry.calculated_item_price().amount)
            .bind(entry.extension().amount)
            .bind(entry.source.as_str())
            .execute(&mut *tx)
            .await?;
        }

        let entry_ids: Vec<i32> = entries.iter().map(|entry| entry.id.as_i32()).collect();
        sqlx::query("DELETE FROM cart_entry WHERE id = ANY($1)")
            .bind(&entry_ids)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(id)
    }
}

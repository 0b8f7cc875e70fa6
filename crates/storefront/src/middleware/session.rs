//! Session middleware configuration and the store's view of the session.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions and wraps the raw
//! [`Session`] in [`StoreSession`], which knows the keys the store uses for
//! cart ownership and checkout state.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use sqlx::PgPool;
use tower_sessions::{Expiry, Session, SessionManagerLayer, session};
use tower_sessions_sqlx_store::PostgresStore;
use uuid::Uuid;

use tidewater_core::OrderId;

use crate::config::StorefrontConfig;
use crate::models::{CartOwner, CheckoutSession, CurrentCustomer, session_keys};

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "tidewater_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer with `PostgreSQL` store.
///
/// # Arguments
///
/// * `pool` - `PostgreSQL` connection pool
/// * `config` - Storefront configuration (for cookie security)
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &StorefrontConfig,
) -> SessionManagerLayer<PostgresStore> {
    // Note: The sessions table must be created via migration
    let store = PostgresStore::new(pool.clone());

    let is_secure = config.is_secure();

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// The visitor's session as seen by the store.
///
/// A session is *active* once it carries a cart token or a logged-in
/// customer. Browsing never activates it; adding to the cart or entering
/// checkout does.
#[derive(Debug, Clone)]
pub struct StoreSession(Session);

impl StoreSession {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self(session)
    }

    /// The underlying tower-sessions handle.
    #[must_use]
    pub const fn inner(&self) -> &Session {
        &self.0
    }

    /// The logged-in customer, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read.
    pub async fn current_customer(&self) -> Result<Option<CurrentCustomer>, session::Error> {
        self.0.get(session_keys::CURRENT_CUSTOMER).await
    }

    /// Whether the visitor is logged in.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read.
    pub async fn is_logged_in(&self) -> Result<bool, session::Error> {
        Ok(self.current_customer().await?.is_some())
    }

    async fn cart_token(&self) -> Result<Option<Uuid>, session::Error> {
        self.0.get(session_keys::CART_TOKEN).await
    }

    /// Whether the session has been activated or belongs to a customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read.
    pub async fn is_active(&self) -> Result<bool, session::Error> {
        Ok(self.cart_token().await?.is_some() || self.is_logged_in().await?)
    }

    /// Activate the session, issuing a cart token on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read or written.
    pub async fn activate(&self) -> Result<Uuid, session::Error> {
        self.activate_with(Uuid::new_v4()).await
    }

    /// Activate the session with `token` unless it already holds one.
    ///
    /// Returns the token in effect.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read or written.
    pub async fn activate_with(&self, token: Uuid) -> Result<Uuid, session::Error> {
        if let Some(existing) = self.cart_token().await? {
            return Ok(existing);
        }

        self.0.insert(session_keys::CART_TOKEN, token).await?;
        tracing::debug!(%token, "Session activated");
        Ok(token)
    }

    /// Owner of this visitor's cart, without activating the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read.
    pub async fn cart_owner(&self) -> Result<Option<CartOwner>, session::Error> {
        if let Some(customer) = self.current_customer().await? {
            return Ok(Some(CartOwner::Account(customer.id)));
        }
        Ok(self.cart_token().await?.map(CartOwner::Session))
    }

    /// Owner the cart has once the session is active, without writing the
    /// session.
    ///
    /// An inactive anonymous session gets a fresh token that only sticks if
    /// passed to [`activate_for`](Self::activate_for).
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read.
    pub async fn prospective_owner(&self) -> Result<CartOwner, session::Error> {
        if let Some(owner) = self.cart_owner().await? {
            return Ok(owner);
        }
        Ok(CartOwner::Session(Uuid::new_v4()))
    }

    /// Activate the session so that it owns `owner`'s cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read or written.
    pub async fn activate_for(&self, owner: CartOwner) -> Result<(), session::Error> {
        match owner {
            CartOwner::Session(token) => self.activate_with(token).await?,
            CartOwner::Account(_) => self.activate().await?,
        };
        Ok(())
    }

    /// Anonymous cart token, if one was issued.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read.
    pub async fn anonymous_token(&self) -> Result<Option<Uuid>, session::Error> {
        self.cart_token().await
    }

    /// Checkout state, empty if checkout never started.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read.
    pub async fn checkout(&self) -> Result<CheckoutSession, session::Error> {
        Ok(self
            .0
            .get::<CheckoutSession>(session_keys::CHECKOUT)
            .await?
            .unwrap_or_default())
    }

    /// Write checkout state back to the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be written.
    pub async fn save_checkout(&self, checkout: &CheckoutSession) -> Result<(), session::Error> {
        self.0.insert(session_keys::CHECKOUT, checkout).await
    }

    /// Id of the order placed most recently in this session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read.
    pub async fn last_order(&self) -> Result<Option<OrderId>, session::Error> {
        self.0.get(session_keys::LAST_ORDER_ID).await
    }

    /// Remember the order just placed for the thank-you page.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be written.
    pub async fn set_last_order(&self, id: OrderId) -> Result<(), session::Error> {
        self.0.insert(session_keys::LAST_ORDER_ID, id).await
    }
}

impl<S> FromRequestParts<S> for StoreSession
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Session::from_request_parts(parts, state).await.map(Self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;
    use tidewater_core::AccountId;

    /// A fresh session backed by an in-memory store.
    pub fn memory_session() -> StoreSession {
        StoreSession::new(Session::new(None, Arc::new(MemoryStore::default()), None))
    }

    #[tokio::test]
    async fn test_new_session_is_inactive() {
        let session = memory_session();
        assert!(!session.is_active().await.unwrap());
        assert_eq!(session.cart_owner().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_activate_issues_stable_token() {
        let session = memory_session();
        let first = session.activate().await.unwrap();
        let second = session.activate().await.unwrap();
        assert_eq!(first, second);
        assert!(session.is_active().await.unwrap());
        assert_eq!(
            session.cart_owner().await.unwrap(),
            Some(CartOwner::Session(first))
        );
    }

    #[tokio::test]
    async fn test_customer_owns_cart() {
        let session = memory_session();
        session
            .inner()
            .insert(
                session_keys::CURRENT_CUSTOMER,
                CurrentCustomer {
                    id: AccountId::new(5),
                    email: "shopper@example.com".to_owned(),
                    fullname: None,
                },
            )
            .await
            .unwrap();

        assert!(session.is_active().await.unwrap());
        assert_eq!(
            session.prospective_owner().await.unwrap(),
            CartOwner::Account(AccountId::new(5))
        );
    }

    #[tokio::test]
    async fn test_prospective_owner_does_not_activate() {
        let session = memory_session();
        let owner = session.prospective_owner().await.unwrap();
        assert!(!session.is_active().await.unwrap());

        session.activate_for(owner).await.unwrap();
        assert!(session.is_active().await.unwrap());
        assert_eq!(session.cart_owner().await.unwrap(), Some(owner));
    }

    #[tokio::test]
    async fn test_activate_for_keeps_existing_token() {
        let session = memory_session();
        let token = session.activate().await.unwrap();

        session
            .activate_for(CartOwner::Session(Uuid::new_v4()))
            .await
            .unwrap();
        assert_eq!(
            session.cart_owner().await.unwrap(),
            Some(CartOwner::Session(token))
        );
    }

    #[tokio::test]
    async fn test_checkout_round_trip() {
        let session = memory_session();
        let mut checkout = session.checkout().await.unwrap();
        assert!(!checkout.is_active());

        checkout.record_completion("checkout");
        session.save_checkout(&checkout).await.unwrap();
        assert!(session.checkout().await.unwrap().has_completed("checkout"));
    }
}

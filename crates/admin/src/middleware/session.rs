//! Session middleware configuration for admin.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions with
//! stricter settings than the storefront (SameSite=Strict, 24hr expiry).
//! The admin session only carries flash notices.

use sqlx::PgPool;
use tower_sessions::{Expiry, Session, SessionManagerLayer, session};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::AdminConfig;
use crate::models::session_keys;

/// Session cookie name for admin.
pub const SESSION_COOKIE_NAME: &str = "tidewater_admin_session";

/// Session expiry time in seconds (24 hours).
const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

/// Create the session layer with `PostgreSQL` store.
///
/// # Panics
///
/// Panics if the schema name or table name is invalid (should never happen
/// with hardcoded "admin" and "session" values).
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &AdminConfig,
) -> SessionManagerLayer<PostgresStore> {
    let store = PostgresStore::new(pool.clone())
        .with_schema_name("admin")
        .expect("valid schema name")
        .with_table_name("session")
        .expect("valid table name");

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
}

/// Store a notice for the next page that shows flashes.
///
/// # Errors
///
/// Returns an error if the session store cannot be written.
pub async fn set_flash(session: &Session, message: &str) -> Result<(), session::Error> {
    session.insert(session_keys::FLASH, message).await
}

/// Remove and return the pending notice.
///
/// # Errors
///
/// Returns an error if the session store cannot be accessed.
pub async fn take_flash(session: &Session) -> Result<Option<String>, session::Error> {
    session.remove(session_keys::FLASH).await
}

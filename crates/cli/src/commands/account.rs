//! Customer account commands.

use thiserror::Error;

use tidewater_core::AccountId;
use tidewater_storefront::services::{AuthError, AuthService};

use super::{CommandError, connect};

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error(transparent)]
    Connect(#[from] CommandError),

    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Create a customer account.
///
/// # Errors
///
/// Returns an error if the email is malformed, the password is too weak, or
/// the account cannot be stored.
pub async fn create(
    email: &str,
    name: Option<&str>,
    password: &str,
) -> Result<AccountId, AccountError> {
    if !email.contains('@') || !email.contains('.') {
        return Err(AccountError::InvalidEmail(email.to_owned()));
    }

    let pool = connect().await?;
    let customer = AuthService::new(&pool)
        .register_with_password(email, name, password)
        .await?;

    Ok(customer.id)
}

//! Customer login and logout.
//!
//! Logging in moves the anonymous cart onto the account. Both directions drop
//! the checkout account object so the next checkout page starts over.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use crate::db::cart::claim_session_entries;
use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{StoreSession, clear_current_customer, set_current_customer};
use crate::services::{AuthError, AuthService};
use crate::state::AppState;

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    /// Local path to return to after logging in.
    pub next: Option<String>,
}

/// Query parameters for the login page.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub error: Option<String>,
    pub next: Option<String>,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/login.html")]
pub struct LoginTemplate {
    pub error: Option<&'static str>,
    pub next: String,
}

/// Only same-site paths are followed after login.
fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path,
        _ => "/cart",
    }
}

/// Login page URL after wrong credentials, keeping `next` intact.
fn failed_login_location(next: &str) -> String {
    format!(
        "/account/login?error=credentials&next={}",
        urlencoding::encode(next)
    )
}

/// Display the login page.
pub async fn login_page(Query(query): Query<LoginQuery>) -> impl IntoResponse {
    LoginTemplate {
        error: query
            .error
            .is_some()
            .then_some("The email address or password you entered is incorrect."),
        next: safe_next(query.next.as_deref()).to_owned(),
    }
}

/// Handle login form submission.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: StoreSession,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let next = safe_next(form.next.as_deref()).to_owned();

    let customer = match AuthService::new(state.pool())
        .login_with_password(&form.email, &form.password)
        .await
    {
        Ok(customer) => customer,
        Err(AuthError::InvalidCredentials) => {
            tracing::info!("Login failed");
            return Ok(Redirect::to(&failed_login_location(&next)).into_response());
        }
        Err(e) => return Err(e.into()),
    };

    let anonymous = session.anonymous_token().await?;
    set_current_customer(session.inner(), &customer).await?;

    if let Some(token) = anonymous {
        claim_session_entries(state.pool(), token, customer.id).await?;
    }

    let mut checkout = session.checkout().await?;
    checkout.forget_account();
    session.save_checkout(&checkout).await?;

    set_sentry_user(&customer.id, Some(&customer.email));
    tracing::info!(account_id = %customer.id, "Customer logged in");

    Ok(Redirect::to(&next).into_response())
}

/// Handle logout.
#[instrument(skip_all)]
pub async fn logout(session: StoreSession) -> Result<Response> {
    clear_current_customer(session.inner()).await?;

    let mut checkout = session.checkout().await?;
    checkout.forget_account();
    session.save_checkout(&checkout).await?;

    clear_sentry_user();
    Ok(Redirect::to("/cart").into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_next() {
        assert_eq!(safe_next(Some("/checkout")), "/checkout");
        assert_eq!(safe_next(Some("//evil.example.com")), "/cart");
        assert_eq!(safe_next(Some("https://evil.example.com")), "/cart");
        assert_eq!(safe_next(None), "/cart");
    }

    #[test]
    fn test_failed_login_location_encodes_next() {
        let location = failed_login_location("/quick-order?sku=A&qty=2");
        assert_eq!(
            location,
            "/account/login?error=credentials&next=%2Fquick-order%3Fsku%3DA%26qty%3D2"
        );

        let (_, encoded) = location.split_once("&next=").unwrap();
        assert_eq!(
            urlencoding::decode(encoded).unwrap(),
            "/quick-order?sku=A&qty=2"
        );
    }
}

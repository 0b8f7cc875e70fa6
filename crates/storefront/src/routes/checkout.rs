//! Checkout pages.
//!
//! Each gated page runs the checkout gate first and redirects when it says
//! so. POST handlers complete their step and move on to the next page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use tidewater_core::OrderId;

use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{OptionalAuth, StoreSession};
use crate::models::{CheckoutSession, CheckoutStep};
use crate::routes::cart::{EntryView, entry_views, subtotal};
use crate::services::checkout::{self, ContactDetails, ContactErrors, Entry};
use crate::services::CartService;
use crate::state::AppState;

/// A page that passed the gate.
struct Gated {
    checkout: CheckoutSession,
    cart: Box<dyn CartService>,
}

/// Run the gate for `step`, turning a gate redirect into a response.
async fn gate(
    state: &AppState,
    session: &StoreSession,
    step: CheckoutStep,
) -> Result<std::result::Result<Gated, Response>> {
    let entry = checkout::enter(
        session,
        |owner| state.open_cart(owner),
        state.checkout_factory(),
        step,
    )
    .await?;

    Ok(match entry {
        Entry::Proceed { checkout, cart } => Ok(Gated { checkout, cart }),
        Entry::Redirect(redirect) => Err(Redirect::to(&redirect.location()).into_response()),
    })
}

/// Checkout front page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/front.html")]
pub struct FrontTemplate {
    pub with_account: bool,
}

/// Contact details page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/first.html")]
pub struct FirstTemplate {
    pub email: String,
    pub fullname: String,
    pub notes: String,
    pub errors: ContactErrors,
}

/// Order review page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/confirmation.html")]
pub struct ConfirmationTemplate {
    pub entries: Vec<EntryView>,
    pub subtotal: String,
    pub email: String,
    pub fullname: String,
    pub notes: String,
}

/// Thank-you page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/thankyou.html")]
pub struct ThankYouTemplate {
    pub order_id: OrderId,
}

/// Contact details form data.
#[derive(Debug, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub fullname: String,
    #[serde(default)]
    pub notes: String,
}

impl From<ContactForm> for ContactDetails {
    fn from(form: ContactForm) -> Self {
        Self {
            email: form.email,
            fullname: form.fullname,
            notes: form.notes,
        }
    }
}

/// Display the checkout front page.
#[instrument(skip_all)]
pub async fn front(State(state): State<AppState>, session: StoreSession) -> Result<Response> {
    let gated = match gate(&state, &session, CheckoutStep::Front).await? {
        Ok(gated) => gated,
        Err(redirect) => return Ok(redirect),
    };

    Ok(FrontTemplate {
        with_account: gated.checkout.with_account(),
    }
    .into_response())
}

/// Continue from the front page.
#[instrument(skip_all)]
pub async fn submit_front(
    State(state): State<AppState>,
    session: StoreSession,
) -> Result<Response> {
    let mut gated = match gate(&state, &session, CheckoutStep::Front).await? {
        Ok(gated) => gated,
        Err(redirect) => return Ok(redirect),
    };

    checkout::complete_front(&mut gated.checkout);
    session.save_checkout(&gated.checkout).await?;

    Ok(Redirect::to("/checkout/first").into_response())
}

/// Display the contact details form.
#[instrument(skip_all)]
pub async fn first(
    State(state): State<AppState>,
    session: StoreSession,
    OptionalAuth(customer): OptionalAuth,
) -> Result<Response> {
    let gated = match gate(&state, &session, CheckoutStep::First).await? {
        Ok(gated) => gated,
        Err(redirect) => return Ok(redirect),
    };

    let order = gated.checkout.order();
    let email = order
        .and_then(|o| o.email.clone())
        .or_else(|| customer.as_ref().map(|c| c.email.clone()))
        .unwrap_or_default();
    let fullname = order
        .and_then(|o| o.fullname.clone())
        .or_else(|| customer.and_then(|c| c.fullname))
        .unwrap_or_default();

    Ok(FirstTemplate {
        email,
        fullname,
        notes: order.and_then(|o| o.notes.clone()).unwrap_or_default(),
        errors: ContactErrors::default(),
    }
    .into_response())
}

/// Save contact details.
#[instrument(skip_all)]
pub async fn submit_first(
    State(state): State<AppState>,
    session: StoreSession,
    Form(form): Form<ContactForm>,
) -> Result<Response> {
    let mut gated = match gate(&state, &session, CheckoutStep::First).await? {
        Ok(gated) => gated,
        Err(redirect) => return Ok(redirect),
    };

    let details = ContactDetails::from(form);
    if let Err(errors) = checkout::complete_first(&mut gated.checkout, &details) {
        return Ok(FirstTemplate {
            email: details.email,
            fullname: details.fullname,
            notes: details.notes,
            errors,
        }
        .into_response());
    }
    session.save_checkout(&gated.checkout).await?;

    Ok(Redirect::to("/checkout/confirmation").into_response())
}

/// Display the order for review.
#[instrument(skip_all)]
pub async fn confirmation(
    State(state): State<AppState>,
    session: StoreSession,
) -> Result<Response> {
    let gated = match gate(&state, &session, CheckoutStep::Confirmation).await? {
        Ok(gated) => gated,
        Err(redirect) => return Ok(redirect),
    };

    let entries = gated.cart.available_entries().await?;
    let order = gated.checkout.order();

    Ok(ConfirmationTemplate {
        entries: entry_views(&entries, &state.config().store),
        subtotal: subtotal(&entries),
        email: order.and_then(|o| o.email.clone()).unwrap_or_default(),
        fullname: order.and_then(|o| o.fullname.clone()).unwrap_or_default(),
        notes: order.and_then(|o| o.notes.clone()).unwrap_or_default(),
    }
    .into_response())
}

/// Place the order.
#[instrument(skip_all)]
pub async fn submit_confirmation(
    State(state): State<AppState>,
    session: StoreSession,
) -> Result<Response> {
    let mut gated = match gate(&state, &session, CheckoutStep::Confirmation).await? {
        Ok(gated) => gated,
        Err(redirect) => return Ok(redirect),
    };

    let order_id =
        checkout::place_order(&mut gated.checkout, gated.cart.as_ref(), state.orders()).await?;
    session.save_checkout(&gated.checkout).await?;
    session.set_last_order(order_id).await?;

    let order = order_id.to_string();
    add_breadcrumb("checkout", "Order placed", Some(&[("order_id", order.as_str())]));

    Ok(Redirect::to("/checkout/thankyou").into_response())
}

/// Thank the shopper for the order placed in this session.
#[instrument(skip_all)]
pub async fn thankyou(session: StoreSession) -> Result<Response> {
    let Some(order_id) = session.last_order().await? else {
        return Ok(Redirect::to("/cart").into_response());
    };

    Ok(ThankYouTemplate { order_id }.into_response())
}

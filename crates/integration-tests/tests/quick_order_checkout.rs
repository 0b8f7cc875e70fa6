//! A shopper fills the quick order form and checks out, end to end over the
//! in-memory collaborators.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use tower_sessions::{MemoryStore, Session};

use tidewater_core::{AccountId, ItemId, ItemStatus, RegionId};
use tidewater_integration_tests::item;
use tidewater_storefront::middleware::{StoreSession, set_current_customer};
use tidewater_storefront::models::{
    CartKind, CheckoutFactory, CheckoutRedirect, CheckoutStep, CurrentCustomer,
};
use tidewater_storefront::routes::quick_order::{parse_rows, resolve_rows};
use tidewater_storefront::services::checkout::{self, ContactDetails, Entry};
use tidewater_storefront::services::quick_order::QUANTITY_NOT_WHOLE;
use tidewater_storefront::services::{
    CartService, InMemoryCart, InMemoryItemLookup, InMemoryOrderService, RowOutcome,
};

const REGION: RegionId = RegionId::new(1);

fn catalog() -> InMemoryItemLookup {
    InMemoryItemLookup::new()
        .with_item(item(1, "SAW-20", 1, ItemStatus::Available, 2450))
        .with_item(item(2, "SAW-26", 1, ItemStatus::OutOfStock, 2900))
        .with_item(item(3, "SAW-KIT", 3, ItemStatus::Available, 4900))
        .with_alias(ItemId::new(1), "HS20")
        .with_alias(ItemId::new(3), "HS20")
}

fn new_session() -> StoreSession {
    StoreSession::new(Session::new(None, Arc::new(MemoryStore::default()), None))
}

fn fields(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect()
}

/// Run the gate for `step` against the shared in-memory `cart`.
async fn enter(session: &StoreSession, cart: &InMemoryCart, step: CheckoutStep) -> Entry {
    let cart = cart.clone();
    checkout::enter(
        session,
        move |_| Box::new(cart) as Box<dyn CartService>,
        &CheckoutFactory::default(),
        step,
    )
    .await
    .unwrap()
}

fn redirect(entry: Entry) -> Option<CheckoutRedirect> {
    match entry {
        Entry::Redirect(redirect) => Some(redirect),
        Entry::Proceed { .. } => None,
    }
}

/// Submit the quick order form with one good row, one out-of-stock row,
/// one unknown SKU and one bad quantity.
async fn fill_cart(session: &StoreSession, cart: &InMemoryCart) {
    let lookup = catalog();
    let shared = cart.clone();

    let rows = parse_rows(
        &fields(&[
            ("sku_0", " #hs20 "),
            ("quantity_0", "2"),
            ("sku_1", "SAW-26"),
            ("quantity_1", "1"),
            ("sku_2", "NOPE-1"),
            ("quantity_2", "1"),
            ("sku_3", "saw-20"),
            ("quantity_3", "two"),
        ]),
        5,
    );
    let outcome = resolve_rows(
        session,
        &lookup,
        move |_| Box::new(shared) as Box<dyn CartService>,
        REGION,
        rows,
    )
    .await
    .unwrap();
    assert!(session.is_active().await.unwrap());

    let outcomes: Vec<RowOutcome> = outcome.rows.iter().map(|row| row.outcome).collect();
    assert_eq!(
        outcomes,
        vec![
            RowOutcome::Added,
            RowOutcome::Saved,
            RowOutcome::NotFound,
            RowOutcome::Invalid,
            RowOutcome::Empty,
        ]
    );
    assert!(outcome.summary_error().is_some());
    assert_eq!(
        outcome.rows[2].sku_error.as_deref(),
        Some("“NOPE-1” is not an available item.")
    );
    assert_eq!(outcome.rows[3].quantity_error, Some(QUANTITY_NOT_WHOLE));

    // The alias is shared by two items; the one with fewer parts wins.
    assert_eq!(outcome.added.len(), 1);
    assert_eq!(outcome.added[0].item.id, ItemId::new(1));
    assert_eq!(outcome.added[0].display_sku(), "SAW-20 (HS20)");
    assert_eq!(
        outcome.saved_message().as_deref(),
        Some("One item has been saved for later.")
    );
}

#[tokio::test]
async fn test_unresolved_submission_leaves_session_inactive() {
    let session = new_session();
    let cart = InMemoryCart::new();
    let shared = cart.clone();
    let rows = parse_rows(
        &fields(&[
            ("sku_0", "NOPE-1"),
            ("quantity_0", "1"),
            ("sku_1", "SAW-20"),
            ("quantity_1", "0"),
        ]),
        2,
    );

    let outcome = resolve_rows(
        &session,
        &catalog(),
        move |_| Box::new(shared) as Box<dyn CartService>,
        REGION,
        rows,
    )
    .await
    .unwrap();

    assert!(outcome.summary_error().is_some());
    assert!(!session.is_active().await.unwrap());
    assert!(cart.entries(CartKind::Checkout).await.unwrap().is_empty());

    let entry = enter(&session, &cart, CheckoutStep::Front).await;
    assert_eq!(redirect(entry), Some(CheckoutRedirect::Cart));
}

#[tokio::test]
async fn test_checkout_requires_an_active_session() {
    let session = new_session();
    let cart = InMemoryCart::new();

    let entry = enter(&session, &cart, CheckoutStep::Front).await;
    assert_eq!(redirect(entry), Some(CheckoutRedirect::Cart));
    assert!(!session.is_active().await.unwrap());
}

#[tokio::test]
async fn test_quick_order_then_guest_checkout() {
    let session = new_session();
    let cart = InMemoryCart::new();
    let orders = InMemoryOrderService::new();

    fill_cart(&session, &cart).await;

    // Jumping ahead lands on the first unmet step.
    let entry = enter(&session, &cart, CheckoutStep::Confirmation).await;
    assert_eq!(redirect(entry), Some(CheckoutRedirect::Step("checkout")));

    let Entry::Proceed { mut checkout, .. } = enter(&session, &cart, CheckoutStep::Front).await
    else {
        panic!("front page should render");
    };
    assert!(!checkout.with_account());
    checkout::complete_front(&mut checkout);
    session.save_checkout(&checkout).await.unwrap();

    let entry = enter(&session, &cart, CheckoutStep::Confirmation).await;
    assert_eq!(redirect(entry), Some(CheckoutRedirect::Step("checkout/first")));

    let Entry::Proceed { mut checkout, .. } = enter(&session, &cart, CheckoutStep::First).await
    else {
        panic!("contact page should render");
    };
    let details = ContactDetails {
        email: " sam@example.com ".to_owned(),
        fullname: "Sam Shopper".to_owned(),
        notes: String::new(),
    };
    checkout::complete_first(&mut checkout, &details).unwrap();
    session.save_checkout(&checkout).await.unwrap();

    let Entry::Proceed {
        mut checkout,
        cart: open,
    } = enter(&session, &cart, CheckoutStep::Confirmation).await
    else {
        panic!("confirmation page should render");
    };
    let order_id = checkout::place_order(&mut checkout, open.as_ref(), &orders)
        .await
        .unwrap();
    session.save_checkout(&checkout).await.unwrap();

    let placed = orders.placed();
    assert_eq!(placed.len(), 1);
    assert_eq!(placed[0].id, order_id);
    assert_eq!(placed[0].order.email.as_deref(), Some("sam@example.com"));
    assert_eq!(placed[0].order.notes, None);
    assert_eq!(placed[0].entries.len(), 1);
    assert_eq!(placed[0].entries[0].quantity, 2);

    // The checkout cart is empty; saved-for-later entries stay behind.
    assert!(cart.entries(CartKind::Checkout).await.unwrap().is_empty());
    assert_eq!(cart.entries(CartKind::Saved).await.unwrap().len(), 1);

    let entry = enter(&session, &cart, CheckoutStep::Front).await;
    assert_eq!(redirect(entry), Some(CheckoutRedirect::Cart));
}

#[tokio::test]
async fn test_login_mid_checkout_starts_over_with_account() {
    let session = new_session();
    let cart = InMemoryCart::new();

    fill_cart(&session, &cart).await;

    let Entry::Proceed { mut checkout, .. } = enter(&session, &cart, CheckoutStep::Front).await
    else {
        panic!("front page should render");
    };
    checkout::complete_front(&mut checkout);
    session.save_checkout(&checkout).await.unwrap();

    // What the login handler does once the password checks out.
    let customer = CurrentCustomer {
        id: AccountId::new(7),
        email: "sam@example.com".to_owned(),
        fullname: Some("Sam Shopper".to_owned()),
    };
    set_current_customer(session.inner(), &customer).await.unwrap();
    let mut checkout = session.checkout().await.unwrap();
    checkout.forget_account();
    session.save_checkout(&checkout).await.unwrap();

    let entry = enter(&session, &cart, CheckoutStep::First).await;
    assert_eq!(redirect(entry), Some(CheckoutRedirect::Step("checkout")));

    let Entry::Proceed { checkout, .. } = enter(&session, &cart, CheckoutStep::Front).await else {
        panic!("front page should render");
    };
    assert!(checkout.with_account());
    assert!(!checkout.has_completed("checkout"));
}

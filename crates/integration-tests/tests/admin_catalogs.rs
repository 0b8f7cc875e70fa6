//! Admin catalog editing over HTTP, backed by the in-memory catalog store.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use secrecy::SecretString;
use tower::ServiceExt;
use tower_sessions::{MemoryStore, SessionManagerLayer};

use tidewater_admin::config::AdminConfig;
use tidewater_admin::routes;
use tidewater_admin::services::InMemoryCatalogStore;
use tidewater_admin::state::AppState;

fn app() -> Router {
    let config = AdminConfig {
        database_url: SecretString::from("postgres://localhost/unused"),
        host: [127, 0, 0, 1].into(),
        port: 3001,
        base_url: "http://localhost:3001".to_owned(),
        sentry_dsn: None,
        sentry_environment: None,
    };
    let store = InMemoryCatalogStore::new()
        .with_catalog(1, "Hand Tools", true)
        .with_catalog(2, "Garden", false);

    routes::routes()
        .layer(SessionManagerLayer::new(MemoryStore::default()))
        .with_state(AppState::with_catalogs(config, Arc::new(store)))
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut request = Request::get(uri);
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    request.body(Body::empty()).unwrap()
}

fn post(uri: &str, form: &str) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form.to_owned()))
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// The `name=value` part of the session cookie set by `response`.
fn session_cookie(response: &axum::response::Response) -> String {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_owned()
}

#[tokio::test]
async fn test_health() {
    let response = app().oneshot(get("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}

#[tokio::test]
async fn test_list_catalogs() {
    let response = app().oneshot(get("/catalogs", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response).await;
    let garden = body.find("Garden").unwrap();
    let tools = body.find("Hand Tools").unwrap();
    assert!(garden < tools);
}

#[tokio::test]
async fn test_edit_unknown_catalog_is_not_found() {
    let response = app().oneshot(get("/catalogs/42/edit", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(response).await, "Catalog with id “42” not found.");
}

#[tokio::test]
async fn test_update_unknown_catalog_is_not_found() {
    let response = app()
        .oneshot(post("/catalogs/42", "title=Anything"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_edit_form_is_prefilled() {
    let response = app().oneshot(get("/catalogs/1/edit", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_text(response).await;
    assert!(body.contains(r#"value="Hand Tools""#));
    assert!(body.contains("checked"));
}

#[tokio::test]
async fn test_blank_title_rerenders_form() {
    let response = app()
        .oneshot(post("/catalogs/1", "title=++&in_season=on"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Title is required."));
}

#[tokio::test]
async fn test_save_flashes_once_on_the_list() {
    let app = app();

    let response = app
        .clone()
        .oneshot(post("/catalogs/2", "title=Garden+%26+Patio&in_season=on"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/catalogs");
    let cookie = session_cookie(&response);

    let response = app
        .clone()
        .oneshot(get("/catalogs", Some(&cookie)))
        .await
        .unwrap();
    let body = body_text(response).await;
    assert!(body.contains("“Garden &amp; Patio” has been saved."));

    let response = app.oneshot(get("/catalogs", Some(&cookie))).await.unwrap();
    assert!(!body_text(response).await.contains("has been saved."));
}

#[tokio::test]
async fn test_create_catalog() {
    let app = app();

    let response = app
        .clone()
        .oneshot(post("/catalogs", "title=Fasteners"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = app.oneshot(get("/catalogs/3/edit", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains(r#"value="Fasteners""#));
    assert!(!body.contains("checked"));
}

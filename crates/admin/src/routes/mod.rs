//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//!
//! # Catalogs
//! GET  /catalogs               - List catalogs
//! GET  /catalogs/new           - New catalog form
//! POST /catalogs               - Create catalog
//! GET  /catalogs/{id}/edit     - Edit catalog form
//! POST /catalogs/{id}          - Update catalog
//! ```

pub mod catalogs;

use axum::{Router, response::Redirect, routing::get};

use crate::state::AppState;

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(catalogs::index).post(catalogs::create))
        .route("/new", get(catalogs::new_catalog))
        .route("/{id}/edit", get(catalogs::edit))
        .route("/{id}", axum::routing::post(catalogs::update))
}

/// Create all routes for admin.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/", get(|| async { Redirect::to("/catalogs") }))
        .nest("/catalogs", catalog_routes())
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

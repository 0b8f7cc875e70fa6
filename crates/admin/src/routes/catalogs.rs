//! Catalog management route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use tidewater_core::CatalogId;

use crate::db::RepositoryError;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{set_flash, take_flash};
use crate::models::catalog::{not_found_message, saved_message};
use crate::models::{Catalog, CatalogErrors, CatalogForm};
use crate::state::AppState;

/// Catalog list page template.
#[derive(Template, WebTemplate)]
#[template(path = "catalogs/index.html")]
pub struct CatalogsIndexTemplate {
    pub catalogs: Vec<Catalog>,
    pub flash: Option<String>,
}

/// Catalog create form template.
#[derive(Template, WebTemplate)]
#[template(path = "catalogs/new.html")]
pub struct CatalogNewTemplate {
    pub form: CatalogForm,
    pub errors: CatalogErrors,
}

/// Catalog edit form template.
#[derive(Template, WebTemplate)]
#[template(path = "catalogs/edit.html")]
pub struct CatalogEditTemplate {
    pub id: CatalogId,
    pub form: CatalogForm,
    pub errors: CatalogErrors,
}

/// Load catalog `id` or fail with a 404.
async fn load(state: &AppState, id: CatalogId) -> Result<Catalog> {
    state
        .catalogs()
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(not_found_message(id)))
}

/// Catalog list page handler.
#[instrument(skip(state, session))]
pub async fn index(State(state): State<AppState>, session: Session) -> Result<impl IntoResponse> {
    let catalogs = state.catalogs().list().await?;
    let flash = take_flash(&session).await?;

    Ok(CatalogsIndexTemplate { catalogs, flash })
}

/// New catalog form handler.
pub async fn new_catalog() -> impl IntoResponse {
    CatalogNewTemplate {
        form: CatalogForm {
            in_season: Some("on".to_owned()),
            ..CatalogForm::default()
        },
        errors: CatalogErrors::default(),
    }
}

/// Create catalog handler.
#[instrument(skip(state, session, form))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CatalogForm>,
) -> Result<Response> {
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => return Ok(CatalogNewTemplate { form, errors }.into_response()),
    };

    let catalog = state.catalogs().create(&input).await?;
    tracing::info!(catalog_id = %catalog.id, title = %catalog.title, "Catalog created");

    set_flash(&session, &saved_message(&catalog.title)).await?;
    Ok(Redirect::to("/catalogs").into_response())
}

/// Edit catalog form handler.
#[instrument(skip(state))]
pub async fn edit(
    State(state): State<AppState>,
    Path(id): Path<CatalogId>,
) -> Result<impl IntoResponse> {
    let catalog = load(&state, id).await?;

    Ok(CatalogEditTemplate {
        id,
        form: CatalogForm::from_catalog(&catalog),
        errors: CatalogErrors::default(),
    })
}

/// Update catalog handler.
#[instrument(skip(state, session, form))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<CatalogId>,
    Form(form): Form<CatalogForm>,
) -> Result<Response> {
    // The catalog must exist even when the form is invalid.
    load(&state, id).await?;

    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => return Ok(CatalogEditTemplate { id, form, errors }.into_response()),
    };

    let catalog = match state.catalogs().update(id, &input).await {
        Ok(catalog) => catalog,
        Err(RepositoryError::NotFound) => return Err(AppError::NotFound(not_found_message(id))),
        Err(e) => return Err(e.into()),
    };
    tracing::info!(catalog_id = %catalog.id, "Catalog updated");

    set_flash(&session, &saved_message(&catalog.title)).await?;
    Ok(Redirect::to("/catalogs").into_response())
}

//! HTTP route handlers for the tree server.
//!
//! Handlers are kept thin, delegating to the registry and tree cache.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use lineage_core::{
    AncestryTree, CacheError, LayoutError, LayoutMode, NewPerson, PersonSearchCriteria,
    PositionedGraph, RegistryError, TreeGraph, Viewport,
};

use super::models::{ErrorResponse, LayoutQuery, PersonView};
use super::AppState;

// =============================================================================
// Errors
// =============================================================================

/// Error converted into a JSON response with a matching status code.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, error = %self.message, "request failed");
        }
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<RegistryError> for ApiError {
    fn from(e: RegistryError) -> Self {
        let status = if e.is_not_found() {
            StatusCode::NOT_FOUND
        } else if e.is_validation() {
            StatusCode::UNPROCESSABLE_ENTITY
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self {
            status,
            message: e.to_string(),
        }
    }
}

impl From<CacheError> for ApiError {
    fn from(e: CacheError) -> Self {
        match e {
            CacheError::Registry(e) => e.into(),
            CacheError::Tree(e) => Self {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                message: e.to_string(),
            },
            other => Self {
                status: if other.is_not_found() {
                    StatusCode::NOT_FOUND
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR
                },
                message: other.to_string(),
            },
        }
    }
}

impl From<LayoutError> for ApiError {
    fn from(e: LayoutError) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: e.to_string(),
        }
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

// =============================================================================
// Person Handlers
// =============================================================================

/// GET `/api/persons` - All registered persons.
pub async fn list_persons(State(state): State<Arc<AppState>>) -> ApiResult<Vec<PersonView>> {
    let registry = state.registry.read().await;
    let persons = registry.list()?;
    Ok(Json(persons.into_iter().map(PersonView::from).collect()))
}

/// GET `/api/persons/search` - Persons matching every given filter.
///
/// Query parameters: `surname`, `given_name`, `nin`, `father_surname`,
/// `mother_surname`.
pub async fn search_persons(
    State(state): State<Arc<AppState>>,
    Query(criteria): Query<PersonSearchCriteria>,
) -> ApiResult<Vec<PersonView>> {
    let registry = state.registry.read().await;
    let persons = registry.search(&criteria)?;
    Ok(Json(persons.into_iter().map(PersonView::from).collect()))
}

/// GET `/api/persons/{id}` - One person.
pub async fn get_person(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<PersonView> {
    let registry = state.registry.read().await;
    Ok(Json(registry.get(&id)?.into()))
}

/// POST `/api/persons` - Register a person; the id is assigned here.
pub async fn create_person(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewPerson>,
) -> Result<(StatusCode, Json<PersonView>), ApiError> {
    let registry = state.registry.write().await;
    let person = registry.create(new)?;
    Ok((StatusCode::CREATED, Json(person.into())))
}

/// PUT `/api/persons/{id}` - Replace a person's fields.
///
/// The stored tree where this person is principal is merged with the edit.
pub async fn update_person(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(fields): Json<NewPerson>,
) -> ApiResult<PersonView> {
    let person = {
        let registry = state.registry.write().await;
        registry.update(fields.with_id(id))?
    };

    let cache = state.cache.write().await;
    cache.sync_principal(person.clone())?;
    Ok(Json(person.into()))
}

// =============================================================================
// Tree Handlers
// =============================================================================

/// GET `/api/trees/{id}` - The ancestry tree of a principal, built on first use.
pub async fn get_tree(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<AncestryTree> {
    // Building writes to the tree store, so take the write side.
    let cache = state.cache.write().await;
    Ok(Json(cache.get_or_build(&id)?))
}

/// GET `/api/trees/{id}/graph` - Nodes and parent-child links.
pub async fn get_graph(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<TreeGraph> {
    let cache = state.cache.write().await;
    Ok(Json(cache.graph(&id)?))
}

/// GET `/api/trees/{id}/layout` - Positioned nodes.
///
/// Query parameters:
/// - `mode`: `generational` (default) or `hierarchical`
/// - `width`, `height`: viewport size (default from config)
pub async fn get_layout(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<LayoutQuery>,
) -> ApiResult<PositionedGraph> {
    let mode = query
        .mode
        .as_deref()
        .map(str::parse::<LayoutMode>)
        .transpose()?;

    let cache = state.cache.write().await;
    let defaults = cache.layout_config();
    let viewport = Viewport::new(
        query.width.unwrap_or(defaults.view_width),
        query.height.unwrap_or(defaults.view_height),
    );
    if viewport.width <= 0.0 || viewport.height <= 0.0 {
        return Err(ApiError {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: "viewport must have a positive size".to_string(),
        });
    }

    Ok(Json(cache.layout(&id, mode, Some(viewport))?))
}

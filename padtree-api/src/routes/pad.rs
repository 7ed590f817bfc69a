//! Pad REST Routes
//!
//! Content CRUD and child listings. Pad paths arrive as the wildcard tail
//! of the route (absent for the root pad) and are normalized + validated
//! before touching the service.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use padtree_core::{normalize_path, validate_path, ChildEntry, Pad};

use crate::error::{ApiError, ApiResult};
use crate::service::PadService;

// ============================================================================
// SHARED STATE
// ============================================================================

/// Shared state for pad routes.
#[derive(Clone)]
pub struct PadState {
    pub service: Arc<PadService>,
    pub max_content_bytes: usize,
}

impl PadState {
    pub fn new(service: Arc<PadService>, max_content_bytes: usize) -> Self {
        Self {
            service,
            max_content_bytes,
        }
    }
}

// ============================================================================
// REQUEST / RESPONSE TYPES
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SavePadRequest {
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeletePadResponse {
    pub deleted: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChildrenResponse {
    pub children: Vec<ChildEntry>,
}

/// Optional actor identity carried on mutating requests and subscriptions
/// so clients can recognize their own echo.
#[derive(Debug, Default, Deserialize)]
pub struct ActorQuery {
    pub actor: Option<String>,
}

impl ActorQuery {
    pub fn id(&self) -> &str {
        self.actor.as_deref().unwrap_or("")
    }
}

/// Normalize and validate the wildcard path segment (absent = root pad).
pub(crate) fn resolve_path(path: Option<Path<String>>) -> ApiResult<String> {
    let raw = path.map(|Path(p)| p).unwrap_or_default();
    let normalized = normalize_path(&raw);
    validate_path(&normalized)?;
    Ok(normalized)
}

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// GET /api/pads/content[/*path] - Read a pad (implicit pads included).
pub async fn get_pad(
    State(state): State<Arc<PadState>>,
    path: Option<Path<String>>,
) -> ApiResult<Json<Pad>> {
    let path = resolve_path(path)?;
    let pad = state.service.read(&path).await?;
    Ok(Json(pad))
}

/// PUT /api/pads/content[/*path] - Write a pad.
pub async fn save_pad(
    State(state): State<Arc<PadState>>,
    path: Option<Path<String>>,
    Query(actor): Query<ActorQuery>,
    Json(req): Json<SavePadRequest>,
) -> ApiResult<Json<Pad>> {
    let path = resolve_path(path)?;
    if req.content.len() > state.max_content_bytes {
        return Err(ApiError::content_too_large(state.max_content_bytes));
    }

    let pad = state.service.write(&path, &req.content, actor.id()).await?;
    Ok(Json(pad))
}

/// DELETE /api/pads/content[/*path] - Delete a pad and its descendants.
pub async fn delete_pad(
    State(state): State<Arc<PadState>>,
    path: Option<Path<String>>,
    Query(actor): Query<ActorQuery>,
) -> ApiResult<Json<DeletePadResponse>> {
    let path = resolve_path(path)?;
    let deleted = state.service.delete(&path, actor.id()).await?;
    Ok(Json(DeletePadResponse { deleted }))
}

/// GET /api/pads/children[/*path] - List direct, materialized children.
pub async fn get_children(
    State(state): State<Arc<PadState>>,
    path: Option<Path<String>>,
) -> ApiResult<Json<ChildrenResponse>> {
    let path = resolve_path(path)?;
    let children = state.service.list_children(&path).await?;
    Ok(Json(ChildrenResponse { children }))
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router(state: Arc<PadState>) -> Router {
    Router::new()
        .route(
            "/content",
            get(get_pad).put(save_pad).delete(delete_pad),
        )
        .route(
            "/content/*path",
            get(get_pad).put(save_pad).delete(delete_pad),
        )
        .route("/children", get(get_children))
        .route("/children/*path", get(get_children))
        .with_state(state)
}

//! API Handlers
//!
//! One handler set serves every registered collection. Mutating handlers
//! check authorization before they look at the request body.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::auth::Caller;
use crate::collections::CollectionRegistry;
use crate::error::Result;
use crate::models::{HealthResponse, PublicRecord, RecordInput};
use crate::records::RecordService;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub records: RecordService,
    pub collections: Arc<CollectionRegistry>,
    /// Secret expected in the `api-key` header
    pub api_key: Option<String>,
}

impl AppState {
    pub fn new(
        records: RecordService,
        collections: CollectionRegistry,
        api_key: Option<String>,
    ) -> Self {
        Self {
            records,
            collections: Arc::new(collections),
            api_key,
        }
    }
}

/// Handler for GET /:collection
pub async fn list_handler(
    State(state): State<AppState>,
    Caller(level): Caller,
    Path(collection): Path<String>,
) -> Result<Json<Vec<PublicRecord>>> {
    let collection = state.collections.get(&collection)?;
    let records = state.records.list(&collection, level).await?;
    Ok(Json(records))
}

/// Handler for GET /:collection/:id
pub async fn get_handler(
    State(state): State<AppState>,
    Caller(level): Caller,
    Path((collection, id)): Path<(String, String)>,
) -> Result<Json<PublicRecord>> {
    let collection = state.collections.get(&collection)?;
    let record = state.records.get(&collection, &id, level).await?;
    Ok(Json(record))
}

/// Handler for POST /:collection
pub async fn create_handler(
    State(state): State<AppState>,
    caller: Caller,
    Path(collection): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<PublicRecord>)> {
    let collection = state.collections.get(&collection)?;
    caller.require_privileged()?;

    let input = RecordInput::parse(&body)?;
    let created = state.records.create(&collection, &input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Handler for PATCH /:collection/:id
pub async fn patch_handler(
    State(state): State<AppState>,
    caller: Caller,
    Path((collection, id)): Path<(String, String)>,
    body: Bytes,
) -> Result<Json<PublicRecord>> {
    let collection = state.collections.get(&collection)?;
    caller.require_privileged()?;

    let input = RecordInput::parse(&body)?;
    let updated = state.records.patch(&collection, &id, &input).await?;
    Ok(Json(updated))
}

/// Handler for DELETE /:collection/:id
pub async fn delete_handler(
    State(state): State<AppState>,
    caller: Caller,
    Path((collection, id)): Path<(String, String)>,
) -> Result<StatusCode> {
    let collection = state.collections.get(&collection)?;
    caller.require_privileged()?;

    state.records.delete(&collection, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.collections.names()))
}

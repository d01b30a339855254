// handlers/public/directory.rs - visitor-facing directory and contact form

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::{ContactRequest, DirectoryEntry};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{LawyerService, RequestService, SubmitRequest};

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// GET /api/lawyers?q=
pub async fn lawyers_get(State(state): State<AppState>, Query(query): Query<SearchQuery>) -> ApiResult<Vec<DirectoryEntry>> {
    let lawyers = LawyerService::new(state.store.clone())
        .search(query.q.as_deref())
        .await?;
    Ok(ApiResponse::success(lawyers))
}

/// GET /api/lawyers/:id
pub async fn lawyer_get(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<DirectoryEntry> {
    let lawyer = LawyerService::new(state.store.clone()).public_entry(id).await?;
    Ok(ApiResponse::success(lawyer))
}

/// POST /api/requests - contact form submission, no session needed
pub async fn request_post(State(state): State<AppState>, Json(body): Json<SubmitRequest>) -> ApiResult<ContactRequest> {
    let request = RequestService::new(state.store.clone()).submit(body).await?;
    Ok(ApiResponse::created(request))
}

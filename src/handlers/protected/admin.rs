// handlers/protected/admin.rs - lawyer account management (admin role)

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::{Lawyer, RequestWithLawyer};
use crate::middleware::{AdminSession, ApiResponse, ApiResult};
use crate::services::{CreateLawyer, LawyerService, RequestService, UpdateLawyer};

/// GET /api/admin/lawyers
pub async fn lawyers_get(State(state): State<AppState>, AdminSession(auth): AdminSession) -> ApiResult<Vec<Lawyer>> {
    let lawyers = LawyerService::new(state.store.clone()).list(&auth.actor).await?;
    Ok(ApiResponse::success(lawyers))
}

/// POST /api/admin/lawyers
pub async fn lawyers_post(
    State(state): State<AppState>,
    AdminSession(auth): AdminSession,
    Json(body): Json<CreateLawyer>,
) -> ApiResult<Lawyer> {
    let lawyer = LawyerService::new(state.store.clone()).create(&auth.actor, body).await?;
    Ok(ApiResponse::created(lawyer))
}

/// GET /api/admin/lawyers/:id
pub async fn lawyer_get(
    State(state): State<AppState>,
    AdminSession(auth): AdminSession,
    Path(id): Path<Uuid>,
) -> ApiResult<Lawyer> {
    let lawyer = LawyerService::new(state.store.clone()).get(&auth.actor, id).await?;
    Ok(ApiResponse::success(lawyer))
}

/// PUT /api/admin/lawyers/:id
pub async fn lawyer_put(
    State(state): State<AppState>,
    AdminSession(auth): AdminSession,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateLawyer>,
) -> ApiResult<Lawyer> {
    let lawyer = LawyerService::new(state.store.clone()).update(&auth.actor, id, body).await?;
    Ok(ApiResponse::success(lawyer))
}

/// DELETE /api/admin/lawyers/:id
pub async fn lawyer_delete(
    State(state): State<AppState>,
    AdminSession(auth): AdminSession,
    Path(id): Path<Uuid>,
) -> ApiResult<Value> {
    LawyerService::new(state.store.clone()).delete(&auth.actor, id).await?;
    Ok(ApiResponse::success(json!({ "id": id, "deleted": true })))
}

#[derive(Debug, Deserialize)]
pub struct EnabledBody {
    pub enabled: bool,
}

/// PUT /api/admin/lawyers/:id/enabled
pub async fn lawyer_enabled_put(
    State(state): State<AppState>,
    AdminSession(auth): AdminSession,
    Path(id): Path<Uuid>,
    Json(body): Json<EnabledBody>,
) -> ApiResult<Lawyer> {
    let lawyer = LawyerService::new(state.store.clone())
        .set_enabled(&auth.actor, id, body.enabled)
        .await?;
    Ok(ApiResponse::success(lawyer))
}

/// GET /api/admin/requests
pub async fn requests_get(
    State(state): State<AppState>,
    AdminSession(auth): AdminSession,
) -> ApiResult<Vec<RequestWithLawyer>> {
    let requests = RequestService::new(state.store.clone()).all(&auth.actor).await?;
    Ok(ApiResponse::success(requests))
}

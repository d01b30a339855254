// handlers/protected/requests.rs - contact request handling for lawyers and admins

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::{ContactRequest, RequestStatus};
use crate::middleware::{ApiResponse, ApiResult, Authorized, LawyerSession};
use crate::services::RequestService;

/// GET /api/lawyer/requests - the caller's own requests
pub async fn own_requests_get(State(state): State<AppState>, session: LawyerSession) -> ApiResult<Vec<ContactRequest>> {
    let requests = RequestService::new(state.store.clone())
        .for_lawyer(&session.auth.actor)
        .await?;
    Ok(ApiResponse::success(requests))
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: RequestStatus,
}

/// PATCH /api/requests/:id - set status; the service checks ownership
pub async fn request_patch(
    State(state): State<AppState>,
    auth: Authorized,
    Path(id): Path<Uuid>,
    Json(body): Json<StatusBody>,
) -> ApiResult<ContactRequest> {
    let request = RequestService::new(state.store.clone())
        .set_status(&auth.actor, id, body.status)
        .await?;
    Ok(ApiResponse::success(request))
}

// handlers/pages.rs - page view models
//
// Every page below the dashboard is reached only after the edge guard let the
// navigation through. The role extractors check again.

use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::database::models::{ContactRequest, DirectoryEntry, Lawyer, Profile, RequestStatus, RequestWithLawyer};
use crate::error::ApiError;
use crate::middleware::{AdminSession, ApiResponse, ApiResult, CurrentSession, LawyerSession, SessionUser};
use crate::services::{LawyerService, RequestService};

use super::public::directory::SearchQuery;

#[derive(Debug, Serialize)]
pub struct HomeView {
    pub query: Option<String>,
    pub lawyers: Vec<DirectoryEntry>,
}

/// GET /
pub async fn home_page(State(state): State<AppState>, Query(query): Query<SearchQuery>) -> ApiResult<HomeView> {
    let lawyers = LawyerService::new(state.store.clone())
        .search(query.q.as_deref())
        .await?;
    Ok(ApiResponse::success(HomeView { query: query.q, lawyers }))
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LoginView {
    #[serde(rename = "redirectedFrom")]
    pub redirected_from: Option<String>,
}

/// GET /login
pub async fn login_page(Query(view): Query<LoginView>) -> ApiResponse<LoginView> {
    ApiResponse::success(view)
}

#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub user: SessionUser,
    pub profile: Option<Profile>,
}

/// GET /dashboard - generic landing when no role-specific area applies
pub async fn dashboard_page(session: CurrentSession) -> ApiResult<DashboardView> {
    let Some(user) = session.user().cloned() else {
        return Err(ApiError::unauthorized("Debes iniciar sesión"));
    };
    Ok(ApiResponse::success(DashboardView {
        user,
        profile: session.profile().cloned(),
    }))
}

#[derive(Debug, Serialize)]
pub struct LawyerDashboardView {
    pub lawyer: Lawyer,
    pub requests: Vec<ContactRequest>,
}

/// GET /dashboard/lawyer
pub async fn lawyer_dashboard_page(State(state): State<AppState>, session: LawyerSession) -> ApiResult<LawyerDashboardView> {
    let requests = RequestService::new(state.store.clone())
        .for_lawyer(&session.auth.actor)
        .await?;
    Ok(ApiResponse::success(LawyerDashboardView {
        lawyer: session.lawyer,
        requests,
    }))
}

#[derive(Debug, Serialize)]
pub struct AdminSummaryView {
    pub lawyers: usize,
    pub enabled_lawyers: usize,
    pub requests: usize,
    pub pending_requests: usize,
}

/// GET /dashboard/admin
pub async fn admin_dashboard_page(State(state): State<AppState>, AdminSession(auth): AdminSession) -> ApiResult<AdminSummaryView> {
    let lawyers = LawyerService::new(state.store.clone()).list(&auth.actor).await?;
    let requests = RequestService::new(state.store.clone()).all(&auth.actor).await?;

    Ok(ApiResponse::success(AdminSummaryView {
        lawyers: lawyers.len(),
        enabled_lawyers: lawyers.iter().filter(|l| l.enabled).count(),
        requests: requests.len(),
        pending_requests: requests
            .iter()
            .filter(|r| r.request.status == RequestStatus::Pending)
            .count(),
    }))
}

#[derive(Debug, Serialize)]
pub struct AdminLawyersView {
    pub lawyers: Vec<Lawyer>,
}

/// GET /dashboard/admin/lawyers
pub async fn admin_lawyers_page(State(state): State<AppState>, AdminSession(auth): AdminSession) -> ApiResult<AdminLawyersView> {
    let lawyers = LawyerService::new(state.store.clone()).list(&auth.actor).await?;
    Ok(ApiResponse::success(AdminLawyersView { lawyers }))
}

#[derive(Debug, Serialize)]
pub struct AdminRequestsView {
    pub requests: Vec<RequestWithLawyer>,
}

/// GET /dashboard/admin/requests
pub async fn admin_requests_page(State(state): State<AppState>, AdminSession(auth): AdminSession) -> ApiResult<AdminRequestsView> {
    let requests = RequestService::new(state.store.clone()).all(&auth.actor).await?;
    Ok(ApiResponse::success(AdminRequestsView { requests }))
}

// handlers/public/auth.rs - session acquisition and the client route guard

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::auth::cookies::{build_clear_cookie, build_session_cookie};
use crate::database::models::Profile;
use crate::error::ApiError;
use crate::guard::{decide_redirect, navigation_path, RouteAction};
use crate::middleware::{ApiResponse, ApiResult, CurrentSession, SessionUser};
use crate::services::{AuthService, LoginOutcome, LoginRequest};

/// POST /api/auth/login - verify credentials, set the session cookie and return the token
pub async fn login_post(State(state): State<AppState>, Json(body): Json<LoginRequest>) -> ApiResult<LoginOutcome> {
    let outcome = AuthService::new(state.store.clone())
        .login(body, &state.config.security)
        .await?;

    let cookie = build_session_cookie(&outcome.token, &state.config.security);
    let response = ApiResponse::success(outcome);
    match cookie {
        Some(cookie) => Ok(response.with_cookie(cookie)),
        None => {
            tracing::warn!("Session token is not a valid cookie value; returning it in the body only");
            Ok(response)
        }
    }
}

/// POST /api/auth/logout
pub async fn logout_post() -> ApiResponse<Value> {
    ApiResponse::success(json!({ "logged_out": true })).with_cookie(build_clear_cookie())
}

#[derive(Debug, Serialize)]
pub struct SessionInfo {
    pub authenticated: bool,
    pub user: Option<SessionUser>,
    pub profile: Option<Profile>,
}

/// GET /api/auth/session - whoami
pub async fn session_get(session: CurrentSession) -> ApiResponse<SessionInfo> {
    ApiResponse::success(SessionInfo {
        authenticated: session.user().is_some(),
        user: session.user().cloned(),
        profile: session.profile().cloned(),
    })
}

#[derive(Debug, Deserialize)]
pub struct RouteQuery {
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct RouteDecision {
    pub path: String,
    #[serde(flatten)]
    pub action: RouteAction,
    pub location: Option<String>,
}

/// GET /api/auth/route?path= - the same guard decision the edge middleware makes
pub async fn route_get(session: CurrentSession, Query(query): Query<RouteQuery>) -> ApiResult<RouteDecision> {
    let Some(path) = navigation_path(&query.path) else {
        return Err(ApiError::bad_request("La ruta debe comenzar con '/'"));
    };

    let action = decide_redirect(&path, &session.view());
    let end_session = matches!(action, RouteAction::RedirectToLogin { end_session: true, .. });
    let response = ApiResponse::success(RouteDecision {
        path: query.path,
        location: action.location(),
        action,
    });

    if end_session {
        Ok(response.with_cookie(build_clear_cookie()))
    } else {
        Ok(response)
    }
}

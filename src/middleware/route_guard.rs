use axum::{
    extract::Request,
    http::header::SET_COOKIE,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use super::auth::CurrentSession;
use crate::auth::cookies::build_clear_cookie;
use crate::guard::{decide_redirect, is_excluded, RouteAction, SessionView};

/// Edge route guard. Runs after `session_middleware` and before any page handler.
pub async fn route_guard_middleware(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    if is_excluded(&path) {
        return next.run(request).await;
    }

    let view = request
        .extensions()
        .get::<CurrentSession>()
        .map(CurrentSession::view)
        .unwrap_or(SessionView::Anonymous);

    let action = decide_redirect(&path, &view);
    match action.location() {
        None => next.run(request).await,
        Some(location) => {
            tracing::debug!("Guard redirect {} -> {}", path, location);
            redirect(&action, &location)
        }
    }
}

/// 303 to `location`, dropping the session cookie when the action asks for it
pub fn redirect(action: &RouteAction, location: &str) -> Response {
    let mut response = Redirect::to(location).into_response();
    if let RouteAction::RedirectToLogin { end_session: true, .. } = action {
        response.headers_mut().append(SET_COOKIE, build_clear_cookie());
    }
    response
}

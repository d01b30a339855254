//! Route guard decision.
//!
//! `decide_redirect` is the only place navigation rules live. The edge
//! middleware (`middleware::route_guard`) and the client-facing
//! `GET /api/auth/route` endpoint both call it, so the two can never disagree.
//!
//! These redirects are a navigation convenience. Authorization is enforced
//! again in the services for every read and write.

use axum::http::Uri;
use serde::Serialize;
use url::form_urlencoded;

use crate::database::models::Role;

pub const HOME_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";
pub const LAWYER_HOME_PATH: &str = "/dashboard/lawyer";
pub const ADMIN_HOME_PATH: &str = "/dashboard/admin";
pub const ADMIN_LAWYERS_PATH: &str = "/dashboard/admin/lawyers";
pub const ADMIN_REQUESTS_PATH: &str = "/dashboard/admin/requests";

/// Query parameter carrying the originally requested path on a login redirect
pub const REDIRECTED_FROM_PARAM: &str = "redirectedFrom";

const API_PREFIX: &str = "/api";
const STATIC_PREFIXES: &[&str] = &["/static", "/assets"];
const STATIC_FILES: &[&str] = &["/favicon.ico", "/robots.txt", "/health"];

/// What the guard knows about the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionView {
    Anonymous,
    /// A valid session. `role` is `None` when the profile could not be loaded.
    Authenticated { role: Option<Role> },
}

/// Outcome of a guard evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RouteAction {
    Allow,
    RedirectToLogin {
        redirected_from: Option<String>,
        /// The session is unusable and should be dropped
        end_session: bool,
    },
    RedirectToDashboard,
    RedirectToRoleHome { role: Role },
}

impl RouteAction {
    /// Target URL for redirect actions, `None` for `Allow`
    pub fn location(&self) -> Option<String> {
        match self {
            RouteAction::Allow => None,
            RouteAction::RedirectToLogin { redirected_from: Some(from), .. } => {
                let query = form_urlencoded::Serializer::new(String::new())
                    .append_pair(REDIRECTED_FROM_PARAM, from)
                    .finish();
                Some(format!("{}?{}", LOGIN_PATH, query))
            }
            RouteAction::RedirectToLogin { redirected_from: None, .. } => Some(LOGIN_PATH.to_string()),
            RouteAction::RedirectToDashboard => Some(DASHBOARD_PATH.to_string()),
            RouteAction::RedirectToRoleHome { role } => Some(role_home(*role).to_string()),
        }
    }
}

/// Dashboard sub-path owned by a role
pub fn role_home(role: Role) -> &'static str {
    match role {
        Role::Lawyer => LAWYER_HOME_PATH,
        Role::Admin => ADMIN_HOME_PATH,
    }
}

/// `path` equals `prefix` or continues it with a new segment
pub fn is_under(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Paths the guard never evaluates: API routes and static assets
pub fn is_excluded(path: &str) -> bool {
    is_under(path, API_PREFIX)
        || STATIC_PREFIXES.iter().any(|prefix| is_under(path, prefix))
        || STATIC_FILES.contains(&path)
}

/// Path component of a navigation target such as `/dashboard?tab=1#top`.
///
/// The edge guard only ever sees `Uri::path()`, so a target reported by a client
/// is reduced the same way. Anything that is not an origin-relative reference is
/// rejected.
pub fn navigation_path(target: &str) -> Option<String> {
    let target = target.split('#').next().unwrap_or_default();
    if !target.starts_with('/') {
        return None;
    }
    let uri: Uri = target.parse().ok()?;
    Some(uri.path().to_owned())
}

/// Decide how navigation to `path` proceeds for the given session.
///
/// Rules in priority order:
/// 1. home, static assets and API routes are always allowed
///    (login is allowed for callers without a session)
/// 2. no session under the dashboard: login, remembering `path`
/// 3. session on the login page: generic dashboard
/// 4. lawyer under the dashboard but outside the lawyer area: lawyer home
/// 5. admin under the dashboard but outside the admin area: admin home
/// 6. session whose profile is missing: login, dropping the session
///    (the login page itself stays open to such a session)
/// 7. otherwise allowed
pub fn decide_redirect(path: &str, session: &SessionView) -> RouteAction {
    if path == HOME_PATH || is_excluded(path) {
        return RouteAction::Allow;
    }

    let role = match session {
        SessionView::Anonymous => {
            if is_under(path, DASHBOARD_PATH) {
                return RouteAction::RedirectToLogin {
                    redirected_from: Some(path.to_string()),
                    end_session: false,
                };
            }
            return RouteAction::Allow;
        }
        SessionView::Authenticated { role } => *role,
    };

    // Without a profile there is no dashboard to land on, and a Bearer
    // session cannot be cleared by the redirect, so the login page stays open
    if path == LOGIN_PATH {
        return match role {
            Some(_) => RouteAction::RedirectToDashboard,
            None => RouteAction::Allow,
        };
    }

    let Some(role) = role else {
        return RouteAction::RedirectToLogin {
            redirected_from: None,
            end_session: true,
        };
    };

    if is_under(path, DASHBOARD_PATH) && !is_under(path, role_home(role)) {
        return RouteAction::RedirectToRoleHome { role };
    }

    RouteAction::Allow
}

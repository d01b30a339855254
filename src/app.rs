use std::sync::Arc;

use axum::{
    http::HeaderValue,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, patch, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{AppConfig, SecurityConfig};
use crate::database::SharedStore;
use crate::error::ApiError;
use crate::handlers::{pages, protected, public};
use crate::middleware::{route_guard_middleware, session_middleware};

/// Shared handler state: configuration plus the backing store
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: SharedStore,
}

impl AppState {
    pub fn new(config: AppConfig, store: SharedStore) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }
}

pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.security);

    Router::new()
        .merge(page_routes())
        .merge(auth_routes())
        .merge(directory_routes())
        .merge(protected_routes())
        .route("/health", get(public::health_get))
        .fallback(not_found)
        // Innermost first: the guard needs the session resolved before it
        .layer(from_fn(route_guard_middleware))
        .layer(from_fn_with_state(state.clone(), session_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::home_page))
        .route("/login", get(pages::login_page))
        .route("/dashboard", get(pages::dashboard_page))
        .route("/dashboard/lawyer", get(pages::lawyer_dashboard_page))
        .route("/dashboard/admin", get(pages::admin_dashboard_page))
        .route("/dashboard/admin/lawyers", get(pages::admin_lawyers_page))
        .route("/dashboard/admin/requests", get(pages::admin_requests_page))
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(public::login_post))
        .route("/api/auth/logout", post(public::logout_post))
        .route("/api/auth/session", get(public::session_get))
        .route("/api/auth/route", get(public::route_get))
}

fn directory_routes() -> Router<AppState> {
    Router::new()
        .route("/api/lawyers", get(public::lawyers_get))
        .route("/api/lawyers/:id", get(public::lawyer_get))
        .route("/api/requests", post(public::request_post))
}

fn protected_routes() -> Router<AppState> {
    use protected::admin;

    Router::new()
        .route("/api/lawyer/requests", get(protected::own_requests_get))
        .route("/api/requests/:id", patch(protected::request_patch))
        .route("/api/admin/lawyers", get(admin::lawyers_get).post(admin::lawyers_post))
        .route(
            "/api/admin/lawyers/:id",
            get(admin::lawyer_get)
                .put(admin::lawyer_put)
                .delete(admin::lawyer_delete),
        )
        .route("/api/admin/lawyers/:id/enabled", put(admin::lawyer_enabled_put))
        .route("/api/admin/requests", get(admin::requests_get))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    if origins.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

async fn not_found() -> ApiError {
    ApiError::not_found("Página no encontrada")
}

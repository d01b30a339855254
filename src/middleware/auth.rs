use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use serde::Serialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::{cookies::extract_session_token, validate_jwt};
use crate::database::models::{Lawyer, Profile, Role};
use crate::error::ApiError;
use crate::guard::SessionView;
use crate::services::Actor;

/// Identity behind a valid session token
#[derive(Clone, Debug, Serialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
}

/// Per-request authentication state, resolved once by `session_middleware`
#[derive(Clone, Debug, Default)]
pub enum CurrentSession {
    #[default]
    Anonymous,
    /// `profile` is `None` when the lookup failed or returned nothing
    Authenticated { user: SessionUser, profile: Option<Profile> },
}

impl CurrentSession {
    pub fn view(&self) -> SessionView {
        match self {
            CurrentSession::Anonymous => SessionView::Anonymous,
            CurrentSession::Authenticated { profile, .. } => SessionView::Authenticated {
                role: profile.as_ref().map(|p| p.role),
            },
        }
    }

    pub fn user(&self) -> Option<&SessionUser> {
        match self {
            CurrentSession::Anonymous => None,
            CurrentSession::Authenticated { user, .. } => Some(user),
        }
    }

    pub fn profile(&self) -> Option<&Profile> {
        match self {
            CurrentSession::Anonymous => None,
            CurrentSession::Authenticated { profile, .. } => profile.as_ref(),
        }
    }
}

/// Resolve the caller's session and profile and store it in request extensions
pub async fn session_middleware(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let session = resolve_session(&state, request.headers()).await;
    request.extensions_mut().insert(session);
    next.run(request).await
}

/// Token from cookie or Bearer header, then the profile from the store.
/// Invalid or expired tokens count as no session.
pub async fn resolve_session(state: &AppState, headers: &HeaderMap) -> CurrentSession {
    let Some(token) = extract_session_token(headers) else {
        return CurrentSession::Anonymous;
    };

    let claims = match validate_jwt(&token, &state.config.security) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!("Ignoring session token: {}", e);
            return CurrentSession::Anonymous;
        }
    };

    let profile = match state.store.profile(claims.sub).await {
        Ok(Some(profile)) => Some(profile),
        Ok(None) => {
            tracing::warn!("No profile for user {}", claims.sub);
            None
        }
        Err(e) => {
            tracing::error!("Profile lookup failed for user {}: {}", claims.sub, e);
            None
        }
    };

    CurrentSession::Authenticated {
        user: SessionUser {
            id: claims.sub,
            email: claims.email,
        },
        profile,
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentSession {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<CurrentSession>().cloned().unwrap_or_default())
    }
}

/// A session with a loaded profile, as an `Actor` for the services
#[derive(Clone, Debug)]
pub struct Authorized {
    pub user: SessionUser,
    pub profile: Profile,
    pub actor: Actor,
    pub lawyer: Option<Lawyer>,
}

#[async_trait]
impl FromRequestParts<AppState> for Authorized {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session = parts.extensions.get::<CurrentSession>().cloned().unwrap_or_default();
        let CurrentSession::Authenticated { user, profile } = session else {
            return Err(ApiError::unauthorized("Debes iniciar sesión"));
        };
        let Some(profile) = profile else {
            return Err(ApiError::forbidden("Tu cuenta no tiene un perfil asignado"));
        };

        let lawyer = match profile.role {
            Role::Lawyer => state.store.lawyer_by_user(user.id).await?,
            Role::Admin => None,
        };

        let actor = Actor {
            user_id: user.id,
            role: profile.role,
            lawyer_id: lawyer.as_ref().map(|l| l.id),
        };

        Ok(Self {
            user,
            profile,
            actor,
            lawyer,
        })
    }
}

/// Caller with the admin role
#[derive(Clone, Debug)]
pub struct AdminSession(pub Authorized);

#[async_trait]
impl FromRequestParts<AppState> for AdminSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let authorized = Authorized::from_request_parts(parts, state).await?;
        if authorized.profile.role != Role::Admin {
            return Err(ApiError::forbidden("Acceso solo para administradores"));
        }
        Ok(Self(authorized))
    }
}

/// Caller with the lawyer role and an existing lawyer row
#[derive(Clone, Debug)]
pub struct LawyerSession {
    pub auth: Authorized,
    pub lawyer: Lawyer,
}

#[async_trait]
impl FromRequestParts<AppState> for LawyerSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let authorized = Authorized::from_request_parts(parts, state).await?;
        if authorized.profile.role != Role::Lawyer {
            return Err(ApiError::forbidden("Acceso solo para abogados"));
        }
        let Some(lawyer) = authorized.lawyer.clone() else {
            return Err(ApiError::not_found("No hay un perfil de abogado asociado"));
        };
        Ok(Self {
            auth: authorized,
            lawyer,
        })
    }
}

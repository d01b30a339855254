use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

use super::{normalize_email, ServiceError};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::{generate_jwt, Claims};
use crate::config::{BootstrapConfig, SecurityConfig};
use crate::database::models::{Identity, NewIdentity, Profile, Role};
use crate::database::SharedStore;

const INVALID_CREDENTIALS: &str = "Correo o contraseña incorrectos";

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    pub token: String,
    pub expires_in: u64,
    pub user: Identity,
    pub profile: Option<Profile>,
}

/// Admin account provisioned from the CLI or at startup
#[derive(Debug, Clone, Validate)]
pub struct NewAdmin {
    #[validate(email(message = "Correo electrónico inválido"))]
    pub email: String,
    #[validate(length(min = 6, message = "La contraseña debe tener al menos 6 caracteres"))]
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

pub struct AuthService {
    store: SharedStore,
}

impl AuthService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Check credentials and issue a session token
    pub async fn login(&self, request: LoginRequest, security: &SecurityConfig) -> Result<LoginOutcome, ServiceError> {
        let email = normalize_email(&request.email);
        let Some(identity) = self.store.find_identity_by_email(&email).await? else {
            warn!("Login attempt for unknown email {}", email);
            return Err(ServiceError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };

        if !verify_password(&request.password, &identity.password_hash)? {
            warn!("Login attempt with wrong password for {}", email);
            return Err(ServiceError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let claims = Claims::new(identity.id, identity.email.clone(), security.session_expiry_hours);
        let token = generate_jwt(&claims, security)?;
        let profile = self.store.profile(identity.id).await?;

        info!("User {} logged in", identity.id);
        Ok(LoginOutcome {
            token,
            expires_in: security.session_expiry_hours * 3600,
            user: identity,
            profile,
        })
    }

    pub async fn create_admin(&self, admin: NewAdmin) -> Result<Identity, ServiceError> {
        let admin = NewAdmin {
            email: normalize_email(&admin.email),
            first_name: admin.first_name.trim().to_string(),
            last_name: admin.last_name.trim().to_string(),
            ..admin
        };
        admin.validate()?;

        let identity = self
            .store
            .create_identity(NewIdentity {
                email: admin.email,
                password_hash: hash_password(&admin.password)?,
                first_name: admin.first_name,
                last_name: admin.last_name,
                role: Role::Admin,
            })
            .await?;

        info!("Created admin {} ({})", identity.id, identity.email);
        Ok(identity)
    }

    /// Provision the configured bootstrap admin unless that email already exists
    pub async fn ensure_admin(&self, bootstrap: &BootstrapConfig) -> Result<Option<Identity>, ServiceError> {
        let (Some(email), Some(password)) = (&bootstrap.admin_email, &bootstrap.admin_password) else {
            return Ok(None);
        };

        if self.store.find_identity_by_email(&normalize_email(email)).await?.is_some() {
            return Ok(None);
        }

        self.create_admin(NewAdmin {
            email: email.clone(),
            password: password.clone(),
            first_name: bootstrap.admin_first_name.clone(),
            last_name: bootstrap.admin_last_name.clone(),
        })
        .await
        .map(Some)
    }
}

pub mod auth_service;
pub mod lawyer_service;
pub mod request_service;

use std::collections::HashMap;

use thiserror::Error;
use uuid::Uuid;
use validator::ValidationErrors;

use crate::auth::JwtError;
use crate::database::models::Role;
use crate::database::StoreError;

pub use auth_service::{AuthService, LoginOutcome, LoginRequest, NewAdmin};
pub use lawyer_service::{CreateLawyer, LawyerService, UpdateLawyer};
pub use request_service::{RequestService, SubmitRequest};

/// Field name to human readable message
pub type FieldErrors = HashMap<String, String>;

/// The authenticated caller every privileged service call is authorized against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: Role,
    /// Own lawyer row, for callers with the lawyer role
    pub lawyer_id: Option<Uuid>,
}

impl Actor {
    pub fn admin(user_id: Uuid) -> Self {
        Self { user_id, role: Role::Admin, lawyer_id: None }
    }

    pub fn lawyer(user_id: Uuid, lawyer_id: Uuid) -> Self {
        Self { user_id, role: Role::Lawyer, lawyer_id: Some(lawyer_id) }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_admin(&self) -> Result<(), ServiceError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ServiceError::Forbidden("Solo un administrador puede realizar esta acción".to_string()))
        }
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{message}")]
    Validation { message: String, field_errors: FieldErrors },

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// A multi-step operation stopped after some steps were already applied
    #[error("Operación incompleta en el paso '{step}': {detail}")]
    PartialFailure { step: &'static str, detail: String },

    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error(transparent)]
    Token(#[from] JwtError),
}

impl From<ValidationErrors> for ServiceError {
    fn from(errors: ValidationErrors) -> Self {
        let field_errors = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let message = errs
                    .iter()
                    .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| "Valor inválido".to_string());
                (field.to_string(), message)
            })
            .collect();

        ServiceError::Validation {
            message: "Revisa los datos del formulario".to_string(),
            field_errors,
        }
    }
}

impl From<argon2::password_hash::Error> for ServiceError {
    fn from(err: argon2::password_hash::Error) -> Self {
        ServiceError::Hash(err.to_string())
    }
}

/// Trim a free-text value, mapping blank input to `None`
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

use serde::Deserialize;
use tracing::{error, info};
use uuid::Uuid;
use validator::Validate;

use super::{normalize_email, Actor, ServiceError};
use crate::database::models::{ContactRequest, NewContactRequest, RequestStatus, RequestWithLawyer, Role};
use crate::database::SharedStore;

/// Visitor contact form
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitRequest {
    pub lawyer_id: Uuid,
    #[validate(length(min = 2, message = "El nombre debe tener al menos 2 caracteres"))]
    pub visitor_name: String,
    #[validate(email(message = "Correo electrónico inválido"))]
    pub visitor_email: String,
    #[validate(length(min = 10, max = 500, message = "El mensaje debe tener entre 10 y 500 caracteres"))]
    pub message: String,
}

pub struct RequestService {
    store: SharedStore,
}

impl RequestService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Record a visitor's message for an enabled lawyer. Starts as pending.
    pub async fn submit(&self, input: SubmitRequest) -> Result<ContactRequest, ServiceError> {
        let input = SubmitRequest {
            lawyer_id: input.lawyer_id,
            visitor_name: input.visitor_name.trim().to_string(),
            visitor_email: normalize_email(&input.visitor_email),
            message: input.message.trim().to_string(),
        };
        input.validate()?;

        match self.store.lawyer(input.lawyer_id).await? {
            Some(lawyer) if lawyer.enabled => {}
            _ => return Err(ServiceError::NotFound("Abogado no encontrado".to_string())),
        }

        let request = self
            .store
            .insert_request(NewContactRequest {
                lawyer_id: input.lawyer_id,
                visitor_name: input.visitor_name,
                visitor_email: input.visitor_email,
                message: input.message,
            })
            .await
            .map_err(|e| {
                error!("Failed to store contact request: {}", e);
                e
            })?;

        info!("Contact request {} for lawyer {}", request.id, request.lawyer_id);
        Ok(request)
    }

    /// Requests addressed to the calling lawyer, newest first
    pub async fn for_lawyer(&self, actor: &Actor) -> Result<Vec<ContactRequest>, ServiceError> {
        let lawyer_id = match (actor.role, actor.lawyer_id) {
            (Role::Lawyer, Some(id)) => id,
            (Role::Lawyer, None) => {
                return Err(ServiceError::NotFound("No hay un perfil de abogado asociado".to_string()))
            }
            (Role::Admin, _) => {
                return Err(ServiceError::Forbidden("Solo disponible para abogados".to_string()))
            }
        };
        Ok(self.store.requests_for_lawyer(lawyer_id).await?)
    }

    /// Every request with its lawyer's name and email, newest first
    pub async fn all(&self, actor: &Actor) -> Result<Vec<RequestWithLawyer>, ServiceError> {
        actor.require_admin()?;
        Ok(self.store.all_requests().await?)
    }

    /// Either status may be set at any time. Lawyers may only touch their own requests.
    pub async fn set_status(
        &self,
        actor: &Actor,
        id: Uuid,
        status: RequestStatus,
    ) -> Result<ContactRequest, ServiceError> {
        let request = self
            .store
            .request(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Solicitud no encontrada".to_string()))?;

        let allowed = actor.is_admin() || actor.lawyer_id == Some(request.lawyer_id);
        if !allowed {
            return Err(ServiceError::Forbidden(
                "No puedes modificar solicitudes de otro abogado".to_string(),
            ));
        }

        let updated = self.store.set_request_status(id, status).await.map_err(|e| {
            error!("Failed to update request {}: {}", id, e);
            e
        })?;
        info!("Request {} set to {} by {}", id, status.as_str(), actor.user_id);
        Ok(updated)
    }
}

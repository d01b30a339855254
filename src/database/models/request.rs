use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

/// Contact request status. Either value may be set at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    #[serde(rename = "pendiente")]
    Pending,
    #[serde(rename = "cerrado")]
    Closed,
}

#[derive(Debug, Error)]
#[error("unknown request status: {0}")]
pub struct UnknownStatus(pub String);

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pendiente",
            RequestStatus::Closed => "cerrado",
        }
    }
}

impl TryFrom<String> for RequestStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "pendiente" => Ok(RequestStatus::Pending),
            "cerrado" => Ok(RequestStatus::Closed),
            _ => Err(UnknownStatus(value)),
        }
    }
}

/// Visitor-submitted contact message directed at one lawyer
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ContactRequest {
    pub id: Uuid,
    pub lawyer_id: Uuid,
    pub visitor_name: String,
    pub visitor_email: String,
    pub message: String,
    #[sqlx(try_from = "String")]
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewContactRequest {
    pub lawyer_id: Uuid,
    pub visitor_name: String,
    pub visitor_email: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LawyerSummary {
    pub full_name: String,
    pub email: String,
}

/// Admin view of a request, joined with the owning lawyer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestWithLawyer {
    #[serde(flatten)]
    pub request: ContactRequest,
    pub lawyer: Option<LawyerSummary>,
}

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use super::models::{
    ContactRequest, Identity, Lawyer, LawyerChanges, NewContactRequest, NewIdentity, NewLawyer,
    Profile, RequestStatus, RequestWithLawyer,
};

/// Errors returned by every backing store call
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Broken reference: {0}")]
    Reference(String),

    #[error("Store not configured: {0} is missing")]
    Config(&'static str),

    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let constraint = db_err.constraint().unwrap_or("constraint").to_string();
            if db_err.is_unique_violation() {
                return StoreError::Conflict(constraint);
            }
            if db_err.is_foreign_key_violation() {
                return StoreError::Reference(constraint);
            }
        }
        StoreError::Sqlx(err)
    }
}

/// Authentication side of the backing store
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Create the identity and its profile atomically
    async fn create_identity(&self, new: NewIdentity) -> Result<Identity, StoreError>;

    async fn find_identity(&self, id: Uuid) -> Result<Option<Identity>, StoreError>;

    async fn find_identity_by_email(&self, email: &str) -> Result<Option<Identity>, StoreError>;

    async fn update_identity_email(&self, id: Uuid, email: &str) -> Result<(), StoreError>;

    /// Delete the identity together with its profile, lawyer row and that lawyer's requests
    async fn delete_identity(&self, id: Uuid) -> Result<(), StoreError>;
}

/// Row CRUD over profiles, lawyers and requests
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    async fn profile(&self, id: Uuid) -> Result<Option<Profile>, StoreError>;

    async fn update_profile_name(&self, id: Uuid, first_name: &str, last_name: &str) -> Result<(), StoreError>;

    /// Enabled lawyers whose name, commune or specialty contains `query` (case-insensitive)
    async fn search_lawyers(&self, query: Option<&str>) -> Result<Vec<Lawyer>, StoreError>;

    /// Every lawyer, newest first
    async fn list_lawyers(&self) -> Result<Vec<Lawyer>, StoreError>;

    async fn lawyer(&self, id: Uuid) -> Result<Option<Lawyer>, StoreError>;

    async fn lawyer_by_user(&self, user_id: Uuid) -> Result<Option<Lawyer>, StoreError>;

    async fn insert_lawyer(&self, new: NewLawyer) -> Result<Lawyer, StoreError>;

    async fn update_lawyer(&self, id: Uuid, changes: &LawyerChanges) -> Result<Lawyer, StoreError>;

    async fn set_lawyer_enabled(&self, id: Uuid, enabled: bool) -> Result<Lawyer, StoreError>;

    async fn insert_request(&self, new: NewContactRequest) -> Result<ContactRequest, StoreError>;

    async fn request(&self, id: Uuid) -> Result<Option<ContactRequest>, StoreError>;

    /// Requests addressed to one lawyer, newest first
    async fn requests_for_lawyer(&self, lawyer_id: Uuid) -> Result<Vec<ContactRequest>, StoreError>;

    /// Every request joined with its lawyer's name and email, newest first
    async fn all_requests(&self) -> Result<Vec<RequestWithLawyer>, StoreError>;

    async fn set_request_status(&self, id: Uuid, status: RequestStatus) -> Result<ContactRequest, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}

pub trait Store: IdentityStore + DirectoryStore {}

impl<T: IdentityStore + DirectoryStore> Store for T {}

pub type SharedStore = Arc<dyn Store>;

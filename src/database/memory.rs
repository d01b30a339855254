use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{
    ContactRequest, Identity, Lawyer, LawyerChanges, LawyerSummary, NewContactRequest, NewIdentity,
    NewLawyer, Profile, RequestStatus, RequestWithLawyer,
};
use super::store::{DirectoryStore, IdentityStore, StoreError};

/// In-process backing store. Enforces the same unique and reference
/// constraints as the postgres schema. Rows are kept in insertion order.
#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<MemoryData>,
}

#[derive(Default)]
struct MemoryData {
    identities: Vec<Identity>,
    profiles: Vec<Profile>,
    lawyers: Vec<Lawyer>,
    requests: Vec<ContactRequest>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MemoryData {
    fn lawyer_mut(&mut self, id: Uuid) -> Result<&mut Lawyer, StoreError> {
        self.lawyers
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("lawyer {}", id)))
    }

    fn rut_taken(&self, rut: &str, except: Option<Uuid>) -> bool {
        self.lawyers
            .iter()
            .any(|l| l.rut == rut && Some(l.id) != except)
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn create_identity(&self, new: NewIdentity) -> Result<Identity, StoreError> {
        let mut data = self.data.write().await;
        if data.identities.iter().any(|i| i.email == new.email) {
            return Err(StoreError::Conflict("users_email_key".to_string()));
        }

        let identity = Identity {
            id: Uuid::new_v4(),
            email: new.email,
            password_hash: new.password_hash,
            created_at: Utc::now(),
        };
        data.profiles.push(Profile {
            id: identity.id,
            first_name: new.first_name,
            last_name: new.last_name,
            role: new.role,
        });
        data.identities.push(identity.clone());
        Ok(identity)
    }

    async fn find_identity(&self, id: Uuid) -> Result<Option<Identity>, StoreError> {
        let data = self.data.read().await;
        Ok(data.identities.iter().find(|i| i.id == id).cloned())
    }

    async fn find_identity_by_email(&self, email: &str) -> Result<Option<Identity>, StoreError> {
        let data = self.data.read().await;
        Ok(data.identities.iter().find(|i| i.email == email).cloned())
    }

    async fn update_identity_email(&self, id: Uuid, email: &str) -> Result<(), StoreError> {
        let mut data = self.data.write().await;
        if data.identities.iter().any(|i| i.email == email && i.id != id) {
            return Err(StoreError::Conflict("users_email_key".to_string()));
        }
        let identity = data
            .identities
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("user {}", id)))?;
        identity.email = email.to_string();
        Ok(())
    }

    async fn delete_identity(&self, id: Uuid) -> Result<(), StoreError> {
        let mut data = self.data.write().await;
        if !data.identities.iter().any(|i| i.id == id) {
            return Err(StoreError::NotFound(format!("user {}", id)));
        }

        let lawyer_ids: Vec<Uuid> = data
            .lawyers
            .iter()
            .filter(|l| l.user_id == id)
            .map(|l| l.id)
            .collect();
        data.requests.retain(|r| !lawyer_ids.contains(&r.lawyer_id));
        data.lawyers.retain(|l| l.user_id != id);
        data.profiles.retain(|p| p.id != id);
        data.identities.retain(|i| i.id != id);
        Ok(())
    }
}

#[async_trait]
impl DirectoryStore for MemoryStore {
    async fn profile(&self, id: Uuid) -> Result<Option<Profile>, StoreError> {
        let data = self.data.read().await;
        Ok(data.profiles.iter().find(|p| p.id == id).cloned())
    }

    async fn update_profile_name(&self, id: Uuid, first_name: &str, last_name: &str) -> Result<(), StoreError> {
        let mut data = self.data.write().await;
        let profile = data
            .profiles
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("profile {}", id)))?;
        profile.first_name = first_name.to_string();
        profile.last_name = last_name.to_string();
        Ok(())
    }

    async fn search_lawyers(&self, query: Option<&str>) -> Result<Vec<Lawyer>, StoreError> {
        let data = self.data.read().await;
        let needle = query.map(str::to_lowercase);
        let mut found: Vec<Lawyer> = data
            .lawyers
            .iter()
            .filter(|l| l.enabled)
            .filter(|l| needle.as_deref().map_or(true, |n| l.matches(n)))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.full_name.cmp(&b.full_name).then(a.id.cmp(&b.id)));
        Ok(found)
    }

    async fn list_lawyers(&self) -> Result<Vec<Lawyer>, StoreError> {
        let data = self.data.read().await;
        Ok(data.lawyers.iter().rev().cloned().collect())
    }

    async fn lawyer(&self, id: Uuid) -> Result<Option<Lawyer>, StoreError> {
        let data = self.data.read().await;
        Ok(data.lawyers.iter().find(|l| l.id == id).cloned())
    }

    async fn lawyer_by_user(&self, user_id: Uuid) -> Result<Option<Lawyer>, StoreError> {
        let data = self.data.read().await;
        Ok(data.lawyers.iter().find(|l| l.user_id == user_id).cloned())
    }

    async fn insert_lawyer(&self, new: NewLawyer) -> Result<Lawyer, StoreError> {
        let mut data = self.data.write().await;
        if !data.profiles.iter().any(|p| p.id == new.user_id) {
            return Err(StoreError::Reference("lawyers_user_id_fkey".to_string()));
        }
        if data.lawyers.iter().any(|l| l.user_id == new.user_id) {
            return Err(StoreError::Conflict("lawyers_user_id_key".to_string()));
        }
        if data.rut_taken(&new.rut, None) {
            return Err(StoreError::Conflict("lawyers_rut_key".to_string()));
        }

        let lawyer = Lawyer {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            full_name: new.full_name,
            rut: new.rut,
            commune: new.commune,
            specialty: new.specialty,
            phone: new.phone,
            email: new.email,
            enabled: true,
            created_at: Utc::now(),
        };
        data.lawyers.push(lawyer.clone());
        Ok(lawyer)
    }

    async fn update_lawyer(&self, id: Uuid, changes: &LawyerChanges) -> Result<Lawyer, StoreError> {
        let mut data = self.data.write().await;
        if data.rut_taken(&changes.rut, Some(id)) {
            return Err(StoreError::Conflict("lawyers_rut_key".to_string()));
        }
        let lawyer = data.lawyer_mut(id)?;
        lawyer.full_name = changes.full_name.clone();
        lawyer.rut = changes.rut.clone();
        lawyer.commune = changes.commune.clone();
        lawyer.specialty = changes.specialty.clone();
        lawyer.phone = changes.phone.clone();
        lawyer.email = changes.email.clone();
        Ok(lawyer.clone())
    }

    async fn set_lawyer_enabled(&self, id: Uuid, enabled: bool) -> Result<Lawyer, StoreError> {
        let mut data = self.data.write().await;
        let lawyer = data.lawyer_mut(id)?;
        lawyer.enabled = enabled;
        Ok(lawyer.clone())
    }

    async fn insert_request(&self, new: NewContactRequest) -> Result<ContactRequest, StoreError> {
        let mut data = self.data.write().await;
        if !data.lawyers.iter().any(|l| l.id == new.lawyer_id) {
            return Err(StoreError::Reference("requests_lawyer_id_fkey".to_string()));
        }

        let request = ContactRequest {
            id: Uuid::new_v4(),
            lawyer_id: new.lawyer_id,
            visitor_name: new.visitor_name,
            visitor_email: new.visitor_email,
            message: new.message,
            status: RequestStatus::Pending,
            created_at: Utc::now(),
        };
        data.requests.push(request.clone());
        Ok(request)
    }

    async fn request(&self, id: Uuid) -> Result<Option<ContactRequest>, StoreError> {
        let data = self.data.read().await;
        Ok(data.requests.iter().find(|r| r.id == id).cloned())
    }

    async fn requests_for_lawyer(&self, lawyer_id: Uuid) -> Result<Vec<ContactRequest>, StoreError> {
        let data = self.data.read().await;
        Ok(data
            .requests
            .iter()
            .rev()
            .filter(|r| r.lawyer_id == lawyer_id)
            .cloned()
            .collect())
    }

    async fn all_requests(&self) -> Result<Vec<RequestWithLawyer>, StoreError> {
        let data = self.data.read().await;
        Ok(data
            .requests
            .iter()
            .rev()
            .map(|r| RequestWithLawyer {
                request: r.clone(),
                lawyer: data
                    .lawyers
                    .iter()
                    .find(|l| l.id == r.lawyer_id)
                    .map(|l| LawyerSummary {
                        full_name: l.full_name.clone(),
                        email: l.email.clone(),
                    }),
            })
            .collect())
    }

    async fn set_request_status(&self, id: Uuid, status: RequestStatus) -> Result<ContactRequest, StoreError> {
        let mut data = self.data.write().await;
        let request = data
            .requests
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("request {}", id)))?;
        request.status = status;
        Ok(request.clone())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

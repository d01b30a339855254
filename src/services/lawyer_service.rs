use serde::Deserialize;
use tracing::{error, info, warn};
use uuid::Uuid;
use validator::Validate;

use super::{non_blank, normalize_email, Actor, ServiceError};
use crate::auth::password::hash_password;
use crate::database::models::{
    split_full_name, DirectoryEntry, Lawyer, LawyerChanges, NewIdentity, NewLawyer, Role,
};
use crate::database::SharedStore;

/// Admin form for a new lawyer account
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateLawyer {
    #[validate(length(min = 2, message = "El nombre debe tener al menos 2 caracteres"))]
    pub full_name: String,
    #[validate(length(min = 9, max = 12, message = "El RUT debe tener entre 9 y 12 caracteres"))]
    pub rut: String,
    #[validate(length(min = 2, message = "La comuna debe tener al menos 2 caracteres"))]
    pub commune: String,
    #[validate(length(min = 2, message = "La especialidad debe tener al menos 2 caracteres"))]
    pub specialty: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[validate(email(message = "Correo electrónico inválido"))]
    pub email: String,
    #[validate(length(min = 6, message = "La contraseña debe tener al menos 6 caracteres"))]
    pub password: String,
}

/// Admin form for editing a lawyer. Every field is replaced.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateLawyer {
    #[validate(length(min = 2, message = "El nombre debe tener al menos 2 caracteres"))]
    pub full_name: String,
    #[validate(length(min = 9, max = 12, message = "El RUT debe tener entre 9 y 12 caracteres"))]
    pub rut: String,
    #[validate(length(min = 2, message = "La comuna debe tener al menos 2 caracteres"))]
    pub commune: String,
    #[validate(length(min = 2, message = "La especialidad debe tener al menos 2 caracteres"))]
    pub specialty: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[validate(email(message = "Correo electrónico inválido"))]
    pub email: String,
}

impl CreateLawyer {
    fn normalized(self) -> Self {
        Self {
            full_name: self.full_name.trim().to_string(),
            rut: self.rut.trim().to_string(),
            commune: self.commune.trim().to_string(),
            specialty: self.specialty.trim().to_string(),
            phone: non_blank(self.phone),
            email: normalize_email(&self.email),
            password: self.password,
        }
    }
}

impl UpdateLawyer {
    fn normalized(self) -> Self {
        Self {
            full_name: self.full_name.trim().to_string(),
            rut: self.rut.trim().to_string(),
            commune: self.commune.trim().to_string(),
            specialty: self.specialty.trim().to_string(),
            phone: non_blank(self.phone),
            email: normalize_email(&self.email),
        }
    }
}

impl From<UpdateLawyer> for LawyerChanges {
    fn from(form: UpdateLawyer) -> Self {
        LawyerChanges {
            full_name: form.full_name,
            rut: form.rut,
            commune: form.commune,
            specialty: form.specialty,
            phone: form.phone,
            email: form.email,
        }
    }
}

/// Directory search and admin-side lawyer account management
pub struct LawyerService {
    store: SharedStore,
}

impl LawyerService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Public directory search. A blank query lists every enabled lawyer.
    pub async fn search(&self, query: Option<&str>) -> Result<Vec<DirectoryEntry>, ServiceError> {
        let query = query.map(str::trim).filter(|q| !q.is_empty());
        let lawyers = self.store.search_lawyers(query).await.map_err(|e| {
            error!("Directory search failed: {}", e);
            e
        })?;
        Ok(lawyers.into_iter().map(DirectoryEntry::from).collect())
    }

    /// A single enabled lawyer as shown to visitors
    pub async fn public_entry(&self, id: Uuid) -> Result<DirectoryEntry, ServiceError> {
        match self.store.lawyer(id).await? {
            Some(lawyer) if lawyer.enabled => Ok(lawyer.into()),
            _ => Err(ServiceError::NotFound("Abogado no encontrado".to_string())),
        }
    }

    pub async fn list(&self, actor: &Actor) -> Result<Vec<Lawyer>, ServiceError> {
        actor.require_admin()?;
        Ok(self.store.list_lawyers().await?)
    }

    pub async fn get(&self, actor: &Actor, id: Uuid) -> Result<Lawyer, ServiceError> {
        actor.require_admin()?;
        self.find(id).await
    }

    /// The caller's own lawyer record
    pub async fn own(&self, actor: &Actor) -> Result<Lawyer, ServiceError> {
        let id = actor
            .lawyer_id
            .ok_or_else(|| ServiceError::NotFound("No hay un perfil de abogado asociado".to_string()))?;
        self.find(id).await
    }

    /// Provision the identity, then the lawyer row. A failed row insert
    /// deletes the identity again so no orphaned login remains.
    pub async fn create(&self, actor: &Actor, input: CreateLawyer) -> Result<Lawyer, ServiceError> {
        actor.require_admin()?;
        let input = input.normalized();
        input.validate()?;

        let password_hash = hash_password(&input.password)?;
        let (first_name, last_name) = split_full_name(&input.full_name);

        let identity = self
            .store
            .create_identity(NewIdentity {
                email: input.email.clone(),
                password_hash,
                first_name,
                last_name,
                role: Role::Lawyer,
            })
            .await
            .map_err(|e| {
                error!("Failed to create identity for {}: {}", input.email, e);
                e
            })?;

        let inserted = self
            .store
            .insert_lawyer(NewLawyer {
                user_id: identity.id,
                full_name: input.full_name,
                rut: input.rut,
                commune: input.commune,
                specialty: input.specialty,
                phone: input.phone,
                email: input.email,
            })
            .await;

        match inserted {
            Ok(lawyer) => {
                info!("Created lawyer {} for user {}", lawyer.id, identity.id);
                Ok(lawyer)
            }
            Err(e) => {
                warn!("Lawyer insert failed, removing identity {}: {}", identity.id, e);
                if let Err(rollback) = self.store.delete_identity(identity.id).await {
                    error!("Failed to remove identity {} after insert failure: {}", identity.id, rollback);
                }
                Err(e.into())
            }
        }
    }

    /// Update the lawyer row, then the identity email and profile name when
    /// they changed. Steps already applied are kept if a later one fails.
    pub async fn update(&self, actor: &Actor, id: Uuid, input: UpdateLawyer) -> Result<Lawyer, ServiceError> {
        actor.require_admin()?;
        let input = input.normalized();
        input.validate()?;
        let changes = LawyerChanges::from(input);

        let current = self.find(id).await?;
        let updated = self.store.update_lawyer(id, &changes).await.map_err(|e| {
            error!("Failed to update lawyer {}: {}", id, e);
            e
        })?;

        if current.email != changes.email {
            if let Err(e) = self.store.update_identity_email(current.user_id, &changes.email).await {
                error!("Failed to update email for user {}: {}", current.user_id, e);
                return Err(ServiceError::PartialFailure {
                    step: "email",
                    detail: e.to_string(),
                });
            }
        }

        let (first_name, last_name) = split_full_name(&changes.full_name);
        let profile = self.store.profile(current.user_id).await.map_err(|e| {
            error!("Failed to load profile {}: {}", current.user_id, e);
            ServiceError::PartialFailure {
                step: "profile",
                detail: e.to_string(),
            }
        })?;

        match profile {
            Some(p) if p.first_name != first_name || p.last_name != last_name => {
                if let Err(e) = self
                    .store
                    .update_profile_name(current.user_id, &first_name, &last_name)
                    .await
                {
                    error!("Failed to update profile {}: {}", current.user_id, e);
                    return Err(ServiceError::PartialFailure {
                        step: "profile",
                        detail: e.to_string(),
                    });
                }
            }
            Some(_) => {}
            None => warn!("Lawyer {} has no profile", id),
        }

        info!("Updated lawyer {}", id);
        Ok(updated)
    }

    /// Flip directory visibility; nothing else changes
    pub async fn set_enabled(&self, actor: &Actor, id: Uuid, enabled: bool) -> Result<Lawyer, ServiceError> {
        actor.require_admin()?;
        let lawyer = self.store.set_lawyer_enabled(id, enabled).await?;
        info!("Lawyer {} enabled={}", id, enabled);
        Ok(lawyer)
    }

    /// Remove the lawyer's identity with every dependent row, then check the
    /// lawyer row is really gone.
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<(), ServiceError> {
        actor.require_admin()?;
        let lawyer = self.find(id).await?;

        self.store.delete_identity(lawyer.user_id).await.map_err(|e| {
            error!("Failed to delete user {} of lawyer {}: {}", lawyer.user_id, id, e);
            e
        })?;

        if self.store.lawyer(id).await?.is_some() {
            error!("Lawyer {} still present after deleting user {}", id, lawyer.user_id);
            return Err(ServiceError::PartialFailure {
                step: "verify",
                detail: "el registro del abogado no fue eliminado".to_string(),
            });
        }

        info!("Deleted lawyer {} and user {}", id, lawyer.user_id);
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Lawyer, ServiceError> {
        self.store
            .lawyer(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Abogado no encontrado".to_string()))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::database::{DirectoryStore, IdentityStore, MemoryStore};

    pub(crate) fn lawyer_form(full_name: &str, email: &str, rut: &str, commune: &str) -> CreateLawyer {
        CreateLawyer {
            full_name: full_name.to_string(),
            rut: rut.to_string(),
            commune: commune.to_string(),
            specialty: "Derecho Civil".to_string(),
            phone: Some("  ".to_string()),
            email: email.to_string(),
            password: "secreto1".to_string(),
        }
    }

    fn admin() -> Actor {
        Actor::admin(Uuid::new_v4())
    }

    fn service() -> (LawyerService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (LawyerService::new(store.clone()), store)
    }

    #[tokio::test]
    async fn create_provisions_identity_profile_and_row() {
        let (service, store) = service();
        let lawyer = service
            .create(&admin(), lawyer_form("Ana María Rojas", " Ana@Example.cl ", "12.345.678-9", "Rancagua"))
            .await
            .unwrap();

        assert!(lawyer.enabled);
        assert_eq!(lawyer.email, "ana@example.cl");
        assert_eq!(lawyer.phone, None);

        let identity = store.find_identity_by_email("ana@example.cl").await.unwrap().unwrap();
        assert_eq!(identity.id, lawyer.user_id);
        let profile = store.profile(identity.id).await.unwrap().unwrap();
        assert_eq!(profile.role, Role::Lawyer);
        assert_eq!(profile.first_name, "Ana");
        assert_eq!(profile.last_name, "María Rojas");
    }

    #[tokio::test]
    async fn failed_row_insert_removes_identity() {
        let (service, store) = service();
        service
            .create(&admin(), lawyer_form("Ana Rojas", "ana@example.cl", "12.345.678-9", "Rancagua"))
            .await
            .unwrap();

        let err = service
            .create(&admin(), lawyer_form("Luis Soto", "luis@example.cl", "12.345.678-9", "Machalí"))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Store(crate::database::StoreError::Conflict(_))));
        assert!(store.find_identity_by_email("luis@example.cl").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn invalid_form_reports_fields() {
        let (service, _) = service();
        let mut form = lawyer_form("A", "not-an-email", "123", "Rancagua");
        form.password = "abc".to_string();

        match service.create(&admin(), form).await {
            Err(ServiceError::Validation { field_errors, .. }) => {
                for field in ["full_name", "email", "rut", "password"] {
                    assert!(field_errors.contains_key(field), "missing {field}");
                }
                assert!(!field_errors.contains_key("commune"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn lawyers_cannot_manage_lawyers() {
        let (service, _) = service();
        let actor = Actor::lawyer(Uuid::new_v4(), Uuid::new_v4());
        let err = service
            .create(&actor, lawyer_form("Ana Rojas", "ana@example.cl", "12.345.678-9", "Rancagua"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
        assert!(matches!(service.list(&actor).await, Err(ServiceError::Forbidden(_))));
    }

    #[tokio::test]
    async fn search_matches_three_fields_and_hides_disabled() {
        let (service, _) = service();
        let a = service
            .create(&admin(), lawyer_form("Ana Rojas", "ana@example.cl", "11.111.111-1", "Rancagua"))
            .await
            .unwrap();
        let b = service
            .create(&admin(), lawyer_form("Rancagüino Pérez", "rp@example.cl", "22.222.222-2", "Machalí"))
            .await
            .unwrap();
        service
            .create(&admin(), lawyer_form("Beatriz Lagos", "bl@example.cl", "33.333.333-3", "RANCAGUA"))
            .await
            .unwrap();
        let hidden = service
            .create(&admin(), lawyer_form("Carla Vera", "cv@example.cl", "44.444.444-4", "Rancagua"))
            .await
            .unwrap();
        service.set_enabled(&admin(), hidden.id, false).await.unwrap();

        let found = service.search(Some("rancagua")).await.unwrap();
        let names: Vec<_> = found.iter().map(|e| e.full_name.as_str()).collect();
        assert_eq!(names, vec!["Ana Rojas", "Beatriz Lagos"]);
        assert!(found.iter().all(|e| e.id != b.id && e.id != hidden.id));
        assert!(found.iter().any(|e| e.id == a.id));

        assert_eq!(service.search(Some("   ")).await.unwrap().len(), 3);
        assert_eq!(service.search(None).await.unwrap().len(), 3);
        assert!(service.search(Some("%")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn toggle_changes_only_visibility() {
        let (service, _) = service();
        let lawyer = service
            .create(&admin(), lawyer_form("Ana Rojas", "ana@example.cl", "12.345.678-9", "Rancagua"))
            .await
            .unwrap();

        let disabled = service.set_enabled(&admin(), lawyer.id, false).await.unwrap();
        assert!(!disabled.enabled);
        assert_eq!(Lawyer { enabled: true, ..disabled.clone() }, lawyer);
        assert!(service.search(Some("Rancagua")).await.unwrap().is_empty());
        assert!(matches!(service.public_entry(lawyer.id).await, Err(ServiceError::NotFound(_))));

        service.set_enabled(&admin(), lawyer.id, true).await.unwrap();
        assert_eq!(service.search(Some("Rancagua")).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_syncs_email_and_profile_name() {
        let (service, store) = service();
        let lawyer = service
            .create(&admin(), lawyer_form("Ana Rojas", "ana@example.cl", "12.345.678-9", "Rancagua"))
            .await
            .unwrap();

        let updated = service
            .update(
                &admin(),
                lawyer.id,
                UpdateLawyer {
                    full_name: "Ana Luisa Rojas".to_string(),
                    rut: "12.345.678-9".to_string(),
                    commune: "Machalí".to_string(),
                    specialty: "Familia".to_string(),
                    phone: Some("+56 9 1111 2222".to_string()),
                    email: "ana.rojas@example.cl".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.commune, "Machalí");
        assert!(updated.enabled);
        let identity = store.find_identity(lawyer.user_id).await.unwrap().unwrap();
        assert_eq!(identity.email, "ana.rojas@example.cl");
        let profile = store.profile(lawyer.user_id).await.unwrap().unwrap();
        assert_eq!(profile.first_name, "Ana");
        assert_eq!(profile.last_name, "Luisa Rojas");
    }

    #[tokio::test]
    async fn update_keeps_row_when_email_step_fails() {
        let (service, store) = service();
        service
            .create(&admin(), lawyer_form("Luis Soto", "luis@example.cl", "11.111.111-1", "Machalí"))
            .await
            .unwrap();
        let lawyer = service
            .create(&admin(), lawyer_form("Ana Rojas", "ana@example.cl", "12.345.678-9", "Rancagua"))
            .await
            .unwrap();

        let err = service
            .update(
                &admin(),
                lawyer.id,
                UpdateLawyer {
                    full_name: "Ana Rojas".to_string(),
                    rut: "12.345.678-9".to_string(),
                    commune: "Graneros".to_string(),
                    specialty: "Derecho Civil".to_string(),
                    phone: None,
                    email: "luis@example.cl".to_string(),
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::PartialFailure { step: "email", .. }));
        let row = store.lawyer(lawyer.id).await.unwrap().unwrap();
        assert_eq!(row.commune, "Graneros");
        let identity = store.find_identity(lawyer.user_id).await.unwrap().unwrap();
        assert_eq!(identity.email, "ana@example.cl");
    }

    #[tokio::test]
    async fn delete_removes_everything() {
        let (service, store) = service();
        let lawyer = service
            .create(&admin(), lawyer_form("Ana Rojas", "ana@example.cl", "12.345.678-9", "Rancagua"))
            .await
            .unwrap();

        service.delete(&admin(), lawyer.id).await.unwrap();

        assert!(store.lawyer(lawyer.id).await.unwrap().is_none());
        assert!(store.find_identity(lawyer.user_id).await.unwrap().is_none());
        assert!(matches!(service.delete(&admin(), lawyer.id).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let (service, _) = service();
        service
            .create(&admin(), lawyer_form("Ana Rojas", "ana@example.cl", "11.111.111-1", "Rancagua"))
            .await
            .unwrap();
        service
            .create(&admin(), lawyer_form("Luis Soto", "luis@example.cl", "22.222.222-2", "Machalí"))
            .await
            .unwrap();

        let names: Vec<_> = service
            .list(&admin())
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.full_name)
            .collect();
        assert_eq!(names, vec!["Luis Soto", "Ana Rojas"]);
    }
}

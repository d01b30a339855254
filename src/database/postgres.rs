use async_trait::async_trait;
use chrono::Utc;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::models::{
    ContactRequest, Identity, Lawyer, LawyerChanges, LawyerSummary, NewContactRequest, NewIdentity,
    NewLawyer, Profile, RequestStatus, RequestWithLawyer,
};
use super::store::{DirectoryStore, IdentityStore, StoreError};

const LAWYER_COLUMNS: &str =
    "id, user_id, full_name, rut, commune, specialty, phone, email, enabled, created_at";

const REQUEST_COLUMNS: &str =
    "id, lawyer_id, visitor_name, visitor_email, message, status, created_at";

/// Backing store over the postgres schema in `migrations/`
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Escape LIKE metacharacters so the query matches literally
pub fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[derive(FromRow)]
struct AdminRequestRow {
    #[sqlx(flatten)]
    request: ContactRequest,
    lawyer_full_name: Option<String>,
    lawyer_email: Option<String>,
}

impl From<AdminRequestRow> for RequestWithLawyer {
    fn from(row: AdminRequestRow) -> Self {
        let lawyer = match (row.lawyer_full_name, row.lawyer_email) {
            (Some(full_name), Some(email)) => Some(LawyerSummary { full_name, email }),
            _ => None,
        };
        Self {
            request: row.request,
            lawyer,
        }
    }
}

#[async_trait]
impl IdentityStore for PgStore {
    async fn create_identity(&self, new: NewIdentity) -> Result<Identity, StoreError> {
        let mut tx = self.pool.begin().await?;

        let identity = sqlx::query_as::<_, Identity>(
            "INSERT INTO users (id, email, password_hash, created_at)
             VALUES ($1, $2, $3, $4)
             RETURNING id, email, password_hash, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO profiles (id, first_name, last_name, role) VALUES ($1, $2, $3, $4)")
            .bind(identity.id)
            .bind(&new.first_name)
            .bind(&new.last_name)
            .bind(new.role.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(identity)
    }

    async fn find_identity(&self, id: Uuid) -> Result<Option<Identity>, StoreError> {
        let identity = sqlx::query_as::<_, Identity>(
            "SELECT id, email, password_hash, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(identity)
    }

    async fn find_identity_by_email(&self, email: &str) -> Result<Option<Identity>, StoreError> {
        let identity = sqlx::query_as::<_, Identity>(
            "SELECT id, email, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(identity)
    }

    async fn update_identity_email(&self, id: Uuid, email: &str) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE users SET email = $2 WHERE id = $1")
            .bind(id)
            .bind(email)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("user {}", id)));
        }
        Ok(())
    }

    async fn delete_identity(&self, id: Uuid) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM requests WHERE lawyer_id IN (SELECT id FROM lawyers WHERE user_id = $1)")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM lawyers WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(StoreError::NotFound(format!("user {}", id)));
        }

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl DirectoryStore for PgStore {
    async fn profile(&self, id: Uuid) -> Result<Option<Profile>, StoreError> {
        let profile = sqlx::query_as::<_, Profile>(
            "SELECT id, first_name, last_name, role FROM profiles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    async fn update_profile_name(&self, id: Uuid, first_name: &str, last_name: &str) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE profiles SET first_name = $2, last_name = $3 WHERE id = $1")
            .bind(id)
            .bind(first_name)
            .bind(last_name)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("profile {}", id)));
        }
        Ok(())
    }

    async fn search_lawyers(&self, query: Option<&str>) -> Result<Vec<Lawyer>, StoreError> {
        let lawyers = match query {
            Some(q) => {
                let pattern = format!("%{}%", escape_like(q));
                sqlx::query_as::<_, Lawyer>(&format!(
                    "SELECT {LAWYER_COLUMNS} FROM lawyers
                     WHERE enabled = true
                       AND (full_name ILIKE $1 OR commune ILIKE $1 OR specialty ILIKE $1)
                     ORDER BY full_name, id"
                ))
                .bind(pattern)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Lawyer>(&format!(
                    "SELECT {LAWYER_COLUMNS} FROM lawyers WHERE enabled = true ORDER BY full_name, id"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(lawyers)
    }

    async fn list_lawyers(&self) -> Result<Vec<Lawyer>, StoreError> {
        let lawyers = sqlx::query_as::<_, Lawyer>(&format!(
            "SELECT {LAWYER_COLUMNS} FROM lawyers ORDER BY created_at DESC, id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(lawyers)
    }

    async fn lawyer(&self, id: Uuid) -> Result<Option<Lawyer>, StoreError> {
        let lawyer = sqlx::query_as::<_, Lawyer>(&format!("SELECT {LAWYER_COLUMNS} FROM lawyers WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(lawyer)
    }

    async fn lawyer_by_user(&self, user_id: Uuid) -> Result<Option<Lawyer>, StoreError> {
        let lawyer = sqlx::query_as::<_, Lawyer>(&format!("SELECT {LAWYER_COLUMNS} FROM lawyers WHERE user_id = $1"))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(lawyer)
    }

    async fn insert_lawyer(&self, new: NewLawyer) -> Result<Lawyer, StoreError> {
        let lawyer = sqlx::query_as::<_, Lawyer>(&format!(
            "INSERT INTO lawyers (id, user_id, full_name, rut, commune, specialty, phone, email, enabled, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, true, $9)
             RETURNING {LAWYER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(new.user_id)
        .bind(&new.full_name)
        .bind(&new.rut)
        .bind(&new.commune)
        .bind(&new.specialty)
        .bind(&new.phone)
        .bind(&new.email)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(lawyer)
    }

    async fn update_lawyer(&self, id: Uuid, changes: &LawyerChanges) -> Result<Lawyer, StoreError> {
        let lawyer = sqlx::query_as::<_, Lawyer>(&format!(
            "UPDATE lawyers
             SET full_name = $2, rut = $3, commune = $4, specialty = $5, phone = $6, email = $7
             WHERE id = $1
             RETURNING {LAWYER_COLUMNS}"
        ))
        .bind(id)
        .bind(&changes.full_name)
        .bind(&changes.rut)
        .bind(&changes.commune)
        .bind(&changes.specialty)
        .bind(&changes.phone)
        .bind(&changes.email)
        .fetch_optional(&self.pool)
        .await?;
        lawyer.ok_or_else(|| StoreError::NotFound(format!("lawyer {}", id)))
    }

    async fn set_lawyer_enabled(&self, id: Uuid, enabled: bool) -> Result<Lawyer, StoreError> {
        let lawyer = sqlx::query_as::<_, Lawyer>(&format!(
            "UPDATE lawyers SET enabled = $2 WHERE id = $1 RETURNING {LAWYER_COLUMNS}"
        ))
        .bind(id)
        .bind(enabled)
        .fetch_optional(&self.pool)
        .await?;
        lawyer.ok_or_else(|| StoreError::NotFound(format!("lawyer {}", id)))
    }

    async fn insert_request(&self, new: NewContactRequest) -> Result<ContactRequest, StoreError> {
        let request = sqlx::query_as::<_, ContactRequest>(&format!(
            "INSERT INTO requests (id, lawyer_id, visitor_name, visitor_email, message, status, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {REQUEST_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(new.lawyer_id)
        .bind(&new.visitor_name)
        .bind(&new.visitor_email)
        .bind(&new.message)
        .bind(RequestStatus::Pending.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(request)
    }

    async fn request(&self, id: Uuid) -> Result<Option<ContactRequest>, StoreError> {
        let request = sqlx::query_as::<_, ContactRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM requests WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(request)
    }

    async fn requests_for_lawyer(&self, lawyer_id: Uuid) -> Result<Vec<ContactRequest>, StoreError> {
        let requests = sqlx::query_as::<_, ContactRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM requests WHERE lawyer_id = $1 ORDER BY created_at DESC, id"
        ))
        .bind(lawyer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(requests)
    }

    async fn all_requests(&self) -> Result<Vec<RequestWithLawyer>, StoreError> {
        let rows = sqlx::query_as::<_, AdminRequestRow>(
            "SELECT r.id, r.lawyer_id, r.visitor_name, r.visitor_email, r.message, r.status, r.created_at,
                    l.full_name AS lawyer_full_name, l.email AS lawyer_email
             FROM requests r
             LEFT JOIN lawyers l ON l.id = r.lawyer_id
             ORDER BY r.created_at DESC, r.id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(RequestWithLawyer::from).collect())
    }

    async fn set_request_status(&self, id: Uuid, status: RequestStatus) -> Result<ContactRequest, StoreError> {
        let request = sqlx::query_as::<_, ContactRequest>(&format!(
            "UPDATE requests SET status = $2 WHERE id = $1 RETURNING {REQUEST_COLUMNS}"
        ))
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?;
        request.ok_or_else(|| StoreError::NotFound(format!("request {}", id)))
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

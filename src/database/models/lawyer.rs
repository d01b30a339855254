use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Directory entry. Only publicly visible while `enabled` is true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Lawyer {
    pub id: Uuid,
    pub user_id: Uuid,
    pub full_name: String,
    pub rut: String,
    pub commune: String,
    pub specialty: String,
    pub phone: Option<String>,
    pub email: String,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl Lawyer {
    /// Case-insensitive substring match over name, commune and specialty.
    /// `needle` must already be lowercased.
    pub fn matches(&self, needle: &str) -> bool {
        [&self.full_name, &self.commune, &self.specialty]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

/// Public projection of a lawyer shown to visitors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub id: Uuid,
    pub full_name: String,
    pub commune: String,
    pub specialty: String,
    pub email: String,
    pub phone: Option<String>,
}

impl From<Lawyer> for DirectoryEntry {
    fn from(lawyer: Lawyer) -> Self {
        Self {
            id: lawyer.id,
            full_name: lawyer.full_name,
            commune: lawyer.commune,
            specialty: lawyer.specialty,
            email: lawyer.email,
            phone: lawyer.phone,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewLawyer {
    pub user_id: Uuid,
    pub full_name: String,
    pub rut: String,
    pub commune: String,
    pub specialty: String,
    pub phone: Option<String>,
    pub email: String,
}

/// Editable lawyer fields; an update replaces all of them
#[derive(Debug, Clone, PartialEq)]
pub struct LawyerChanges {
    pub full_name: String,
    pub rut: String,
    pub commune: String,
    pub specialty: String,
    pub phone: Option<String>,
    pub email: String,
}

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

/// Dashboard role carried by a profile. Stored as its Spanish column value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "abogado")]
    Lawyer,
    #[serde(rename = "admin")]
    Admin,
}

#[derive(Debug, Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Lawyer => "abogado",
            Role::Admin => "admin",
        }
    }
}

impl TryFrom<String> for Role {
    type Error = UnknownRole;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "abogado" => Ok(Role::Lawyer),
            "admin" => Ok(Role::Admin),
            _ => Err(UnknownRole(value)),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-user record carrying role and display name. `id` equals the identity id.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
}

/// Split a full name into (first, last): the first word, then the remaining words.
pub fn split_full_name(full_name: &str) -> (String, String) {
    let mut words = full_name.split_whitespace();
    let first = words.next().unwrap_or_default().to_string();
    let last = words.collect::<Vec<_>>().join(" ");
    (first, last)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_column_value() {
        assert_eq!(Role::try_from("abogado".to_string()).unwrap(), Role::Lawyer);
        assert_eq!(Role::try_from("admin".to_string()).unwrap(), Role::Admin);
        assert!(Role::try_from("visitor".to_string()).is_err());
        assert_eq!(serde_json::to_value(Role::Lawyer).unwrap(), "abogado");
    }

    #[test]
    fn splits_names_on_first_word() {
        assert_eq!(
            split_full_name("Juan Pérez Soto"),
            ("Juan".to_string(), "Pérez Soto".to_string())
        );
        assert_eq!(split_full_name("Cher"), ("Cher".to_string(), String::new()));
        assert_eq!(
            split_full_name("  María   José  "),
            ("María".to_string(), "José".to_string())
        );
    }
}

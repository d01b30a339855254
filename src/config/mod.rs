use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

/// Upper bound for `SECURITY_SESSION_EXPIRY_HOURS` (one year)
pub const MAX_SESSION_EXPIRY_HOURS: u64 = 24 * 365;

/// Startup configuration errors. Any of these is fatal for the server.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub bootstrap: BootstrapConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Shut down once stdin closes. Used by test harnesses that own the process.
    #[serde(default)]
    pub exit_on_stdin_eof: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub session_expiry_hours: u64,
    pub cookie_secure: bool,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

/// Optional admin account provisioned at startup when it does not exist yet
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BootstrapConfig {
    pub admin_email: Option<String>,
    #[serde(skip_serializing)]
    pub admin_password: Option<String>,
    pub admin_first_name: String,
    pub admin_last_name: String,
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// Presets are picked from `APP_ENV`, then individual variables override them.
    /// `JWT_SECRET` is always required; `DATABASE_URL` is required for the postgres backend.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self::load()?;
        config.validate()?;
        Ok(config)
    }

    /// Like `from_env`, but only the store settings are required. Used by the CLI,
    /// which never signs session tokens.
    pub fn store_from_env() -> Result<Self, ConfigError> {
        let config = Self::load()?;
        config.validate_store()?;
        Ok(config)
    }

    fn load() -> Result<Self, ConfigError> {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Some(port) = env::var("LAWDIR_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.server.port = port.parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value: port.clone(),
            })?;
        }
        if let Ok(v) = env::var("HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("LAWDIR_EXIT_ON_STDIN_EOF") {
            self.server.exit_on_stdin_eof = v.parse().unwrap_or(self.server.exit_on_stdin_eof);
        }

        if let Ok(v) = env::var("STORE_BACKEND") {
            self.store.backend = match v.to_ascii_lowercase().as_str() {
                "postgres" | "pg" => StoreBackend::Postgres,
                "memory" | "mem" => StoreBackend::Memory,
                _ => return Err(ConfigError::Invalid { name: "STORE_BACKEND", value: v }),
            };
        }

        // Database overrides
        self.database.url = env::var("DATABASE_URL").ok().filter(|s| !s.is_empty());
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_RUN_MIGRATIONS") {
            self.database.run_migrations = v.parse().unwrap_or(self.database.run_migrations);
        }

        // Security overrides
        self.security.jwt_secret = env::var("JWT_SECRET").unwrap_or_default();
        if let Ok(v) = env::var("SECURITY_SESSION_EXPIRY_HOURS") {
            self.security.session_expiry_hours = v.parse().unwrap_or(self.security.session_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_COOKIE_SECURE") {
            self.security.cookie_secure = v.parse().unwrap_or(self.security.cookie_secure);
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        // Bootstrap admin
        self.bootstrap.admin_email = env::var("BOOTSTRAP_ADMIN_EMAIL").ok().filter(|s| !s.is_empty());
        self.bootstrap.admin_password = env::var("BOOTSTRAP_ADMIN_PASSWORD").ok().filter(|s| !s.is_empty());
        if let Ok(v) = env::var("BOOTSTRAP_ADMIN_FIRST_NAME") {
            self.bootstrap.admin_first_name = v;
        }
        if let Ok(v) = env::var("BOOTSTRAP_ADMIN_LAST_NAME") {
            self.bootstrap.admin_last_name = v;
        }

        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.is_empty() {
            return Err(ConfigError::Missing("JWT_SECRET"));
        }
        let hours = self.security.session_expiry_hours;
        if hours == 0 || hours > MAX_SESSION_EXPIRY_HOURS {
            return Err(ConfigError::Invalid {
                name: "SECURITY_SESSION_EXPIRY_HOURS",
                value: hours.to_string(),
            });
        }
        self.validate_store()
    }

    fn validate_store(&self) -> Result<(), ConfigError> {
        if self.store.backend == StoreBackend::Postgres && self.database.url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }
        Ok(())
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                exit_on_stdin_eof: false,
            },
            store: StoreConfig {
                backend: StoreBackend::Postgres,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
                run_migrations: true,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                session_expiry_hours: 24 * 7, // 1 week
                cookie_secure: false,
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
            },
            bootstrap: BootstrapConfig {
                admin_email: None,
                admin_password: None,
                admin_first_name: "Admin".to_string(),
                admin_last_name: String::new(),
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                exit_on_stdin_eof: false,
            },
            store: StoreConfig {
                backend: StoreBackend::Postgres,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
                run_migrations: false,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                session_expiry_hours: 12,
                cookie_secure: true,
                enable_cors: false,
                cors_origins: vec![],
            },
            bootstrap: BootstrapConfig {
                admin_first_name: "Admin".to_string(),
                ..Default::default()
            },
        }
    }

    /// In-memory configuration used by tests and demos
    pub fn in_memory(jwt_secret: impl Into<String>) -> Self {
        let mut config = Self::development();
        config.store.backend = StoreBackend::Memory;
        config.security.jwt_secret = jwt_secret.into();
        config
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.store.backend, StoreBackend::Postgres);
        assert!(config.database.run_migrations);
        assert!(!config.security.cookie_secure);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(config.security.cookie_secure);
        assert!(!config.database.run_migrations);
        assert_eq!(config.security.session_expiry_hours, 12);
    }

    #[test]
    fn missing_secret_is_fatal() {
        let config = AppConfig::development();
        assert!(matches!(config.validate(), Err(ConfigError::Missing("JWT_SECRET"))));
    }

    #[test]
    fn postgres_backend_requires_database_url() {
        let mut config = AppConfig::development();
        config.security.jwt_secret = "secret".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Missing("DATABASE_URL"))));

        config.database.url = Some("postgres://localhost/lawdir".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn session_expiry_is_bounded() {
        let mut config = AppConfig::in_memory("secret");

        config.security.session_expiry_hours = u64::MAX;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { name: "SECURITY_SESSION_EXPIRY_HOURS", .. })
        ));

        config.security.session_expiry_hours = 0;
        assert!(config.validate().is_err());

        config.security.session_expiry_hours = MAX_SESSION_EXPIRY_HOURS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn memory_backend_needs_no_database() {
        let config = AppConfig::in_memory("secret");
        assert!(config.validate().is_ok());
    }
}

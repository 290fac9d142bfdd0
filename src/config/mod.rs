use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

/// Longest session lifetime accepted from `TOKEN_EXPIRY_HOURS` (one year)
pub const MAX_TOKEN_EXPIRY_HOURS: u64 = 24 * 365;

/// Errors raised while assembling configuration at startup
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
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub public_dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: StorageBackend,
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub token_secret: String,
    pub token_expiry_hours: u64,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    /// Build configuration from the process environment.
    ///
    /// Profile defaults are chosen by `APP_ENV`, then individual variables
    /// override them. `TOKEN_SECRET` has no default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let config = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()?;

        config.validate()?;
        Ok(config)
    }

    fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        // Server overrides
        if let Ok(v) = env::var("PORT") {
            self.server.port = parse_var("PORT", &v)?;
        }
        if let Ok(v) = env::var("PUBLIC_DIR") {
            self.server.public_dir = Some(v).filter(|dir| !dir.is_empty());
        }

        // Database overrides
        if let Ok(v) = env::var("STORAGE_BACKEND") {
            self.database.backend = match v.as_str() {
                "postgres" | "postgresql" => StorageBackend::Postgres,
                "memory" => StorageBackend::Memory,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "STORAGE_BACKEND",
                        value: v,
                    })
                }
            };
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse_var("DATABASE_MAX_CONNECTIONS", &v)?;
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = parse_var("DATABASE_CONNECTION_TIMEOUT", &v)?;
        }

        // Security overrides
        if let Ok(v) = env::var("TOKEN_SECRET") {
            self.security.token_secret = v;
        }
        if let Ok(v) = env::var("TOKEN_EXPIRY_HOURS") {
            self.security.token_expiry_hours = parse_var("TOKEN_EXPIRY_HOURS", &v)?;
        }
        if let Ok(v) = env::var("CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        Ok(self)
    }

    /// Reject configurations the server cannot start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.token_secret.is_empty() {
            return Err(ConfigError::Missing("TOKEN_SECRET"));
        }
        let expiry = self.security.token_expiry_hours;
        if expiry == 0 || expiry > MAX_TOKEN_EXPIRY_HOURS {
            return Err(ConfigError::Invalid {
                name: "TOKEN_EXPIRY_HOURS",
                value: expiry.to_string(),
            });
        }
        if self.database.backend == StorageBackend::Postgres && self.database.url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }
        Ok(())
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    /// Configuration suitable for tests: in-memory storage and the given secret
    pub fn for_testing(token_secret: impl Into<String>) -> Self {
        let mut config = Self::development();
        config.database.backend = StorageBackend::Memory;
        config.server.public_dir = None;
        config.security.token_secret = token_secret.into();
        config
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                port: 5005,
                public_dir: Some("public".to_string()),
            },
            database: DatabaseConfig {
                backend: StorageBackend::Postgres,
                url: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            security: SecurityConfig {
                token_secret: String::new(),
                token_expiry_hours: 6,
                cors_origins: vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:5173".to_string(),
                ],
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                port: 5005,
                public_dir: Some("public".to_string()),
            },
            database: DatabaseConfig {
                backend: StorageBackend::Postgres,
                url: None,
                max_connections: 20,
                connection_timeout: 10,
            },
            security: SecurityConfig {
                token_secret: String::new(),
                token_expiry_hours: 6,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                port: 5005,
                public_dir: None,
            },
            database: DatabaseConfig {
                backend: StorageBackend::Postgres,
                url: None,
                max_connections: 50,
                connection_timeout: 5,
            },
            security: SecurityConfig {
                token_secret: String::new(),
                token_expiry_hours: 6,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::Invalid {
        name,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.server.port, 5005);
        assert_eq!(config.security.token_expiry_hours, 6);
        assert!(config.is_development());
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(config.server.public_dir.is_none());
        assert_eq!(config.database.max_connections, 50);
    }

    #[test]
    fn missing_secret_is_rejected() {
        let mut config = AppConfig::for_testing("secret");
        config.security.token_secret.clear();
        assert!(matches!(config.validate(), Err(ConfigError::Missing("TOKEN_SECRET"))));
    }

    #[test]
    fn postgres_backend_requires_url() {
        let mut config = AppConfig::for_testing("secret");
        config.database.backend = StorageBackend::Postgres;
        assert!(matches!(config.validate(), Err(ConfigError::Missing("DATABASE_URL"))));

        config.database.url = Some("postgres://localhost/cohort_tools".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn token_expiry_must_be_positive_and_bounded() {
        let mut config = AppConfig::for_testing("secret");

        config.security.token_expiry_hours = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { name: "TOKEN_EXPIRY_HOURS", .. })
        ));

        config.security.token_expiry_hours = u64::MAX;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { name: "TOKEN_EXPIRY_HOURS", .. })
        ));

        config.security.token_expiry_hours = MAX_TOKEN_EXPIRY_HOURS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_var_reports_bad_values() {
        let err = parse_var::<u16>("PORT", "eighty").unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for PORT: eighty");
    }
}

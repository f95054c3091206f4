use jsonwebtoken::Algorithm;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub security: SecurityConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub superadmin: SuperAdminConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Shared secret for token verification. Must match the issuing
    /// SuperAdmin exactly; a mismatch rejects every token.
    pub jwt_secret: String,
    pub jwt_algorithm: String,
    /// Module identifier this service requires in `enabled_modules`.
    pub module: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
    /// Tenant pools idle longer than this are eligible for eviction.
    pub idle_eviction_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub idle_timeout_secs: u64,
    pub absolute_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuperAdminConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl SecurityConfig {
    /// Parse the configured algorithm name. Fatal at startup if unknown.
    pub fn algorithm(&self) -> Result<Algorithm, String> {
        self.jwt_algorithm
            .parse()
            .map_err(|_| format!("unknown JWT algorithm: {}", self.jwt_algorithm))
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET_KEY") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("JWT_ALGORITHM") {
            self.security.jwt_algorithm = v;
        }
        if let Ok(v) = env::var("HMS_MODULE") {
            self.security.module = v;
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECT_TIMEOUT_SECS") {
            self.database.connect_timeout_secs =
                v.parse().unwrap_or(self.database.connect_timeout_secs);
        }
        if let Ok(v) = env::var("DATABASE_IDLE_EVICTION_SECS") {
            self.database.idle_eviction_secs =
                v.parse().unwrap_or(self.database.idle_eviction_secs);
        }

        // Session overrides
        if let Ok(v) = env::var("SESSION_COOKIE_NAME") {
            self.session.cookie_name = v;
        }
        if let Ok(v) = env::var("SESSION_IDLE_TIMEOUT_SECS") {
            self.session.idle_timeout_secs = v.parse().unwrap_or(self.session.idle_timeout_secs);
        }
        if let Ok(v) = env::var("SESSION_ABSOLUTE_TIMEOUT_SECS") {
            self.session.absolute_timeout_secs =
                v.parse().unwrap_or(self.session.absolute_timeout_secs);
        }

        // SuperAdmin overrides
        if let Ok(v) = env::var("SUPERADMIN_URL") {
            self.superadmin.base_url = v;
        }
        if let Ok(v) = env::var("SUPERADMIN_TIMEOUT_SECS") {
            self.superadmin.request_timeout_secs =
                v.parse().unwrap_or(self.superadmin.request_timeout_secs);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            security: SecurityConfig {
                jwt_secret: "dev-only-secret".to_string(),
                jwt_algorithm: "HS256".to_string(),
                module: "hms".to_string(),
            },
            database: DatabaseConfig {
                max_connections: 10,
                connect_timeout_secs: 30,
                idle_eviction_secs: 600,
            },
            session: SessionConfig {
                cookie_name: "hms_session".to_string(),
                idle_timeout_secs: 60 * 60,
                absolute_timeout_secs: 12 * 60 * 60,
            },
            superadmin: SuperAdminConfig {
                base_url: "http://localhost:8000".to_string(),
                request_timeout_secs: 10,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            security: SecurityConfig {
                // Must come from JWT_SECRET_KEY; an empty secret rejects all tokens
                jwt_secret: String::new(),
                jwt_algorithm: "HS256".to_string(),
                module: "hms".to_string(),
            },
            database: DatabaseConfig {
                max_connections: 20,
                connect_timeout_secs: 10,
                idle_eviction_secs: 600,
            },
            session: SessionConfig {
                cookie_name: "hms_session".to_string(),
                idle_timeout_secs: 30 * 60,
                absolute_timeout_secs: 8 * 60 * 60,
            },
            superadmin: SuperAdminConfig {
                base_url: "https://admin-staging.celiyo.com".to_string(),
                request_timeout_secs: 10,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_algorithm: "HS256".to_string(),
                module: "hms".to_string(),
            },
            database: DatabaseConfig {
                max_connections: 50,
                connect_timeout_secs: 5,
                idle_eviction_secs: 300,
            },
            session: SessionConfig {
                cookie_name: "hms_session".to_string(),
                idle_timeout_secs: 15 * 60,
                absolute_timeout_secs: 4 * 60 * 60,
            },
            superadmin: SuperAdminConfig {
                base_url: "https://admin.celiyo.com".to_string(),
                request_timeout_secs: 10,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn development_defaults() {
        let config = AppConfig::development();
        assert_eq!(config.security.module, "hms");
        assert_eq!(config.security.jwt_algorithm, "HS256");
        assert!(config.security.algorithm().is_ok());
    }

    #[test]
    fn production_requires_explicit_secret() {
        let config = AppConfig::production();
        assert!(config.security.jwt_secret.is_empty());
        assert_eq!(config.session.idle_timeout_secs, 15 * 60);
    }

    #[test]
    fn rejects_unknown_algorithm() {
        let mut config = AppConfig::development();
        config.security.jwt_algorithm = "none".to_string();
        assert!(config.security.algorithm().is_err());
    }
}

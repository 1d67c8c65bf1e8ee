use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

/// Port the web client expects the API on.
pub const DEFAULT_PORT: u16 = 3001;

pub const DEFAULT_DATABASE_URL: &str = "postgres://postgres-dev@db/dev?sslmode=disable";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No secret key found; set environment variable JWTSECRETKEY before starting")]
    MissingJwtSecret,

    #[error("Incomplete OAuth configuration: {0} is set but {1} is not")]
    IncompleteOAuth(&'static str, &'static str),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub oauth: Option<OAuthConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
    /// Seeded as the first admin when the users table is empty at startup.
    pub initial_admin_email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthConfig {
    pub client_id: String,
    #[serde(skip_serializing)]
    pub client_secret: String,
    pub authorize_url: String,
    pub token_url: String,
    pub user_api_url: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let jwt_secret = lookup("JWTSECRETKEY")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingJwtSecret)?;

        let config = match environment {
            Environment::Production => Self::production(jwt_secret),
            Environment::Staging => Self::staging(jwt_secret),
            Environment::Development => Self::development(jwt_secret),
        };

        config.with_overrides(&lookup)
    }

    fn with_overrides<F>(mut self, lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server overrides
        if let Some(v) = lookup("WEBPORT").or_else(|| lookup("PORT")) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Some(v) = lookup("BIND_HOST") {
            self.server.host = v;
        }

        // Database overrides
        if let Some(v) = lookup("DATABASE_URL") {
            self.database.url = v;
        }
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Some(v) = lookup("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        self.database.initial_admin_email = lookup("INITIAL_ADMIN_EMAIL").filter(|s| !s.is_empty());

        // Security overrides
        if let Some(v) = lookup("CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // OAuth is all-or-nothing
        let client_id = lookup("GITHUB_CLIENT_ID").filter(|s| !s.is_empty());
        let client_secret = lookup("GITHUB_CLIENT_SECRET").filter(|s| !s.is_empty());
        self.oauth = match (client_id, client_secret) {
            (Some(client_id), Some(client_secret)) => Some(OAuthConfig::github(client_id, client_secret)),
            (Some(_), None) => {
                return Err(ConfigError::IncompleteOAuth("GITHUB_CLIENT_ID", "GITHUB_CLIENT_SECRET"))
            }
            (None, Some(_)) => {
                return Err(ConfigError::IncompleteOAuth("GITHUB_CLIENT_SECRET", "GITHUB_CLIENT_ID"))
            }
            (None, None) => None,
        };

        Ok(self)
    }

    fn development(jwt_secret: String) -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: DEFAULT_PORT,
            },
            database: DatabaseConfig {
                url: DEFAULT_DATABASE_URL.to_string(),
                max_connections: 10,
                connection_timeout: 30,
                initial_admin_email: None,
            },
            security: SecurityConfig {
                jwt_secret,
                cors_origins: vec!["http://localhost:3000".to_string()],
            },
            oauth: None,
        }
    }

    fn staging(jwt_secret: String) -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                max_connections: 20,
                connection_timeout: 10,
                ..Self::development(String::new()).database
            },
            ..Self::development(jwt_secret)
        }
    }

    fn production(jwt_secret: String) -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                max_connections: 50,
                connection_timeout: 5,
                ..Self::development(String::new()).database
            },
            security: SecurityConfig {
                jwt_secret,
                cors_origins: Vec::new(),
            },
            ..Self::development(String::new())
        }
    }

    /// Default tracing filter when RUST_LOG is not set.
    pub fn default_log_filter(&self) -> &'static str {
        match self.environment {
            Environment::Production => "info",
            Environment::Staging | Environment::Development => "debug",
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl OAuthConfig {
    pub fn github(client_id: String, client_secret: String) -> Self {
        Self {
            client_id,
            client_secret,
            authorize_url: "https://github.com/login/oauth/authorize".to_string(),
            token_url: "https://github.com/login/oauth/access_token".to_string(),
            user_api_url: "https://api.github.com/user".to_string(),
        }
    }
}

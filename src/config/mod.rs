//! Configuration management
//!
//! Loads configuration for the Newswire backend from:
//! - a `config.yml` file
//! - environment variables (which override file settings)
//!
//! Every value has a sensible default so a missing or empty file still
//! yields a runnable configuration. The only value that should always be
//! set in production is the token signing secret.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Authentication configuration
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origin
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_cors_origin() -> String {
    "http://localhost:5173".to_string()
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database path, or `:memory:`
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    "data/newswire.db".to_string()
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Symmetric signing key for issued tokens
    #[serde(default = "default_secret_key")]
    pub secret_key: String,
    /// Access token lifetime in minutes
    #[serde(default = "default_access_expire_minutes")]
    pub access_token_expire_minutes: i64,
    /// Refresh token lifetime in days
    #[serde(default = "default_refresh_expire_days")]
    pub refresh_token_expire_days: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: default_secret_key(),
            access_token_expire_minutes: default_access_expire_minutes(),
            refresh_token_expire_days: default_refresh_expire_days(),
        }
    }
}

fn default_secret_key() -> String {
    // Development fallback; override via config.yml or NEWSWIRE_SECRET_KEY
    "insecure-dev-secret-change-me".to_string()
}

fn default_access_expire_minutes() -> i64 {
    30
}

fn default_refresh_expire_days() -> i64 {
    7
}

impl Config {
    /// Load configuration from a YAML file.
    ///
    /// A missing or empty file yields the defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file {}: {}", path.display(), e))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file {}: {}", path.display(), e))?;

        Ok(config)
    }

    /// Load configuration from file with environment variable overrides.
    ///
    /// Recognized variables:
    /// - `NEWSWIRE_SERVER_HOST`
    /// - `NEWSWIRE_SERVER_PORT`
    /// - `NEWSWIRE_DATABASE_URL`
    /// - `NEWSWIRE_SECRET_KEY`
    pub fn load_with_env(path: &Path) -> anyhow::Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("NEWSWIRE_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("NEWSWIRE_SERVER_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.server.port = port;
            }
        }
        if let Ok(url) = std::env::var("NEWSWIRE_DATABASE_URL") {
            self.database.url = url;
        }
        if let Ok(secret) = std::env::var("NEWSWIRE_SECRET_KEY") {
            self.auth.secret_key = secret;
        }
    }
}

//! Configuration module for Filevault.

use serde::Deserialize;
use std::path::Path;

use crate::{Result, VaultError};

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed CORS origins for the browser client.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8600
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/filevault.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Blob bucket configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the blob storage directory.
    #[serde(default = "default_bucket_path")]
    pub bucket_path: String,
    /// Base URL under which stored files are served (used to build the
    /// public view URL recorded on each file document).
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    /// Maximum upload size in megabytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_mb: u64,
}

fn default_bucket_path() -> String {
    "data/bucket".to_string()
}

fn default_public_base_url() -> String {
    "http://localhost:8600/api/files".to_string()
}

fn default_max_upload_size() -> u64 {
    50
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket_path: default_bucket_path(),
            public_base_url: default_public_base_url(),
            max_upload_size_mb: default_max_upload_size(),
        }
    }
}

/// Session configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Session lifetime in days (also the cookie max-age).
    #[serde(default = "default_session_days")]
    pub lifetime_days: u32,
    /// One-time code lifetime in minutes.
    #[serde(default = "default_otp_minutes")]
    pub otp_lifetime_mins: u32,
}

fn default_session_days() -> u32 {
    30
}

fn default_otp_minutes() -> u32 {
    15
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            lifetime_days: default_session_days(),
            otp_lifetime_mins: default_otp_minutes(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log file path.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "data/filevault.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Blob storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Session settings.
    #[serde(default)]
    pub session: SessionConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&content).map_err(|e| VaultError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8600);
        assert_eq!(config.database.path, "data/filevault.db");
        assert_eq!(config.storage.bucket_path, "data/bucket");
        assert_eq!(config.session.lifetime_days, 30);
        assert_eq!(config.session.otp_lifetime_mins, 15);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_partial_toml() {
        let toml_str = r#"
[server]
port = 9000

[storage]
bucket_path = "/var/lib/filevault/bucket"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.storage.bucket_path, "/var/lib/filevault/bucket");
        assert_eq!(config.storage.max_upload_size_mb, 50);
    }

    #[test]
    fn test_parse_empty_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8600);
        assert_eq!(config.session.lifetime_days, 30);
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load("does/not/exist.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_toml() {
        let result: std::result::Result<Config, _> = toml::from_str("server = 42");
        assert!(result.is_err());
    }
}

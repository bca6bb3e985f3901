//! PinDrop Configuration
//!
//! This module provides configuration structures for the PinDrop
//! file sharing server. Values are resolved from built-in defaults, an
//! optional TOML file, and the `STORAGE_PATH` environment variable, in
//! that order.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable selecting the storage root
pub const STORAGE_PATH_ENV: &str = "STORAGE_PATH";

/// Main PinDrop configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PinDropConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// File storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// CORS configuration
    #[serde(default)]
    pub cors: CorsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP bind address
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Maximum accepted upload request size in megabytes
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: u64,
}

/// File storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory holding one subdirectory per PIN
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,

    /// Require PINs to be 6-8 ASCII digits
    #[serde(default)]
    pub strict_pins: bool,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Origin allowed to call the API with credentials
    #[serde(default = "default_allowed_origin")]
    pub allowed_origin: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (pretty, compact)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_bind_address() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_max_upload_mb() -> u64 {
    1024
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("./storage")
}

fn default_allowed_origin() -> String {
    "http://localhost:5173".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            max_upload_mb: default_max_upload_mb(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
            strict_pins: false,
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origin: default_allowed_origin(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl PinDropConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string
    pub fn from_str(content: &str) -> crate::Result<Self> {
        let config: PinDropConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the runtime configuration: the file when given, defaults
    /// otherwise, then the `STORAGE_PATH` environment override.
    pub fn load(path: Option<&std::path::Path>) -> crate::Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_storage_override(std::env::var(STORAGE_PATH_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    /// Replace the storage root if a non-empty override is present
    pub fn apply_storage_override(&mut self, value: Option<String>) {
        if let Some(path) = value.filter(|p| !p.is_empty()) {
            self.storage.path = PathBuf::from(path);
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> crate::Result<()> {
        if self.server.bind_address.is_empty() {
            return Err(crate::Error::Config("server.bind_address cannot be empty".into()));
        }

        if self.server.max_upload_mb == 0 {
            return Err(crate::Error::Config("server.max_upload_mb must be positive".into()));
        }

        if self.storage.path.as_os_str().is_empty() {
            return Err(crate::Error::Config("storage.path cannot be empty".into()));
        }

        if self.cors.allowed_origin.is_empty() {
            return Err(crate::Error::Config("cors.allowed_origin cannot be empty".into()));
        }

        Ok(())
    }

    /// Get the storage root path
    pub fn storage_path(&self) -> &PathBuf {
        &self.storage.path
    }

    /// Upload body limit in bytes
    pub fn max_upload_bytes(&self) -> usize {
        usize::try_from(self.server.max_upload_mb.saturating_mul(1024 * 1024)).unwrap_or(usize::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PinDropConfig::from_str("").unwrap();
        assert_eq!(config.server.bind_address, "0.0.0.0:8080");
        assert_eq!(config.storage_path(), &PathBuf::from("./storage"));
        assert_eq!(config.cors.allowed_origin, "http://localhost:5173");
        assert!(!config.storage.strict_pins);
        assert_eq!(config.max_upload_bytes(), 1024 * 1024 * 1024);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[server]
bind_address = "127.0.0.1:9000"
max_upload_mb = 16

[storage]
path = "/srv/pindrop"
strict_pins = true

[cors]
allowed_origin = "https://drop.example.com"

[logging]
level = "debug"
format = "compact"
"#;

        let config = PinDropConfig::from_str(toml).unwrap();
        assert_eq!(config.server.bind_address, "127.0.0.1:9000");
        assert_eq!(config.max_upload_bytes(), 16 * 1024 * 1024);
        assert_eq!(config.storage_path(), &PathBuf::from("/srv/pindrop"));
        assert!(config.storage.strict_pins);
        assert_eq!(config.logging.format, "compact");
    }

    #[test]
    fn test_storage_override() {
        let mut config = PinDropConfig::default();
        config.apply_storage_override(Some(String::new()));
        assert_eq!(config.storage_path(), &PathBuf::from("./storage"));

        config.apply_storage_override(Some("/data/drops".to_string()));
        assert_eq!(config.storage_path(), &PathBuf::from("/data/drops"));
    }

    #[test]
    fn test_rejects_zero_upload_limit() {
        let err = PinDropConfig::from_str("[server]\nmax_upload_mb = 0\n").unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pindrop.toml");
        std::fs::write(&path, "[storage]\npath = \"drops\"\n").unwrap();

        let config = PinDropConfig::from_file(&path).unwrap();
        assert_eq!(config.storage_path(), &PathBuf::from("drops"));
    }
}

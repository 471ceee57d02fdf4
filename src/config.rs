//! Configuration management for `CabFare`
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::FareError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for `CabFare`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CabFareConfig {
    /// Geocoding service configuration
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    /// Routing service configuration
    #[serde(default)]
    pub routing: RoutingConfig,
    /// Fare model configuration
    #[serde(default)]
    pub model: ModelConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
}

/// Geocoding (place name lookup) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Base URL of a Nominatim-compatible search API
    #[serde(default = "default_geocoding_base_url")]
    pub base_url: String,
    /// User agent sent with every lookup; Nominatim rejects anonymous clients
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
}

/// Routing service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Base URL of the calculate-route endpoint
    #[serde(default = "default_routing_base_url")]
    pub base_url: String,
    /// Routing API key
    pub api_key: Option<String>,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
}

/// Fare model settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Path of the serialized regression model
    #[serde(default = "default_model_path")]
    pub path: PathBuf,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// HTTP server settings for `cabfare serve`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Idle time after which an API session is forgotten
    #[serde(default = "default_session_ttl")]
    pub session_ttl_seconds: u64,
    /// Most API sessions held at once; the least recently used is dropped first
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

// Default value functions
fn default_geocoding_base_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_user_agent() -> String {
    format!("cabfare/{}", crate::VERSION)
}

fn default_routing_base_url() -> String {
    "https://api.tomtom.com/routing/1/calculateRoute".to_string()
}

fn default_timeout() -> u32 {
    30
}

fn default_model_path() -> PathBuf {
    PathBuf::from("saved_models/model.json")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_session_ttl() -> u64 {
    30 * 60
}

fn default_max_sessions() -> usize {
    1000
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoding_base_url(),
            user_agent: default_user_agent(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            base_url: default_routing_base_url(),
            api_key: None,
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
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

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            session_ttl_seconds: default_session_ttl(),
            max_sessions: default_max_sessions(),
        }
    }
}

impl CabFareConfig {
    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path()
                .filter(|path| path.exists())
                .unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. CABFARE_ROUTING__API_KEY
        builder = builder.add_source(
            Environment::with_prefix("CABFARE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: CabFareConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("cabfare").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.geocoding.base_url.is_empty() {
            self.geocoding.base_url = default_geocoding_base_url();
        }
        if self.geocoding.user_agent.is_empty() {
            self.geocoding.user_agent = default_user_agent();
        }
        if self.geocoding.timeout_seconds == 0 {
            self.geocoding.timeout_seconds = default_timeout();
        }
        if self.routing.base_url.is_empty() {
            self.routing.base_url = default_routing_base_url();
        }
        if self.routing.timeout_seconds == 0 {
            self.routing.timeout_seconds = default_timeout();
        }
        if self.model.path.as_os_str().is_empty() {
            self.model.path = default_model_path();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.server.host.is_empty() {
            self.server.host = default_host();
        }
        if self.server.session_ttl_seconds == 0 {
            self.server.session_ttl_seconds = default_session_ttl();
        }
        if self.server.max_sessions == 0 {
            self.server.max_sessions = default_max_sessions();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate API keys and credentials
    pub fn validate_api_keys(&self) -> Result<()> {
        if let Some(api_key) = &self.routing.api_key {
            if api_key.trim().is_empty() {
                return Err(FareError::config(
                    "Routing API key cannot be empty if provided. Either remove it or provide a valid key.",
                )
                .into());
            }
        }
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.geocoding.timeout_seconds > 300 {
            return Err(FareError::config("Geocoding timeout cannot exceed 300 seconds").into());
        }

        if self.routing.timeout_seconds > 300 {
            return Err(FareError::config("Routing timeout cannot exceed 300 seconds").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(FareError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(FareError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("Geocoding", &self.geocoding.base_url),
            ("Routing", &self.routing.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(FareError::config(format!(
                    "{name} base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        if self.geocoding.user_agent.trim().is_empty() {
            return Err(FareError::config("Geocoding user agent cannot be blank").into());
        }

        if self.model.path.as_os_str().is_empty() {
            return Err(FareError::config("Model path cannot be empty").into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = CabFareConfig::default();
        assert_eq!(config.geocoding.base_url, "https://nominatim.openstreetmap.org");
        assert_eq!(
            config.routing.base_url,
            "https://api.tomtom.com/routing/1/calculateRoute"
        );
        assert_eq!(config.routing.timeout_seconds, 30);
        assert_eq!(config.model.path, PathBuf::from("saved_models/model.json"));
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.session_ttl_seconds, 1800);
        assert_eq!(config.server.max_sessions, 1000);
        assert!(config.routing.api_key.is_none());
        assert!(config.geocoding.user_agent.starts_with("cabfare/"));
    }

    #[test]
    fn test_config_validation_empty_api_key() {
        let mut config = CabFareConfig::default();
        config.routing.api_key = Some("  ".to_string());
        assert!(config.validate_api_keys().is_err());

        config.routing.api_key = Some("routing-key-123".to_string());
        assert!(config.validate_api_keys().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = CabFareConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = CabFareConfig::default();
        config.routing.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));
    }

    #[test]
    fn test_config_validation_rejects_non_http_url() {
        let mut config = CabFareConfig::default();
        config.geocoding.base_url = "ftp://nominatim.example".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_apply_defaults_repairs_zero_values() {
        let mut config = CabFareConfig::default();
        config.routing.timeout_seconds = 0;
        config.model.path = PathBuf::new();
        config.logging.format = String::new();
        config.apply_defaults();
        assert_eq!(config.routing.timeout_seconds, 30);
        assert_eq!(config.model.path, PathBuf::from("saved_models/model.json"));
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[routing]
api_key = "file-key-123"
base_url = "http://127.0.0.1:9000/route"

[model]
path = "models/fare.json"
"#,
        )
        .unwrap();

        let config = CabFareConfig::load_from_path(Some(path)).unwrap();
        assert_eq!(config.routing.api_key.as_deref(), Some("file-key-123"));
        assert_eq!(config.routing.base_url, "http://127.0.0.1:9000/route");
        assert_eq!(config.model.path, PathBuf::from("models/fare.json"));
        // Sections absent from the file keep their defaults
        assert_eq!(config.geocoding.timeout_seconds, 30);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = CabFareConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("cabfare"));
            assert!(path.to_string_lossy().contains("config.toml"));
        }
    }
}

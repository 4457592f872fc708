//! Configuration management for expenseweb
//!
//! This module handles loading, validation, and management of
//! expenseweb configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use error::ConfigError;

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Finance backend connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the REST backend, e.g. `http://localhost:8000`
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Where unauthenticated users are redirected
    #[serde(default = "default_login_url")]
    pub login_url: String,
    /// Session cookie name forwarded to the backend
    #[serde(default = "default_session_cookie")]
    pub session_cookie: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            login_url: default_login_url(),
            session_cookie: default_session_cookie(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_login_url() -> String {
    "/login".to_string()
}

fn default_session_cookie() -> String {
    "session".to_string()
}

/// Currency and number formatting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyConfig {
    /// Currency used when a record carries none
    #[serde(default = "default_currency")]
    pub default_currency: String,
    /// Number of decimal places
    #[serde(default = "default_decimal_places")]
    pub decimal_places: u32,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            default_currency: default_currency(),
            decimal_places: default_decimal_places(),
        }
    }
}

fn default_currency() -> String {
    "EUR".to_string()
}

fn default_decimal_places() -> u32 {
    2
}

/// Defaults pre-filled into the link-bank form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankLinkConfig {
    #[serde(default = "default_institution_id")]
    pub institution_id: String,
    #[serde(default = "default_max_historical_days")]
    pub max_historical_days: String,
    #[serde(default = "default_access_valid_for_days")]
    pub access_valid_for_days: String,
    #[serde(default = "default_access_scope")]
    pub access_scope: Vec<String>,
}

impl Default for BankLinkConfig {
    fn default() -> Self {
        Self {
            institution_id: default_institution_id(),
            max_historical_days: default_max_historical_days(),
            access_valid_for_days: default_access_valid_for_days(),
            access_scope: default_access_scope(),
        }
    }
}

fn default_institution_id() -> String {
    "ING_INGBNL2A".to_string()
}

fn default_max_historical_days() -> String {
    "90".to_string()
}

fn default_access_valid_for_days() -> String {
    "180".to_string()
}

fn default_access_scope() -> Vec<String> {
    vec![
        "balances".to_string(),
        "transactions".to_string(),
        "details".to_string(),
    ]
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Backend settings
    #[serde(default)]
    pub backend: BackendConfig,
    /// Currency settings
    #[serde(default)]
    pub currency: CurrencyConfig,
    /// Link-bank form defaults
    #[serde(default)]
    pub bank_link: BankLinkConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: PathBuf) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound {
                    path: path.to_string_lossy().into_owned(),
                }
            } else {
                ConfigError::IoError(e)
            }
        })?;

        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content).map_err(|e| ConfigError::InvalidYaml {
            message: e.to_string(),
        })?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        // The client speaks plain HTTP only
        if !self.backend.base_url.starts_with("http://") {
            return Err(ConfigError::InvalidValue {
                field: "backend.base_url".to_string(),
                reason: "Base URL must start with http://".to_string(),
            });
        }

        if self.backend.session_cookie.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "backend.session_cookie".to_string(),
                reason: "Session cookie name must not be empty".to_string(),
            });
        }

        let currency = &self.currency.default_currency;
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ConfigError::InvalidValue {
                field: "currency.default_currency".to_string(),
                reason: "Currency must be a three-letter ISO 4217 code".to_string(),
            });
        }

        if self.currency.decimal_places > 10 {
            return Err(ConfigError::InvalidValue {
                field: "currency.decimal_places".to_string(),
                reason: "Decimal places must be between 0 and 10".to_string(),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Backend base URL without a trailing slash
    pub fn backend_url(&self) -> &str {
        self.backend.base_url.trim_end_matches('/')
    }

    /// Address the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_template_parses() {
        let config = Config::from_yaml(Config::generate_default()).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.backend.base_url, "http://localhost:8000");
        assert_eq!(config.currency.default_currency, "EUR");
        assert_eq!(config.bank_link.institution_id, "ING_INGBNL2A");
        assert_eq!(config.bank_link.access_scope.len(), 3);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = Config::from_yaml("server:\n  port: 9000\n").unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.backend.session_cookie, "session");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_rejects_zero_port() {
        let err = Config::from_yaml("server:\n  port: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "server.port"));
    }

    #[test]
    fn test_rejects_https_backend() {
        let err = Config::from_yaml("backend:\n  base_url: \"https://bank.example\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "backend.base_url"));
    }

    #[test]
    fn test_rejects_bad_currency() {
        let err = Config::from_yaml("currency:\n  default_currency: \"euro\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "currency.default_currency"));
    }

    #[test]
    fn test_invalid_yaml() {
        let err = Config::from_yaml("server: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidYaml { .. }));
    }

    #[test]
    fn test_backend_url_trims_trailing_slash() {
        let config = Config::from_yaml("backend:\n  base_url: \"http://api.local:5000/\"\n").unwrap();
        assert_eq!(config.backend_url(), "http://api.local:5000");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server:\n  host: \"127.0.0.1\"\n  port: 8088").unwrap();

        let config = Config::load(file.path().to_path_buf()).unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:8088");
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(PathBuf::from("/definitely/not/here.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }
}

//! Server configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use pogoda_core::{ForecastConfig, GeocodingConfig};

/// Shortest accepted outbound timeout in seconds.
pub const MIN_TIMEOUT_SECS: u64 = 1;
/// Longest accepted outbound timeout in seconds.
pub const MAX_TIMEOUT_SECS: u64 = 60;

/// Server configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server settings.
    pub server: ServerConfig,
    /// Storage settings.
    pub storage: StorageConfig,
    /// Geocoding provider settings.
    pub geocoding: GeocodingConfig,
    /// Forecast provider settings.
    pub forecast: ForecastConfig,
}

impl Config {
    /// Load configuration from the default path.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = default_config_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Read {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Save configuration to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        std::fs::write(path.as_ref(), content).map_err(|e| ConfigError::Write {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Validate the configuration and return every problem found.
    ///
    /// This checks:
    /// - Server bind address is `host:port` with a non-zero port
    /// - Storage path is not empty
    /// - Provider base URLs use http or https
    /// - The geocoding User-Agent is set
    /// - Timeouts are within 1-60 seconds
    ///
    /// # Example
    ///
    /// ```
    /// use pogoda_service::Config;
    ///
    /// let config = Config::default();
    /// config.validate().expect("Default config should be valid");
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        errors.extend(self.server.validate());
        errors.extend(self.storage.validate());
        errors.extend(validate_geocoding(&self.geocoding));
        errors.extend(validate_forecast(&self.forecast));

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Load and validate configuration from a file.
    pub fn load_validated<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = Self::load(path)?;
        config.validate()?;
        Ok(config)
    }
}

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:8000").
    pub bind: String,
    /// Directory served under `/static`, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
            static_dir: None,
        }
    }
}

impl ServerConfig {
    /// Validate server configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.bind.is_empty() {
            errors.push(ValidationError::new(
                "server.bind",
                "bind address cannot be empty",
            ));
        } else {
            match self.bind.rsplit_once(':') {
                None => errors.push(ValidationError::new(
                    "server.bind",
                    format!(
                        "invalid bind address '{}': expected format 'host:port'",
                        self.bind
                    ),
                )),
                Some((_, port)) => match port.parse::<u16>() {
                    Ok(0) => errors.push(ValidationError::new("server.bind", "port cannot be 0")),
                    Err(_) => errors.push(ValidationError::new(
                        "server.bind",
                        format!("invalid port '{}': must be a number 1-65535", port),
                    )),
                    Ok(_) => {}
                },
            }
        }

        if let Some(dir) = &self.static_dir
            && dir.as_os_str().is_empty()
        {
            errors.push(ValidationError::new(
                "server.static_dir",
                "static directory cannot be empty string (omit it instead)",
            ));
        }

        errors
    }
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Database file path.
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: pogoda_store::default_db_path(),
        }
    }
}

impl StorageConfig {
    /// Validate storage configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.path.as_os_str().is_empty() {
            errors.push(ValidationError::new(
                "storage.path",
                "database path cannot be empty",
            ));
        }

        errors
    }
}

fn validate_base_url(field: &str, url: &str) -> Option<ValidationError> {
    let url = url.trim();
    if url.starts_with("http://") || url.starts_with("https://") {
        None
    } else {
        Some(ValidationError::new(
            field,
            format!("invalid URL '{}': must start with http:// or https://", url),
        ))
    }
}

fn validate_timeout(field: &str, secs: u64) -> Option<ValidationError> {
    if (MIN_TIMEOUT_SECS..=MAX_TIMEOUT_SECS).contains(&secs) {
        None
    } else {
        Some(ValidationError::new(
            field,
            format!(
                "timeout {} is out of range ({}-{} seconds)",
                secs, MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS
            ),
        ))
    }
}

fn validate_geocoding(config: &GeocodingConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    errors.extend(validate_base_url("geocoding.base_url", &config.base_url));
    if config.user_agent.trim().is_empty() {
        errors.push(ValidationError::new(
            "geocoding.user_agent",
            "user agent cannot be empty (the provider rejects anonymous clients)",
        ));
    }
    errors.extend(validate_timeout(
        "geocoding.timeout_secs",
        config.timeout_secs,
    ));

    errors
}

fn validate_forecast(config: &ForecastConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    errors.extend(validate_base_url("forecast.base_url", &config.base_url));
    errors.extend(validate_timeout("forecast.timeout_secs", config.timeout_secs));

    errors
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),
    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    Validation(Vec<ValidationError>),
}

/// A single validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// The field path (e.g., `server.bind` or `geocoding.timeout_secs`).
    pub field: String,
    /// Description of the validation failure.
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Default configuration file path.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pogoda")
        .join("server.toml")
}

use crate::error::{Result, WltsError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Layered service settings for WLTS
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub port: ConfigValue<u16>,
    pub catalog_path: ConfigValue<PathBuf>,
    pub request_timeout_secs: ConfigValue<u64>,
    pub max_concurrency: ConfigValue<usize>,
    pub raster_buffer: ConfigValue<f64>,
    pub cors_origin: ConfigValue<String>,
    /// Accept caller roles from the roles header. Only enable behind a
    /// gateway that authenticates callers and sets or strips the header.
    pub trust_roles_header: ConfigValue<bool>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            port: ConfigValue::new(3001, ConfigSource::Default),
            catalog_path: ConfigValue::new(PathBuf::from("wlts.json"), ConfigSource::Default),
            request_timeout_secs: ConfigValue::new(30, ConfigSource::Default),
            max_concurrency: ConfigValue::new(8, ConfigSource::Default),
            raster_buffer: ConfigValue::new(0.002, ConfigSource::Default),
            cors_origin: ConfigValue::new("*".to_string(), ConfigSource::Default),
            trust_roles_header: ConfigValue::new(false, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| WltsError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| WltsError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(port) = file_config.port {
            self.port.update(port, ConfigSource::File);
        }

        if let Some(catalog) = file_config.catalog {
            self.catalog_path.update(catalog, ConfigSource::File);
        }

        if let Some(timeout) = file_config.request_timeout_secs {
            self.request_timeout_secs.update(timeout, ConfigSource::File);
        }

        if let Some(max_concurrency) = file_config.max_concurrency {
            self.max_concurrency.update(parse_concurrency(max_concurrency)?, ConfigSource::File);
        }

        if let Some(buffer) = file_config.raster_buffer {
            self.raster_buffer.update(parse_raster_buffer(buffer)?, ConfigSource::File);
        }

        if let Some(origin) = file_config.cors_origin {
            self.cors_origin.update(origin, ConfigSource::File);
        }

        if let Some(trust) = file_config.trust_roles_header {
            self.trust_roles_header.update(trust, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // WLTS_PORT
        if let Ok(port_str) = env::var("WLTS_PORT") {
            match port_str.parse::<u16>() {
                Ok(port) => self.port.update(port, ConfigSource::Environment),
                Err(_) => tracing::warn!("Invalid WLTS_PORT value '{}': expected port number", port_str),
            }
        }

        // WLTS_CATALOG
        if let Ok(catalog) = env::var("WLTS_CATALOG") {
            self.catalog_path.update(PathBuf::from(catalog), ConfigSource::Environment);
        }

        // WLTS_REQUEST_TIMEOUT
        if let Ok(timeout_str) = env::var("WLTS_REQUEST_TIMEOUT") {
            match timeout_str.parse::<u64>() {
                Ok(timeout) => self.request_timeout_secs.update(timeout, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid WLTS_REQUEST_TIMEOUT value '{}': expected seconds",
                    timeout_str
                ),
            }
        }

        // WLTS_MAX_CONCURRENCY
        if let Ok(value) = env::var("WLTS_MAX_CONCURRENCY") {
            match value.parse::<usize>().ok().and_then(|v| parse_concurrency(v).ok()) {
                Some(limit) => self.max_concurrency.update(limit, ConfigSource::Environment),
                None => tracing::warn!(
                    "Invalid WLTS_MAX_CONCURRENCY value '{}': expected positive integer",
                    value
                ),
            }
        }

        // WLTS_RASTER_BUFFER
        if let Ok(value) = env::var("WLTS_RASTER_BUFFER") {
            match value.parse::<f64>().ok().and_then(|v| parse_raster_buffer(v).ok()) {
                Some(buffer) => self.raster_buffer.update(buffer, ConfigSource::Environment),
                None => tracing::warn!(
                    "Invalid WLTS_RASTER_BUFFER value '{}': expected positive degrees",
                    value
                ),
            }
        }

        // WLTS_CORS_ORIGIN
        if let Ok(origin) = env::var("WLTS_CORS_ORIGIN") {
            self.cors_origin.update(origin, ConfigSource::Environment);
        }

        // WLTS_TRUST_ROLES_HEADER
        if let Ok(value) = env::var("WLTS_TRUST_ROLES_HEADER") {
            match value.parse::<bool>() {
                Ok(trust) => self.trust_roles_header.update(trust, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid WLTS_TRUST_ROLES_HEADER value '{}': expected true or false",
                    value
                ),
            }
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(port) = overrides.port {
            self.port.update(port, ConfigSource::Cli);
        }

        if let Some(catalog) = overrides.catalog_path {
            self.catalog_path.update(catalog, ConfigSource::Cli);
        }

        if let Some(timeout) = overrides.request_timeout_secs {
            self.request_timeout_secs.update(timeout, ConfigSource::Cli);
        }

        if let Some(max_concurrency) = overrides.max_concurrency {
            self.max_concurrency.update(max_concurrency.max(1), ConfigSource::Cli);
        }
    }

    /// Get all configuration values as a map for inspection
    pub fn to_inspection_map(&self) -> HashMap<String, (String, ConfigSource)> {
        let mut map = HashMap::new();

        map.insert("port".to_string(), (self.port.value.to_string(), self.port.source));

        map.insert(
            "catalog_path".to_string(),
            (self.catalog_path.value.display().to_string(), self.catalog_path.source),
        );

        map.insert(
            "request_timeout_secs".to_string(),
            (self.request_timeout_secs.value.to_string(), self.request_timeout_secs.source),
        );

        map.insert(
            "max_concurrency".to_string(),
            (self.max_concurrency.value.to_string(), self.max_concurrency.source),
        );

        map.insert(
            "raster_buffer".to_string(),
            (self.raster_buffer.value.to_string(), self.raster_buffer.source),
        );

        map.insert(
            "cors_origin".to_string(),
            (self.cors_origin.value.clone(), self.cors_origin.source),
        );

        map.insert(
            "trust_roles_header".to_string(),
            (self.trust_roles_header.value.to_string(), self.trust_roles_header.source),
        );

        map
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    port: Option<u16>,
    catalog: Option<PathBuf>,
    request_timeout_secs: Option<u64>,
    max_concurrency: Option<usize>,
    raster_buffer: Option<f64>,
    cors_origin: Option<String>,
    trust_roles_header: Option<bool>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub port: Option<u16>,
    pub catalog_path: Option<PathBuf>,
    pub request_timeout_secs: Option<u64>,
    pub max_concurrency: Option<usize>,
}

fn parse_concurrency(value: usize) -> Result<usize> {
    if value == 0 {
        return Err(WltsError::ConfigInvalid {
            key: "max_concurrency".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(value)
}

fn parse_raster_buffer(value: f64) -> Result<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(WltsError::ConfigInvalid {
            key: "raster_buffer".to_string(),
            reason: format!("must be a positive number of degrees, got {}", value),
        });
    }
    Ok(value)
}

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use wlts_core::config::LayeredConfig;
use wlts_core::error::Result;

/// API server configuration resolved from the layered settings
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub port: u16,
    pub cors_origin: String,
    pub catalog_path: PathBuf,
    pub request_timeout: Duration,
    pub max_concurrency: usize,
    pub raster_buffer: f64,
    pub trust_roles_header: bool,
}

impl ApiConfig {
    /// Load defaults, then the optional `WLTS_CONFIG` file, then environment overrides
    pub fn load() -> Result<Self> {
        let mut layered = LayeredConfig::with_defaults();
        if let Ok(path) = env::var("WLTS_CONFIG") {
            layered = layered.load_from_file(&path)?;
        }
        Ok(Self::from_layered(&layered.load_from_env()))
    }

    pub fn from_layered(config: &LayeredConfig) -> Self {
        Self {
            port: config.port.value,
            cors_origin: config.cors_origin.value.clone(),
            catalog_path: config.catalog_path.value.clone(),
            request_timeout: Duration::from_secs(config.request_timeout_secs.value),
            max_concurrency: config.max_concurrency.value,
            raster_buffer: config.raster_buffer.value,
            trust_roles_header: config.trust_roles_header.value,
        }
    }

    /// Get the server bind address
    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }

    /// `*` allows any origin
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origin.trim() == "*"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_load_uses_environment() {
        env::remove_var("WLTS_CONFIG");
        env::set_var("WLTS_PORT", "8080");
        env::set_var("WLTS_CATALOG", "/etc/wlts/catalog.toml");

        let config = ApiConfig::load().unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.catalog_path, PathBuf::from("/etc/wlts/catalog.toml"));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.allows_any_origin());
        assert!(!config.trust_roles_header);

        env::remove_var("WLTS_PORT");
        env::remove_var("WLTS_CATALOG");
    }

    #[test]
    #[serial]
    fn test_roles_header_trust_from_environment() {
        env::remove_var("WLTS_CONFIG");
        env::set_var("WLTS_TRUST_ROLES_HEADER", "true");
        assert!(ApiConfig::load().unwrap().trust_roles_header);

        // Unparseable values keep the default
        env::set_var("WLTS_TRUST_ROLES_HEADER", "yes");
        assert!(!ApiConfig::load().unwrap().trust_roles_header);

        env::remove_var("WLTS_TRUST_ROLES_HEADER");
    }

    #[test]
    #[serial]
    fn test_missing_settings_file_fails() {
        env::set_var("WLTS_CONFIG", "/nonexistent/wlts.toml");
        assert!(ApiConfig::load().is_err());
        env::remove_var("WLTS_CONFIG");
    }
}

//! Integration tests for layered service settings
//!
//! Precedence: CLI arguments > Environment variables > Config file > Defaults

use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;
use wlts_core::config::{CliConfigOverrides, ConfigSource, LayeredConfig};

fn clear_env() {
    for key in [
        "WLTS_PORT",
        "WLTS_CATALOG",
        "WLTS_REQUEST_TIMEOUT",
        "WLTS_MAX_CONCURRENCY",
        "WLTS_RASTER_BUFFER",
        "WLTS_CORS_ORIGIN",
    ] {
        env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_env_overrides_file() {
    clear_env();
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
port = 8080
catalog = "from-file.json"
"#
    )
    .unwrap();

    env::set_var("WLTS_CATALOG", "from-env.toml");

    let config = LayeredConfig::with_defaults()
        .load_from_file(file.path())
        .unwrap()
        .load_from_env();

    assert_eq!(config.port.value, 8080);
    assert_eq!(config.port.source, ConfigSource::File);
    assert_eq!(config.catalog_path.value, PathBuf::from("from-env.toml"));
    assert_eq!(config.catalog_path.source, ConfigSource::Environment);

    clear_env();
}

#[test]
#[serial]
fn test_invalid_env_values_are_ignored() {
    clear_env();
    env::set_var("WLTS_PORT", "not-a-port");
    env::set_var("WLTS_MAX_CONCURRENCY", "0");
    env::set_var("WLTS_RASTER_BUFFER", "-1");

    let config = LayeredConfig::with_defaults().load_from_env();

    assert_eq!(config.port.value, 3001);
    assert_eq!(config.port.source, ConfigSource::Default);
    assert_eq!(config.max_concurrency.value, 8);
    assert_eq!(config.raster_buffer.source, ConfigSource::Default);

    clear_env();
}

#[test]
#[serial]
fn test_cli_overrides_everything() {
    clear_env();
    env::set_var("WLTS_PORT", "9000");
    env::set_var("WLTS_REQUEST_TIMEOUT", "5");

    let mut config = LayeredConfig::with_defaults().load_from_env();
    config.update_from_cli(CliConfigOverrides {
        port: Some(7000),
        ..Default::default()
    });

    assert_eq!(config.port.value, 7000);
    assert_eq!(config.port.source, ConfigSource::Cli);
    assert_eq!(config.request_timeout_secs.value, 5);
    assert_eq!(config.request_timeout_secs.source, ConfigSource::Environment);

    clear_env();
}

#[test]
fn test_missing_file_is_config_error() {
    let result = LayeredConfig::with_defaults().load_from_file("/nonexistent/wlts.toml");
    assert!(result.is_err());
}

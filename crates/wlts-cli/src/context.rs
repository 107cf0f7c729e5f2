//! Settings and engine loading shared by CLI commands

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;
use wlts_core::catalog::Catalog;
use wlts_core::config::LayeredConfig;
use wlts_trajectory::{CollectionRegistry, DatasourceRegistry, TrajectoryService};

use crate::cli::Cli;

/// Load layered settings: defaults, settings file, environment, then CLI flags
pub fn load_config(cli: &Cli) -> Result<LayeredConfig> {
    let settings = cli
        .config
        .clone()
        .or_else(|| std::env::var("WLTS_CONFIG").ok().map(PathBuf::from));

    let mut config = LayeredConfig::with_defaults();
    if let Some(path) = settings {
        config = config
            .load_from_file(&path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?;
    }
    let mut config = config.load_from_env();
    config.update_from_cli(cli.overrides());
    Ok(config)
}

/// Build the trajectory engine from the configured catalog
pub fn load_service(config: &LayeredConfig) -> Result<TrajectoryService> {
    let path = &config.catalog_path.value;
    let catalog = Catalog::load(path).with_context(|| {
        format!("Failed to load catalog from {}. Pass --catalog or set WLTS_CATALOG", path.display())
    })?;

    let timeout = Duration::from_secs(config.request_timeout_secs.value);
    let datasources = DatasourceRegistry::from_catalog(&catalog, timeout)?;
    let collections =
        CollectionRegistry::from_catalog(&catalog, &datasources, config.raster_buffer.value)?;

    tracing::debug!(
        catalog = %path.display(),
        collections = collections.len(),
        max_concurrency = config.max_concurrency.value,
        "Engine ready"
    );
    Ok(TrajectoryService::new(collections, config.max_concurrency.value))
}

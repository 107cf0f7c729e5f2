use clap::{Parser, Subcommand};
use std::path::PathBuf;
use wlts_core::config::CliConfigOverrides;
use wlts_core::models::{Roles, TrajectoryParams};

/// WLTS - Web Land Trajectory Service
#[derive(Parser, Debug)]
#[command(name = "wlts")]
#[command(about = "Land-classification trajectories across feature and coverage collections", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Settings file (TOML); defaults to WLTS_CONFIG when set
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Catalog file (JSON or TOML)
    #[arg(long, global = true, value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    /// Upstream request timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Collections queried at once
    #[arg(long, global = true, value_name = "N")]
    pub max_concurrency: Option<usize>,

    /// Comma separated roles of the caller (private collections need a matching role)
    #[arg(long, global = true, value_name = "ROLES")]
    pub roles: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn overrides(&self) -> CliConfigOverrides {
        CliConfigOverrides {
            port: None,
            catalog_path: self.catalog.clone(),
            request_timeout_secs: self.timeout,
            max_concurrency: self.max_concurrency,
        }
    }

    pub fn caller_roles(&self) -> Roles {
        self.roles.as_deref().map(Roles::from_csv).unwrap_or_default()
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the collections visible to the caller
    List,

    /// Show the metadata of one collection
    Describe(DescribeArgs),

    /// Resolve the land-use trajectory of a point
    Trajectory(TrajectoryArgs),

    /// Check that every collection layer is advertised by its datasource
    Doctor(DoctorArgs),

    /// Show effective settings and where each value comes from
    Config,
}

#[derive(Parser, Debug)]
pub struct DescribeArgs {
    /// Collection name
    pub name: String,
}

#[derive(Parser, Debug)]
pub struct TrajectoryArgs {
    /// Longitude in decimal degrees (EPSG:4326)
    #[arg(long, allow_hyphen_values = true)]
    pub longitude: String,

    /// Latitude in decimal degrees (EPSG:4326)
    #[arg(long, allow_hyphen_values = true)]
    pub latitude: String,

    /// Comma separated collection names (defaults to every visible collection)
    #[arg(long)]
    pub collections: Option<String>,

    /// Start of the temporal window (YYYY, YYYY-MM or YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<String>,

    /// End of the temporal window (YYYY, YYYY-MM or YYYY-MM-DD)
    #[arg(long)]
    pub end_date: Option<String>,

    /// Embed each observation's geometry in the result
    #[arg(long)]
    pub geometry: bool,
}

impl TrajectoryArgs {
    pub fn into_params(self) -> TrajectoryParams {
        TrajectoryParams {
            latitude: Some(self.latitude),
            longitude: Some(self.longitude),
            collections: self.collections,
            start_date: self.start_date,
            end_date: self.end_date,
            geometry: self.geometry.then(|| "true".to_string()),
        }
    }
}

#[derive(Parser, Debug)]
pub struct DoctorArgs {
    /// Show every checked layer
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

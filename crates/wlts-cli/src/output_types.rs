use serde::Serialize;
use tabled::Tabled;
use wlts_core::config::ConfigSource;
use wlts_core::models::TrajectoryPoint;
use wlts_trajectory::Collection;

/// Row of the list command
#[derive(Debug, Serialize, Tabled)]
pub struct CollectionRow {
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Type")]
    pub kind: String,
    #[tabled(rename = "Datasource")]
    pub datasource: String,
    #[tabled(rename = "Public")]
    pub public: bool,
}

impl From<&Collection> for CollectionRow {
    fn from(collection: &Collection) -> Self {
        Self {
            name: collection.name().to_string(),
            kind: collection.kind().to_string(),
            datasource: collection.datasource_id().to_string(),
            public: collection.is_public(),
        }
    }
}

/// Output for the list command
#[derive(Debug, Serialize)]
pub struct ListOutput {
    pub collections: Vec<String>,
}

/// Row of the trajectory command
#[derive(Debug, Tabled)]
pub struct TrajectoryRow {
    #[tabled(rename = "Date")]
    pub date: String,
    #[tabled(rename = "Collection")]
    pub collection: String,
    #[tabled(rename = "Class")]
    pub class: String,
}

impl From<&TrajectoryPoint> for TrajectoryRow {
    fn from(point: &TrajectoryPoint) -> Self {
        Self {
            date: point.date.clone(),
            collection: point.collection.clone(),
            class: point.class.clone(),
        }
    }
}

/// Outcome of one doctor check
#[derive(Debug, Serialize, Tabled)]
pub struct CheckResult {
    #[tabled(rename = "Collection")]
    pub collection: String,
    #[tabled(rename = "Layers")]
    pub layers: usize,
    #[tabled(rename = "Passed")]
    pub passed: bool,
    #[tabled(rename = "Message")]
    pub message: String,
}

/// Output for the doctor command
#[derive(Debug, Serialize)]
pub struct DoctorOutput {
    pub checks: Vec<CheckResult>,
    pub passed: usize,
    pub total: usize,
}

/// Row of the config command
#[derive(Debug, Serialize, Tabled)]
pub struct ConfigEntry {
    #[tabled(rename = "Setting")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Source")]
    pub source: &'static str,
}

impl ConfigEntry {
    pub fn new(key: String, value: String, source: ConfigSource) -> Self {
        Self { key, value, source: source_label(source) }
    }
}

fn source_label(source: ConfigSource) -> &'static str {
    match source {
        ConfigSource::Default => "default",
        ConfigSource::File => "file",
        ConfigSource::Environment => "env",
        ConfigSource::Cli => "cli",
    }
}

use serde::Serialize;

/// Service root response
#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub version: &'static str,
    pub application_name: &'static str,
}

impl RootResponse {
    pub fn new(version: &'static str) -> Self {
        Self { version, application_name: "Web Land Trajectory Service" }
    }
}

/// Collection list response
#[derive(Debug, Serialize)]
pub struct CollectionsResponse {
    pub collections: Vec<String>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub collections: usize,
}

impl HealthResponse {
    pub fn ok(collections: usize) -> Self {
        Self { status: "ok", service: "wlts-api", collections }
    }
}

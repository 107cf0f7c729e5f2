//! Error types for WLTS

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WltsError {
    // Catalog lookups
    #[error("Collection not found: {name}")]
    CollectionNotFound { name: String },

    #[error("Access to collection {name} is forbidden")]
    Forbidden { name: String },

    #[error("Datasource not found: {id}")]
    DatasourceNotFound { id: String },

    // Protocol adapter preconditions
    #[error("Feature type {name} not found on datasource {datasource}")]
    FeatureTypeNotFound { name: String, datasource: String },

    #[error("Coverage {name} not found on datasource {datasource}")]
    CoverageNotFound { name: String, datasource: String },

    // Classification
    #[error("No class found for identifier {identifier} in {type_name}")]
    ClassNotFound { identifier: String, type_name: String },

    // Upstream services
    #[error("Datasource {datasource} unavailable: {reason}")]
    UpstreamUnavailable { datasource: String, reason: String },

    #[error("Invalid response from datasource {datasource}: {reason}")]
    InvalidResponse { datasource: String, reason: String },

    // Request validation
    #[error("Malformed query: {reason}")]
    MalformedQuery { reason: String },

    #[error("Invalid date '{value}': {reason}")]
    InvalidDate { value: String, reason: String },

    // Geometry
    #[error("Projection from EPSG:{from} to EPSG:{to} failed: {reason}")]
    Projection { from: u32, to: u32, reason: String },

    // Configuration errors
    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    #[error("Catalog file not found at {path}")]
    CatalogNotFound { path: PathBuf },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Coarse classification of errors as seen by a request boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    ClassNotFound,
    UpstreamUnavailable,
    MalformedQuery,
    Configuration,
    Internal,
}

impl WltsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WltsError::CollectionNotFound { .. }
            | WltsError::DatasourceNotFound { .. }
            | WltsError::FeatureTypeNotFound { .. }
            | WltsError::CoverageNotFound { .. } => ErrorKind::NotFound,
            WltsError::Forbidden { .. } => ErrorKind::Forbidden,
            WltsError::ClassNotFound { .. } => ErrorKind::ClassNotFound,
            WltsError::UpstreamUnavailable { .. } | WltsError::InvalidResponse { .. } => {
                ErrorKind::UpstreamUnavailable
            }
            WltsError::MalformedQuery { .. } | WltsError::InvalidDate { .. } => {
                ErrorKind::MalformedQuery
            }
            WltsError::ConfigInvalid { .. } | WltsError::CatalogNotFound { .. } => {
                ErrorKind::Configuration
            }
            WltsError::Projection { .. } | WltsError::Io(_) | WltsError::Serialization(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Soft failures skip a single observation instead of failing the request
    pub fn is_soft(&self) -> bool {
        self.kind() == ErrorKind::ClassNotFound
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        WltsError::MalformedQuery { reason: reason.into() }
    }

    pub fn config_invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        WltsError::ConfigInvalid { key: key.into(), reason: reason.into() }
    }
}

pub type Result<T> = std::result::Result<T, WltsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_class_not_found_is_soft() {
        let soft = WltsError::ClassNotFound {
            identifier: "7".to_string(),
            type_name: "lccs:classes".to_string(),
        };
        assert!(soft.is_soft());

        let hard = WltsError::FeatureTypeNotFound {
            name: "ws:deter".to_string(),
            datasource: "geoserver".to_string(),
        };
        assert!(!hard.is_soft());
        assert_eq!(hard.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_date_errors_are_malformed_queries() {
        let err = WltsError::InvalidDate {
            value: "yesterday".to_string(),
            reason: "unrecognised".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::MalformedQuery);
    }
}

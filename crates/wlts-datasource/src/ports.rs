use async_trait::async_trait;
use wlts_core::error::Result;

use crate::models::{ClassLookupRequest, CoverageRequest, FeatureQuery, FeatureRecord};

/// Port for a vector feature service
#[async_trait]
pub trait VectorSource: Send + Sync {
    /// Datasource identifier
    fn id(&self) -> &str;

    /// Default workspace for unqualified names
    fn workspace(&self) -> &str;

    /// Qualified names of all advertised feature types
    async fn feature_types(&self) -> Result<Vec<String>>;

    /// Features intersecting the query point
    async fn get_features(&self, query: &FeatureQuery) -> Result<Vec<FeatureRecord>>;

    /// Label of the class matching the request, if any
    async fn get_class(&self, request: &ClassLookupRequest) -> Result<Option<String>>;
}

/// Port for a raster coverage service
#[async_trait]
pub trait RasterSource: Send + Sync {
    /// Datasource identifier
    fn id(&self) -> &str;

    /// Default workspace for unqualified names
    fn workspace(&self) -> &str;

    /// Qualified names of all advertised coverages
    async fn coverages(&self) -> Result<Vec<String>>;

    /// Value of the first band at the request point, `None` when no value
    async fn sample(&self, request: &CoverageRequest) -> Result<Option<f64>>;
}

/// Port for resolving class identifiers into labels
#[async_trait]
pub trait ClassLookup: Send + Sync {
    /// Datasource answering the lookups
    fn datasource_id(&self) -> &str;

    /// Default workspace for the class feature type
    fn workspace(&self) -> &str;

    async fn lookup_class(&self, request: &ClassLookupRequest) -> Result<Option<String>>;
}

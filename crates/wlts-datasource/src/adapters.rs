//! Query adapters wrapping the protocol ports.
//!
//! Adapters add what every source needs regardless of protocol: lazily
//! fetched capability listings, the existence precondition on feature types
//! and coverages, and process-lifetime memoization of idempotent calls.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{OnceCell, RwLock};
use wlts_core::catalog::{DatasourceDefinition, DatasourceKind};
use wlts_core::error::{Result, WltsError};

use crate::models::{ClassLookupRequest, CoverageRequest, FeatureQuery, FeatureRecord};
use crate::ports::{ClassLookup, RasterSource, VectorSource};
use crate::wcs::WcsClient;
use crate::wfs::WfsClient;

/// Capability listings are qualified (`ws:name`); accept either form
fn advertised(names: &HashSet<String>, name: &str) -> bool {
    names.contains(name) || name.split_once(':').is_some_and(|(_, local)| names.contains(local))
}

/// Vector query adapter over a feature service
pub struct VectorAdapter {
    source: Arc<dyn VectorSource>,
    feature_types: OnceCell<HashSet<String>>,
    classes: RwLock<HashMap<String, Option<String>>>,
}

impl std::fmt::Debug for VectorAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorAdapter").field("id", &self.id()).finish()
    }
}

impl VectorAdapter {
    pub fn new(source: Arc<dyn VectorSource>) -> Self {
        Self { source, feature_types: OnceCell::new(), classes: RwLock::new(HashMap::new()) }
    }

    pub fn id(&self) -> &str {
        self.source.id()
    }

    pub fn workspace(&self) -> &str {
        self.source.workspace()
    }

    /// Advertised feature types, fetched once
    pub async fn feature_types(&self) -> Result<&HashSet<String>> {
        self.feature_types
            .get_or_try_init(|| async {
                let names = self.source.feature_types().await?;
                tracing::debug!(datasource = %self.id(), count = names.len(), "Loaded feature types");
                Ok::<_, WltsError>(names.into_iter().collect())
            })
            .await
    }

    pub async fn ensure_feature_type(&self, type_name: &str) -> Result<()> {
        if advertised(self.feature_types().await?, type_name) {
            Ok(())
        } else {
            Err(WltsError::FeatureTypeNotFound {
                name: type_name.to_string(),
                datasource: self.id().to_string(),
            })
        }
    }

    /// Records intersecting the query point.
    ///
    /// Queries whose configured date lies outside the window return no
    /// records without contacting the service.
    pub async fn query_feature(&self, query: &FeatureQuery) -> Result<Vec<FeatureRecord>> {
        if query.skip_locally() {
            tracing::debug!(type_name = %query.type_name, "Observation outside date window");
            return Ok(Vec::new());
        }
        self.ensure_feature_type(&query.type_name).await?;
        self.source.get_features(query).await
    }
}

#[async_trait]
impl ClassLookup for VectorAdapter {
    fn datasource_id(&self) -> &str {
        self.id()
    }

    fn workspace(&self) -> &str {
        self.source.workspace()
    }

    async fn lookup_class(&self, request: &ClassLookupRequest) -> Result<Option<String>> {
        let key = request.cache_key();
        if let Some(cached) = self.classes.read().await.get(&key) {
            return Ok(cached.clone());
        }

        let label = self.source.get_class(request).await?;
        self.classes.write().await.insert(key, label.clone());
        Ok(label)
    }
}

/// Raster query adapter over a coverage service
pub struct RasterAdapter {
    source: Arc<dyn RasterSource>,
    coverages: OnceCell<HashSet<String>>,
    samples: RwLock<HashMap<String, Option<f64>>>,
}

impl std::fmt::Debug for RasterAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterAdapter").field("id", &self.id()).finish()
    }
}

impl RasterAdapter {
    pub fn new(source: Arc<dyn RasterSource>) -> Self {
        Self { source, coverages: OnceCell::new(), samples: RwLock::new(HashMap::new()) }
    }

    pub fn id(&self) -> &str {
        self.source.id()
    }

    pub fn workspace(&self) -> &str {
        self.source.workspace()
    }

    /// Advertised coverages, fetched once
    pub async fn coverages(&self) -> Result<&HashSet<String>> {
        self.coverages
            .get_or_try_init(|| async {
                let names = self.source.coverages().await?;
                tracing::debug!(datasource = %self.id(), count = names.len(), "Loaded coverages");
                Ok::<_, WltsError>(names.into_iter().collect())
            })
            .await
    }

    pub async fn ensure_coverage(&self, coverage: &str) -> Result<()> {
        if advertised(self.coverages().await?, coverage) {
            Ok(())
        } else {
            Err(WltsError::CoverageNotFound {
                name: coverage.to_string(),
                datasource: self.id().to_string(),
            })
        }
    }

    /// Sampled value at the request point, memoized per request
    pub async fn sample_coverage(&self, request: &CoverageRequest) -> Result<Option<f64>> {
        self.ensure_coverage(&request.coverage).await?;

        let key = request.cache_key();
        if let Some(cached) = self.samples.read().await.get(&key) {
            return Ok(*cached);
        }

        let value = self.source.sample(request).await?;
        self.samples.write().await.insert(key, value);
        Ok(value)
    }
}

/// A configured datasource: one of the two protocol families
#[derive(Clone)]
pub enum Datasource {
    Vector(Arc<VectorAdapter>),
    Raster(Arc<RasterAdapter>),
}

impl std::fmt::Debug for Datasource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Datasource").field("id", &self.id()).field("kind", &self.kind()).finish()
    }
}

impl Datasource {
    /// Build the protocol client described by a catalog entry
    pub fn from_definition(definition: &DatasourceDefinition, timeout: Duration) -> Result<Self> {
        let datasource = match definition.kind {
            DatasourceKind::Wfs => Datasource::vector(Arc::new(WfsClient::new(definition, timeout)?)),
            DatasourceKind::Wcs => Datasource::raster(Arc::new(WcsClient::new(definition, timeout)?)),
        };
        tracing::debug!(datasource = %definition.id, kind = %definition.kind, host = %definition.host, "Created datasource");
        Ok(datasource)
    }

    pub fn vector(source: Arc<dyn VectorSource>) -> Self {
        Datasource::Vector(Arc::new(VectorAdapter::new(source)))
    }

    pub fn raster(source: Arc<dyn RasterSource>) -> Self {
        Datasource::Raster(Arc::new(RasterAdapter::new(source)))
    }

    pub fn id(&self) -> &str {
        match self {
            Datasource::Vector(adapter) => adapter.id(),
            Datasource::Raster(adapter) => adapter.id(),
        }
    }

    pub fn kind(&self) -> DatasourceKind {
        match self {
            Datasource::Vector(_) => DatasourceKind::Wfs,
            Datasource::Raster(_) => DatasourceKind::Wcs,
        }
    }

    pub fn workspace(&self) -> &str {
        match self {
            Datasource::Vector(adapter) => adapter.workspace(),
            Datasource::Raster(adapter) => adapter.workspace(),
        }
    }

    pub fn as_vector(&self) -> Option<&Arc<VectorAdapter>> {
        match self {
            Datasource::Vector(adapter) => Some(adapter),
            Datasource::Raster(_) => None,
        }
    }

    pub fn as_raster(&self) -> Option<&Arc<RasterAdapter>> {
        match self {
            Datasource::Raster(adapter) => Some(adapter),
            Datasource::Vector(_) => None,
        }
    }

    /// Classification lookups are answered by feature services only
    pub fn as_class_lookup(&self) -> Option<Arc<dyn ClassLookup>> {
        self.as_vector().map(|adapter| Arc::clone(adapter) as Arc<dyn ClassLookup>)
    }

    /// Check that a feature type or coverage is advertised
    pub async fn ensure_layer(&self, name: &str) -> Result<()> {
        match self {
            Datasource::Vector(adapter) => adapter.ensure_feature_type(name).await,
            Datasource::Raster(adapter) => adapter.ensure_coverage(name).await,
        }
    }
}

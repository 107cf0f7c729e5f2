//! In-memory datasource implementations for development and testing.
//!
//! These implementations use `RwLock::unwrap()` intentionally. Lock poisoning
//! only occurs when another thread panicked while holding the lock, which is
//! an unrecoverable state. For real deployments, use the WFS/WCS clients.
//!
//! Every call is recorded so callers can assert which requests reached a
//! datasource, and which did not.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use wlts_core::dates::parse_date;
use wlts_core::error::{Result, WltsError};
use wlts_geo::intersects_point;

use crate::models::{
    qualified_name, ClassLookupRequest, CoverageRequest, FeatureQuery, FeatureRecord,
    TemporalFilter,
};
use crate::ports::{RasterSource, VectorSource};

/// A request observed by an in-memory source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedRequest {
    FeatureTypes,
    GetFeature { type_name: String, cql_filter: String },
    GetClass { type_name: String, cql_filter: String },
    Coverages,
    Sample { coverage: String, time: String },
}

#[derive(Debug, Clone, Default)]
struct Recorder {
    requests: Arc<RwLock<Vec<RecordedRequest>>>,
    unavailable: Arc<AtomicBool>,
}

impl Recorder {
    fn record(&self, datasource: &str, request: RecordedRequest) -> Result<()> {
        self.requests.write().unwrap().push(request);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(WltsError::UpstreamUnavailable {
                datasource: datasource.to_string(),
                reason: "connection refused".to_string(),
            });
        }
        Ok(())
    }
}

/// In-memory feature service
#[derive(Debug, Clone, Default)]
pub struct MemoryVectorSource {
    id: String,
    workspace: String,
    features: Arc<RwLock<HashMap<String, Vec<FeatureRecord>>>>,
    classes: Arc<RwLock<HashMap<(String, String), String>>>,
    recorder: Recorder,
}

impl MemoryVectorSource {
    pub fn new(id: impl Into<String>, workspace: impl Into<String>) -> Self {
        Self { id: id.into(), workspace: workspace.into(), ..Default::default() }
    }

    /// Advertise a feature type; unqualified names get the source workspace
    pub fn add_feature_type(&self, type_name: &str) {
        let type_name = qualified_name(&self.workspace, type_name);
        self.features.write().unwrap().entry(type_name).or_default();
    }

    pub fn insert_feature(&self, type_name: &str, record: FeatureRecord) {
        let type_name = qualified_name(&self.workspace, type_name);
        self.features.write().unwrap().entry(type_name).or_default().push(record);
    }

    /// Register a class label answered by lookups on `type_name`
    pub fn insert_class(&self, type_name: &str, identifier: &str, label: &str) {
        let type_name = qualified_name(&self.workspace, type_name);
        self.add_feature_type(&type_name);
        self.classes
            .write()
            .unwrap()
            .insert((type_name, identifier.to_string()), label.to_string());
    }

    /// Make every following call fail with `UpstreamUnavailable`
    pub fn set_unavailable(&self, unavailable: bool) {
        self.recorder.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.recorder.requests.read().unwrap().clone()
    }
}

fn matches_temporal(record: &FeatureRecord, temporal: &TemporalFilter) -> bool {
    match temporal {
        TemporalFilter::Range { property, window, .. } => record
            .property_text(property)
            .and_then(|value| parse_date(&value).ok())
            .is_some_and(|date| window.contains(date)),
        _ => true,
    }
}

#[async_trait]
impl VectorSource for MemoryVectorSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn workspace(&self) -> &str {
        &self.workspace
    }

    async fn feature_types(&self) -> Result<Vec<String>> {
        self.recorder.record(&self.id, RecordedRequest::FeatureTypes)?;
        let features = self.features.read().unwrap();
        let mut names: Vec<String> = features.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn get_features(&self, query: &FeatureQuery) -> Result<Vec<FeatureRecord>> {
        self.recorder.record(
            &self.id,
            RecordedRequest::GetFeature {
                type_name: query.type_name.clone(),
                cql_filter: query.cql_filter()?,
            },
        )?;

        let features = self.features.read().unwrap();
        Ok(features
            .get(&query.type_name)
            .map(|records| {
                records
                    .iter()
                    .filter(|record| {
                        record
                            .geometry
                            .as_ref()
                            .is_some_and(|geometry| intersects_point(geometry, query.x, query.y))
                    })
                    .filter(|record| matches_temporal(record, &query.temporal))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_class(&self, request: &ClassLookupRequest) -> Result<Option<String>> {
        self.recorder.record(
            &self.id,
            RecordedRequest::GetClass {
                type_name: request.type_name.clone(),
                cql_filter: request.cql_filter(),
            },
        )?;

        let classes = self.classes.read().unwrap();
        Ok(classes.get(&(request.type_name.clone(), request.identifier.clone())).cloned())
    }
}

/// In-memory coverage service holding one value per `(coverage, time)`
#[derive(Debug, Clone, Default)]
pub struct MemoryRasterSource {
    id: String,
    workspace: String,
    coverages: Arc<RwLock<HashMap<String, HashMap<String, f64>>>>,
    recorder: Recorder,
}

impl MemoryRasterSource {
    pub fn new(id: impl Into<String>, workspace: impl Into<String>) -> Self {
        Self { id: id.into(), workspace: workspace.into(), ..Default::default() }
    }

    pub fn add_coverage(&self, coverage: &str) {
        let coverage = qualified_name(&self.workspace, coverage);
        self.coverages.write().unwrap().entry(coverage).or_default();
    }

    pub fn insert_sample(&self, coverage: &str, time: &str, value: f64) {
        let coverage = qualified_name(&self.workspace, coverage);
        self.coverages
            .write()
            .unwrap()
            .entry(coverage)
            .or_default()
            .insert(time.to_string(), value);
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.recorder.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.recorder.requests.read().unwrap().clone()
    }
}

#[async_trait]
impl RasterSource for MemoryRasterSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn workspace(&self) -> &str {
        &self.workspace
    }

    async fn coverages(&self) -> Result<Vec<String>> {
        self.recorder.record(&self.id, RecordedRequest::Coverages)?;
        let coverages = self.coverages.read().unwrap();
        let mut names: Vec<String> = coverages.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn sample(&self, request: &CoverageRequest) -> Result<Option<f64>> {
        self.recorder.record(
            &self.id,
            RecordedRequest::Sample { coverage: request.coverage.clone(), time: request.time.clone() },
        )?;

        let coverages = self.coverages.read().unwrap();
        Ok(coverages.get(&request.coverage).and_then(|times| times.get(&request.time)).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map, Value};
    use wlts_core::models::Geometry;

    fn parcel(class: &str, date: &str) -> FeatureRecord {
        let mut properties = Map::new();
        properties.insert("classname".to_string(), Value::from(class));
        properties.insert("view_date".to_string(), json!(date));
        let square = Geometry::polygon(vec![vec![
            [-66.1, -9.1],
            [-66.0, -9.1],
            [-66.0, -9.0],
            [-66.1, -9.0],
            [-66.1, -9.1],
        ]]);
        FeatureRecord::new(properties, Some(square))
    }

    #[tokio::test]
    async fn test_memory_vector_filters_by_point() {
        let source = MemoryVectorSource::new("terrabrasilis", "deter");
        source.insert_feature("deter_amz", parcel("CORTE_RASO", "2016-10-07"));

        let inside = FeatureQuery::new("deter:deter_amz", "geom", 4326, -66.031, -9.091).unwrap();
        assert_eq!(source.get_features(&inside).await.unwrap().len(), 1);

        let outside = FeatureQuery::new("deter:deter_amz", "geom", 4326, -60.0, -9.091).unwrap();
        assert!(source.get_features(&outside).await.unwrap().is_empty());

        assert_eq!(source.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_memory_unavailable() {
        let source = MemoryRasterSource::new("mapbiomas", "mapbiomas");
        source.set_unavailable(true);
        let err = source.coverages().await.unwrap_err();
        assert_eq!(err.kind(), wlts_core::ErrorKind::UpstreamUnavailable);
        assert_eq!(source.requests(), vec![RecordedRequest::Coverages]);
    }
}

//! Feature and image collections
//!
//! A collection turns a trajectory query into trajectory points by driving
//! its datasource adapter once per observation descriptor (feature
//! collections) or once per timeline entry and attribute (image
//! collections), then resolving each class label.

use std::sync::Arc;

use chrono::NaiveDate;
use wlts_core::catalog::{FeatureCollectionDefinition, ImageCollectionDefinition};
use wlts_core::dates::parse_date;
use wlts_core::error::{Result, WltsError};
use wlts_core::models::{
    CollectionDescription, CollectionKind, CollectionMeta, Crs, Geometry, TemporalKind,
    TrajectoryPoint, TrajectoryQuery,
};
use wlts_datasource::raster::format_sample;
use wlts_datasource::{
    qualified_name, CoverageRequest, FeatureQuery, FeatureRecord, GridShape, RasterAdapter,
    TemporalFilter, VectorAdapter,
};
use wlts_geo::{buffer_point, reproject_bounds, reproject_geometry, reproject_point};

use crate::classification::ClassResolver;

const QUERY_SRID: u32 = 4326;

/// Where the observation date of a feature descriptor comes from
#[derive(Debug, Clone, PartialEq)]
pub enum ObservationDate {
    /// Fixed by configuration (STRING temporal type)
    Fixed(NaiveDate),
    /// Read from a record property (DATE temporal type)
    Property(String),
}

/// One queryable attribute set on a feature type
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureObservation {
    /// Qualified feature type name
    pub type_name: String,
    pub date: ObservationDate,
    pub class_property: Option<String>,
    pub class_label: Option<String>,
}

/// Collection backed by a feature service
#[derive(Debug)]
pub struct FeatureCollection {
    meta: CollectionMeta,
    adapter: Arc<VectorAdapter>,
    resolver: ClassResolver,
    geometry_property: String,
    srid: u32,
    observations: Vec<FeatureObservation>,
}

impl FeatureCollection {
    pub fn new(
        meta: CollectionMeta,
        definition: &FeatureCollectionDefinition,
        adapter: Arc<VectorAdapter>,
        resolver: ClassResolver,
    ) -> Result<Self> {
        let workspace = definition.workspace.as_deref().unwrap_or_else(|| adapter.workspace());

        let observations = definition
            .observations
            .iter()
            .enumerate()
            .map(|(index, observation)| {
                let date = match meta.temporal.kind {
                    TemporalKind::String => {
                        ObservationDate::Fixed(parse_date(&observation.temporal_property).map_err(
                            |e| {
                                WltsError::config_invalid(
                                    format!("{}.observations[{}].temporal_property", meta.name, index),
                                    e.to_string(),
                                )
                            },
                        )?)
                    }
                    TemporalKind::Date => {
                        ObservationDate::Property(observation.temporal_property.clone())
                    }
                };
                let feature_name =
                    observation.feature_name.as_deref().unwrap_or(&definition.feature_name);
                let workspace = observation.workspace.as_deref().unwrap_or(workspace);

                Ok(FeatureObservation {
                    type_name: qualified_name(workspace, feature_name),
                    date,
                    class_property: observation.class_property.clone(),
                    class_label: observation.class_label.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            meta,
            adapter,
            resolver,
            geometry_property: definition.geom_property.property_name.clone(),
            srid: definition.geom_property.srid,
            observations,
        })
    }

    pub async fn trajectory(&self, query: &TrajectoryQuery) -> Result<Vec<TrajectoryPoint>> {
        let window = query.window();
        let (x, y) = reproject_point(query.longitude, query.latitude, QUERY_SRID, self.srid)?;
        let string_format = &self.meta.temporal.string_format;

        let mut points = Vec::new();
        for observation in &self.observations {
            let temporal = match &observation.date {
                ObservationDate::Fixed(observed) => TemporalFilter::Fixed {
                    observed: *observed,
                    window,
                    string_format: string_format.clone(),
                },
                ObservationDate::Property(_) if window.is_unbounded() => TemporalFilter::None,
                ObservationDate::Property(property) => TemporalFilter::Range {
                    property: property.clone(),
                    window,
                    string_format: string_format.clone(),
                },
            };

            let feature_query =
                FeatureQuery::new(&observation.type_name, &self.geometry_property, self.srid, x, y)?
                    .with_temporal(temporal);
            let records = self.adapter.query_feature(&feature_query).await?;

            for record in &records {
                if let Some(point) = self.point_for(observation, record, query).await? {
                    points.push(point);
                }
            }
        }

        Ok(points)
    }

    async fn point_for(
        &self,
        observation: &FeatureObservation,
        record: &FeatureRecord,
        query: &TrajectoryQuery,
    ) -> Result<Option<TrajectoryPoint>> {
        let date = match &observation.date {
            ObservationDate::Fixed(observed) => self.meta.temporal.format(*observed)?,
            ObservationDate::Property(property) => {
                let Some(raw) = record.property_text(property) else {
                    tracing::debug!(collection = %self.meta.name, property = %property, "Record without date");
                    return Ok(None);
                };
                // Services may ignore the CQL date bounds
                if let Ok(date) = parse_date(&raw) {
                    if !self.meta.temporal.in_window(&query.window(), date) {
                        return Ok(None);
                    }
                }
                self.meta.temporal.canonical(&raw)
            }
        };

        let raw = observation.class_property.as_deref().and_then(|p| record.property_text(p));
        let Some(class) = resolve_soft(
            &self.resolver,
            &self.meta.name,
            observation.class_label.as_deref(),
            raw.as_deref(),
        )
        .await?
        else {
            return Ok(None);
        };

        let geometry = match (&record.geometry, query.geometry) {
            (Some(geometry), true) => {
                Some(reproject_geometry(geometry, &Crs::epsg(self.srid), &Crs::wgs84())?)
            }
            _ => None,
        };

        Ok(Some(TrajectoryPoint { collection: self.meta.name.clone(), class, date, geometry }))
    }
}

/// One raster attribute of an image collection
#[derive(Debug, Clone, PartialEq)]
pub struct ImageAttribute {
    pub name: String,
    pub class_label: Option<String>,
}

/// A timestamp the coverage is known to contain
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineEntry {
    /// Value sent as the coverage `TIME`
    pub time: String,
    pub date: NaiveDate,
}

/// Collection backed by a coverage service
#[derive(Debug)]
pub struct ImageCollection {
    meta: CollectionMeta,
    adapter: Arc<RasterAdapter>,
    resolver: ClassResolver,
    coverage: String,
    srid: u32,
    grid: GridShape,
    buffer: f64,
    attributes: Vec<ImageAttribute>,
    timeline: Vec<TimelineEntry>,
}

impl ImageCollection {
    /// `buffer` is the clip margin around the query point, in degrees
    pub fn new(
        meta: CollectionMeta,
        definition: &ImageCollectionDefinition,
        adapter: Arc<RasterAdapter>,
        resolver: ClassResolver,
        buffer: f64,
    ) -> Result<Self> {
        let timeline = definition
            .timeline
            .iter()
            .map(|time| {
                let date = parse_date(time).map_err(|e| {
                    WltsError::config_invalid(format!("{}.timeline", meta.name), e.to_string())
                })?;
                Ok(TimelineEntry { time: time.clone(), date })
            })
            .collect::<Result<Vec<_>>>()?;

        let workspace = definition.workspace.as_deref().unwrap_or_else(|| adapter.workspace());

        Ok(Self {
            coverage: qualified_name(workspace, &definition.image),
            srid: definition.srid,
            grid: GridShape { columns: definition.grid.column, rows: definition.grid.row },
            buffer,
            attributes: definition
                .attributes
                .iter()
                .map(|attr| ImageAttribute {
                    name: attr.attribute.clone(),
                    class_label: attr.class_label.clone(),
                })
                .collect(),
            timeline,
            meta,
            adapter,
            resolver,
        })
    }

    pub async fn trajectory(&self, query: &TrajectoryQuery) -> Result<Vec<TrajectoryPoint>> {
        let window = query.window();
        let clip = buffer_point(query.longitude, query.latitude, self.buffer);
        let bbox = reproject_bounds(&clip, QUERY_SRID, self.srid)?;
        let point = reproject_point(query.longitude, query.latitude, QUERY_SRID, self.srid)?;

        let mut points = Vec::new();
        for attribute in &self.attributes {
            for entry in &self.timeline {
                if !window.contains(entry.date) {
                    tracing::debug!(collection = %self.meta.name, time = %entry.time, "Timestamp outside date window");
                    continue;
                }

                let request =
                    CoverageRequest::new(&self.coverage, self.srid, bbox, self.grid, &entry.time, point)?;
                let Some(value) = self.adapter.sample_coverage(&request).await? else {
                    tracing::debug!(
                        collection = %self.meta.name,
                        attribute = %attribute.name,
                        time = %entry.time,
                        "No value at point"
                    );
                    continue;
                };

                let raw = format_sample(value);
                let Some(class) = resolve_soft(
                    &self.resolver,
                    &self.meta.name,
                    attribute.class_label.as_deref(),
                    Some(&raw),
                )
                .await?
                else {
                    continue;
                };

                points.push(TrajectoryPoint {
                    collection: self.meta.name.clone(),
                    class,
                    date: self.meta.temporal.format(entry.date)?,
                    geometry: query.geometry.then(|| Geometry::point(query.longitude, query.latitude)),
                });
            }
        }

        Ok(points)
    }
}

/// Resolve a label, absorbing soft failures as `None`
async fn resolve_soft(
    resolver: &ClassResolver,
    collection: &str,
    literal: Option<&str>,
    raw: Option<&str>,
) -> Result<Option<String>> {
    match resolver.resolve(literal, raw).await {
        Ok(class) => Ok(Some(class)),
        Err(e) if e.is_soft() => {
            tracing::debug!(collection = %collection, error = %e, "Skipping observation");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// A configured collection
#[derive(Debug)]
pub enum Collection {
    Feature(FeatureCollection),
    Image(ImageCollection),
}

impl Collection {
    pub fn meta(&self) -> &CollectionMeta {
        match self {
            Collection::Feature(c) => &c.meta,
            Collection::Image(c) => &c.meta,
        }
    }

    pub fn name(&self) -> &str {
        &self.meta().name
    }

    pub fn kind(&self) -> CollectionKind {
        match self {
            Collection::Feature(_) => CollectionKind::Feature,
            Collection::Image(_) => CollectionKind::Image,
        }
    }

    pub fn is_public(&self) -> bool {
        self.meta().is_public
    }

    pub fn datasource_id(&self) -> &str {
        match self {
            Collection::Feature(c) => c.adapter.id(),
            Collection::Image(c) => c.adapter.id(),
        }
    }

    pub fn describe(&self) -> CollectionDescription {
        self.meta().describe()
    }

    /// Trajectory points for the query, unsorted
    pub async fn trajectory(&self, query: &TrajectoryQuery) -> Result<Vec<TrajectoryPoint>> {
        match self {
            Collection::Feature(c) => c.trajectory(query).await,
            Collection::Image(c) => c.trajectory(query).await,
        }
    }

    /// Feature types or coverages read by the collection, in first-use order
    pub fn layers(&self) -> Vec<String> {
        match self {
            Collection::Feature(c) => {
                let mut names: Vec<String> = Vec::new();
                for observation in &c.observations {
                    if !names.contains(&observation.type_name) {
                        names.push(observation.type_name.clone());
                    }
                }
                names
            }
            Collection::Image(c) => vec![c.coverage.clone()],
        }
    }

    /// Check that every layer is advertised by the datasource
    pub async fn verify(&self) -> Result<()> {
        for layer in self.layers() {
            match self {
                Collection::Feature(c) => c.adapter.ensure_feature_type(&layer).await?,
                Collection::Image(c) => c.adapter.ensure_coverage(&layer).await?,
            }
        }
        Ok(())
    }
}

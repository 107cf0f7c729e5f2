//! Typed requests and records exchanged with datasources

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use wlts_core::dates::{format_date, DateWindow};
use wlts_core::error::{Result, WltsError};
use wlts_core::models::{BoundingBox, Geometry};
use wlts_geo::point_wkt;

/// Prefix `name` with `workspace` unless it is already qualified
pub fn qualified_name(workspace: &str, name: &str) -> String {
    if name.contains(':') || workspace.is_empty() {
        name.to_string()
    } else {
        format!("{}:{}", workspace, name)
    }
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(WltsError::malformed(format!("'{}' must not be empty", field)));
    }
    Ok(())
}

/// Date constraint attached to a feature query
#[derive(Debug, Clone, PartialEq)]
pub enum TemporalFilter {
    /// No date constraint
    None,
    /// The observation date is fixed by configuration and checked locally
    Fixed { observed: NaiveDate, window: DateWindow, string_format: String },
    /// The server filters a record property against the window
    Range { property: String, window: DateWindow, string_format: String },
}

/// A "features intersecting this point" query against one feature type
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureQuery {
    pub type_name: String,
    pub geometry_property: String,
    /// SRID of the geometry property; `x`/`y` are expressed in it
    pub srid: u32,
    pub x: f64,
    pub y: f64,
    pub temporal: TemporalFilter,
}

impl FeatureQuery {
    pub fn new(
        type_name: impl Into<String>,
        geometry_property: impl Into<String>,
        srid: u32,
        x: f64,
        y: f64,
    ) -> Result<Self> {
        let query = Self {
            type_name: type_name.into(),
            geometry_property: geometry_property.into(),
            srid,
            x,
            y,
            temporal: TemporalFilter::None,
        };
        require("type_name", &query.type_name)?;
        require("geometry_property", &query.geometry_property)?;
        if !x.is_finite() || !y.is_finite() {
            return Err(WltsError::malformed("query point must be finite"));
        }
        Ok(query)
    }

    pub fn with_temporal(mut self, temporal: TemporalFilter) -> Self {
        self.temporal = temporal;
        self
    }

    /// True when a configured observation date falls outside the window,
    /// so the query can be answered with no records and no network call.
    pub fn skip_locally(&self) -> bool {
        match &self.temporal {
            TemporalFilter::Fixed { observed, window, string_format } => {
                !window.contains_at_granularity(*observed, string_format)
            }
            _ => false,
        }
    }

    /// CQL filter: point intersection plus inclusive date bounds
    pub fn cql_filter(&self) -> Result<String> {
        let mut filter =
            format!("INTERSECTS({}, {})", self.geometry_property, point_wkt(self.x, self.y));

        if let TemporalFilter::Range { property, window, string_format } = &self.temporal {
            if let Some(start) = window.start {
                filter.push_str(&format!(" AND {} >= {}", property, format_date(start, string_format)?));
            }
            if let Some(end) = window.end {
                filter.push_str(&format!(" AND {} <= {}", property, format_date(end, string_format)?));
            }
        }

        Ok(filter)
    }
}

/// One feature returned by a feature service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub properties: Map<String, Value>,
    /// Geometry in the CRS requested by the query
    pub geometry: Option<Geometry>,
}

impl FeatureRecord {
    pub fn new(properties: Map<String, Value>, geometry: Option<Geometry>) -> Self {
        Self { properties, geometry }
    }

    /// Property value coerced to text; missing and null values give `None`
    pub fn property_text(&self, name: &str) -> Option<String> {
        match self.properties.get(name)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Second lookup resolving a class identifier into its label
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassLookupRequest {
    /// Qualified feature type holding the classes
    pub type_name: String,
    /// Element carrying the label
    pub class_property_name: String,
    /// Field matched against the identifier
    pub class_property_value: String,
    pub identifier: String,
    pub system_name: Option<String>,
}

impl ClassLookupRequest {
    pub fn new(
        type_name: impl Into<String>,
        class_property_name: impl Into<String>,
        class_property_value: impl Into<String>,
        identifier: impl Into<String>,
        system_name: Option<String>,
    ) -> Result<Self> {
        let request = Self {
            type_name: type_name.into(),
            class_property_name: class_property_name.into(),
            class_property_value: class_property_value.into(),
            identifier: identifier.into(),
            system_name,
        };
        require("type_name", &request.type_name)?;
        require("class_property_name", &request.class_property_name)?;
        require("class_property_value", &request.class_property_value)?;
        require("identifier", &request.identifier)?;
        Ok(request)
    }

    /// `value=id[ AND class_system_name='name']`, quoting non-numeric ids
    pub fn cql_filter(&self) -> String {
        let identifier = if self.identifier.parse::<f64>().is_ok() {
            self.identifier.clone()
        } else {
            format!("'{}'", self.identifier.replace('\'', "''"))
        };

        let mut filter = format!("{}={}", self.class_property_value, identifier);
        if let Some(system) = &self.system_name {
            filter.push_str(&format!(" AND class_system_name='{}'", system.replace('\'', "''")));
        }
        filter
    }

    /// Memo key: the `(type, tag, filter)` triple
    pub fn cache_key(&self) -> String {
        format!("{}|{}|{}", self.type_name, self.class_property_name, self.cql_filter())
    }
}

/// Pixel dimensions requested from a coverage service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridShape {
    pub columns: u32,
    pub rows: u32,
}

/// A clipped coverage request sampled at one point
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageRequest {
    /// Qualified coverage name
    pub coverage: String,
    pub srid: u32,
    /// Clip box in `srid`
    pub bbox: BoundingBox,
    pub grid: GridShape,
    pub time: String,
    /// Sample location in `srid`
    pub x: f64,
    pub y: f64,
}

impl CoverageRequest {
    pub fn new(
        coverage: impl Into<String>,
        srid: u32,
        bbox: BoundingBox,
        grid: GridShape,
        time: impl Into<String>,
        (x, y): (f64, f64),
    ) -> Result<Self> {
        let request = Self { coverage: coverage.into(), srid, bbox, grid, time: time.into(), x, y };
        require("coverage", &request.coverage)?;
        require("time", &request.time)?;
        if grid.columns == 0 || grid.rows == 0 {
            return Err(WltsError::malformed("grid dimensions must be positive"));
        }
        if !bbox.contains(x, y) {
            return Err(WltsError::malformed(format!(
                "sample point ({}, {}) lies outside the clip box",
                x, y
            )));
        }
        Ok(request)
    }

    pub fn cache_key(&self) -> String {
        format!(
            "{}|{}|{}|{}x{}|{}|{},{}",
            self.coverage,
            self.srid,
            self.bbox.to_query_value(),
            self.grid.columns,
            self.grid.rows,
            self.time,
            self.x,
            self.y
        )
    }
}

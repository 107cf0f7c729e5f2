//! Trajectory request and response types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::{parse_date, DateWindow};
use crate::error::{Result, WltsError};
use crate::models::geometry::Geometry;

/// Raw trajectory parameters as they arrive from a query string or CLI
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrajectoryParams {
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub collections: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub geometry: Option<String>,
}

impl TrajectoryParams {
    /// Parse and validate into a [`TrajectoryQuery`]
    pub fn into_query(self) -> Result<TrajectoryQuery> {
        let longitude = parse_coordinate("longitude", self.longitude.as_deref())?;
        let latitude = parse_coordinate("latitude", self.latitude.as_deref())?;

        let mut query = TrajectoryQuery::new(longitude, latitude)?;

        if let Some(collections) = non_blank(self.collections.as_deref()) {
            query = query.with_collections(collections.split(',').map(str::to_string).collect());
        }
        if let Some(start) = non_blank(self.start_date.as_deref()) {
            query = query.with_start_date(parse_query_date("start_date", start)?);
        }
        if let Some(end) = non_blank(self.end_date.as_deref()) {
            query = query.with_end_date(parse_query_date("end_date", end)?);
        }
        if let Some(flag) = non_blank(self.geometry.as_deref()) {
            query = query.with_geometry(parse_flag(flag)?);
        }

        query.validate()?;
        Ok(query)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_coordinate(name: &str, value: Option<&str>) -> Result<f64> {
    let raw = non_blank(value)
        .ok_or_else(|| WltsError::malformed(format!("'{}' is a required property", name)))?;
    raw.parse::<f64>()
        .map_err(|_| WltsError::malformed(format!("'{}' must be a number, got '{}'", name, raw)))
}

fn parse_query_date(name: &str, value: &str) -> Result<NaiveDate> {
    parse_date(value).map_err(|e| WltsError::malformed(format!("'{}': {}", name, e)))
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(WltsError::malformed(format!("'geometry' must be a boolean, got '{}'", other))),
    }
}

/// Validated trajectory request
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryQuery {
    pub longitude: f64,
    pub latitude: f64,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Requested collection names; `None` means every visible collection
    pub collections: Option<Vec<String>>,
    pub geometry: bool,
}

impl TrajectoryQuery {
    /// Create a query for a point in EPSG:4326
    pub fn new(longitude: f64, latitude: f64) -> Result<Self> {
        let query = Self {
            longitude,
            latitude,
            start_date: None,
            end_date: None,
            collections: None,
            geometry: false,
        };
        query.validate_point()?;
        Ok(query)
    }

    /// Restrict to the named collections. Duplicates and blanks are dropped.
    pub fn with_collections(mut self, names: Vec<String>) -> Self {
        let mut unique: Vec<String> = Vec::with_capacity(names.len());
        for name in names {
            let name = name.trim().to_string();
            if !name.is_empty() && !unique.contains(&name) {
                unique.push(name);
            }
        }
        self.collections = if unique.is_empty() { None } else { Some(unique) };
        self
    }

    pub fn with_start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn with_end_date(mut self, date: NaiveDate) -> Self {
        self.end_date = Some(date);
        self
    }

    pub fn with_geometry(mut self, geometry: bool) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn window(&self) -> DateWindow {
        DateWindow::new(self.start_date, self.end_date)
    }

    fn validate_point(&self) -> Result<()> {
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(WltsError::malformed(format!(
                "longitude {} outside [-180, 180]",
                self.longitude
            )));
        }
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(WltsError::malformed(format!(
                "latitude {} outside [-90, 90]",
                self.latitude
            )));
        }
        Ok(())
    }

    /// Full validation: coordinates and date ordering
    pub fn validate(&self) -> Result<()> {
        self.validate_point()?;
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(WltsError::malformed(format!(
                    "start_date {} is after end_date {}",
                    start, end
                )));
            }
        }
        Ok(())
    }

    /// Normalized parameters echoed back in the response
    pub fn echo(&self) -> QueryEcho {
        QueryEcho {
            collections: self.collections.clone(),
            longitude: self.longitude,
            latitude: self.latitude,
            start_date: self.start_date.map(|d| d.format("%Y-%m-%d").to_string()),
            end_date: self.end_date.map(|d| d.format("%Y-%m-%d").to_string()),
            geometry: self.geometry,
        }
    }
}

/// One land-classification observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    pub collection: String,
    #[serde(rename = "class")]
    pub class: String,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub geometry: Option<Geometry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryEcho {
    pub collections: Option<Vec<String>>,
    pub longitude: f64,
    pub latitude: f64,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub geometry: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryResult {
    pub trajectory: Vec<TrajectoryPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryResponse {
    pub query: QueryEcho,
    pub result: TrajectoryResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(lon: &str, lat: &str) -> TrajectoryParams {
        TrajectoryParams {
            longitude: Some(lon.to_string()),
            latitude: Some(lat.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_params_into_query() {
        let query = TrajectoryParams {
            collections: Some("deter_amz,prodes_amz,deter_amz".to_string()),
            start_date: Some("2016-10-07".to_string()),
            geometry: Some("true".to_string()),
            ..params("-66.031", "-9.091")
        }
        .into_query()
        .unwrap();

        assert_eq!(query.longitude, -66.031);
        assert_eq!(
            query.collections,
            Some(vec!["deter_amz".to_string(), "prodes_amz".to_string()])
        );
        assert_eq!(query.start_date, NaiveDate::from_ymd_opt(2016, 10, 7));
        assert!(query.geometry);
    }

    #[test]
    fn test_missing_latitude_is_malformed() {
        let err = TrajectoryParams { latitude: None, ..params("-66.031", "") }
            .into_query()
            .unwrap_err();
        assert!(err.to_string().contains("latitude"));
    }

    #[test]
    fn test_out_of_range_and_unparseable() {
        assert!(params("-200", "0").into_query().is_err());
        assert!(params("0", "91").into_query().is_err());
        assert!(params("abc", "0").into_query().is_err());
        assert!(TrajectoryParams { start_date: Some("soon".to_string()), ..params("0", "0") }
            .into_query()
            .is_err());
    }

    #[test]
    fn test_reversed_window_is_rejected() {
        let err = TrajectoryParams {
            start_date: Some("2019".to_string()),
            end_date: Some("2018".to_string()),
            ..params("0", "0")
        }
        .into_query()
        .unwrap_err();
        assert!(err.to_string().contains("after"));
    }

    #[test]
    fn test_blank_collections_mean_all() {
        let query = TrajectoryParams { collections: Some(" , ".to_string()), ..params("0", "0") }
            .into_query()
            .unwrap();
        assert!(query.collections.is_none());
    }

    #[test]
    fn test_point_serialization() {
        let point = TrajectoryPoint {
            collection: "deter_amz".to_string(),
            class: "DESMATAMENTO_CR".to_string(),
            date: "2016-10-07".to_string(),
            geometry: None,
        };
        let json = serde_json::to_value(&point).unwrap();
        assert_eq!(json["class"], "DESMATAMENTO_CR");
        assert!(json.get("geometry").is_none());
    }
}

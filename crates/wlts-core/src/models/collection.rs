use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::{self, DateWindow};
use crate::error::Result;
use crate::models::classification::{ClassificationStrategy, ClassificationSystem};

/// Dataset kind of a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectionKind {
    Feature,
    Image,
}

impl std::fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectionKind::Feature => write!(f, "Feature"),
            CollectionKind::Image => write!(f, "Image"),
        }
    }
}

/// How the observation date of a collection is represented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TemporalKind {
    /// Each observation descriptor carries its own fixed date
    String,
    /// Dates live in a property of the queried records
    Date,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalResolution {
    pub unit: String,
    pub value: u32,
}

/// Temporal metadata of a collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalSpec {
    #[serde(rename = "type")]
    pub kind: TemporalKind,
    pub resolution: TemporalResolution,
    pub string_format: String,
}

impl TemporalSpec {
    /// Render a date with the collection's format
    pub fn format(&self, date: NaiveDate) -> Result<String> {
        dates::format_date(date, &self.string_format)
    }

    /// Canonical rendering of a date string read from a record.
    ///
    /// Values that cannot be parsed are kept verbatim.
    pub fn canonical(&self, raw: &str) -> String {
        dates::parse_date(raw)
            .and_then(|date| self.format(date))
            .unwrap_or_else(|_| raw.to_string())
    }

    /// Window membership at the collection's format granularity
    pub fn in_window(&self, window: &DateWindow, date: NaiveDate) -> bool {
        window.contains_at_granularity(date, &self.string_format)
    }
}

/// Validity period of a collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start_date: String,
    pub end_date: String,
}

/// Spatial extent in EPSG:4326
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpatialExtent {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

/// Descriptive metadata shared by both collection variants
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionMeta {
    pub name: String,
    pub title: String,
    pub description: String,
    pub detail: Option<String>,
    pub kind: CollectionKind,
    pub temporal: TemporalSpec,
    pub spatial_extent: SpatialExtent,
    pub period: Period,
    pub is_public: bool,
    pub deprecated: bool,
    pub classification: ClassificationStrategy,
    pub datasource_id: String,
}

impl CollectionMeta {
    pub fn describe(&self) -> CollectionDescription {
        CollectionDescription {
            name: self.name.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            detail: self.detail.clone(),
            collection_type: self.kind,
            resolution_unit: self.temporal.resolution.clone(),
            period: self.period.clone(),
            spatial_extent: self.spatial_extent,
            classification_system: ClassificationSystemInfo {
                kind: self.classification.type_tag().to_string(),
                system: self.classification.system().clone(),
            },
            is_public: self.is_public,
            deprecated: self.deprecated,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationSystemInfo {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub system: ClassificationSystem,
}

/// Collection metadata as returned by `describe_collection`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionDescription {
    pub name: String,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub collection_type: CollectionKind,
    pub resolution_unit: TemporalResolution,
    pub period: Period,
    pub spatial_extent: SpatialExtent,
    pub classification_system: ClassificationSystemInfo,
    pub is_public: bool,
    pub deprecated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yearly() -> TemporalSpec {
        TemporalSpec {
            kind: TemporalKind::String,
            resolution: TemporalResolution { unit: "YEAR".to_string(), value: 1 },
            string_format: "%Y".to_string(),
        }
    }

    #[test]
    fn test_canonical_dates() {
        let spec = TemporalSpec { string_format: "%Y-%m-%d".to_string(), ..yearly() };
        assert_eq!(spec.canonical("2016-10-07T00:00:00Z"), "2016-10-07");
        assert_eq!(spec.canonical("garbage"), "garbage");
        assert_eq!(yearly().canonical("2016-10-07"), "2016");
    }

    #[test]
    fn test_temporal_kind_serde() {
        let kind: TemporalKind = serde_json::from_str("\"STRING\"").unwrap();
        assert_eq!(kind, TemporalKind::String);
        let kind: TemporalKind = serde_json::from_str("\"DATE\"").unwrap();
        assert_eq!(kind, TemporalKind::Date);
    }

    #[test]
    fn test_description_serializes_type_tags() {
        let meta = CollectionMeta {
            name: "prodes_amz".to_string(),
            title: "PRODES".to_string(),
            description: "Yearly deforestation".to_string(),
            detail: None,
            kind: CollectionKind::Feature,
            temporal: yearly(),
            spatial_extent: SpatialExtent { xmin: -74.0, ymin: -18.0, xmax: -44.0, ymax: 5.3 },
            period: Period { start_date: "2008".to_string(), end_date: "2019".to_string() },
            is_public: true,
            deprecated: false,
            classification: ClassificationStrategy::Literal {
                system: ClassificationSystem::default(),
            },
            datasource_id: "geoserver".to_string(),
        };

        let json = serde_json::to_value(meta.describe()).unwrap();
        assert_eq!(json["collection_type"], "Feature");
        assert_eq!(json["classification_system"]["type"], "Literal");
        assert_eq!(json["resolution_unit"]["unit"], "YEAR");
        assert!(json.get("detail").is_none());
    }
}

//! Catalog of datasources and collections
//!
//! The catalog is the static description loaded once at startup: which
//! feature and coverage services exist, and which collections are served
//! from them. It is read from a JSON or TOML document (chosen by file
//! extension) and validated before any registry is built from it.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dates::{parse_date, validate_format};
use crate::error::{Result, WltsError};
use crate::models::{
    ClassificationStrategy, ClassificationSystem, CollectionKind, CollectionMeta,
    ExternalClassification, Period, SpatialExtent, TemporalSpec,
};

/// Protocol spoken by a datasource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DatasourceKind {
    Wfs,
    Wcs,
}

impl std::fmt::Display for DatasourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasourceKind::Wfs => write!(f, "WFS"),
            DatasourceKind::Wcs => write!(f, "WCS"),
        }
    }
}

/// Connection description of a datasource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasourceDefinition {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: DatasourceKind,
    /// Service root, e.g. `https://host/geoserver`
    pub host: String,
    pub workspace: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl DatasourceDefinition {
    /// Basic-auth pair, when both halves are configured
    pub fn credentials(&self) -> Option<(String, String)> {
        match (&self.user, &self.password) {
            (Some(user), Some(password)) => Some((user.clone(), password.clone())),
            _ => None,
        }
    }
}

/// Classification block as written in catalog files.
///
/// `type` is `Literal`, `Self`, or any other tag for an external lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationDefinition {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub datasource_id: Option<String>,
    #[serde(default)]
    pub property_name: Option<String>,
    #[serde(default)]
    pub class_property_name: Option<String>,
    #[serde(default)]
    pub class_property_value: Option<String>,
    #[serde(default)]
    pub workspace: Option<String>,
    #[serde(default)]
    pub classification_system_name: Option<String>,
    #[serde(default)]
    pub classification_system_id: Option<String>,
    #[serde(default)]
    pub classification_system_version: Option<String>,
}

impl ClassificationDefinition {
    fn system(&self) -> ClassificationSystem {
        ClassificationSystem {
            name: self.classification_system_name.clone(),
            id: self.classification_system_id.clone(),
            version: self.classification_system_version.clone(),
        }
    }

    /// Build the typed strategy, checking the fields an external lookup needs
    pub fn to_strategy(&self, collection: &str) -> Result<ClassificationStrategy> {
        let system = self.system();
        match self.kind.as_str() {
            "Literal" => Ok(ClassificationStrategy::Literal { system }),
            "Self" => Ok(ClassificationStrategy::SelfValue { system }),
            _ => {
                let require = |value: &Option<String>, field: &str| {
                    value.clone().filter(|v| !v.is_empty()).ok_or_else(|| {
                        WltsError::config_invalid(
                            format!("{}.classification.{}", collection, field),
                            format!("required for '{}' classification", self.kind),
                        )
                    })
                };
                Ok(ClassificationStrategy::External(ExternalClassification {
                    datasource_id: require(&self.datasource_id, "datasource_id")?,
                    property_name: require(&self.property_name, "property_name")?,
                    class_property_name: require(&self.class_property_name, "class_property_name")?,
                    class_property_value: require(
                        &self.class_property_value,
                        "class_property_value",
                    )?,
                    workspace: self.workspace.clone(),
                    system,
                }))
            }
        }
    }
}

/// Fields shared by feature and image collections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionCommon {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub detail: Option<String>,
    pub datasource_id: String,
    pub temporal: TemporalSpec,
    pub spatial_extent: SpatialExtent,
    pub period: Period,
    #[serde(default = "default_true")]
    pub is_public: bool,
    #[serde(default)]
    pub deprecated: bool,
    pub classification: ClassificationDefinition,
}

fn default_true() -> bool {
    true
}

impl CollectionCommon {
    /// Immutable metadata of the collection
    pub fn to_meta(&self, kind: CollectionKind) -> Result<CollectionMeta> {
        Ok(CollectionMeta {
            name: self.name.clone(),
            title: self.title.clone().unwrap_or_else(|| self.name.clone()),
            description: self.description.clone(),
            detail: self.detail.clone(),
            kind,
            temporal: self.temporal.clone(),
            spatial_extent: self.spatial_extent,
            period: self.period.clone(),
            is_public: self.is_public,
            deprecated: self.deprecated,
            classification: self.classification.to_strategy(&self.name)?,
            datasource_id: self.datasource_id.clone(),
        })
    }
}

/// Geometry column of a feature type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeometryProperty {
    pub property_name: String,
    pub srid: u32,
}

/// One queryable attribute set of a feature collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationDefinition {
    /// Feature type override; defaults to the collection's `feature_name`
    #[serde(default)]
    pub feature_name: Option<String>,
    #[serde(default)]
    pub workspace: Option<String>,
    /// Date of the observation (STRING collections) or the record property holding it
    pub temporal_property: String,
    /// Record property holding the raw class value
    #[serde(default)]
    pub class_property: Option<String>,
    /// Fixed label for `Literal` collections
    #[serde(default)]
    pub class_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollectionDefinition {
    #[serde(flatten)]
    pub common: CollectionCommon,
    pub feature_name: String,
    #[serde(default)]
    pub workspace: Option<String>,
    pub geom_property: GeometryProperty,
    pub observations: Vec<ObservationDefinition>,
}

/// Grid shape requested from the coverage service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridDefinition {
    pub column: u32,
    pub row: u32,
}

/// One raster attribute of an image collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDefinition {
    pub attribute: String,
    #[serde(default)]
    pub class_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageCollectionDefinition {
    #[serde(flatten)]
    pub common: CollectionCommon,
    pub image: String,
    #[serde(default)]
    pub workspace: Option<String>,
    pub grid: GridDefinition,
    pub srid: u32,
    pub attributes: Vec<AttributeDefinition>,
    /// Timestamps the coverage is known to contain, in order
    pub timeline: Vec<String>,
}

/// Whole catalog document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub datasources: Vec<DatasourceDefinition>,
    #[serde(default)]
    pub feature_collections: Vec<FeatureCollectionDefinition>,
    #[serde(default)]
    pub image_collections: Vec<ImageCollectionDefinition>,
}

impl Catalog {
    /// Load and validate a catalog file. `.toml` files are read as TOML,
    /// everything else as JSON.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(WltsError::CatalogNotFound { path: path.to_path_buf() });
        }

        let content = fs::read_to_string(path)?;
        let is_toml = path.extension().and_then(|ext| ext.to_str()) == Some("toml");
        let catalog = if is_toml { Self::from_toml(&content)? } else { Self::from_json(&content)? };

        tracing::info!(
            path = %path.display(),
            datasources = catalog.datasources.len(),
            collections = catalog.collection_count(),
            "Loaded catalog"
        );

        Ok(catalog)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let catalog: Catalog = serde_json::from_str(content)
            .map_err(|e| WltsError::config_invalid("catalog", format!("invalid JSON: {}", e)))?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let catalog: Catalog = toml::from_str(content)
            .map_err(|e| WltsError::config_invalid("catalog", format!("invalid TOML: {}", e)))?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn collection_count(&self) -> usize {
        self.feature_collections.len() + self.image_collections.len()
    }

    pub fn datasource(&self, id: &str) -> Option<&DatasourceDefinition> {
        self.datasources.iter().find(|ds| ds.id == id)
    }

    /// Check cross references and value formats
    pub fn validate(&self) -> Result<()> {
        let mut ids = HashSet::new();
        for ds in &self.datasources {
            if !ids.insert(ds.id.as_str()) {
                return Err(WltsError::config_invalid(
                    "datasources",
                    format!("duplicate datasource id '{}'", ds.id),
                ));
            }
            if ds.host.trim().is_empty() {
                return Err(WltsError::config_invalid(
                    format!("datasources.{}.host", ds.id),
                    "host must not be empty",
                ));
            }
        }

        let mut names = HashSet::new();
        let commons = self
            .feature_collections
            .iter()
            .map(|c| (&c.common, CollectionKind::Feature))
            .chain(self.image_collections.iter().map(|c| (&c.common, CollectionKind::Image)));

        for (common, kind) in commons {
            if !names.insert(common.name.as_str()) {
                return Err(WltsError::config_invalid(
                    "collections",
                    format!("duplicate collection name '{}'", common.name),
                ));
            }
            self.validate_common(common, kind)?;
        }

        for collection in &self.feature_collections {
            validate_feature(collection)?;
        }
        for collection in &self.image_collections {
            validate_image(collection)?;
        }

        Ok(())
    }

    fn validate_common(&self, common: &CollectionCommon, kind: CollectionKind) -> Result<()> {
        let expected = match kind {
            CollectionKind::Feature => DatasourceKind::Wfs,
            CollectionKind::Image => DatasourceKind::Wcs,
        };
        self.expect_datasource(&common.name, &common.datasource_id, expected)?;

        validate_format(&common.temporal.string_format).map_err(|e| {
            WltsError::config_invalid(format!("{}.temporal.string_format", common.name), e.to_string())
        })?;

        for (field, value) in
            [("start_date", &common.period.start_date), ("end_date", &common.period.end_date)]
        {
            parse_date(value).map_err(|e| {
                WltsError::config_invalid(format!("{}.period.{}", common.name, field), e.to_string())
            })?;
        }

        if let ClassificationStrategy::External(external) =
            common.classification.to_strategy(&common.name)?
        {
            self.expect_datasource(&common.name, &external.datasource_id, DatasourceKind::Wfs)?;
        }

        Ok(())
    }

    fn expect_datasource(&self, collection: &str, id: &str, kind: DatasourceKind) -> Result<()> {
        let ds = self.datasource(id).ok_or_else(|| {
            WltsError::config_invalid(
                format!("{}.datasource_id", collection),
                format!("unknown datasource '{}'", id),
            )
        })?;
        if ds.kind != kind {
            return Err(WltsError::config_invalid(
                format!("{}.datasource_id", collection),
                format!("datasource '{}' is {}, expected {}", id, ds.kind, kind),
            ));
        }
        Ok(())
    }
}

fn validate_feature(collection: &FeatureCollectionDefinition) -> Result<()> {
    let name = &collection.common.name;
    if collection.observations.is_empty() {
        return Err(WltsError::config_invalid(
            format!("{}.observations", name),
            "at least one observation is required",
        ));
    }

    let literal = collection.common.classification.kind == "Literal";
    let string_dates = collection.common.temporal.kind == crate::models::TemporalKind::String;

    for (index, obs) in collection.observations.iter().enumerate() {
        let key = |field: &str| format!("{}.observations[{}].{}", name, index, field);
        if literal && obs.class_label.is_none() {
            return Err(WltsError::config_invalid(
                key("class_label"),
                "Literal classification needs a label",
            ));
        }
        if !literal && obs.class_property.is_none() {
            return Err(WltsError::config_invalid(
                key("class_property"),
                "class property is required unless classification is Literal",
            ));
        }
        if string_dates {
            parse_date(&obs.temporal_property)
                .map_err(|e| WltsError::config_invalid(key("temporal_property"), e.to_string()))?;
        }
    }
    Ok(())
}

fn validate_image(collection: &ImageCollectionDefinition) -> Result<()> {
    let name = &collection.common.name;
    if collection.grid.column == 0 || collection.grid.row == 0 {
        return Err(WltsError::config_invalid(
            format!("{}.grid", name),
            "grid dimensions must be positive",
        ));
    }
    if collection.attributes.is_empty() {
        return Err(WltsError::config_invalid(
            format!("{}.attributes", name),
            "at least one attribute is required",
        ));
    }
    if collection.common.classification.kind == "Literal"
        && collection.attributes.iter().any(|attr| attr.class_label.is_none())
    {
        return Err(WltsError::config_invalid(
            format!("{}.attributes", name),
            "Literal classification needs a label on every attribute",
        ));
    }
    for time in &collection.timeline {
        parse_date(time).map_err(|e| {
            WltsError::config_invalid(format!("{}.timeline", name), e.to_string())
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"{
        "datasources": [
            {"id": "terrabrasilis", "type": "WFS", "host": "http://localhost/geoserver", "workspace": "deter"},
            {"id": "mapbiomas_wcs", "type": "WCS", "host": "http://localhost/geoserver", "workspace": "mapbiomas",
             "user": "reader", "password": "secret"}
        ],
        "feature_collections": [{
            "name": "deter_amz",
            "description": "Deforestation alerts",
            "datasource_id": "terrabrasilis",
            "temporal": {"type": "DATE", "resolution": {"unit": "DAY", "value": 1}, "string_format": "%Y-%m-%d"},
            "spatial_extent": {"xmin": -74.0, "ymin": -18.0, "xmax": -44.0, "ymax": 5.3},
            "period": {"start_date": "2016-08-02", "end_date": "2020-12-31"},
            "classification": {"type": "Self"},
            "feature_name": "deter_amz",
            "geom_property": {"property_name": "geom", "srid": 4674},
            "observations": [{"temporal_property": "view_date", "class_property": "classname"}]
        }],
        "image_collections": [{
            "name": "mapbiomas5_amazonia",
            "datasource_id": "mapbiomas_wcs",
            "is_public": false,
            "temporal": {"type": "STRING", "resolution": {"unit": "YEAR", "value": 1}, "string_format": "%Y"},
            "spatial_extent": {"xmin": -74.0, "ymin": -18.0, "xmax": -44.0, "ymax": 5.3},
            "period": {"start_date": "1985", "end_date": "2019"},
            "classification": {"type": "External", "datasource_id": "terrabrasilis",
                               "property_name": "classes", "class_property_name": "description",
                               "class_property_value": "class_id",
                               "classification_system_name": "MapBiomas"},
            "image": "mapbiomas_amazonia",
            "grid": {"column": 1, "row": 1},
            "srid": 4326,
            "attributes": [{"attribute": "classification"}],
            "timeline": ["1985", "2018-01-01", "2019/01/01"]
        }]
    }"#;

    #[test]
    fn test_parse_and_validate() {
        let catalog = Catalog::from_json(CATALOG).unwrap();
        assert_eq!(catalog.collection_count(), 2);

        let wcs = catalog.datasource("mapbiomas_wcs").unwrap();
        assert_eq!(wcs.credentials(), Some(("reader".to_string(), "secret".to_string())));

        let feature = &catalog.feature_collections[0];
        assert!(feature.common.is_public);
        let meta = feature.common.to_meta(CollectionKind::Feature).unwrap();
        assert_eq!(meta.title, "deter_amz");
        assert_eq!(meta.classification.type_tag(), "Self");

        let image = &catalog.image_collections[0];
        let meta = image.common.to_meta(CollectionKind::Image).unwrap();
        assert!(!meta.is_public);
        assert_eq!(meta.classification.datasource_id(), Some("terrabrasilis"));
    }

    #[test]
    fn test_kind_mismatch_is_rejected() {
        let broken = CATALOG
            .replace(r#""datasource_id": "mapbiomas_wcs""#, r#""datasource_id": "terrabrasilis""#);
        let err = Catalog::from_json(&broken).unwrap_err();
        assert!(err.to_string().contains("expected WCS"));
    }

    #[test]
    fn test_external_requires_lookup_fields() {
        let definition = ClassificationDefinition {
            kind: "External".to_string(),
            datasource_id: Some("lccs".to_string()),
            property_name: None,
            class_property_name: Some("name".to_string()),
            class_property_value: Some("id".to_string()),
            workspace: None,
            classification_system_name: None,
            classification_system_id: None,
            classification_system_version: None,
        };
        let err = definition.to_strategy("prodes").unwrap_err();
        assert!(err.to_string().contains("property_name"));
    }

    #[test]
    fn test_unknown_type_tag_is_external() {
        let definition = ClassificationDefinition {
            kind: "Classification".to_string(),
            datasource_id: Some("lccs".to_string()),
            property_name: Some("classes".to_string()),
            class_property_name: Some("name".to_string()),
            class_property_value: Some("id".to_string()),
            workspace: None,
            classification_system_name: None,
            classification_system_id: None,
            classification_system_version: None,
        };
        assert_eq!(definition.to_strategy("prodes").unwrap().type_tag(), "External");
    }

    #[test]
    fn test_bad_timeline_entry_is_rejected() {
        let broken = CATALOG.replace("\"2019/01/01\"", "\"someday\"");
        let err = Catalog::from_json(&broken).unwrap_err();
        assert!(err.to_string().contains("timeline"));
    }
}

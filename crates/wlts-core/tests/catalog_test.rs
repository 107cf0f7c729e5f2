//! Catalog loading from files on disk

use std::io::Write;
use tempfile::Builder;
use wlts_core::catalog::{Catalog, DatasourceKind};
use wlts_core::models::{CollectionKind, TemporalKind};
use wlts_core::{ErrorKind, WltsError};

const TOML_CATALOG: &str = r#"
[[datasources]]
id = "terrabrasilis"
type = "WFS"
host = "http://localhost/geoserver"
workspace = "prodes"

[[feature_collections]]
name = "prodes_amz"
title = "PRODES Amazonia"
description = "Yearly clear-cut deforestation"
datasource_id = "terrabrasilis"
feature_name = "yearly_deforestation"
geom_property = { property_name = "geom", srid = 4674 }

[feature_collections.temporal]
type = "STRING"
string_format = "%Y"
resolution = { unit = "YEAR", value = 1 }

[feature_collections.spatial_extent]
xmin = -74.0
ymin = -18.0
xmax = -44.0
ymax = 5.3

[feature_collections.period]
start_date = "2008"
end_date = "2019"

[feature_collections.classification]
type = "Literal"

[[feature_collections.observations]]
temporal_property = "2017"
class_label = "Desmatamento"

[[feature_collections.observations]]
temporal_property = "2018"
class_label = "Desmatamento"
"#;

#[test]
fn test_load_toml_catalog_by_extension() {
    let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
    write!(file, "{}", TOML_CATALOG).unwrap();

    let catalog = Catalog::load(file.path()).unwrap();

    assert_eq!(catalog.datasources[0].kind, DatasourceKind::Wfs);
    assert_eq!(catalog.feature_collections.len(), 1);

    let collection = &catalog.feature_collections[0];
    assert_eq!(collection.observations.len(), 2);
    assert_eq!(collection.common.temporal.kind, TemporalKind::String);

    let meta = collection.common.to_meta(CollectionKind::Feature).unwrap();
    assert_eq!(meta.title, "PRODES Amazonia");
    assert!(meta.classification.is_literal());
}

#[test]
fn test_json_is_the_default_format() {
    let mut file = Builder::new().suffix(".json").tempfile().unwrap();
    write!(file, r#"{{"datasources": []}}"#).unwrap();

    let catalog = Catalog::load(file.path()).unwrap();
    assert_eq!(catalog.collection_count(), 0);
}

#[test]
fn test_missing_catalog() {
    let err = Catalog::load("/nonexistent/wlts.json").unwrap_err();
    assert!(matches!(err, WltsError::CatalogNotFound { .. }));
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn test_literal_without_label_is_rejected() {
    let broken = TOML_CATALOG.replacen("class_label = \"Desmatamento\"", "", 1);
    let err = Catalog::from_toml(&broken).unwrap_err();
    assert!(err.to_string().contains("class_label"));
}

#[test]
fn test_unknown_datasource_is_rejected() {
    let broken = TOML_CATALOG.replace("datasource_id = \"terrabrasilis\"", "datasource_id = \"other\"");
    let err = Catalog::from_toml(&broken).unwrap_err();
    assert!(err.to_string().contains("unknown datasource 'other'"));
}

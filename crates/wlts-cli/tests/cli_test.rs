//! Integration tests for the wlts binary
//!
//! Every command here runs without reaching a datasource.

use std::io::Write;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::NamedTempFile;

const CATALOG: &str = r#"{
    "datasources": [
        {"id": "terrabrasilis", "type": "WFS", "host": "http://127.0.0.1:9/geoserver", "workspace": "prodes"},
        {"id": "mapbiomas_wcs", "type": "WCS", "host": "http://127.0.0.1:9/geoserver", "workspace": "mapbiomas"}
    ],
    "feature_collections": [{
        "name": "prodes_amz",
        "title": "PRODES Amazonia",
        "datasource_id": "terrabrasilis",
        "temporal": {"type": "STRING", "resolution": {"unit": "YEAR", "value": 1}, "string_format": "%Y"},
        "spatial_extent": {"xmin": -74.0, "ymin": -18.0, "xmax": -44.0, "ymax": 5.3},
        "period": {"start_date": "2016", "end_date": "2018"},
        "classification": {"type": "Literal", "classification_system_name": "PRODES"},
        "feature_name": "yearly_deforestation",
        "geom_property": {"property_name": "geom", "srid": 4326},
        "observations": [
            {"feature_name": "yearly_deforestation_2016", "temporal_property": "2016", "class_label": "Desmatamento"}
        ]
    }],
    "image_collections": [{
        "name": "mapbiomas5_amazonia",
        "datasource_id": "mapbiomas_wcs",
        "is_public": false,
        "temporal": {"type": "STRING", "resolution": {"unit": "YEAR", "value": 1}, "string_format": "%Y"},
        "spatial_extent": {"xmin": -74.0, "ymin": -18.0, "xmax": -44.0, "ymax": 5.3},
        "period": {"start_date": "2018", "end_date": "2019"},
        "classification": {"type": "Self"},
        "image": "mapbiomas_amazonia",
        "grid": {"column": 1, "row": 1},
        "srid": 4326,
        "attributes": [{"attribute": "classification"}],
        "timeline": ["2018", "2019"]
    }]
}"#;

fn catalog_file() -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    file.write_all(CATALOG.as_bytes()).unwrap();
    file
}

fn wlts(catalog: &NamedTempFile, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_wlts"))
        .args(args)
        .arg("--catalog")
        .arg(catalog.path())
        .env_remove("WLTS_CONFIG")
        .env_remove("WLTS_CATALOG")
        .env("RUST_LOG", "off")
        .output()
        .expect("Failed to execute wlts")
}

fn json_stdout(output: &Output) -> Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).expect("Output should be valid JSON")
}

#[test]
fn test_list_hides_private_collections() {
    let catalog = catalog_file();

    let output = wlts(&catalog, &["list", "--json"]);
    assert!(output.status.success());
    let parsed = json_stdout(&output);
    assert_eq!(parsed["status"], "success");
    assert_eq!(parsed["data"]["collections"], serde_json::json!(["prodes_amz"]));

    let output = wlts(&catalog, &["list", "--json", "--roles", "mapbiomas5_amazonia"]);
    let parsed = json_stdout(&output);
    assert_eq!(
        parsed["data"]["collections"],
        serde_json::json!(["prodes_amz", "mapbiomas5_amazonia"])
    );
}

#[test]
fn test_describe() {
    let catalog = catalog_file();

    let output = wlts(&catalog, &["describe", "prodes_amz", "--json"]);
    assert!(output.status.success());
    let parsed = json_stdout(&output);
    assert_eq!(parsed["data"]["title"], "PRODES Amazonia");
    assert_eq!(parsed["data"]["classification_system"]["type"], "Literal");

    let output = wlts(&catalog, &["describe", "mapbiomas5_amazonia"]);
    assert!(!output.status.success());

    let output = wlts(&catalog, &["describe", "unknown_x"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown_x"));
}

#[test]
fn test_trajectory_outside_window_is_empty() {
    let catalog = catalog_file();

    let output = wlts(
        &catalog,
        &[
            "trajectory",
            "--longitude",
            "-54.0",
            "--latitude",
            "-12.0",
            "--collections",
            "prodes_amz",
            "--start-date",
            "2017-01-01",
            "--json",
        ],
    );

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let parsed = json_stdout(&output);
    assert_eq!(parsed["data"]["query"]["collections"], serde_json::json!(["prodes_amz"]));
    assert_eq!(parsed["data"]["result"]["trajectory"], serde_json::json!([]));
}

#[test]
fn test_trajectory_rejects_bad_coordinates() {
    let catalog = catalog_file();

    let output = wlts(&catalog, &["trajectory", "--longitude", "-54.0", "--latitude", "120"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("latitude"));
}

#[test]
fn test_missing_catalog_fails() {
    let output = Command::new(env!("CARGO_BIN_EXE_wlts"))
        .args(["list", "--catalog", "/nonexistent/catalog.json"])
        .env_remove("WLTS_CONFIG")
        .env("RUST_LOG", "off")
        .output()
        .expect("Failed to execute wlts");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to load catalog"));
}

#[test]
fn test_config_reports_sources() {
    let catalog = catalog_file();

    let output = wlts(&catalog, &["config", "--json", "--timeout", "5"]);
    assert!(output.status.success());
    let parsed = json_stdout(&output);
    let entries = parsed["data"].as_array().unwrap();

    let timeout = entries.iter().find(|e| e["key"] == "request_timeout_secs").unwrap();
    assert_eq!(timeout["value"], "5");
    assert_eq!(timeout["source"], "cli");
    let port = entries.iter().find(|e| e["key"] == "port").unwrap();
    assert_eq!(port["source"], "default");
}

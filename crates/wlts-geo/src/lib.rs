//! WLTS Geo - Geometry conversions, reprojection, and point predicates
//!
//! Query points arrive in EPSG:4326 while feature types and coverages live in
//! their own reference systems. This crate moves points, boxes and feature
//! geometries between them and answers the few spatial questions the
//! trajectory engine asks.

pub mod models;
pub mod spatial;
pub mod transform;

pub use models::{from_geo_geometry, from_geojson_geometry, to_geo_geometry};
pub use spatial::{buffer_point, intersects_point, point_wkt};
pub use transform::{reproject_bounds, reproject_geometry, reproject_point, Reprojector};

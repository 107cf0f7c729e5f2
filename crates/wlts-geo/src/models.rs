//! Geometry models for wlts-geo.
//!
//! Re-exports the canonical types from `wlts-core` and converts them to and
//! from the `geo` and `geojson` crates.

use geo::{Coord, Geometry as GeoGeometry, LineString, Polygon};
use wlts_core::error::{Result, WltsError};

pub use wlts_core::models::{BoundingBox, Crs, Geometry};

fn line(coords: &[[f64; 2]]) -> LineString {
    LineString::new(coords.iter().map(|c| Coord { x: c[0], y: c[1] }).collect())
}

fn polygon(rings: &[Vec<[f64; 2]>]) -> Polygon {
    match rings.split_first() {
        Some((exterior, interiors)) => {
            Polygon::new(line(exterior), interiors.iter().map(|r| line(r)).collect())
        }
        None => Polygon::new(LineString::new(vec![]), vec![]),
    }
}

fn coords_of(ls: &LineString) -> Vec<[f64; 2]> {
    ls.coords().map(|c| [c.x, c.y]).collect()
}

fn rings_of(p: &Polygon) -> Vec<Vec<[f64; 2]>> {
    std::iter::once(p.exterior()).chain(p.interiors()).map(coords_of).collect()
}

/// Convert a canonical Geometry to a geo::Geometry
pub fn to_geo_geometry(geom: &Geometry) -> GeoGeometry {
    match geom {
        Geometry::Point { coordinates } => {
            GeoGeometry::Point(geo::Point::new(coordinates[0], coordinates[1]))
        }
        Geometry::LineString { coordinates } => GeoGeometry::LineString(line(coordinates)),
        Geometry::Polygon { coordinates } => GeoGeometry::Polygon(polygon(coordinates)),
        Geometry::MultiPoint { coordinates } => GeoGeometry::MultiPoint(geo::MultiPoint::new(
            coordinates.iter().map(|c| geo::Point::new(c[0], c[1])).collect(),
        )),
        Geometry::MultiLineString { coordinates } => GeoGeometry::MultiLineString(
            geo::MultiLineString::new(coordinates.iter().map(|l| line(l)).collect()),
        ),
        Geometry::MultiPolygon { coordinates } => GeoGeometry::MultiPolygon(
            geo::MultiPolygon::new(coordinates.iter().map(|p| polygon(p)).collect()),
        ),
    }
}

/// Convert a geo::Geometry to a canonical Geometry.
///
/// Returns `None` for empty geometry collections.
pub fn from_geo_geometry(geom: &GeoGeometry) -> Option<Geometry> {
    let converted = match geom {
        GeoGeometry::Point(p) => Geometry::point(p.x(), p.y()),
        GeoGeometry::Line(l) => Geometry::LineString {
            coordinates: vec![[l.start.x, l.start.y], [l.end.x, l.end.y]],
        },
        GeoGeometry::LineString(ls) => Geometry::LineString { coordinates: coords_of(ls) },
        GeoGeometry::Polygon(p) => Geometry::Polygon { coordinates: rings_of(p) },
        GeoGeometry::MultiPoint(mp) => Geometry::MultiPoint {
            coordinates: mp.iter().map(|p| [p.x(), p.y()]).collect(),
        },
        GeoGeometry::MultiLineString(mls) => Geometry::MultiLineString {
            coordinates: mls.iter().map(coords_of).collect(),
        },
        GeoGeometry::MultiPolygon(mp) => Geometry::MultiPolygon {
            coordinates: mp.iter().map(rings_of).collect(),
        },
        // Feature services return simple geometries; keep the first member
        GeoGeometry::GeometryCollection(gc) => return gc.iter().next().and_then(from_geo_geometry),
        GeoGeometry::Rect(r) => Geometry::Polygon { coordinates: rings_of(&r.to_polygon()) },
        GeoGeometry::Triangle(t) => Geometry::Polygon { coordinates: rings_of(&t.to_polygon()) },
    };
    Some(converted)
}

/// Convert a GeoJSON geometry as returned by a feature service
pub fn from_geojson_geometry(geometry: geojson::Geometry) -> Result<Geometry> {
    let geo_geom = GeoGeometry::<f64>::try_from(geometry)
        .map_err(|e| WltsError::Serialization(format!("Unsupported GeoJSON geometry: {}", e)))?;
    from_geo_geometry(&geo_geom)
        .ok_or_else(|| WltsError::Serialization("Empty geometry collection".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polygon_conversion_keeps_rings() {
        let with_hole = Geometry::polygon(vec![
            vec![[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0], [0.0, 0.0]],
            vec![[1.0, 1.0], [2.0, 1.0], [2.0, 2.0], [1.0, 1.0]],
        ]);
        let back = from_geo_geometry(&to_geo_geometry(&with_hole)).unwrap();
        assert_eq!(back, with_hole);
    }

    #[test]
    fn test_from_geojson_drops_third_dimension() {
        let geometry = geojson::Geometry::new(geojson::Value::Point(vec![-66.0, -9.0, 120.0]));
        let converted = from_geojson_geometry(geometry).unwrap();
        assert_eq!(converted, Geometry::point(-66.0, -9.0));
    }

    #[test]
    fn test_empty_collection_has_no_canonical_form() {
        let empty = GeoGeometry::GeometryCollection(geo::GeometryCollection::<f64>(vec![]));
        assert!(from_geo_geometry(&empty).is_none());
    }
}

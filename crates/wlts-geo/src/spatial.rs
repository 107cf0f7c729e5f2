//! Point predicates and query envelopes

use crate::models::{to_geo_geometry, BoundingBox, Geometry};
use geo::{Intersects, Point};
use wkt::ToWkt;

/// Square envelope of `margin` units around a point
pub fn buffer_point(x: f64, y: f64, margin: f64) -> BoundingBox {
    BoundingBox::around(x, y, margin)
}

/// Check if a geometry intersects the point `(x, y)`, boundary included
pub fn intersects_point(geometry: &Geometry, x: f64, y: f64) -> bool {
    to_geo_geometry(geometry).intersects(&Point::new(x, y))
}

/// WKT rendering of a point, as used in CQL filters
pub fn point_wkt(x: f64, y: f64) -> String {
    Point::new(x, y).wkt_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn square() -> Geometry {
        Geometry::polygon(vec![vec![
            [0.0, 0.0],
            [2.0, 0.0],
            [2.0, 2.0],
            [0.0, 2.0],
            [0.0, 0.0],
        ]])
    }

    #[test]
    fn test_intersects_point() {
        assert!(intersects_point(&square(), 1.0, 1.0));
        assert!(intersects_point(&square(), 2.0, 1.0));
        assert!(!intersects_point(&square(), 3.0, 1.0));
    }

    #[test]
    fn test_point_wkt() {
        assert_eq!(point_wkt(-66.031, -9.091), "POINT(-66.031 -9.091)");
    }

    proptest! {
        #[test]
        fn prop_buffer_contains_center(
            x in -180.0f64..180.0,
            y in -90.0f64..90.0,
            margin in 0.0001f64..1.0,
        ) {
            let bbox = buffer_point(x, y, margin);
            prop_assert!(bbox.contains(x, y));
            prop_assert!((bbox.max_x - bbox.min_x - 2.0 * margin).abs() < 1e-9);
        }
    }
}

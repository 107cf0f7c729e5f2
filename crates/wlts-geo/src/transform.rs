//! CRS transformation between the query CRS and datasource CRSs

use crate::models::{from_geo_geometry, to_geo_geometry, BoundingBox, Crs, Geometry};
use geo::{Coord, MapCoords};
use proj::Proj;
use wlts_core::error::{Result, WltsError};

/// A prepared transformation between two EPSG codes.
///
/// Identical source and target codes skip PROJ entirely.
pub struct Reprojector {
    from: u32,
    to: u32,
    proj: Option<Proj>,
}

impl std::fmt::Debug for Reprojector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reprojector").field("from", &self.from).field("to", &self.to).finish()
    }
}

impl Reprojector {
    pub fn new(from: u32, to: u32) -> Result<Self> {
        let proj = if from == to {
            None
        } else {
            let from_proj = format!("EPSG:{}", from);
            let to_proj = format!("EPSG:{}", to);
            let proj = Proj::new_known_crs(&from_proj, &to_proj, None).map_err(|e| {
                WltsError::Projection {
                    from,
                    to,
                    reason: format!("Failed to create projection: {}", e),
                }
            })?;
            Some(proj)
        };
        Ok(Self { from, to, proj })
    }

    pub fn is_identity(&self) -> bool {
        self.proj.is_none()
    }

    fn failure(&self, e: proj::ProjError) -> WltsError {
        WltsError::Projection { from: self.from, to: self.to, reason: e.to_string() }
    }

    /// Transform a single `(x, y)` pair
    pub fn point(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        match &self.proj {
            None => Ok((x, y)),
            Some(proj) => proj.convert((x, y)).map_err(|e| self.failure(e)),
        }
    }

    pub fn geometry(&self, geometry: &Geometry) -> Result<Geometry> {
        let Some(proj) = &self.proj else {
            return Ok(geometry.clone());
        };

        let transformed = to_geo_geometry(geometry)
            .try_map_coords(|c| proj.convert((c.x, c.y)).map(|(x, y)| Coord { x, y }))
            .map_err(|e| self.failure(e))?;

        from_geo_geometry(&transformed).ok_or_else(|| WltsError::Projection {
            from: self.from,
            to: self.to,
            reason: "empty geometry".to_string(),
        })
    }

    /// Envelope of the four transformed corners
    pub fn bounds(&self, bbox: &BoundingBox) -> Result<BoundingBox> {
        if self.is_identity() {
            return Ok(*bbox);
        }

        let corners = [
            self.point(bbox.min_x, bbox.min_y)?,
            self.point(bbox.min_x, bbox.max_y)?,
            self.point(bbox.max_x, bbox.min_y)?,
            self.point(bbox.max_x, bbox.max_y)?,
        ];

        let mut out = BoundingBox::new(f64::MAX, f64::MAX, f64::MIN, f64::MIN);
        for (x, y) in corners {
            out.min_x = out.min_x.min(x);
            out.min_y = out.min_y.min(y);
            out.max_x = out.max_x.max(x);
            out.max_y = out.max_y.max(y);
        }
        Ok(out)
    }
}

/// Reproject a point between EPSG codes
pub fn reproject_point(x: f64, y: f64, from: u32, to: u32) -> Result<(f64, f64)> {
    Reprojector::new(from, to)?.point(x, y)
}

/// Reproject a geometry from one CRS to another
pub fn reproject_geometry(geometry: &Geometry, from_crs: &Crs, to_crs: &Crs) -> Result<Geometry> {
    Reprojector::new(from_crs.epsg, to_crs.epsg)?.geometry(geometry)
}

/// Reproject a bounding box, returning the envelope of its corners
pub fn reproject_bounds(bbox: &BoundingBox, from: u32, to: u32) -> Result<BoundingBox> {
    Reprojector::new(from, to)?.bounds(bbox)
}

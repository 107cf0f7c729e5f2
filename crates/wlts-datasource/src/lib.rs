//! WLTS Datasource - Protocol ports and adapters
//!
//! This crate defines the ports the trajectory engine talks to (feature
//! services, coverage services, classification lookups) and provides WFS/WCS
//! clients plus in-memory implementations for development and testing.

pub mod adapters;
pub mod http;
pub mod memory;
pub mod models;
pub mod ports;
pub mod raster;
pub mod wcs;
pub mod wfs;
pub mod xml;

pub use adapters::{Datasource, RasterAdapter, VectorAdapter};
pub use memory::{MemoryRasterSource, MemoryVectorSource, RecordedRequest};
pub use models::{
    qualified_name, ClassLookupRequest, CoverageRequest, FeatureQuery, FeatureRecord, GridShape,
    TemporalFilter,
};
pub use ports::{ClassLookup, RasterSource, VectorSource};

pub mod classification;
pub mod collection;
pub mod geometry;
pub mod roles;
pub mod trajectory;

pub use classification::{ClassificationStrategy, ClassificationSystem, ExternalClassification};
pub use collection::{
    CollectionDescription, CollectionKind, CollectionMeta, Period, SpatialExtent, TemporalKind,
    TemporalResolution, TemporalSpec,
};
pub use geometry::{BoundingBox, Crs, Geometry};
pub use roles::Roles;
pub use trajectory::{
    QueryEcho, TrajectoryParams, TrajectoryPoint, TrajectoryQuery, TrajectoryResponse,
    TrajectoryResult,
};

//! WLTS Trajectory - Resolution engine
//!
//! This crate wires collections to their datasources and answers trajectory
//! requests: class resolution, per-collection queries, and the merge of all
//! observations into one time-ordered trajectory.

pub mod classification;
pub mod collection;
pub mod orchestrator;
pub mod registry;

pub use classification::ClassResolver;
pub use collection::{
    Collection, FeatureCollection, FeatureObservation, ImageAttribute, ImageCollection,
    ObservationDate, TimelineEntry,
};
pub use orchestrator::{merge_sorted, TrajectoryService};
pub use registry::{CollectionRegistry, DatasourceRegistry};

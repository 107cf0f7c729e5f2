//! WLTS Core - Domain models, catalog, and configuration
//!
//! This crate contains the domain types shared by the trajectory engine, its
//! protocol adapters and the service boundaries.

pub mod catalog;
pub mod config;
pub mod dates;
pub mod error;
pub mod models;

pub use error::{ErrorKind, Result, WltsError};

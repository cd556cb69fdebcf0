//! `aoh-core` validates the inputs of an Area of Habitat (AOH) run and
//! prepares the attribute field that will hold the result.
//!
//! This crate includes:
//! - **Pipeline**: checks that a DEM, a land-cover classification raster and a
//!   habitat layer fit together, then resolves or creates the destination field.
//! - **Inspection**: lists the layers of a habitat container and the integer
//!   fields of a layer.
//! - **Backends**: the [`datasets::DatasetBackend`] seam, with a GDAL
//!   implementation (feature `gdal`) and an in-memory one.
//! - **Notifications** and a single-run **trigger** for front ends.
//! - **Driver Registry**: the raster and vector formats the tool accepts.

pub mod datasets;
pub mod drivers;
pub mod error;
#[cfg(feature = "gdal")]
pub mod gdal_backend;
pub mod inspect;
pub mod memory;
pub mod notify;
pub mod pipeline;
pub mod schema;
pub mod trigger;
pub mod types;

pub use error::{AohError, BackendError, Result};

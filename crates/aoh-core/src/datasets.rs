//! Dataset access traits.
//!
//! The pipeline never talks to a geospatial library directly. It asks a
//! [`DatasetBackend`] for handles, and each handle releases its dataset when
//! dropped, so every exit path of a run closes what it opened.

use std::path::Path;

use crate::error::BackendError;
use crate::types::{RasterDescriptor, VectorLayerDescriptor};

/// Access mode for opening a vector container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    ReadOnly,
    Update,
}

/// An open raster dataset. Dropping the handle closes the dataset.
pub trait RasterHandle {
    /// Description captured when the raster was opened.
    fn descriptor(&self) -> &RasterDescriptor;
}

/// An open vector container. Dropping the handle closes the container.
pub trait VectorHandle {
    /// Names of the layers in container order.
    fn layer_names(&self) -> Vec<String>;

    /// Describes the layer named `name`, or `None` if it does not exist.
    fn layer(&self, name: &str) -> Option<VectorLayerDescriptor>;

    /// Adds a 32-bit integer field to a layer.
    ///
    /// # Arguments
    ///
    /// * `layer` - Name of the target layer
    /// * `field` - Name of the field to create
    ///
    /// # Errors
    ///
    /// Returns an error if the container was opened read-only or the
    /// underlying library refuses the schema change.
    fn create_integer_field(&mut self, layer: &str, field: &str) -> Result<(), BackendError>;
}

/// Opens datasets by path.
pub trait DatasetBackend {
    /// Opens a raster read-only and captures its descriptor from band 1.
    ///
    /// # Errors
    ///
    /// Returns an error if the path does not resolve to a readable raster.
    fn open_raster(&self, path: &Path) -> Result<Box<dyn RasterHandle + '_>, BackendError>;

    /// Opens a vector container with the given access mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the path does not resolve to a vector container or
    /// cannot be opened in the requested mode.
    fn open_vector(
        &self,
        path: &Path,
        access: Access,
    ) -> Result<Box<dyn VectorHandle + '_>, BackendError>;
}

/// Backend used when the crate is built without GDAL; every open fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableBackend;

impl DatasetBackend for UnavailableBackend {
    fn open_raster(&self, _path: &Path) -> Result<Box<dyn RasterHandle + '_>, BackendError> {
        Err(BackendError::Unavailable)
    }

    fn open_vector(
        &self,
        _path: &Path,
        _access: Access,
    ) -> Result<Box<dyn VectorHandle + '_>, BackendError> {
        Err(BackendError::Unavailable)
    }
}

/// Returns the GDAL backend when compiled in, otherwise [`UnavailableBackend`].
#[must_use]
pub fn default_backend() -> Box<dyn DatasetBackend> {
    #[cfg(feature = "gdal")]
    {
        Box::new(crate::gdal_backend::GdalBackend::new())
    }
    #[cfg(not(feature = "gdal"))]
    {
        Box::new(UnavailableBackend)
    }
}

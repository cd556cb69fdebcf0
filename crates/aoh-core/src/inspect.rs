//! Read-only inspection of habitat containers.
//!
//! These helpers collect what a caller needs before building a
//! [`ValidationRequest`](crate::types::ValidationRequest): the layers of a
//! container and the integer fields of a layer that could receive AOH values.
//! Containers are opened read-only and released before returning.

use std::path::Path;

use log::debug;

use crate::datasets::{Access, DatasetBackend};
use crate::error::{AohError, Result};
use crate::types::{DestinationField, VectorLayerDescriptor};

/// Lists the layer names of a habitat container in container order.
///
/// # Errors
///
/// Returns [`AohError::HabitatOpen`] if the container cannot be opened.
pub fn list_layers<B>(backend: &B, container: &Path) -> Result<Vec<String>>
where
    B: DatasetBackend + ?Sized,
{
    let handle = backend
        .open_vector(container, Access::ReadOnly)
        .map_err(|source| AohError::HabitatOpen {
            path: container.to_path_buf(),
            source,
        })?;
    let names = handle.layer_names();
    debug!("{} has {} layer(s)", container.display(), names.len());
    Ok(names)
}

/// Describes one layer; `None` selects the first layer of the container.
///
/// # Errors
///
/// Returns [`AohError::HabitatOpen`], [`AohError::LayerNotFound`] or
/// [`AohError::NoLayers`].
pub fn describe_layer<B>(
    backend: &B,
    container: &Path,
    layer: Option<&str>,
) -> Result<VectorLayerDescriptor>
where
    B: DatasetBackend + ?Sized,
{
    let handle = backend
        .open_vector(container, Access::ReadOnly)
        .map_err(|source| AohError::HabitatOpen {
            path: container.to_path_buf(),
            source,
        })?;
    let name = match layer.filter(|n| !n.is_empty()) {
        Some(name) => name.to_string(),
        None => handle
            .layer_names()
            .into_iter()
            .next()
            .ok_or(AohError::NoLayers)?,
    };
    handle
        .layer(&name)
        .ok_or(AohError::LayerNotFound(name))
}

/// Names of the fields of a layer able to store an AOH value.
///
/// # Errors
///
/// Same as [`describe_layer`].
pub fn integer_fields<B>(backend: &B, container: &Path, layer: Option<&str>) -> Result<Vec<String>>
where
    B: DatasetBackend + ?Sized,
{
    let layer = describe_layer(backend, container, layer)?;
    Ok(layer
        .integer_fields()
        .into_iter()
        .map(str::to_string)
        .collect())
}

/// Destination to use when the caller expressed no preference.
///
/// Reuses the first integer field when the layer has one, otherwise asks for
/// a new field whose name still has to be supplied.
#[must_use]
pub fn default_destination(integer_fields: &[String]) -> DestinationField {
    if integer_fields.is_empty() {
        DestinationField::New(String::new())
    } else {
        DestinationField::Existing(None)
    }
}

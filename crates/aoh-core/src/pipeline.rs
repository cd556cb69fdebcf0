//! Validation and provisioning pipeline.
//!
//! A run is a linear chain of gates over a [`ValidationRequest`]:
//!
//! 1. all three paths are non-empty
//! 2. the DEM raster opens
//! 3. the classification raster opens and matches the DEM grid
//! 4. the habitat container opens for update
//! 5. the layer resolves
//! 6. the required schema fields are present
//! 7. the destination field is resolved, creating it if requested
//!
//! The first failing gate ends the run with its [`AohError`]. Dataset handles
//! are owned by the run and dropped on every exit path.

use log::{debug, info, warn};

use crate::datasets::{Access, DatasetBackend, VectorHandle};
use crate::error::{AohError, InputKind, Result};
use crate::schema;
use crate::types::{
    DestinationField, FieldDescriptor, FieldType, GridPolicy, Provisioned, RasterDescriptor,
    ValidationRequest, VectorLayerDescriptor,
};

/// Runs the pipeline against `backend`.
///
/// # Errors
///
/// Returns the [`AohError`] of the first gate that fails. When the error is
/// returned no field has been created, except for
/// [`AohError::FieldCreation`] where the backend may have partially applied
/// the change.
///
/// # Examples
///
/// ```
/// use aoh_core::memory::{MemoryBackend, MemoryContainer};
/// use aoh_core::pipeline;
/// use aoh_core::schema::REQUIRED_FIELDS;
/// use aoh_core::types::{
///     DestinationField, FieldDescriptor, FieldType, GridSize, ValidationRequest,
/// };
///
/// let fields = REQUIRED_FIELDS
///     .iter()
///     .map(|name| FieldDescriptor::new(*name, FieldType::Real))
///     .collect();
/// let backend = MemoryBackend::new()
///     .with_raster("dem.tif", GridSize::new(100, 100))
///     .with_raster("class.tif", GridSize::new(100, 100))
///     .with_container(MemoryContainer::new("habitat.gdb").with_layer("zones", fields));
///
/// let request = ValidationRequest::new(
///     "dem.tif",
///     "class.tif",
///     "habitat.gdb",
///     Some("zones".to_string()),
///     DestinationField::New("aoh_val".to_string()),
/// );
/// let provisioned = pipeline::run(&backend, &request).unwrap();
/// assert!(provisioned.created);
/// assert!(backend.ledger().is_balanced());
/// ```
pub fn run<B>(backend: &B, request: &ValidationRequest) -> Result<Provisioned>
where
    B: DatasetBackend + ?Sized,
{
    check_inputs(request)?;

    info!("Opening DEM raster {}", request.dem.display());
    let dem = backend
        .open_raster(&request.dem)
        .map_err(|source| AohError::DemOpen {
            path: request.dem.clone(),
            source,
        })?;
    debug!("DEM: {:?}", dem.descriptor());

    info!(
        "Opening class raster {}",
        request.classification.display()
    );
    let classification =
        backend
            .open_raster(&request.classification)
            .map_err(|source| AohError::ClassOpen {
                path: request.classification.clone(),
                source,
            })?;
    debug!("Class raster: {:?}", classification.descriptor());
    check_grid_compatibility(
        dem.descriptor(),
        classification.descriptor(),
        request.grid_policy,
    )?;

    info!("Opening habitat vector {} for update", request.habitat.display());
    let mut habitat = backend
        .open_vector(&request.habitat, Access::Update)
        .map_err(|source| AohError::HabitatOpen {
            path: request.habitat.clone(),
            source,
        })?;

    let layer = resolve_layer(&*habitat, request.layer.as_deref())?;
    debug!("Layer {} has {} field(s)", layer.name, layer.fields.len());

    if let Some(missing) = schema::first_missing_field(&layer) {
        warn!("Layer {} lacks required field {missing}", layer.name);
        return Err(AohError::SchemaFieldMissing(missing.to_string()));
    }

    let (field, created) = resolve_destination(&mut *habitat, &layer, &request.destination)?;
    let layer = if created {
        habitat.layer(&layer.name).unwrap_or_else(|| {
            let mut layer = layer;
            layer
                .fields
                .push(FieldDescriptor::new(field.clone(), FieldType::Integer));
            layer
        })
    } else {
        layer
    };

    info!(
        "AOH field {field} ready on layer {} ({})",
        layer.name,
        if created { "created" } else { "existing" }
    );
    Ok(Provisioned {
        dem: dem.descriptor().clone(),
        classification: classification.descriptor().clone(),
        layer,
        field,
        created,
    })
}

/// Rejects requests with an empty path, checked DEM, class, habitat.
///
/// # Errors
///
/// Returns [`AohError::MissingInput`] naming the first empty path.
pub fn check_inputs(request: &ValidationRequest) -> Result<()> {
    let inputs = [
        (InputKind::Dem, &request.dem),
        (InputKind::Classification, &request.classification),
        (InputKind::Habitat, &request.habitat),
    ];
    for (kind, path) in inputs {
        if path.as_os_str().is_empty() {
            warn!("No {} given", kind.as_str());
            return Err(AohError::MissingInput(kind));
        }
    }
    Ok(())
}

/// Checks that the classification raster lines up with the DEM.
///
/// Under [`GridPolicy::DimensionsOnly`] only the row and column counts are
/// compared. [`GridPolicy::Strict`] also requires the extents to agree within
/// half a DEM pixel along each axis and the projection strings to be identical.
///
/// # Errors
///
/// Returns [`AohError::GridMismatch`], [`AohError::ExtentMismatch`] or
/// [`AohError::ProjectionMismatch`].
pub fn check_grid_compatibility(
    dem: &RasterDescriptor,
    classification: &RasterDescriptor,
    policy: GridPolicy,
) -> Result<()> {
    if dem.grid != classification.grid {
        warn!(
            "Class raster is {} but the DEM is {}",
            classification.grid, dem.grid
        );
        return Err(AohError::GridMismatch {
            dem: dem.grid,
            classification: classification.grid,
        });
    }
    if policy == GridPolicy::DimensionsOnly {
        return Ok(());
    }

    let x_tolerance = dem.pixel_size_x().abs() / 2.0;
    let y_tolerance = dem.pixel_size_y().abs() / 2.0;
    let (dem_extent, class_extent) = (dem.extent(), classification.extent());
    if !dem_extent.approx_eq(&class_extent, x_tolerance, y_tolerance) {
        return Err(AohError::ExtentMismatch {
            dem: dem_extent.to_string(),
            classification: class_extent.to_string(),
        });
    }
    if dem.projection.trim() != classification.projection.trim() {
        return Err(AohError::ProjectionMismatch);
    }
    Ok(())
}

/// Finds the requested layer, or the first layer when none is named.
fn resolve_layer(
    habitat: &dyn VectorHandle,
    name: Option<&str>,
) -> Result<VectorLayerDescriptor> {
    match name.filter(|n| !n.is_empty()) {
        Some(name) => habitat
            .layer(name)
            .ok_or_else(|| AohError::LayerNotFound(name.to_string())),
        None => {
            let first = habitat
                .layer_names()
                .into_iter()
                .next()
                .ok_or(AohError::NoLayers)?;
            debug!("No layer named, using {first}");
            habitat.layer(&first).ok_or(AohError::LayerNotFound(first))
        },
    }
}

/// Resolves the destination field, creating it for [`DestinationField::New`].
///
/// Returns the field name and whether it was created.
fn resolve_destination(
    habitat: &mut dyn VectorHandle,
    layer: &VectorLayerDescriptor,
    destination: &DestinationField,
) -> Result<(String, bool)> {
    match destination {
        DestinationField::Existing(choice) => {
            let candidates = layer.integer_fields();
            let Some(first) = candidates.first() else {
                return Err(AohError::NoEligibleField);
            };
            match choice {
                None => Ok(((*first).to_string(), false)),
                Some(name) if candidates.contains(&name.as_str()) => Ok((name.clone(), false)),
                Some(name) => Err(AohError::IneligibleField(name.clone())),
            }
        },
        DestinationField::New(name) => {
            let name = name.trim();
            if name.is_empty() {
                return Err(AohError::EmptyFieldName);
            }
            if layer.has_field_ignore_case(name) {
                return Err(AohError::FieldNameCollision(name.to_string()));
            }
            habitat
                .create_integer_field(&layer.name, name)
                .map_err(|source| AohError::FieldCreation {
                    field: name.to_string(),
                    source,
                })?;
            Ok((name.to_string(), true))
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GridSize, IDENTITY_TRANSFORM};
    use std::path::PathBuf;

    fn raster(grid: GridSize, gt: [f64; 6], projection: &str) -> RasterDescriptor {
        RasterDescriptor::new("r.tif", grid, gt, projection)
    }

    #[test]
    fn test_equal_grids_pass() {
        for (x, y) in [(1, 1), (100, 100), (640, 480), (7, 3000)] {
            let a = raster(GridSize::new(x, y), IDENTITY_TRANSFORM, "");
            let b = raster(GridSize::new(x, y), IDENTITY_TRANSFORM, "");
            assert!(check_grid_compatibility(&a, &b, GridPolicy::DimensionsOnly).is_ok());
        }
    }

    #[test]
    fn test_grids_differing_in_either_dimension_fail() {
        let dem = raster(GridSize::new(100, 100), IDENTITY_TRANSFORM, "");
        for (x, y) in [(99, 100), (100, 101), (50, 50), (100, 0)] {
            let class = raster(GridSize::new(x, y), IDENTITY_TRANSFORM, "");
            let err = check_grid_compatibility(&dem, &class, GridPolicy::DimensionsOnly)
                .unwrap_err();
            assert!(matches!(
                err,
                AohError::GridMismatch { classification, .. } if classification == GridSize::new(x, y)
            ));
        }
    }

    #[test]
    fn test_dimension_policy_ignores_extent_and_projection() {
        let grid = GridSize::new(10, 10);
        let dem = raster(grid, [0.0, 30.0, 0.0, 0.0, 0.0, -30.0], "EPSG:32633");
        let class = raster(grid, [5000.0, 30.0, 0.0, 0.0, 0.0, -30.0], "EPSG:4326");
        assert!(check_grid_compatibility(&dem, &class, GridPolicy::DimensionsOnly).is_ok());
    }

    #[test]
    fn test_strict_policy_rejects_shifted_extent() {
        let grid = GridSize::new(10, 10);
        let dem = raster(grid, [0.0, 30.0, 0.0, 0.0, 0.0, -30.0], "EPSG:32633");
        let class = raster(grid, [5000.0, 30.0, 0.0, 0.0, 0.0, -30.0], "EPSG:32633");
        assert!(matches!(
            check_grid_compatibility(&dem, &class, GridPolicy::Strict),
            Err(AohError::ExtentMismatch { .. })
        ));
    }

    #[test]
    fn test_strict_policy_tolerates_subpixel_drift() {
        let grid = GridSize::new(10, 10);
        let dem = raster(grid, [0.0, 30.0, 0.0, 0.0, 0.0, -30.0], "EPSG:32633");
        let class = raster(grid, [1.0, 30.0, 0.0, -1.0, 0.0, -30.0], "EPSG:32633");
        assert!(check_grid_compatibility(&dem, &class, GridPolicy::Strict).is_ok());
    }

    #[test]
    fn test_strict_policy_uses_per_axis_tolerance() {
        let grid = GridSize::new(10, 10);
        let dem = raster(grid, [0.0, 30.0, 0.0, 0.0, 0.0, -10.0], "EPSG:32633");
        // 12 units is under half a pixel in X (15) but over it in Y (5)
        let shifted_x = raster(grid, [12.0, 30.0, 0.0, 0.0, 0.0, -10.0], "EPSG:32633");
        let shifted_y = raster(grid, [0.0, 30.0, 0.0, 12.0, 0.0, -10.0], "EPSG:32633");
        assert!(check_grid_compatibility(&dem, &shifted_x, GridPolicy::Strict).is_ok());
        assert!(matches!(
            check_grid_compatibility(&dem, &shifted_y, GridPolicy::Strict),
            Err(AohError::ExtentMismatch { .. })
        ));
    }

    #[test]
    fn test_strict_policy_rejects_other_projection() {
        let grid = GridSize::new(10, 10);
        let dem = raster(grid, IDENTITY_TRANSFORM, "EPSG:32633");
        let class = raster(grid, IDENTITY_TRANSFORM, "EPSG:4326");
        assert!(matches!(
            check_grid_compatibility(&dem, &class, GridPolicy::Strict),
            Err(AohError::ProjectionMismatch)
        ));
    }

    #[test]
    fn test_check_inputs_order() {
        let mut request = ValidationRequest::new(
            "",
            "",
            "",
            None,
            DestinationField::Existing(None),
        );
        assert!(matches!(
            check_inputs(&request),
            Err(AohError::MissingInput(InputKind::Dem))
        ));
        request.dem = PathBuf::from("dem.tif");
        assert!(matches!(
            check_inputs(&request),
            Err(AohError::MissingInput(InputKind::Classification))
        ));
        request.classification = PathBuf::from("class.tif");
        assert!(matches!(
            check_inputs(&request),
            Err(AohError::MissingInput(InputKind::Habitat))
        ));
        request.habitat = PathBuf::from("habitat.gdb");
        assert!(check_inputs(&request).is_ok());
    }
}

//! Dataset backend over the system GDAL library.
//!
//! Rasters are opened read-only and described from band 1. Vector containers
//! are opened with `GDAL_OF_VECTOR`, plus `GDAL_OF_UPDATE` when a field may be
//! created. `gdal::Dataset` closes itself on drop, which is what releases the
//! handles handed out here.

use std::path::Path;

use gdal::vector::{LayerAccess, OGRFieldType};
use gdal::{Dataset, DatasetOptions, GdalOpenFlags};
use log::debug;

use crate::datasets::{Access, DatasetBackend, RasterHandle, VectorHandle};
use crate::error::BackendError;
use crate::types::{
    FieldDescriptor, FieldType, GridSize, IDENTITY_TRANSFORM, RasterDescriptor,
    VectorLayerDescriptor,
};

/// Backend opening datasets through GDAL.
#[derive(Debug, Default, Clone, Copy)]
pub struct GdalBackend;

impl GdalBackend {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn open_flags(access: Access) -> GdalOpenFlags {
    match access {
        Access::ReadOnly => GdalOpenFlags::GDAL_OF_VECTOR | GdalOpenFlags::GDAL_OF_READONLY,
        Access::Update => GdalOpenFlags::GDAL_OF_VECTOR | GdalOpenFlags::GDAL_OF_UPDATE,
    }
}

/// Maps an OGR field type code onto [`FieldType`].
#[must_use]
pub fn field_type_from_ogr(code: OGRFieldType::Type) -> FieldType {
    match code {
        OGRFieldType::OFTInteger => FieldType::Integer,
        OGRFieldType::OFTInteger64 => FieldType::Integer64,
        OGRFieldType::OFTReal => FieldType::Real,
        OGRFieldType::OFTString => FieldType::String,
        OGRFieldType::OFTDate => FieldType::Date,
        OGRFieldType::OFTDateTime => FieldType::DateTime,
        other => FieldType::Other(format!("OGRFieldType({other})")),
    }
}

impl DatasetBackend for GdalBackend {
    fn open_raster(&self, path: &Path) -> Result<Box<dyn RasterHandle + '_>, BackendError> {
        let options = DatasetOptions {
            open_flags: GdalOpenFlags::GDAL_OF_RASTER | GdalOpenFlags::GDAL_OF_READONLY,
            ..Default::default()
        };
        let dataset = Dataset::open_ex(path, options)?;
        let (x_size, y_size) = dataset.rasterband(1)?.size();
        // GDAL reports an identity transform for rasters without georeferencing
        let geo_transform = dataset.geo_transform().unwrap_or(IDENTITY_TRANSFORM);
        let descriptor = RasterDescriptor::new(
            path,
            GridSize::new(x_size, y_size),
            geo_transform,
            dataset.projection(),
        );
        debug!("Opened raster {} ({})", path.display(), descriptor.grid);
        Ok(Box::new(GdalRaster {
            _dataset: dataset,
            descriptor,
        }))
    }

    fn open_vector(
        &self,
        path: &Path,
        access: Access,
    ) -> Result<Box<dyn VectorHandle + '_>, BackendError> {
        let options = DatasetOptions {
            open_flags: open_flags(access),
            ..Default::default()
        };
        let dataset = Dataset::open_ex(path, options)?;
        debug!(
            "Opened vector container {} ({} layer(s), {access:?})",
            path.display(),
            dataset.layer_count()
        );
        Ok(Box::new(GdalVector {
            dataset,
            path: path.to_path_buf(),
        }))
    }
}

struct GdalRaster {
    _dataset: Dataset,
    descriptor: RasterDescriptor,
}

impl RasterHandle for GdalRaster {
    fn descriptor(&self) -> &RasterDescriptor {
        &self.descriptor
    }
}

struct GdalVector {
    dataset: Dataset,
    path: std::path::PathBuf,
}

impl VectorHandle for GdalVector {
    fn layer_names(&self) -> Vec<String> {
        self.dataset.layers().map(|layer| layer.name()).collect()
    }

    fn layer(&self, name: &str) -> Option<VectorLayerDescriptor> {
        let layer = self.dataset.layers().find(|layer| layer.name() == name)?;
        let fields = layer
            .defn()
            .fields()
            .map(|field| FieldDescriptor::new(field.name(), field_type_from_ogr(field.field_type())))
            .collect();
        Some(VectorLayerDescriptor {
            container: self.path.clone(),
            name: layer.name(),
            fields,
        })
    }

    fn create_integer_field(&mut self, layer: &str, field: &str) -> Result<(), BackendError> {
        let target = self.dataset.layer_by_name(layer)?;
        target.create_defn_fields(&[(field, OGRFieldType::OFTInteger)])?;
        debug!("Created integer field {field} on layer {layer}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_type_mapping() {
        assert_eq!(
            field_type_from_ogr(OGRFieldType::OFTInteger),
            FieldType::Integer
        );
        assert_eq!(
            field_type_from_ogr(OGRFieldType::OFTInteger64),
            FieldType::Integer64
        );
        assert_eq!(field_type_from_ogr(OGRFieldType::OFTReal), FieldType::Real);
        assert!(matches!(
            field_type_from_ogr(OGRFieldType::OFTBinary),
            FieldType::Other(_)
        ));
    }

    #[test]
    fn test_open_missing_raster_fails() {
        let backend = GdalBackend::new();
        assert!(
            backend
                .open_raster(Path::new("/nonexistent/aoh/dem.tif"))
                .is_err()
        );
    }

    #[test]
    fn test_open_flags() {
        assert!(open_flags(Access::Update).contains(GdalOpenFlags::GDAL_OF_UPDATE));
        assert!(!open_flags(Access::ReadOnly).contains(GdalOpenFlags::GDAL_OF_UPDATE));
    }
}

//! In-memory dataset backend.
//!
//! Rasters and vector containers are registered by path up front. A shared
//! [`HandleLedger`] counts how many handles were opened and released and keeps
//! the order of open attempts, which makes the acquire/release discipline of
//! a run observable.
//!
//! # Examples
//!
//! ```
//! use aoh_core::memory::{MemoryBackend, MemoryContainer};
//! use aoh_core::datasets::{Access, DatasetBackend};
//! use aoh_core::types::GridSize;
//!
//! let backend = MemoryBackend::new()
//!     .with_raster("dem.tif", GridSize::new(100, 100))
//!     .with_container(MemoryContainer::new("habitat.gdb").with_layer("zones", vec![]));
//!
//! {
//!     let container = backend
//!         .open_vector("habitat.gdb".as_ref(), Access::ReadOnly)
//!         .unwrap();
//!     assert_eq!(container.layer_names(), vec!["zones".to_string()]);
//! }
//! assert!(backend.ledger().is_balanced());
//! ```

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::datasets::{Access, DatasetBackend, RasterHandle, VectorHandle};
use crate::error::BackendError;
use crate::types::{
    FieldDescriptor, FieldType, GridSize, IDENTITY_TRANSFORM, RasterDescriptor,
    VectorLayerDescriptor,
};

/// Counts handle acquisition and release.
#[derive(Debug, Default)]
pub struct HandleLedger {
    opened: Cell<usize>,
    released: Cell<usize>,
    attempts: RefCell<Vec<PathBuf>>,
}

impl HandleLedger {
    /// Number of handles successfully opened.
    #[must_use]
    pub fn opened(&self) -> usize {
        self.opened.get()
    }

    /// Number of handles released.
    #[must_use]
    pub fn released(&self) -> usize {
        self.released.get()
    }

    /// Handles currently alive.
    #[must_use]
    pub fn open_handles(&self) -> usize {
        self.opened() - self.released()
    }

    /// `true` when every opened handle has been released.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.opened() == self.released()
    }

    /// Every path an open was attempted on, in order, including failures.
    #[must_use]
    pub fn attempts(&self) -> Vec<PathBuf> {
        self.attempts.borrow().clone()
    }

    /// `true` if an open was attempted on `path`.
    #[must_use]
    pub fn was_attempted(&self, path: impl AsRef<Path>) -> bool {
        self.attempts.borrow().iter().any(|p| p == path.as_ref())
    }

    fn record_attempt(&self, path: &Path) {
        self.attempts.borrow_mut().push(path.to_path_buf());
    }

    fn acquire(&self) {
        self.opened.set(self.opened.get() + 1);
    }

    fn release(&self) {
        self.released.set(self.released.get() + 1);
    }
}

/// A layer held by a [`MemoryContainer`].
#[derive(Debug, Clone)]
pub struct MemoryLayer {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
}

/// A vector container held by a [`MemoryBackend`].
#[derive(Debug, Clone)]
pub struct MemoryContainer {
    pub path: PathBuf,
    pub layers: Vec<MemoryLayer>,
    /// Refuse to open for update
    pub read_only: bool,
    /// Make every field creation fail
    pub fail_field_creation: bool,
}

impl MemoryContainer {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            layers: Vec::new(),
            read_only: false,
            fail_field_creation: false,
        }
    }

    #[must_use]
    pub fn with_layer(mut self, name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        self.layers.push(MemoryLayer {
            name: name.into(),
            fields,
        });
        self
    }

    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    #[must_use]
    pub fn failing_field_creation(mut self) -> Self {
        self.fail_field_creation = true;
        self
    }

    fn describe(&self, name: &str) -> Option<VectorLayerDescriptor> {
        self.layers
            .iter()
            .find(|l| l.name == name)
            .map(|l| VectorLayerDescriptor {
                container: self.path.clone(),
                name: l.name.clone(),
                fields: l.fields.clone(),
            })
    }
}

/// Dataset backend backed by plain Rust values.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    rasters: HashMap<PathBuf, RasterDescriptor>,
    containers: HashMap<PathBuf, RefCell<MemoryContainer>>,
    ledger: HandleLedger,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a raster with the given grid and an identity geotransform.
    #[must_use]
    pub fn with_raster(self, path: impl Into<PathBuf>, grid: GridSize) -> Self {
        let path = path.into();
        let descriptor = RasterDescriptor::new(path, grid, IDENTITY_TRANSFORM, "");
        self.with_raster_descriptor(descriptor)
    }

    /// Registers a raster under `descriptor.path`.
    #[must_use]
    pub fn with_raster_descriptor(mut self, descriptor: RasterDescriptor) -> Self {
        self.rasters.insert(descriptor.path.clone(), descriptor);
        self
    }

    /// Registers a vector container under `container.path`.
    #[must_use]
    pub fn with_container(mut self, container: MemoryContainer) -> Self {
        self.containers
            .insert(container.path.clone(), RefCell::new(container));
        self
    }

    #[must_use]
    pub fn ledger(&self) -> &HandleLedger {
        &self.ledger
    }

    /// Current state of a layer, read without going through a handle.
    #[must_use]
    pub fn layer(&self, container: impl AsRef<Path>, layer: &str) -> Option<VectorLayerDescriptor> {
        self.containers
            .get(container.as_ref())
            .and_then(|c| c.borrow().describe(layer))
    }
}

impl DatasetBackend for MemoryBackend {
    fn open_raster(&self, path: &Path) -> Result<Box<dyn RasterHandle + '_>, BackendError> {
        self.ledger.record_attempt(path);
        let Some(descriptor) = self.rasters.get(path) else {
            if self.containers.contains_key(path) {
                return Err(BackendError::WrongKind {
                    path: path.to_path_buf(),
                    expected: "raster",
                });
            }
            return Err(BackendError::NotFound {
                path: path.to_path_buf(),
            });
        };
        self.ledger.acquire();
        Ok(Box::new(MemoryRaster {
            descriptor: descriptor.clone(),
            ledger: &self.ledger,
        }))
    }

    fn open_vector(
        &self,
        path: &Path,
        access: Access,
    ) -> Result<Box<dyn VectorHandle + '_>, BackendError> {
        self.ledger.record_attempt(path);
        let Some(container) = self.containers.get(path) else {
            if self.rasters.contains_key(path) {
                return Err(BackendError::WrongKind {
                    path: path.to_path_buf(),
                    expected: "vector",
                });
            }
            return Err(BackendError::NotFound {
                path: path.to_path_buf(),
            });
        };
        if access == Access::Update && container.borrow().read_only {
            return Err(BackendError::Rejected {
                message: format!("'{}' cannot be opened for update", path.display()),
            });
        }
        self.ledger.acquire();
        Ok(Box::new(MemoryVector {
            path: path.to_path_buf(),
            access,
            container,
            ledger: &self.ledger,
        }))
    }
}

struct MemoryRaster<'a> {
    descriptor: RasterDescriptor,
    ledger: &'a HandleLedger,
}

impl RasterHandle for MemoryRaster<'_> {
    fn descriptor(&self) -> &RasterDescriptor {
        &self.descriptor
    }
}

impl Drop for MemoryRaster<'_> {
    fn drop(&mut self) {
        self.ledger.release();
    }
}

struct MemoryVector<'a> {
    path: PathBuf,
    access: Access,
    container: &'a RefCell<MemoryContainer>,
    ledger: &'a HandleLedger,
}

impl VectorHandle for MemoryVector<'_> {
    fn layer_names(&self) -> Vec<String> {
        self.container
            .borrow()
            .layers
            .iter()
            .map(|l| l.name.clone())
            .collect()
    }

    fn layer(&self, name: &str) -> Option<VectorLayerDescriptor> {
        self.container.borrow().describe(name)
    }

    fn create_integer_field(&mut self, layer: &str, field: &str) -> Result<(), BackendError> {
        if self.access != Access::Update {
            return Err(BackendError::ReadOnly {
                path: self.path.clone(),
            });
        }
        let mut container = self.container.borrow_mut();
        if container.fail_field_creation {
            return Err(BackendError::Rejected {
                message: format!("failed to add field {field}"),
            });
        }
        let target = container
            .layers
            .iter_mut()
            .find(|l| l.name == layer)
            .ok_or_else(|| BackendError::LayerNotFound {
                layer: layer.to_string(),
            })?;
        if target.fields.iter().any(|f| f.name.eq_ignore_ascii_case(field)) {
            return Err(BackendError::Rejected {
                message: format!("field {field} already exists"),
            });
        }
        target
            .fields
            .push(FieldDescriptor::new(field, FieldType::Integer));
        Ok(())
    }
}

impl Drop for MemoryVector<'_> {
    fn drop(&mut self) {
        self.ledger.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> MemoryBackend {
        MemoryBackend::new()
            .with_raster("dem.tif", GridSize::new(10, 10))
            .with_container(MemoryContainer::new("habitat.gdb").with_layer(
                "zones",
                vec![FieldDescriptor::new("h1", FieldType::Real)],
            ))
            .with_container(MemoryContainer::new("locked.gdb").read_only())
    }

    #[test]
    fn test_handles_are_counted() {
        let backend = backend();
        {
            let _dem = backend.open_raster(Path::new("dem.tif")).unwrap();
            let _gdb = backend
                .open_vector(Path::new("habitat.gdb"), Access::ReadOnly)
                .unwrap();
            assert_eq!(backend.ledger().open_handles(), 2);
        }
        assert_eq!(backend.ledger().opened(), 2);
        assert!(backend.ledger().is_balanced());
    }

    #[test]
    fn test_failed_open_is_recorded_but_not_counted() {
        let backend = backend();
        let result = backend.open_raster(Path::new("missing.tif"));
        assert!(matches!(result, Err(BackendError::NotFound { .. })));
        assert!(backend.ledger().was_attempted("missing.tif"));
        assert_eq!(backend.ledger().opened(), 0);
    }

    #[test]
    fn test_wrong_kind() {
        let backend = backend();
        assert!(matches!(
            backend.open_raster(Path::new("habitat.gdb")),
            Err(BackendError::WrongKind { expected: "raster", .. })
        ));
        assert!(matches!(
            backend.open_vector(Path::new("dem.tif"), Access::ReadOnly),
            Err(BackendError::WrongKind { expected: "vector", .. })
        ));
    }

    #[test]
    fn test_read_only_container_refuses_update() {
        let backend = backend();
        assert!(
            backend
                .open_vector(Path::new("locked.gdb"), Access::Update)
                .is_err()
        );
        assert!(
            backend
                .open_vector(Path::new("locked.gdb"), Access::ReadOnly)
                .is_ok()
        );
    }

    #[test]
    fn test_create_field_requires_update_access() {
        let backend = backend();
        let mut gdb = backend
            .open_vector(Path::new("habitat.gdb"), Access::ReadOnly)
            .unwrap();
        assert!(matches!(
            gdb.create_integer_field("zones", "aoh"),
            Err(BackendError::ReadOnly { .. })
        ));
    }

    #[test]
    fn test_create_field_persists() {
        let backend = backend();
        {
            let mut gdb = backend
                .open_vector(Path::new("habitat.gdb"), Access::Update)
                .unwrap();
            gdb.create_integer_field("zones", "aoh").unwrap();
            assert!(gdb.create_integer_field("zones", "aoh").is_err());
            assert!(gdb.create_integer_field("zones", "AOH").is_err());
            assert!(matches!(
                gdb.create_integer_field("nope", "aoh"),
                Err(BackendError::LayerNotFound { .. })
            ));
        }
        let layer = backend.layer("habitat.gdb", "zones").unwrap();
        assert_eq!(
            layer.field("aoh").map(|f| &f.field_type),
            Some(&FieldType::Integer)
        );
    }
}

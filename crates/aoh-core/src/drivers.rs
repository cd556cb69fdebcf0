//! Registry of the dataset formats the tool accepts.
//!
//! Each driver names a GDAL format, the kind of dataset it holds and whether
//! the tool can open it and add fields to it. Raster inputs are filtered the
//! same way a file dialog would, by GeoTIFF extension.
//!
//! # Examples
//!
//! ```
//! use aoh_core::drivers::{find_driver, raster_filter_matches};
//!
//! let gdb = find_driver("openfilegdb").expect("OpenFileGDB driver should exist");
//! assert!(gdb.capabilities.create_field.is_supported());
//!
//! assert!(raster_filter_matches("dem.TIF"));
//! assert!(!raster_filter_matches("dem.img"));
//! ```

use std::path::Path;

/// Support status for a specific driver operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportStatus {
    /// The operation is implemented and tested.
    Supported,
    /// The operation is not supported by the driver.
    NotSupported,
    /// GDAL can do it, but the tool does not rely on it yet.
    Planned,
}

impl SupportStatus {
    /// Returns `true` if the operation is fully supported.
    ///
    /// # Examples
    ///
    /// ```
    /// use aoh_core::drivers::SupportStatus;
    ///
    /// assert!(SupportStatus::Supported.is_supported());
    /// assert!(!SupportStatus::Planned.is_supported());
    /// ```
    #[must_use]
    pub fn is_supported(&self) -> bool {
        matches!(self, SupportStatus::Supported)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            SupportStatus::Supported => "Supported",
            SupportStatus::NotSupported => "Not Supported",
            SupportStatus::Planned => "Planned",
        }
    }
}

/// What a driver stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetKind {
    /// DEM and classification inputs
    Raster,
    /// Habitat containers
    Vector,
}

impl DatasetKind {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            DatasetKind::Raster => "Raster",
            DatasetKind::Vector => "Vector",
        }
    }
}

/// Operations the tool performs through a driver.
#[derive(Debug, Clone, Copy)]
pub struct DriverCapabilities {
    /// Opening and describing datasets.
    pub open: SupportStatus,
    /// Adding an integer attribute field to a layer.
    pub create_field: SupportStatus,
}

/// Dataset format driver definition.
#[derive(Debug, Clone)]
pub struct Driver {
    /// GDAL short name (e.g. `"GTiff"`).
    pub short_name: &'static str,
    /// Long descriptive name for display purposes.
    pub long_name: &'static str,
    pub kind: DatasetKind,
    /// Lower-case file or directory extensions, without the dot.
    pub extensions: &'static [&'static str],
    pub capabilities: DriverCapabilities,
}

impl Driver {
    #[must_use]
    pub const fn new(
        short_name: &'static str,
        long_name: &'static str,
        kind: DatasetKind,
        extensions: &'static [&'static str],
        open: SupportStatus,
        create_field: SupportStatus,
    ) -> Self {
        Self {
            short_name,
            long_name,
            kind,
            extensions,
            capabilities: DriverCapabilities { open, create_field },
        }
    }

    /// Returns `true` if `path` carries one of this driver's extensions.
    #[must_use]
    pub fn matches_path(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.extensions
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(ext))
            })
    }
}

/// Returns every driver in the registry.
#[must_use]
pub fn get_drivers() -> Vec<Driver> {
    use DatasetKind::{Raster, Vector};
    use SupportStatus::{NotSupported, Planned, Supported};

    vec![
        Driver::new(
            "GTiff",
            "GeoTIFF",
            Raster,
            &["tif", "tiff"],
            Supported,
            NotSupported,
        ),
        Driver::new(
            "COG",
            "Cloud optimized GeoTIFF",
            Raster,
            &["tif", "tiff"],
            Supported,
            NotSupported,
        ),
        Driver::new(
            "HFA",
            "Erdas Imagine Images (.img)",
            Raster,
            &["img"],
            Planned,
            NotSupported,
        ),
        Driver::new(
            "OpenFileGDB",
            "ESRI FileGDB",
            Vector,
            &["gdb"],
            Supported,
            Supported,
        ),
        Driver::new(
            "FileGDB",
            "ESRI FileGDB (SDK)",
            Vector,
            &["gdb"],
            Supported,
            Supported,
        ),
        Driver::new("GPKG", "GeoPackage", Vector, &["gpkg"], Planned, Planned),
        Driver::new(
            "ESRI Shapefile",
            "ESRI Shapefile",
            Vector,
            &["shp"],
            Planned,
            Planned,
        ),
    ]
}

/// Returns drivers whose open operation is fully supported.
#[must_use]
pub fn get_available_drivers() -> Vec<Driver> {
    get_drivers()
        .into_iter()
        .filter(|d| d.capabilities.open.is_supported())
        .collect()
}

/// Finds a driver by its short name (case-insensitive).
#[must_use]
pub fn find_driver(name: &str) -> Option<Driver> {
    get_drivers()
        .into_iter()
        .find(|d| d.short_name.eq_ignore_ascii_case(name))
}

/// First supported driver of `kind` recognising the extension of `path`.
#[must_use]
pub fn driver_for_path(path: impl AsRef<Path>, kind: DatasetKind) -> Option<Driver> {
    let path = path.as_ref();
    get_available_drivers()
        .into_iter()
        .find(|d| d.kind == kind && d.matches_path(path))
}

/// The raster file filter: `GeoTiff(*.tif *.tiff)`, case-insensitive.
#[must_use]
pub fn raster_filter_matches(path: impl AsRef<Path>) -> bool {
    find_driver("GTiff").is_some_and(|d| d.matches_path(path.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_driver_case_insensitive() {
        let driver = find_driver("gtiff");
        assert!(driver.is_some());
        assert_eq!(driver.unwrap().short_name, "GTiff");
        assert!(find_driver("NetCDF").is_none());
    }

    #[test]
    fn test_available_drivers() {
        let drivers = get_available_drivers();
        assert_eq!(drivers.len(), 4);
        assert!(drivers.iter().all(|d| d.capabilities.open.is_supported()));
    }

    #[test]
    fn test_raster_filter() {
        assert!(raster_filter_matches("/data/dem.tif"));
        assert!(raster_filter_matches("/data/class.TIFF"));
        assert!(!raster_filter_matches("/data/dem"));
        assert!(!raster_filter_matches("/data/dem.tif.aux.xml"));
    }

    #[test]
    fn test_driver_for_path() {
        let gdb = driver_for_path("/data/habitat.gdb", DatasetKind::Vector).unwrap();
        assert_eq!(gdb.short_name, "OpenFileGDB");
        assert!(driver_for_path("/data/habitat.gdb", DatasetKind::Raster).is_none());
        // GeoPackage support is only planned
        assert!(driver_for_path("/data/habitat.gpkg", DatasetKind::Vector).is_none());
    }

    #[test]
    fn test_support_status() {
        assert!(SupportStatus::Supported.is_supported());
        assert!(!SupportStatus::NotSupported.is_supported());
        assert_eq!(SupportStatus::NotSupported.as_str(), "Not Supported");
    }
}

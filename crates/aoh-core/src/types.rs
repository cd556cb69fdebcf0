//! Data types for AOH dataset validation.
//!
//! This module defines the descriptors built from opened datasets, the
//! destination field choice and the request/outcome pair of a pipeline run.

use std::fmt;
use std::path::{Path, PathBuf};

/// Pixel grid dimensions of a raster (band 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSize {
    /// Number of pixel columns.
    pub x_size: usize,
    /// Number of pixel rows.
    pub y_size: usize,
}

impl GridSize {
    #[must_use]
    pub const fn new(x_size: usize, y_size: usize) -> Self {
        Self { x_size, y_size }
    }
}

impl fmt::Display for GridSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.x_size, self.y_size)
    }
}

/// Affine coefficients mapping pixel/line to georeferenced coordinates.
///
/// Same layout as GDAL: `[origin_x, pixel_w, rot_x, origin_y, rot_y, pixel_h]`.
pub type GeoTransform = [f64; 6];

/// Transform used when a raster carries no georeferencing.
pub const IDENTITY_TRANSFORM: GeoTransform = [0.0, 1.0, 0.0, 0.0, 0.0, 1.0];

/// Geographic bounds of a raster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Extent {
    /// Computes the extent covered by `grid` under `transform`.
    #[must_use]
    pub fn from_transform(transform: &GeoTransform, grid: GridSize) -> Self {
        #[allow(clippy::cast_precision_loss)]
        let (cols, rows) = (grid.x_size as f64, grid.y_size as f64);
        Self {
            x_min: transform[0],
            x_max: transform[0] + transform[1] * cols,
            y_min: transform[3] + transform[5] * rows,
            y_max: transform[3],
        }
    }

    /// Returns `true` if the X bounds differ by at most `x_tolerance` and the
    /// Y bounds by at most `y_tolerance`.
    #[must_use]
    pub fn approx_eq(&self, other: &Extent, x_tolerance: f64, y_tolerance: f64) -> bool {
        (self.x_min - other.x_min).abs() <= x_tolerance
            && (self.x_max - other.x_max).abs() <= x_tolerance
            && (self.y_min - other.y_min).abs() <= y_tolerance
            && (self.y_max - other.y_max).abs() <= y_tolerance
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}] x [{}, {}]",
            self.x_min, self.x_max, self.y_min, self.y_max
        )
    }
}

/// Read-only description of an opened raster.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterDescriptor {
    /// Path the raster was opened from
    pub path: PathBuf,
    /// Grid size of band 1
    pub grid: GridSize,
    /// Affine geotransform
    pub geo_transform: GeoTransform,
    /// Projection reference (WKT), empty when unknown
    pub projection: String,
}

impl RasterDescriptor {
    #[must_use]
    pub fn new(
        path: impl Into<PathBuf>,
        grid: GridSize,
        geo_transform: GeoTransform,
        projection: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            grid,
            geo_transform,
            projection: projection.into(),
        }
    }

    /// Pixel width.
    #[must_use]
    pub fn pixel_size_x(&self) -> f64 {
        self.geo_transform[1]
    }

    /// Pixel height (negative for north-up rasters).
    #[must_use]
    pub fn pixel_size_y(&self) -> f64 {
        self.geo_transform[5]
    }

    #[must_use]
    pub fn extent(&self) -> Extent {
        Extent::from_transform(&self.geo_transform, self.grid)
    }
}

/// Attribute field types as reported by the vector backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// 32-bit integer; the only type able to store an AOH value.
    Integer,
    Integer64,
    Real,
    String,
    Date,
    DateTime,
    /// Any other backend type, kept by name for display.
    Other(String),
}

impl FieldType {
    #[must_use]
    pub fn is_integer(&self) -> bool {
        matches!(self, FieldType::Integer)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            FieldType::Integer => "Integer",
            FieldType::Integer64 => "Integer64",
            FieldType::Real => "Real",
            FieldType::String => "String",
            FieldType::Date => "Date",
            FieldType::DateTime => "DateTime",
            FieldType::Other(name) => name,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Information about an attribute field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Field name
    pub name: String,
    /// Field type
    pub field_type: FieldType,
}

impl FieldDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

/// Description of one layer inside a vector container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorLayerDescriptor {
    /// Path of the container (e.g. a `.gdb` directory)
    pub container: PathBuf,
    /// Layer name
    pub name: String,
    /// Attribute fields in layer order
    pub fields: Vec<FieldDescriptor>,
}

impl VectorLayerDescriptor {
    /// Exact, case-sensitive lookup by field name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Field lookup the way OGR resolves field indices (ASCII case-insensitive).
    #[must_use]
    pub fn has_field_ignore_case(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name.eq_ignore_ascii_case(name))
    }

    /// Names of fields able to hold an AOH value, in layer order.
    #[must_use]
    pub fn integer_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.field_type.is_integer())
            .map(|f| f.name.as_str())
            .collect()
    }
}

/// Where the AOH value of each feature will be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestinationField {
    /// Reuse an integer field already on the layer; `None` picks the first one.
    Existing(Option<String>),
    /// Create a new integer field with this name.
    New(String),
}

/// How strictly the DEM and classification rasters must agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GridPolicy {
    /// Only row and column counts are compared.
    #[default]
    DimensionsOnly,
    /// Row/column counts, extent and projection are compared.
    Strict,
}

/// Fully-populated input of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationRequest {
    pub dem: PathBuf,
    pub classification: PathBuf,
    pub habitat: PathBuf,
    /// Layer inside the habitat container; `None` picks the first layer.
    pub layer: Option<String>,
    pub destination: DestinationField,
    pub grid_policy: GridPolicy,
}

impl ValidationRequest {
    #[must_use]
    pub fn new(
        dem: impl AsRef<Path>,
        classification: impl AsRef<Path>,
        habitat: impl AsRef<Path>,
        layer: Option<String>,
        destination: DestinationField,
    ) -> Self {
        Self {
            dem: dem.as_ref().to_path_buf(),
            classification: classification.as_ref().to_path_buf(),
            habitat: habitat.as_ref().to_path_buf(),
            layer,
            destination,
            grid_policy: GridPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_grid_policy(mut self, grid_policy: GridPolicy) -> Self {
        self.grid_policy = grid_policy;
        self
    }
}

/// Successful outcome of a pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct Provisioned {
    pub dem: RasterDescriptor,
    pub classification: RasterDescriptor,
    /// Layer as it stands after provisioning
    pub layer: VectorLayerDescriptor,
    /// Name of the field that will receive AOH values
    pub field: String,
    /// Whether the field was created by this run
    pub created: bool,
}

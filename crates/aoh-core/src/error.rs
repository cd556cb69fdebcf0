//! Error types for AOH dataset validation.
//!
//! Every pipeline failure is terminal for the run and maps to exactly one
//! [`AohError`] variant. Failures reported by a dataset backend are carried as
//! a [`BackendError`] source so the underlying cause is not lost.

use std::path::PathBuf;
use thiserror::Error;

use crate::types::GridSize;

/// The three paths a run needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Dem,
    Classification,
    Habitat,
}

impl InputKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            InputKind::Dem => "DEM raster",
            InputKind::Classification => "class raster",
            InputKind::Habitat => "habitat vector",
        }
    }
}

/// Errors reported by a dataset backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// No dataset exists at the path
    #[error("No dataset found at '{path}'")]
    NotFound {
        /// The requested path
        path: PathBuf,
    },

    /// The dataset exists but is not of the requested kind
    #[error("'{path}' is not a {expected} dataset")]
    WrongKind {
        /// The requested path
        path: PathBuf,
        /// "raster" or "vector"
        expected: &'static str,
    },

    /// The layer is not part of the container
    #[error("Layer '{layer}' not found")]
    LayerNotFound {
        /// The requested layer name
        layer: String,
    },

    /// A write was attempted on a handle opened read-only
    #[error("Dataset '{path}' is not open for update")]
    ReadOnly {
        /// The container path
        path: PathBuf,
    },

    /// The backend refused the operation
    #[error("{message}")]
    Rejected {
        /// Backend description of the problem
        message: String,
    },

    /// The crate was built without a usable backend
    #[error("GDAL support is not available; rebuild with the `gdal` feature")]
    Unavailable,

    /// Error raised by the GDAL library
    #[cfg(feature = "gdal")]
    #[error(transparent)]
    Gdal(#[from] gdal::errors::GdalError),
}

/// Main error type of a validation and provisioning run.
#[derive(Debug, Error)]
pub enum AohError {
    /// One of the required paths is empty
    #[error("Please choose a {}", .0.as_str())]
    MissingInput(InputKind),

    /// The DEM raster could not be opened
    #[error("Open DEM failed: '{path}': {source}")]
    DemOpen {
        path: PathBuf,
        #[source]
        source: BackendError,
    },

    /// The classification raster could not be opened
    #[error("Open class raster failed: '{path}': {source}")]
    ClassOpen {
        path: PathBuf,
        #[source]
        source: BackendError,
    },

    /// Row/column counts of the two rasters differ
    #[error("The size of class raster ({classification}) must match the DEM ({dem})")]
    GridMismatch {
        dem: GridSize,
        classification: GridSize,
    },

    /// Strict policy only: geographic extents differ
    #[error("The extent of class raster ({classification}) must match the DEM ({dem})")]
    ExtentMismatch {
        dem: String,
        classification: String,
    },

    /// Strict policy only: projection references differ
    #[error("The projection of class raster must match the DEM")]
    ProjectionMismatch,

    /// The habitat container could not be opened for update
    #[error("Open habitat vector failed: '{path}': {source}")]
    HabitatOpen {
        path: PathBuf,
        #[source]
        source: BackendError,
    },

    /// The named layer does not exist in the container
    #[error("The habitat vector has no layer named {0}")]
    LayerNotFound(String),

    /// No layer was named and the container has none to default to
    #[error("The habitat vector does not contain any layer")]
    NoLayers,

    /// A required schema field is absent from the layer
    #[error("The layer must contain a field named {0}")]
    SchemaFieldMissing(String),

    /// Reuse was chosen but the layer has no integer field
    #[error("There is no existing field that can store aoh")]
    NoEligibleField,

    /// Reuse was chosen with a field that is not an integer field of the layer
    #[error("Field {0} is not an integer field of the layer")]
    IneligibleField(String),

    /// Creation was chosen with a blank name
    #[error("Please add a field name to store aoh")]
    EmptyFieldName,

    /// Creation was chosen with a name already on the layer
    #[error("Field {0} already exists")]
    FieldNameCollision(String),

    /// The backend failed to create the field
    #[error("Create field {field} failed: {source}")]
    FieldCreation {
        field: String,
        #[source]
        source: BackendError,
    },

    /// Another run holds the trigger
    #[error("A validation run is already in progress")]
    RunInProgress,
}

/// Type alias for Results using [`AohError`].
pub type Result<T> = std::result::Result<T, AohError>;

impl AohError {
    /// Dialog-style title grouping the error by category.
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            Self::MissingInput(_) => "Path error",
            Self::DemOpen { .. }
            | Self::ClassOpen { .. }
            | Self::HabitatOpen { .. }
            | Self::GridMismatch { .. }
            | Self::ExtentMismatch { .. }
            | Self::ProjectionMismatch => "File error",
            Self::LayerNotFound(_) | Self::NoLayers | Self::SchemaFieldMissing(_) => {
                "Data error"
            },
            Self::NoEligibleField
            | Self::IneligibleField(_)
            | Self::EmptyFieldName
            | Self::FieldNameCollision(_)
            | Self::FieldCreation { .. } => "Field error",
            Self::RunInProgress => "Busy",
        }
    }

    /// Short message suitable for showing to an end user.
    ///
    /// Unlike the `Display` output this omits paths and backend detail.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::DemOpen { .. } => "Open DEM failed".to_string(),
            Self::ClassOpen { .. } => "Open class raster failed".to_string(),
            Self::HabitatOpen { .. } => "Open habitat vector failed".to_string(),
            Self::GridMismatch { .. } => "The size of class raster must match the DEM".to_string(),
            Self::ExtentMismatch { .. } => {
                "The extent of class raster must match the DEM".to_string()
            },
            Self::FieldCreation { .. } => "Create field failed".to_string(),
            _ => self.to_string(),
        }
    }

    /// Get recovery suggestions if available.
    #[must_use]
    pub fn recovery_suggestion(&self) -> Option<String> {
        match self {
            Self::MissingInput(kind) => Some(format!("Provide a path to the {}.", kind.as_str())),
            Self::DemOpen { .. } | Self::ClassOpen { .. } => {
                Some("Check that the file exists and is a readable GeoTIFF.".to_string())
            },
            Self::HabitatOpen { .. } => Some(
                "Check that the path is a file geodatabase and that it is writable.".to_string(),
            ),
            Self::GridMismatch { .. } | Self::ExtentMismatch { .. } | Self::ProjectionMismatch => {
                Some("Resample the class raster onto the DEM grid.".to_string())
            },
            Self::LayerNotFound(_) | Self::NoLayers => {
                Some("Run 'aoh layers <HABITAT>' to list the available layers.".to_string())
            },
            Self::NoEligibleField | Self::IneligibleField(_) => {
                Some("Create a new field with --new-field instead.".to_string())
            },
            Self::FieldNameCollision(_) => Some(
                "Choose another name, or reuse the field with --field if it is an integer field."
                    .to_string(),
            ),
            _ => None,
        }
    }
}

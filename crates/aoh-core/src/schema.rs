//! Required attribute schema of a habitat layer.

use crate::types::VectorLayerDescriptor;

/// Fields every habitat layer must carry, in the order they are checked.
///
/// `altitude_low`/`altitude_upper` bound the altitude band of the feature and
/// `h1`..`h8` weight the eight land-cover classes.
pub const REQUIRED_FIELDS: [&str; 10] = [
    "altitude_low",
    "altitude_upper",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "h7",
    "h8",
];

/// Returns the first required field absent from `layer`, if any.
///
/// Matching is exact and case-sensitive; field types are not checked.
#[must_use]
pub fn first_missing_field(layer: &VectorLayerDescriptor) -> Option<&'static str> {
    REQUIRED_FIELDS
        .iter()
        .copied()
        .find(|name| !layer.has_field(name))
}

/// Returns every required field absent from `layer`, in check order.
#[must_use]
pub fn missing_fields(layer: &VectorLayerDescriptor) -> Vec<&'static str> {
    REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|name| !layer.has_field(name))
        .collect()
}

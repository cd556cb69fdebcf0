//! Display utilities for formatting CLI output.
//!
//! This module provides table row structures and formatting functions
//! for presenting layers, drivers and run results in a human-readable format.

use tabled::{Table, Tabled};

use aoh_core::drivers::Driver;
use aoh_core::schema::{self, REQUIRED_FIELDS};
use aoh_core::types::{Provisioned, VectorLayerDescriptor};

/// Table row representation for displaying field information.
#[derive(Tabled)]
pub struct FieldRow {
    /// Name of the field.
    #[tabled(rename = "Field")]
    pub name: String,
    /// Attribute type of the field.
    #[tabled(rename = "Type")]
    pub field_type: String,
    /// Whether the field belongs to the required habitat schema.
    #[tabled(rename = "Required")]
    pub required: String,
    /// Whether the field can store an AOH value.
    #[tabled(rename = "AOH Eligible")]
    pub eligible: String,
}

/// Table row representation for displaying driver information.
#[derive(Tabled)]
pub struct DriverRow {
    /// GDAL short name of the driver.
    #[tabled(rename = "Short Name")]
    pub short_name: String,
    /// Full descriptive name of the driver format.
    #[tabled(rename = "Long Name")]
    pub long_name: String,
    /// Raster or vector.
    #[tabled(rename = "Kind")]
    pub kind: String,
    /// Recognised extensions.
    #[tabled(rename = "Extensions")]
    pub extensions: String,
    /// Support status for opening datasets.
    #[tabled(rename = "Open")]
    pub open: String,
    /// Support status for adding an AOH field.
    #[tabled(rename = "Create Field")]
    pub create_field: String,
}

fn yes_no(value: bool) -> String {
    if value { "Yes" } else { "No" }.to_string()
}

/// Builds the field rows of a layer, in layer order.
#[must_use]
pub fn field_rows(layer: &VectorLayerDescriptor) -> Vec<FieldRow> {
    layer
        .fields
        .iter()
        .map(|f| FieldRow {
            name: f.name.clone(),
            field_type: f.field_type.to_string(),
            required: yes_no(REQUIRED_FIELDS.contains(&f.name.as_str())),
            eligible: yes_no(f.field_type.is_integer()),
        })
        .collect()
}

/// Builds the driver rows of the registry.
#[must_use]
pub fn driver_rows(drivers: &[Driver]) -> Vec<DriverRow> {
    drivers
        .iter()
        .map(|d| DriverRow {
            short_name: d.short_name.to_string(),
            long_name: d.long_name.to_string(),
            kind: d.kind.as_str().to_string(),
            extensions: d.extensions.join(", "),
            open: d.capabilities.open.as_str().to_string(),
            create_field: d.capabilities.create_field.as_str().to_string(),
        })
        .collect()
}

/// One-line verdict on the required habitat schema of a layer.
#[must_use]
pub fn schema_summary(layer: &VectorLayerDescriptor) -> String {
    let missing = schema::missing_fields(layer);
    if missing.is_empty() {
        "All required fields present".to_string()
    } else {
        format!("Missing required fields: {}", missing.join(", "))
    }
}

/// Display a layer's schema in a formatted table.
pub fn display_layer(layer: &VectorLayerDescriptor) {
    println!("\nLayer: {} ({})", layer.name, layer.container.display());

    if layer.fields.is_empty() {
        println!("(no attribute fields)");
    } else {
        let table = Table::new(field_rows(layer)).to_string();
        println!("{table}");
    }
    println!("{}", schema_summary(layer));
}

/// Display the drivers in a formatted table.
pub fn display_drivers(drivers: &[Driver]) {
    println!("\nSupported Drivers ({} total):\n", drivers.len());
    let table = Table::new(driver_rows(drivers)).to_string();
    println!("{table}");
}

/// Display a summary of the datasets a successful run validated.
pub fn display_provisioned(provisioned: &Provisioned) {
    println!("DEM:         {} ({})", provisioned.dem.path.display(), provisioned.dem.grid);
    println!(
        "Class:       {} ({})",
        provisioned.classification.path.display(),
        provisioned.classification.grid
    );
    println!(
        "Habitat:     {} / {}",
        provisioned.layer.container.display(),
        provisioned.layer.name
    );
    println!(
        "AOH field:   {}{}",
        provisioned.field,
        if provisioned.created { " (created)" } else { "" }
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use aoh_core::drivers::get_drivers;
    use aoh_core::types::{FieldDescriptor, FieldType};
    use std::path::PathBuf;

    fn layer() -> VectorLayerDescriptor {
        VectorLayerDescriptor {
            container: PathBuf::from("habitat.gdb"),
            name: "zones".to_string(),
            fields: vec![
                FieldDescriptor::new("altitude_low", FieldType::Real),
                FieldDescriptor::new("aoh", FieldType::Integer),
                FieldDescriptor::new("big", FieldType::Integer64),
            ],
        }
    }

    #[test]
    fn test_field_rows() {
        let rows = field_rows(&layer());
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].required, "Yes");
        assert_eq!(rows[0].eligible, "No");
        assert_eq!(rows[1].field_type, "Integer");
        assert_eq!(rows[1].eligible, "Yes");
        assert_eq!(rows[2].eligible, "No");
    }

    #[test]
    fn test_schema_summary_lists_every_missing_field() {
        assert_eq!(
            schema_summary(&layer()),
            "Missing required fields: altitude_upper, h1, h2, h3, h4, h5, h6, h7, h8"
        );
        let complete = VectorLayerDescriptor {
            fields: REQUIRED_FIELDS
                .iter()
                .map(|name| FieldDescriptor::new(*name, FieldType::Real))
                .collect(),
            ..layer()
        };
        assert_eq!(schema_summary(&complete), "All required fields present");
    }

    #[test]
    fn test_driver_rows() {
        let rows = driver_rows(&get_drivers());
        let gtiff = rows.iter().find(|r| r.short_name == "GTiff").unwrap();
        assert_eq!(gtiff.kind, "Raster");
        assert_eq!(gtiff.extensions, "tif, tiff");
        assert_eq!(gtiff.create_field, "Not Supported");
    }

    #[test]
    fn test_display_layer_without_fields() {
        let empty = VectorLayerDescriptor {
            fields: vec![],
            ..layer()
        };
        // This test just ensures the function runs without panicking
        display_layer(&empty);
        display_layer(&layer());
    }
}

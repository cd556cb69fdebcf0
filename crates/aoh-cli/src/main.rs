//! Command-line interface for preparing Area of Habitat (AOH) runs.
//!
//! This binary is a thin adapter over [`aoh_core`]: it collects the DEM,
//! classification and habitat paths plus the destination field choice from the
//! command line, runs the validation pipeline and reports the outcome.
//!
//! # Architecture
//!
//! The CLI is built using [`clap`] for argument parsing and [`tracing`] for structured logging.
//! Library code logs through the `log` facade, which is bridged into `tracing`.
//!
//! # Available Commands
//!
//! - `validate` - Validate the inputs and provision the AOH field
//! - `layers` - List the layers of a habitat container
//! - `fields` - Show the fields of a habitat layer
//! - `drivers` - List the supported dataset formats

mod console;
mod display;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{Level, debug, info, warn};
use tracing_log::LogTracer;
use tracing_subscriber::FmtSubscriber;

use aoh_core::datasets::{DatasetBackend, default_backend};
use aoh_core::drivers::{self, DatasetKind};
use aoh_core::inspect;
use aoh_core::notify;
use aoh_core::trigger::Trigger;
use aoh_core::types::{DestinationField, GridPolicy, ValidationRequest};

use crate::console::ConsoleNotifier;

#[derive(Parser)]
#[command(
    name = "aoh",
    version,
    about = "Validate AOH inputs and prepare the AOH field",
    long_about = "Checks that a DEM, a land-cover classification raster and a habitat layer\n\
                  fit together, then reuses or creates the integer field that will store\n\
                  the Area of Habitat of each feature."
)]
/// Command-line arguments and options for the `aoh` CLI.
struct Cli {
    /// Enable verbose (INFO level) logging output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug (DEBUG level) logging output with detailed diagnostics.
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands for the `aoh` CLI.
#[derive(Subcommand)]
enum Commands {
    /// Validates the three datasets and provisions the AOH field.
    Validate(ValidateArgs),

    /// Lists the layers of a habitat container.
    Layers {
        /// Path to the habitat container (e.g. a `.gdb` directory).
        #[arg(value_name = "HABITAT")]
        habitat: PathBuf,
    },

    /// Shows the fields of a habitat layer and which can store AOH values.
    Fields {
        /// Path to the habitat container.
        #[arg(value_name = "HABITAT")]
        habitat: PathBuf,

        /// Layer to inspect; defaults to the first layer.
        #[arg(short, long, value_name = "LAYER")]
        layer: Option<String>,
    },

    /// Lists the supported dataset formats.
    Drivers,
}

#[derive(clap::Args, Debug, Default)]
struct ValidateArgs {
    /// DEM raster (GeoTIFF).
    #[arg(long, value_name = "RASTER")]
    dem: Option<PathBuf>,

    /// Land-cover classification raster (GeoTIFF).
    #[arg(long = "class", value_name = "RASTER")]
    classification: Option<PathBuf>,

    /// Habitat vector container.
    #[arg(long, value_name = "HABITAT")]
    habitat: Option<PathBuf>,

    /// Layer inside the habitat container; defaults to the first layer.
    #[arg(short, long, value_name = "LAYER")]
    layer: Option<String>,

    /// Reuse an existing integer field; without a name the first one is used.
    #[arg(long, value_name = "FIELD", num_args = 0..=1, conflicts_with = "new_field")]
    field: Option<Option<String>>,

    /// Create a new integer field with this name.
    #[arg(long, value_name = "FIELD")]
    new_field: Option<String>,

    /// Also require matching extent and projection between the rasters.
    #[arg(long)]
    strict_grid: bool,
}

/// Entry point for the `aoh` command-line interface.
///
/// # Errors
///
/// Returns an error if command execution fails or if the logging system cannot be initialized.
fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity flags
    let log_level = if cli.debug {
        Level::DEBUG
    } else if cli.verbose {
        Level::INFO
    } else {
        Level::WARN
    };

    // Bridge logs from the `log` crate to the `tracing` ecosystem.
    LogTracer::init()?;

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let backend = default_backend();
    match cli.command {
        Commands::Validate(args) => handle_validate(&*backend, &args)?,
        Commands::Layers { habitat } => handle_layers(&*backend, &habitat)?,
        Commands::Fields { habitat, layer } => {
            handle_fields(&*backend, &habitat, layer.as_deref())?;
        },
        Commands::Drivers => handle_drivers(),
    }

    Ok(())
}

/// Builds the request, inspecting the layer when no destination was given.
fn build_request(backend: &dyn DatasetBackend, args: &ValidateArgs) -> ValidationRequest {
    let dem = args.dem.clone().unwrap_or_default();
    let classification = args.classification.clone().unwrap_or_default();
    let habitat = args.habitat.clone().unwrap_or_default();

    let destination = match (&args.field, &args.new_field) {
        (_, Some(name)) => DestinationField::New(name.clone()),
        (Some(choice), None) => DestinationField::Existing(choice.clone()),
        (None, None) => default_destination(backend, &habitat, args.layer.as_deref()),
    };
    debug!("Destination: {destination:?}");

    let grid_policy = if args.strict_grid {
        GridPolicy::Strict
    } else {
        GridPolicy::DimensionsOnly
    };
    ValidationRequest::new(dem, classification, habitat, args.layer.clone(), destination)
        .with_grid_policy(grid_policy)
}

fn default_destination(
    backend: &dyn DatasetBackend,
    habitat: &Path,
    layer: Option<&str>,
) -> DestinationField {
    if habitat.as_os_str().is_empty() {
        return DestinationField::Existing(None);
    }
    match inspect::integer_fields(backend, habitat, layer) {
        Ok(fields) => inspect::default_destination(&fields),
        // The pipeline reports the real problem in its own order
        Err(e) => {
            debug!("Could not inspect {}: {e}", habitat.display());
            DestinationField::Existing(None)
        },
    }
}

fn warn_on_unexpected_formats(request: &ValidationRequest) {
    for raster in [&request.dem, &request.classification] {
        if !raster.as_os_str().is_empty() && !drivers::raster_filter_matches(raster) {
            warn!("{} does not look like a GeoTIFF", raster.display());
        }
    }
    if !request.habitat.as_os_str().is_empty()
        && drivers::driver_for_path(&request.habitat, DatasetKind::Vector).is_none()
    {
        warn!("{} does not look like a file geodatabase", request.habitat.display());
    }
}

fn handle_validate(backend: &dyn DatasetBackend, args: &ValidateArgs) -> Result<()> {
    let request = build_request(backend, args);
    warn_on_unexpected_formats(&request);
    info!("Validating {request:?}");

    let trigger = Trigger::new();
    let outcome = trigger.run(backend, &request);
    notify::report(&ConsoleNotifier, &outcome);

    match outcome {
        Ok(provisioned) => {
            display::display_provisioned(&provisioned);
            Ok(())
        },
        Err(error) => {
            if let Some(hint) = error.recovery_suggestion() {
                eprintln!("Hint: {hint}");
            }
            Err(error.into())
        },
    }
}

fn handle_layers(backend: &dyn DatasetBackend, habitat: &Path) -> Result<()> {
    let layers = inspect::list_layers(backend, habitat)?;
    if layers.is_empty() {
        warn!("{} contains no layers", habitat.display());
    }
    for name in layers {
        println!("{name}");
    }
    Ok(())
}

fn handle_fields(backend: &dyn DatasetBackend, habitat: &Path, layer: Option<&str>) -> Result<()> {
    let layer = inspect::describe_layer(backend, habitat, layer)?;
    display::display_layer(&layer);
    Ok(())
}

fn handle_drivers() {
    display::display_drivers(&drivers::get_drivers());
}

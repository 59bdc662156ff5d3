//! gridmap - draw a gridded global dataset as a filled-contour world map
//!
//! This is the main entry point for the gridmap application.

use tracing::{error, info};

use gridmap::{init_tracing, pipeline, Config, Result};

fn main() -> Result<()> {
    // Load configuration
    let config = Config::load().map_err(|e| {
        init_tracing("info");
        error!("Configuration error: {}", e);
        e
    })?;

    init_tracing(&config.log_level);
    info!("Starting gridmap v{}", env!("CARGO_PKG_VERSION"));

    // Validate configuration
    config.validate().map_err(|e| {
        error!("Invalid configuration: {}", e);
        e
    })?;

    // Failures are logged by the pipeline itself
    let summary = pipeline::run(&config)?;

    info!(
        "Wrote {} ({} x {} grid, {} bands)",
        summary.output.display(),
        summary.grid_shape.0,
        summary.grid_shape.1,
        summary.map.palette.bands.len()
    );
    Ok(())
}

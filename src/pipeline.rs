//! End-to-end run: load the grid, render the map, decorate and save.

use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

use crate::config::Config;
use crate::data_loader::load_grid;
use crate::error::Result;
use crate::logging::{log_error, log_operation_end, log_operation_start, log_timed_operation};
use crate::map::{render, BaseMapStyle, LineLayer, MapHandle, MapRequest, RasterBackend, TextRenderer};

/// What a finished run produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub output: PathBuf,
    pub grid_shape: (usize, usize),
    pub map: MapHandle,
}

/// Load the configured grid and write the map figure
pub fn run(config: &Config) -> Result<RunSummary> {
    let start = Instant::now();
    log_operation_start("gridmap run", Some(&config.figure.output.display().to_string()));

    let result = run_inner(config);
    if let Err(e) = &result {
        log_error(e, "gridmap run");
    }
    log_operation_end("gridmap run", start, result.is_ok());
    result
}

fn run_inner(config: &Config) -> Result<RunSummary> {
    let input = config.input.file.clone().unwrap_or_default();
    let grid = load_grid(&input, config.separator()?)?;

    let base_map = BaseMapStyle {
        coastlines: config
            .map
            .coastlines
            .as_deref()
            .map(|path| LineLayer::load(path, "coastlines"))
            .transpose()?,
        borders: config
            .map
            .borders
            .as_deref()
            .map(|path| LineLayer::load(path, "borders"))
            .transpose()?,
        ..BaseMapStyle::default()
    };

    let request = MapRequest {
        projection: config.map.projection.clone(),
        center_lat: config.map.center_lat,
        center_lon: config.map.center_lon,
        ramp: config.color_ramp()?,
        colorbar_label: config.colors.colorbar_label.clone(),
        base_map,
    };

    let figure = config.figure_size();
    let mut backend = RasterBackend::new(figure)?;
    let text = match &config.figure.font {
        Some(path) => Some(TextRenderer::load(path, figure.dpi)?),
        None => TextRenderer::system(figure.dpi),
    };
    match text {
        Some(text) => backend = backend.with_font(text),
        None => warn!("No usable font found, title and colorbar labels are skipped"),
    }

    let map = log_timed_operation("render_map", || render(&mut backend, &grid, &request))?;
    backend.draw_title(&map.projection, &config.figure.title)?;
    if let Some(logo) = &config.figure.logo {
        backend.add_logo(&map.projection, logo, config.figure.logo_zoom)?;
    }
    backend.save(&config.figure.output)?;

    info!(
        input = %input.display(),
        output = %config.figure.output.display(),
        "Map written"
    );

    Ok(RunSummary {
        output: config.figure.output.clone(),
        grid_shape: grid.shape(),
        map,
    })
}

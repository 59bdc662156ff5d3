//! Integration tests for gridmap
//!
//! These tests run the whole pipeline from a grid file on disk to a PNG.

mod common;

use common::{assertions, image_utils, test_data};
use gridmap::colormaps::{Band, ExtendMode};
use gridmap::map::{MapProjection, PlotArea};
use gridmap::{pipeline, Config, GridMapError};
use image::{Rgba, RgbaImage};
use std::path::Path;

fn config_for(input: &Path, output: &Path) -> Config {
    let mut config = Config::default();
    config.input.file = Some(input.to_path_buf());
    config.figure.output = output.to_path_buf();
    config
}

#[test]
fn test_loader_reads_global_grid() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("grid.txt");
    test_data::create_global_grid(&input, 30.0).unwrap();

    let grid = gridmap::data_loader::load_grid(&input, ';').unwrap();
    assert_eq!(grid.shape(), (13, 7));
    assertions::assert_axis_eq(&grid.lat_values(), &test_data::axis(-90.0, 90.0, 30.0));
    assertions::assert_value_eq(grid.data[[6, 3]], 0.95);
    assert_eq!(grid.missing_count(), 0);
}

#[test]
fn test_render_global_grid_to_png() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("grid.txt");
    let output = dir.path().join("map.png");
    test_data::create_global_grid(&input, 10.0).unwrap();

    let config = config_for(&input, &output);
    config.validate().unwrap();
    let summary = pipeline::run(&config).unwrap();

    assert_eq!(summary.output, output);
    assert_eq!(summary.grid_shape, (37, 19));
    assert_eq!(summary.map.palette.bands.len(), 5);
    assert!(summary.map.palette.under.is_some());
    assert!(summary.map.stats.pixels > 0);

    let image = image_utils::load_rgba(&output).unwrap();
    assert_eq!(image.dimensions(), (1536, 864));

    // The map center sits on the equator, inside the top band
    let projection = MapProjection::from_name("moll", 0.0, 0.0).unwrap();
    let area = PlotArea::fit(image.dimensions(), projection.extent());
    let center = image_utils::pixel_at(
        &image,
        area.left + area.width / 2.0,
        area.top + area.height / 2.0,
    );
    let levels = config.colors.levels.clone();
    assert_eq!(levels.classify(0.95), Band::Inside(4));
    assert_eq!(center, summary.map.palette.bands[4]);
    assert!(summary.map.palette.all_colors().contains(&center));

    // Polar values are below the first level and use the under color
    let under = summary.map.palette.under.unwrap();
    assert!(image_utils::count_color(&image, under) > 0);
}

#[test]
fn test_render_with_decorations() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("grid.txt");
    let output = dir.path().join("decorated.png");
    let coastline = dir.path().join("coast.geojson");
    let logo = dir.path().join("logo.png");
    test_data::create_global_grid(&input, 15.0).unwrap();
    test_data::create_coastline(&coastline).unwrap();
    RgbaImage::from_pixel(200, 100, Rgba([255, 0, 255, 255]))
        .save(&logo)
        .unwrap();

    let mut config = config_for(&input, &output);
    config.map.projection = "robin".to_string();
    config.map.coastlines = Some(coastline);
    config.colors.extend = ExtendMode::Both;
    config.figure.logo = Some(logo);
    config.figure.logo_zoom = 0.5;
    config.figure.width_in = 8.0;
    config.figure.height_in = 4.5;
    config.validate().unwrap();

    let summary = pipeline::run(&config).unwrap();
    assert_eq!(summary.map.palette.bands.len(), 5);
    assert!(summary.map.palette.over.is_some());

    let image = image_utils::load_rgba(&output).unwrap();
    assert_eq!(image.dimensions(), (768, 432));
    assert!(image_utils::count_color(&image, [255, 0, 255, 255]) > 0);
}

#[test]
fn test_orthographic_render() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("grid.txt");
    let output = dir.path().join("ortho.png");
    test_data::create_global_grid(&input, 10.0).unwrap();

    let mut config = config_for(&input, &output);
    config.map.projection = "ortho".to_string();
    config.map.center_lat = 45.0;
    config.map.center_lon = -30.0;
    config.figure.dpi = 40.0;

    let summary = pipeline::run(&config).unwrap();
    assert!(summary.map.stats.skipped > 0);
    assert!(output.exists());
}

#[test]
fn test_incomplete_grid_fails() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("grid.txt");
    let output = dir.path().join("map.png");
    test_data::create_incomplete_grid(&input).unwrap();

    let err = pipeline::run(&config_for(&input, &output)).unwrap_err();
    assert!(
        matches!(
            err,
            GridMapError::IncompleteGrid {
                rows: 11,
                num_lon: 3,
                num_lat: 4
            }
        ),
        "unexpected error: {err}"
    );
    assert!(err.is_data_shape_error());
    assert!(!output.exists());
}

#[test]
fn test_lat_major_grid_fails() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("grid.txt");
    let output = dir.path().join("map.png");
    test_data::create_lat_major_grid(&input).unwrap();

    let err = pipeline::run(&config_for(&input, &output)).unwrap_err();
    assert!(matches!(err, GridMapError::GridOrdering { .. }), "unexpected error: {err}");
    assert!(!output.exists());
}

#[test]
fn test_missing_input_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(&dir.path().join("absent.txt"), &dir.path().join("map.png"));
    let err = pipeline::run(&config).unwrap_err();
    assert!(
        matches!(err, GridMapError::Io(ref e) if e.kind() == std::io::ErrorKind::NotFound),
        "unexpected error: {err}"
    );
}

#[test]
fn test_custom_separator() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("grid.csv");
    let output = dir.path().join("map.png");
    let lons = test_data::axis(-180.0, 180.0, 45.0);
    let lats = test_data::axis(-90.0, 90.0, 45.0);
    std::fs::write(&input, test_data::grid_text(&lons, &lats, ',', test_data::equator_peak)).unwrap();

    let mut config = config_for(&input, &output);
    config.input.separator = ",".to_string();
    config.figure.dpi = 30.0;

    let summary = pipeline::run(&config).unwrap();
    assert_eq!(summary.grid_shape, (9, 5));
}

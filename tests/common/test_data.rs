//! Test data generation utilities.
//!
//! This module writes delimited grid files with known values, in the
//! `index;lon;lat;de` layout the loader expects.

use std::fmt::Write as _;
use std::io;
use std::path::Path;

/// Longitudes or latitudes from `start` to `stop` inclusive
pub fn axis(start: f64, stop: f64, step: f64) -> Vec<f64> {
    let count = ((stop - start) / step).round() as usize + 1;
    (0..count).map(|i| start + i as f64 * step).collect()
}

/// A smooth field that peaks at the equator: 0.95 there, -0.05 at the poles
pub fn equator_peak(_lon: f64, lat: f64) -> f64 {
    0.45 + 0.5 * lat.to_radians().cos()
}

/// Render rows lon-major (all latitudes of the first longitude first)
pub fn grid_text(lons: &[f64], lats: &[f64], sep: char, value: impl Fn(f64, f64) -> f64) -> String {
    let mut text = format!("index{sep}lon{sep}lat{sep}de\n");
    let mut index = 0;
    for &lon in lons {
        for &lat in lats {
            let _ = writeln!(text, "{index}{sep}{lon}{sep}{lat}{sep}{}", value(lon, lat));
            index += 1;
        }
    }
    text
}

/// Render rows lat-major, which the loader must reject
pub fn lat_major_text(lons: &[f64], lats: &[f64], sep: char) -> String {
    let mut text = format!("index{sep}lon{sep}lat{sep}de\n");
    let mut index = 0;
    for &lat in lats {
        for &lon in lons {
            let _ = writeln!(text, "{index}{sep}{lon}{sep}{lat}{sep}1.0");
            index += 1;
        }
    }
    text
}

/// Write a global grid with the given spacing in degrees
pub fn create_global_grid(path: &Path, step: f64) -> io::Result<()> {
    let lons = axis(-180.0, 180.0, step);
    let lats = axis(-90.0, 90.0, step);
    std::fs::write(path, grid_text(&lons, &lats, ';', equator_peak))
}

/// Write a grid file with its last row removed
pub fn create_incomplete_grid(path: &Path) -> io::Result<()> {
    let text = grid_text(&[0.0, 10.0, 20.0], &[0.0, 10.0, 20.0, 30.0], ';', |_, _| 1.0);
    let mut lines: Vec<&str> = text.lines().collect();
    lines.pop();
    std::fs::write(path, lines.join("\n") + "\n")
}

/// Write a small lat-major grid file
pub fn create_lat_major_grid(path: &Path) -> io::Result<()> {
    std::fs::write(path, lat_major_text(&[0.0, 10.0, 20.0], &[0.0, 10.0, 20.0, 30.0], ';'))
}

/// Write a GeoJSON file with one coastline crossing the map center
pub fn create_coastline(path: &Path) -> io::Result<()> {
    let json = r#"{"type": "FeatureCollection", "features": [
        {"type": "Feature", "properties": {},
         "geometry": {"type": "LineString", "coordinates": [[-40, -20], [40, 20]]}}
    ]}"#;
    std::fs::write(path, json)
}

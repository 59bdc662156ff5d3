//! Grid file loading.
//!
//! This module reads a delimited text file of `index, lon, lat, de` rows,
//! infers the grid dimensions from the distinct coordinate values and
//! reshapes the columns into a [`Grid`]. The file must be presorted by
//! longitude, then latitude.

use ndarray::Array2;
use serde::Deserialize;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{GridMapError, Result};
use crate::grid::Grid;
use crate::logging::log_grid_load_stats;

/// Columns every grid file header must name
pub const REQUIRED_COLUMNS: [&str; 3] = ["lon", "lat", "de"];

/// One row of a grid file. The `index` column is not needed and is ignored
/// along with any other extra column.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct GridRecord {
    pub lon: f64,
    pub lat: f64,
    /// An empty field is a missing value
    pub de: Option<f64>,
}

/// Load a presorted grid file and validate its shape and ordering
pub fn load_grid(path: &Path, separator: char) -> Result<Grid> {
    if !path.exists() {
        return Err(GridMapError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("File not found: {}", path.display()),
        )));
    }

    let file = std::fs::File::open(path)?;
    info!("Opened grid file: {}", path.display());

    let records = read_records(file, separator)?;
    let grid = grid_from_records(&records)?;

    let (num_lon, num_lat) = grid.shape();
    log_grid_load_stats(
        &path.display().to_string(),
        records.len(),
        num_lon,
        num_lat,
        grid.value_range(),
        grid.missing_count(),
    );

    Ok(grid)
}

/// Parse all rows of a delimited grid file
pub fn read_records<R: Read>(reader: R, separator: char) -> Result<Vec<GridRecord>> {
    let delimiter = separator_byte(separator)?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?;
    if let Some(column) = REQUIRED_COLUMNS
        .iter()
        .find(|name| !headers.iter().any(|h| h == **name))
    {
        return Err(GridMapError::MissingColumn {
            column: column.to_string(),
        });
    }

    let mut records = Vec::new();
    for row in reader.deserialize::<GridRecord>() {
        records.push(row?);
    }

    debug!("Read {} grid rows", records.len());
    Ok(records)
}

/// Reshape parsed rows into a lon-major grid.
///
/// Grid dimensions come from the number of distinct longitudes and
/// latitudes. Element `[i][j]` of every array is row `i * num_lat + j`.
pub fn grid_from_records(records: &[GridRecord]) -> Result<Grid> {
    if records.is_empty() {
        return Err(GridMapError::EmptyGrid);
    }

    for (row, record) in records.iter().enumerate() {
        if !record.lon.is_finite() || !record.lat.is_finite() {
            return Err(GridMapError::InvalidCoordinates {
                message: format!(
                    "row {} has non-finite coordinates (lon {}, lat {})",
                    row + 1,
                    record.lon,
                    record.lat
                ),
            });
        }
    }

    let num_lon = count_distinct(records.iter().map(|r| r.lon));
    let num_lat = count_distinct(records.iter().map(|r| r.lat));

    if num_lon * num_lat != records.len() {
        return Err(GridMapError::IncompleteGrid {
            rows: records.len(),
            num_lon,
            num_lat,
        });
    }

    let shape = (num_lon, num_lat);
    let lon = reshape(records.iter().map(|r| r.lon).collect(), shape)?;
    let lat = reshape(records.iter().map(|r| r.lat).collect(), shape)?;
    let data = reshape(
        records.iter().map(|r| r.de.unwrap_or(f64::NAN)).collect(),
        shape,
    )?;

    let grid = Grid::new(lon, lat, data)?;
    grid.validate_ordering()?;

    debug!(num_lon, num_lat, "Reshaped grid rows");
    Ok(grid)
}

/// Number of distinct values, compared bit for bit with `-0.0 == 0.0`
fn count_distinct(values: impl Iterator<Item = f64>) -> usize {
    values
        .map(|v| if v == 0.0 { 0.0f64.to_bits() } else { v.to_bits() })
        .collect::<HashSet<u64>>()
        .len()
}

fn reshape(values: Vec<f64>, shape: (usize, usize)) -> Result<Array2<f64>> {
    Array2::from_shape_vec(shape, values).map_err(|e| GridMapError::InvalidParameter {
        param: "grid".to_string(),
        message: format!("Failed to reshape columns to {:?}: {}", shape, e),
    })
}

fn separator_byte(separator: char) -> Result<u8> {
    if separator.is_ascii() && separator != '"' && separator != '\n' && separator != '\r' {
        Ok(separator as u8)
    } else {
        Err(GridMapError::invalid_parameter(
            "separator",
            format!("Unsupported field separator: {:?}", separator),
        ))
    }
}

//! Error types for gridmap.
//!
//! A single error enum covers loading, validation, configuration and
//! rendering failures. The two grid shape checks get their own variants so
//! callers can tell a malformed grid apart from an I/O or parse problem.

use thiserror::Error;

/// Which coordinate column broke the lon-major ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridAxis {
    /// Longitude must be constant along each row of the reshaped grid
    Lon,
    /// Latitude must be constant down each column of the reshaped grid
    Lat,
}

impl std::fmt::Display for GridAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GridAxis::Lon => write!(f, "lon"),
            GridAxis::Lat => write!(f, "lat"),
        }
    }
}

/// The main error type for gridmap operations.
#[derive(Error, Debug)]
pub enum GridMapError {
    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Delimited file parse errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Row count does not describe a complete rectangular grid
    #[error(
        "Incomplete grid: {rows} rows cannot form a {num_lon} x {num_lat} lon/lat grid ({expected} expected)",
        expected = .num_lon * .num_lat
    )]
    IncompleteGrid {
        rows: usize,
        num_lon: usize,
        num_lat: usize,
    },

    /// Rows were not sorted by longitude first, then latitude
    #[error(
        "Grid ordering error: {axis} at [{}][{}] is {found}, expected {expected} (file must be sorted by lon, then lat)",
        .position.0,
        .position.1
    )]
    GridOrdering {
        axis: GridAxis,
        position: (usize, usize),
        expected: f64,
        found: f64,
    },

    /// The header lacks a required column
    #[error("Grid file header has no `{column}` column")]
    MissingColumn { column: String },

    /// The file had a header but no rows
    #[error("Grid file contains no data rows")]
    EmptyGrid,

    /// Invalid coordinate errors
    #[error("Invalid coordinates: {message}")]
    InvalidCoordinates { message: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Invalid parameter errors
    #[error("Invalid parameter: {param} - {message}")]
    InvalidParameter { param: String, message: String },

    /// Image generation errors
    #[error("Image generation error: {message}")]
    ImageGeneration { message: String },

    /// Image decoding/encoding errors
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GridMapError {
    /// True for the errors that mean the grid file does not describe a
    /// complete, lon-major rectangular grid.
    pub fn is_data_shape_error(&self) -> bool {
        matches!(
            self,
            GridMapError::IncompleteGrid { .. }
                | GridMapError::GridOrdering { .. }
                | GridMapError::EmptyGrid
                | GridMapError::MissingColumn { .. }
        )
    }

    pub(crate) fn invalid_parameter(param: &str, message: impl Into<String>) -> Self {
        GridMapError::InvalidParameter {
            param: param.to_string(),
            message: message.into(),
        }
    }
}

/// Convenience type alias for Results with GridMapError
pub type Result<T> = std::result::Result<T, GridMapError>;

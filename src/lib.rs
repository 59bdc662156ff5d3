//! # gridmap
//!
//! Load a gridded global dataset from a delimited text file and draw it as a
//! filled-contour world map.
//!
//! ## Key Features
//!
//! - **Strict grid loading**: a file of `lon`/`lat`/`de` rows is reshaped into
//!   `(num_lon, num_lat)` arrays, and incomplete or mis-ordered grids are rejected
//! - **Two-color ramps**: band colors are interpolated in HSL space, with
//!   optional under/over colors for out-of-range values
//! - **World projections**: cylindrical, Mollweide, Hammer, sinusoidal,
//!   Robinson and orthographic
//! - **PNG figures**: filled contours, base map linework, a colorbar, title and logo
//!
//! ## Architecture
//!
//! - **Data Layer**: [`data_loader`] reads and validates the grid
//! - **Color Layer**: [`colormaps`] turns a ramp and levels into a discrete colormap
//! - **Map Layer**: [`map`] projects, triangulates and draws through a [`map::MapBackend`]
//! - **Pipeline**: [`pipeline::run`] ties it together from a [`Config`]

pub mod colormaps;
pub mod config;
pub mod data_loader;
pub mod error;
pub mod grid;
pub mod logging;
pub mod map;
pub mod pipeline;

pub use config::Config;
pub use error::{GridMapError, Result};
pub use grid::Grid;
pub use logging::{
    init_tracing, log_error, log_grid_load_stats, log_operation_end, log_operation_start,
    log_timed_operation,
};

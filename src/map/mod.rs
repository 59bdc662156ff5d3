//! World map rendering.
//!
//! Projections, contour triangulation, base map linework and the raster
//! backend that turns a [`Grid`](crate::grid::Grid) into a PNG figure.

pub mod backend;
pub mod coastline;
pub mod contour;
pub mod projection;
pub mod raster;
pub mod render;
pub mod text;

pub use backend::{BaseMapStyle, Colorbar, ContourStats, MapBackend, ProjectedGrid};
pub use coastline::LineLayer;
pub use projection::{MapProjection, ProjectionKind};
pub use raster::{FigureSize, PlotArea, RasterBackend};
pub use render::{render, MapHandle, MapRequest};
pub use text::TextRenderer;

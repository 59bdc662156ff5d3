//! The rendering seam between map logic and a drawing engine.
//!
//! [`render`](crate::map::render::render) only talks to a [`MapBackend`];
//! the raster backend in [`raster`](crate::map::raster) is the default
//! implementation and tests use a recording one.

use ndarray::Array2;

use crate::colormaps::{BandPalette, LevelSet, Rgba};
use crate::error::Result;
use crate::map::coastline::LineLayer;
use crate::map::projection::MapProjection;

/// Grid coordinates together with their planar projection.
///
/// `x` and `y` are meters from the lower-left corner of the map; points the
/// projection hides are `NaN`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedGrid {
    pub lon: Array2<f64>,
    pub lat: Array2<f64>,
    pub x: Array2<f64>,
    pub y: Array2<f64>,
}

impl ProjectedGrid {
    pub fn dim(&self) -> (usize, usize) {
        self.x.dim()
    }

    /// Number of points the projection could place
    pub fn visible_count(&self) -> usize {
        self.x.iter().filter(|v| v.is_finite()).count()
    }
}

/// Linework drawn over the filled bands
#[derive(Debug, Clone, PartialEq)]
pub struct BaseMapStyle {
    pub coastlines: Option<LineLayer>,
    pub borders: Option<LineLayer>,
    /// Stroke weight in points
    pub line_width: f64,
    pub line_color: Rgba,
}

impl Default for BaseMapStyle {
    fn default() -> Self {
        Self {
            coastlines: None,
            borders: None,
            line_width: 0.5,
            line_color: [0, 0, 0, 255],
        }
    }
}

/// Everything a backend needs to draw the colorbar
#[derive(Debug, Clone, PartialEq)]
pub struct Colorbar {
    pub levels: LevelSet,
    pub palette: BandPalette,
    pub label: String,
    /// Label font size in points
    pub label_size: f64,
}

/// Counters reported by `draw_filled_contours`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContourStats {
    pub triangles: usize,
    pub skipped: usize,
    pub pixels: usize,
}

/// A map drawing engine
pub trait MapBackend {
    /// Project grid coordinates. The default delegates to the projection.
    fn project_points(
        &self,
        projection: &MapProjection,
        lon: &Array2<f64>,
        lat: &Array2<f64>,
    ) -> Result<ProjectedGrid> {
        let (x, y) = projection.project_arrays(lon, lat)?;
        Ok(ProjectedGrid {
            lon: lon.clone(),
            lat: lat.clone(),
            x,
            y,
        })
    }

    /// Fill the bands between `levels` with the palette colors
    fn draw_filled_contours(
        &mut self,
        projection: &MapProjection,
        points: &ProjectedGrid,
        data: &Array2<f64>,
        levels: &LevelSet,
        palette: &BandPalette,
    ) -> Result<ContourStats>;

    /// Draw the map boundary, coastlines and borders
    fn draw_base_map(&mut self, projection: &MapProjection, style: &BaseMapStyle) -> Result<()>;

    /// Draw the colorbar beside the map
    fn draw_colorbar(&mut self, projection: &MapProjection, colorbar: &Colorbar) -> Result<()>;
}

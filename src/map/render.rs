//! Grid-to-map rendering.
//!
//! [`render`] resolves the projection, builds the discrete colormap from
//! the request's color ramp and drives a [`MapBackend`] through the filled
//! contours, the base map and the colorbar, in that order.

use tracing::{info, warn};

use crate::colormaps::{BandPalette, ColorRamp, ListedColormap};
use crate::error::Result;
use crate::grid::Grid;
use crate::map::backend::{BaseMapStyle, Colorbar, ContourStats, MapBackend};
use crate::map::projection::MapProjection;

/// Colorbar label size in points
pub const COLORBAR_LABEL_SIZE: f64 = 16.0;

/// What to draw and how
#[derive(Debug, Clone)]
pub struct MapRequest {
    /// Projection short name, e.g. `moll`
    pub projection: String,
    pub center_lat: f64,
    pub center_lon: f64,
    pub ramp: ColorRamp,
    pub colorbar_label: String,
    pub base_map: BaseMapStyle,
}

/// The result of a render, kept for later figure decorations
#[derive(Debug, Clone)]
pub struct MapHandle {
    pub projection: MapProjection,
    pub colormap: ListedColormap,
    pub palette: BandPalette,
    pub stats: ContourStats,
}

/// Draw `grid` as a filled-contour world map on `backend`
pub fn render<B: MapBackend>(backend: &mut B, grid: &Grid, request: &MapRequest) -> Result<MapHandle> {
    let projection =
        MapProjection::from_name(&request.projection, request.center_lat, request.center_lon)?;

    let points = backend.project_points(&projection, &grid.lon, &grid.lat)?;
    let colormap = request.ramp.build_colormap();
    let palette = colormap.band_palette(&request.ramp.levels);

    let stats = backend.draw_filled_contours(
        &projection,
        &points,
        &grid.data,
        &request.ramp.levels,
        &palette,
    )?;

    if request.base_map.coastlines.is_none() && request.base_map.borders.is_none() {
        warn!("No coastline or border data configured, drawing the map boundary only");
    }
    backend.draw_base_map(&projection, &request.base_map)?;

    backend.draw_colorbar(
        &projection,
        &Colorbar {
            levels: request.ramp.levels.clone(),
            palette: palette.clone(),
            label: request.colorbar_label.clone(),
            label_size: COLORBAR_LABEL_SIZE,
        },
    )?;

    info!(
        projection = projection.kind.name(),
        center_lat = projection.center_lat,
        center_lon = projection.center_lon,
        visible_points = points.visible_count(),
        triangles = stats.triangles,
        skipped = stats.skipped,
        bands = palette.bands.len(),
        extend = %request.ramp.extend,
        "Rendered filled contour map"
    );

    Ok(MapHandle {
        projection,
        colormap,
        palette,
        stats,
    })
}

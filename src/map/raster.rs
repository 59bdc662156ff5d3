//! Raster map backend.
//!
//! Draws the map into an in-memory RGBA image: filled contour triangles,
//! base map linework, the colorbar, an optional title and logo. The image
//! is written out as PNG.

use image::{imageops, ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_line_segment_mut, draw_polygon_mut};
use imageproc::point::Point;
use imageproc::rect::Rect;
use ndarray::Array2;
use std::path::Path;
use tracing::{debug, info};

use crate::colormaps::{BandPalette, LevelSet, Rgba as Color};
use crate::error::{GridMapError, Result};
use crate::map::backend::{BaseMapStyle, Colorbar, ContourStats, MapBackend, ProjectedGrid};
use crate::map::coastline::Polyline;
use crate::map::contour::{triangulate, Triangle};
use crate::map::projection::MapProjection;
use crate::map::text::{Anchor, TextRenderer};

/// Subplot box as fractions of the figure
const SUBPLOT_LEFT: f64 = 0.125;
const SUBPLOT_RIGHT: f64 = 0.9;
const SUBPLOT_BOTTOM: f64 = 0.11;
const SUBPLOT_TOP: f64 = 0.88;

/// Colorbar width and gap, as fractions of the map width
const COLORBAR_SIZE: f64 = 0.05;
const COLORBAR_PAD: f64 = 0.02;

/// Sizes in points
const TICK_LENGTH: f64 = 3.5;
const TICK_LABEL_SIZE: f64 = 10.0;
const TITLE_SIZE: f64 = 24.0;

/// Largest accepted figure side in pixels
const MAX_FIGURE_PIXELS: f64 = 20_000.0;

const BACKGROUND: Color = [255, 255, 255, 255];
const FOREGROUND: Color = [0, 0, 0, 255];

/// Figure size in inches and its resolution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FigureSize {
    pub width_in: f64,
    pub height_in: f64,
    pub dpi: f64,
}

impl Default for FigureSize {
    fn default() -> Self {
        Self {
            width_in: 16.0,
            height_in: 9.0,
            dpi: 96.0,
        }
    }
}

impl FigureSize {
    /// Pixel dimensions of the figure
    pub fn pixels(&self) -> Result<(u32, u32)> {
        let width = (self.width_in * self.dpi).round();
        let height = (self.height_in * self.dpi).round();
        let usable = |side: f64| (1.0..=MAX_FIGURE_PIXELS).contains(&side);
        if !usable(width) || !usable(height) {
            return Err(GridMapError::ImageGeneration {
                message: format!(
                    "Figure of {}x{} in at {} dpi gives an unusable {}x{} px image",
                    self.width_in, self.height_in, self.dpi, width, height
                ),
            });
        }
        Ok((width as u32, height as u32))
    }

    pub fn points_to_pixels(&self, points: f64) -> f64 {
        points * self.dpi / 72.0
    }
}

/// Where the map sits in the figure, in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotArea {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PlotArea {
    /// Fit a map of the given planar extent into the subplot box, keeping
    /// its aspect ratio and leaving room for the colorbar on the right.
    pub fn fit(figure: (u32, u32), extent: (f64, f64)) -> Self {
        let (fig_w, fig_h) = (figure.0 as f64, figure.1 as f64);
        let avail_w = (SUBPLOT_RIGHT - SUBPLOT_LEFT) * fig_w;
        let avail_h = (SUBPLOT_TOP - SUBPLOT_BOTTOM) * fig_h;
        let aspect = extent.0 / extent.1;
        let span = 1.0 + COLORBAR_SIZE + COLORBAR_PAD;

        let width = (avail_w / span).min(avail_h * aspect);
        let height = width / aspect;
        Self {
            left: SUBPLOT_LEFT * fig_w + (avail_w - width * span) / 2.0,
            top: (1.0 - SUBPLOT_TOP) * fig_h + (avail_h - height) / 2.0,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Planar map coordinates to pixel coordinates (y grows downward)
    pub fn to_pixel(&self, extent: (f64, f64), (x, y): (f64, f64)) -> (f64, f64) {
        (
            self.left + x / extent.0 * self.width,
            self.top + (1.0 - y / extent.1) * self.height,
        )
    }
}

/// Geometry of the colorbar: interior boxes plus extension triangles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorbarLayout {
    pub left: f64,
    pub width: f64,
    pub top: f64,
    pub height: f64,
    pub bands: usize,
    pub under: bool,
    pub over: bool,
}

impl ColorbarLayout {
    pub fn new(area: &PlotArea, bands: usize, under: bool, over: bool) -> Self {
        Self {
            left: area.right() + COLORBAR_PAD * area.width,
            width: COLORBAR_SIZE * area.width,
            top: area.top,
            height: area.height,
            bands,
            under,
            over,
        }
    }

    /// Length of one interior box. Each extension triangle is as long as one box.
    pub fn box_length(&self) -> f64 {
        let slots = self.bands + usize::from(self.under) + usize::from(self.over);
        self.height / slots.max(1) as f64
    }

    pub fn interior_top(&self) -> f64 {
        self.top + if self.over { self.box_length() } else { 0.0 }
    }

    pub fn interior_bottom(&self) -> f64 {
        self.top + self.height - if self.under { self.box_length() } else { 0.0 }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Vertical position of level `k`, counted from the bottom
    pub fn level_y(&self, k: usize) -> f64 {
        self.interior_bottom() - k as f64 * self.box_length()
    }

    /// Outline of the whole bar, clockwise from the top left
    pub fn outline(&self) -> Vec<(f64, f64)> {
        let center = self.left + self.width / 2.0;
        let mut points = vec![(self.left, self.interior_top())];
        if self.over {
            points.push((center, self.top));
        }
        points.push((self.right(), self.interior_top()));
        points.push((self.right(), self.interior_bottom()));
        if self.under {
            points.push((center, self.top + self.height));
        }
        points.push((self.left, self.interior_bottom()));
        points
    }
}

/// The default backend, drawing into an RGBA image
#[derive(Debug)]
pub struct RasterBackend {
    canvas: RgbaImage,
    figure: FigureSize,
    text: Option<TextRenderer>,
}

impl RasterBackend {
    /// Create a blank white figure
    pub fn new(figure: FigureSize) -> Result<Self> {
        let (width, height) = figure.pixels()?;
        debug!(width, height, dpi = figure.dpi, "Created figure canvas");
        Ok(Self {
            canvas: RgbaImage::from_pixel(width, height, Rgba(BACKGROUND)),
            figure,
            text: None,
        })
    }

    /// Enable text drawing
    pub fn with_font(mut self, text: TextRenderer) -> Self {
        self.text = Some(text);
        self
    }

    pub fn has_text(&self) -> bool {
        self.text.is_some()
    }

    pub fn figure(&self) -> FigureSize {
        self.figure
    }

    pub fn image(&self) -> &RgbaImage {
        &self.canvas
    }

    pub fn into_image(self) -> RgbaImage {
        self.canvas
    }

    pub fn plot_area(&self, projection: &MapProjection) -> PlotArea {
        PlotArea::fit(self.canvas.dimensions(), projection.extent())
    }

    /// Draw the title centered above the map, followed by one blank line
    pub fn draw_title(&mut self, projection: &MapProjection, title: &str) -> Result<()> {
        let area = self.plot_area(projection);
        let Some(text) = &self.text else {
            debug!("No font loaded, title skipped");
            return Ok(());
        };
        let line = self.figure.points_to_pixels(TITLE_SIZE);
        let top = (area.top - 2.0 * line - self.figure.points_to_pixels(6.0)).max(0.0);
        text.draw(
            &mut self.canvas,
            title,
            (area.left + area.width / 2.0) as i32,
            top as i32,
            TITLE_SIZE,
            Anchor::Center,
        );
        Ok(())
    }

    /// Overlay a PNG logo scaled by `zoom`, its lower-left corner on the
    /// map's lower-left corner
    pub fn add_logo(&mut self, projection: &MapProjection, path: &Path, zoom: f64) -> Result<()> {
        if zoom.is_nan() || zoom <= 0.0 {
            return Err(GridMapError::invalid_parameter(
                "logo_zoom",
                format!("Logo zoom must be positive, got {}", zoom),
            ));
        }
        let logo = image::open(path)?.to_rgba8();
        let width = ((logo.width() as f64 * zoom).round() as u32).max(1);
        let height = ((logo.height() as f64 * zoom).round() as u32).max(1);
        let scaled = imageops::resize(&logo, width, height, imageops::FilterType::Triangle);

        let area = self.plot_area(projection);
        let x = area.left.round() as i64;
        let y = (area.bottom() - height as f64).round() as i64;
        imageops::overlay(&mut self.canvas, &scaled, x, y);

        info!(path = %path.display(), width, height, "Added logo");
        Ok(())
    }

    /// Write the figure as PNG
    pub fn save(&self, path: &Path) -> Result<()> {
        self.canvas.save_with_format(path, ImageFormat::Png)?;
        info!(
            path = %path.display(),
            width = self.canvas.width(),
            height = self.canvas.height(),
            "Saved figure"
        );
        Ok(())
    }

    fn stroke(&mut self, points: &[(f64, f64)], closed: bool, width_pt: f64, color: Color) {
        if points.len() < 2 {
            return;
        }
        let thickness = self.figure.points_to_pixels(width_pt).round().max(1.0) as i32;
        let segments = points.windows(2).map(|w| (w[0], w[1]));
        let closing = closed.then_some((points[points.len() - 1], points[0]));

        for (a, b) in segments.chain(closing) {
            for offset in 0..thickness {
                let d = (offset - thickness / 2) as f32;
                draw_line_segment_mut(
                    &mut self.canvas,
                    (a.0 as f32 + d, a.1 as f32 + d),
                    (b.0 as f32 + d, b.1 as f32 + d),
                    Rgba(color),
                );
            }
        }
    }

    fn fill_triangle(
        &mut self,
        triangle: &Triangle,
        levels: &LevelSet,
        palette: &BandPalette,
    ) -> usize {
        let (w, h) = self.canvas.dimensions();
        let (x0, y0, x1, y1) = triangle.bounds();
        let (Some(xs), Some(ys)) = (pixel_span(x0, x1, w), pixel_span(y0, y1, h)) else {
            return 0;
        };

        let mut filled = 0;
        for py in ys.0..=ys.1 {
            for px in xs.0..=xs.1 {
                let Some(value) = triangle.value_at((px as f64 + 0.5, py as f64 + 0.5)) else {
                    continue;
                };
                if let Some(color) = palette.color_for(levels.classify(value)) {
                    self.canvas.put_pixel(px, py, Rgba(color));
                    filled += 1;
                }
            }
        }
        filled
    }
}

/// Pixel index range covering `[lo, hi]`, clipped to `0..limit`
fn pixel_span(lo: f64, hi: f64, limit: u32) -> Option<(u32, u32)> {
    if limit == 0 || !lo.is_finite() || !hi.is_finite() || hi < 0.0 || lo >= limit as f64 {
        return None;
    }
    let first = lo.floor().max(0.0) as u32;
    let last = (hi.ceil() as u32).min(limit - 1);
    Some((first, last))
}

/// Project a lon/lat polyline, breaking it at hidden points and where it
/// jumps across the map seam
pub fn project_polyline(projection: &MapProjection, line: &Polyline) -> Vec<Vec<(f64, f64)>> {
    let half_width = projection.half_extent().0;
    let mut pieces = Vec::new();
    let mut current: Vec<(f64, f64)> = Vec::new();

    for &(lon, lat) in line {
        match projection.project(lon, lat) {
            Some(p) => {
                if let Some(&last) = current.last() {
                    if (p.0 - last.0).abs() > half_width {
                        pieces.push(std::mem::take(&mut current));
                    }
                }
                current.push(p);
            }
            None => pieces.push(std::mem::take(&mut current)),
        }
    }
    pieces.push(current);
    pieces.retain(|piece| piece.len() >= 2);
    pieces
}

impl MapBackend for RasterBackend {
    fn draw_filled_contours(
        &mut self,
        projection: &MapProjection,
        points: &ProjectedGrid,
        data: &Array2<f64>,
        levels: &LevelSet,
        palette: &BandPalette,
    ) -> Result<ContourStats> {
        let area = self.plot_area(projection);
        let extent = projection.extent();
        let triangulation = triangulate(projection, points, data)?;

        let mut pixels = 0;
        for triangle in &triangulation.triangles {
            let on_canvas = Triangle {
                points: triangle.points.map(|p| area.to_pixel(extent, p)),
                values: triangle.values,
            };
            pixels += self.fill_triangle(&on_canvas, levels, palette);
        }

        Ok(ContourStats {
            triangles: triangulation.triangles.len(),
            skipped: triangulation.skipped,
            pixels,
        })
    }

    fn draw_base_map(&mut self, projection: &MapProjection, style: &BaseMapStyle) -> Result<()> {
        let area = self.plot_area(projection);
        let extent = projection.extent();

        for layer in [&style.coastlines, &style.borders].into_iter().flatten() {
            let mut segments = 0;
            for line in &layer.lines {
                for piece in project_polyline(projection, line) {
                    let pixels: Vec<(f64, f64)> =
                        piece.iter().map(|&p| area.to_pixel(extent, p)).collect();
                    self.stroke(&pixels, false, style.line_width, style.line_color);
                    segments += 1;
                }
            }
            debug!(layer = %layer.name, segments, "Drew base map layer");
        }

        let boundary: Vec<(f64, f64)> = projection
            .boundary(360)
            .into_iter()
            .map(|p| area.to_pixel(extent, p))
            .collect();
        self.stroke(&boundary, true, style.line_width, style.line_color);
        Ok(())
    }

    fn draw_colorbar(&mut self, projection: &MapProjection, colorbar: &Colorbar) -> Result<()> {
        let area = self.plot_area(projection);
        let palette = &colorbar.palette;
        let layout = ColorbarLayout::new(
            &area,
            palette.bands.len(),
            palette.under.is_some(),
            palette.over.is_some(),
        );
        let bar_width = layout.width.round().max(1.0) as u32;

        for (k, &color) in palette.bands.iter().enumerate() {
            let top = layout.level_y(k + 1).round();
            let bottom = layout.level_y(k).round();
            let height = (bottom - top).max(1.0) as u32;
            let rect = Rect::at(layout.left.round() as i32, top as i32).of_size(bar_width, height);
            draw_filled_rect_mut(&mut self.canvas, rect, Rgba(color));
        }

        let center = layout.left + layout.width / 2.0;
        let extensions = [
            (palette.under, layout.interior_bottom(), layout.top + layout.height),
            (palette.over, layout.interior_top(), layout.top),
        ];
        for (color, base, apex) in extensions {
            let Some(color) = color else { continue };
            let triangle = [
                Point::new(layout.left.round() as i32, base.round() as i32),
                Point::new(layout.right().round() as i32, base.round() as i32),
                Point::new(center.round() as i32, apex.round() as i32),
            ];
            if triangle[0] != triangle[2] {
                draw_polygon_mut(&mut self.canvas, &triangle, Rgba(color));
            }
        }

        self.stroke(&layout.outline(), true, 0.8, FOREGROUND);

        let tick = self.figure.points_to_pixels(TICK_LENGTH);
        let ticks: Vec<(f64, f64)> = (0..colorbar.levels.len())
            .map(|k| (layout.right(), layout.level_y(k)))
            .collect();
        for &(x, y) in &ticks {
            self.stroke(&[(x, y), (x + tick, y)], false, 0.8, FOREGROUND);
        }

        let Some(text) = &self.text else {
            debug!("No font loaded, colorbar labels skipped");
            return Ok(());
        };

        let label_x = layout.right() + tick + self.figure.points_to_pixels(3.5);
        let mut widest = 0u32;
        for (&level, &(_, y)) in colorbar.levels.values().iter().zip(ticks.iter()) {
            let label = colorbar.levels.format_level(level);
            let (w, h) = text.measure(&label, TICK_LABEL_SIZE);
            widest = widest.max(w);
            text.draw(
                &mut self.canvas,
                &label,
                label_x as i32,
                (y - h as f64 / 2.0) as i32,
                TICK_LABEL_SIZE,
                Anchor::Left,
            );
        }

        let title_x = label_x + widest as f64 + self.figure.points_to_pixels(4.0);
        text.draw_vertical(
            &mut self.canvas,
            &colorbar.label,
            title_x as i32,
            (layout.top + layout.height / 2.0) as i32,
            colorbar.label_size,
        );
        Ok(())
    }
}

//! Image inspection utilities for testing.

use image::{ImageError, RgbaImage};
use std::path::Path;

/// Load a PNG written by the renderer
pub fn load_rgba(path: &Path) -> Result<RgbaImage, ImageError> {
    Ok(image::open(path)?.to_rgba8())
}

/// Color of the pixel nearest to `(x, y)`
pub fn pixel_at(image: &RgbaImage, x: f64, y: f64) -> [u8; 4] {
    image.get_pixel(x as u32, y as u32).0
}

/// Number of pixels with exactly this color
pub fn count_color(image: &RgbaImage, color: [u8; 4]) -> usize {
    image.pixels().filter(|p| p.0 == color).count()
}

//! Text drawing with a TrueType font.

use image::{imageops, Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use rusttype::{Font, Scale};
use std::path::Path;
use tracing::debug;

use crate::colormaps::Rgba as Color;
use crate::error::{GridMapError, Result};

/// Horizontal anchor of a text box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Left,
    Center,
}

pub struct TextRenderer {
    font: Font<'static>,
    dpi: f64,
    color: Color,
}

impl std::fmt::Debug for TextRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextRenderer")
            .field("dpi", &self.dpi)
            .field("color", &self.color)
            .finish()
    }
}

impl TextRenderer {
    /// Load a TTF/OTF font file
    pub fn load(path: &Path, dpi: f64) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let font = Font::try_from_vec(bytes).ok_or_else(|| GridMapError::InvalidParameter {
            param: "font".to_string(),
            message: format!("{} is not a usable TrueType font", path.display()),
        })?;
        debug!(path = %path.display(), "Loaded font");
        Ok(Self::from_font(font, dpi))
    }

    /// Find an installed sans-serif font. `None` when the system has none
    /// that rusttype can read.
    pub fn system(dpi: f64) -> Option<Self> {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        let query = fontdb::Query {
            families: &[fontdb::Family::SansSerif],
            ..fontdb::Query::default()
        };
        let id = db.query(&query)?;
        let family = db
            .face(id)
            .and_then(|face| face.families.first())
            .map(|(name, _)| name.clone())
            .unwrap_or_default();
        let font = db.with_face_data(id, |data, index| {
            Font::try_from_vec_and_index(data.to_vec(), index)
        })??;
        debug!(family = %family, faces = db.len(), "Using system font");
        Some(Self::from_font(font, dpi))
    }

    fn from_font(font: Font<'static>, dpi: f64) -> Self {
        Self {
            font,
            dpi,
            color: [0, 0, 0, 255],
        }
    }

    /// Font size in points to a pixel scale
    fn scale(&self, size_pt: f64) -> Scale {
        Scale::uniform((size_pt * self.dpi / 72.0) as f32)
    }

    /// Width and height in pixels of `text` at `size_pt`
    pub fn measure(&self, text: &str, size_pt: f64) -> (u32, u32) {
        let (w, h) = text_size(self.scale(size_pt), &self.font, text);
        (w.max(0) as u32, h.max(0) as u32)
    }

    /// Draw a line of text with its top edge at `y`
    pub fn draw(
        &self,
        canvas: &mut RgbaImage,
        text: &str,
        x: i32,
        y: i32,
        size_pt: f64,
        anchor: Anchor,
    ) {
        let (w, _) = self.measure(text, size_pt);
        let x = match anchor {
            Anchor::Left => x,
            Anchor::Center => x - (w / 2) as i32,
        };
        draw_text_mut(canvas, Rgba(self.color), x, y, self.scale(size_pt), &self.font, text);
    }

    /// Draw text turned 90 degrees counter-clockwise, reading bottom to
    /// top, centered vertically on `center_y` with its left edge at `x`.
    pub fn draw_vertical(
        &self,
        canvas: &mut RgbaImage,
        text: &str,
        x: i32,
        center_y: i32,
        size_pt: f64,
    ) {
        let (w, h) = self.measure(text, size_pt);
        if w == 0 || h == 0 {
            return;
        }
        let line_height = self.scale(size_pt).y.ceil() as u32;
        let mut label = RgbaImage::new(w + 2, line_height.max(h) + 2);
        draw_text_mut(&mut label, Rgba(self.color), 1, 1, self.scale(size_pt), &self.font, text);

        let rotated = imageops::rotate270(&label);
        let top = center_y - (rotated.height() / 2) as i32;
        imageops::overlay(canvas, &rotated, x as i64, top as i64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_rejects_non_font() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not_a_font.ttf");
        std::fs::write(&path, b"plain text").unwrap();

        assert!(matches!(
            TextRenderer::load(&path, 96.0),
            Err(GridMapError::InvalidParameter { ref param, .. }) if param == "font"
        ));
    }

    #[test]
    fn test_system_font_draws_text() {
        // Hosts without any installed font have nothing to check
        let Some(text) = TextRenderer::system(96.0) else {
            return;
        };
        let (w, h) = text.measure("Data values", 16.0);
        assert!(w > 0 && h > 0);

        let mut canvas = RgbaImage::from_pixel(200, 60, Rgba([255, 255, 255, 255]));
        text.draw(&mut canvas, "Data values", 100, 10, 16.0, Anchor::Center);
        assert!(canvas.pixels().any(|p| p.0 != [255, 255, 255, 255]));
    }
}

//! Colormap trait and the discrete listed colormap.
//!
//! This module defines the common interface for colormaps and the
//! [`ListedColormap`] used for contour bands, which carries optional colors
//! for values below the first and above the last level.

use crate::colormaps::levels::{Band, LevelSet};

/// An RGBA color
pub type Rgba = [u8; 4];

/// Fully transparent, used for values that are not drawn
pub const TRANSPARENT: Rgba = [0, 0, 0, 0];

/// Trait for color mapping implementations
pub trait Colormap: Send + Sync {
    /// Map a normalized value (0.0 to 1.0) to an RGBA color
    fn map_normalized(&self, value: f64) -> Rgba;

    /// Map a value to an RGBA color given the data range
    fn map(&self, value: f64, min: f64, max: f64) -> Rgba {
        let normalized = if max > min {
            ((value - min) / (max - min)).clamp(0.0, 1.0)
        } else {
            0.5
        };
        self.map_normalized(normalized)
    }

    /// Get the name of this colormap
    fn name(&self) -> &str;
}

/// A colormap made of a fixed list of colors, sampled by index
#[derive(Debug, Clone, PartialEq)]
pub struct ListedColormap {
    name: String,
    colors: Vec<Rgba>,
    under: Option<Rgba>,
    over: Option<Rgba>,
}

impl ListedColormap {
    /// Create a colormap from at least one color
    pub fn new(name: impl Into<String>, colors: Vec<Rgba>) -> Self {
        debug_assert!(!colors.is_empty(), "a listed colormap needs colors");
        Self {
            name: name.into(),
            colors,
            under: None,
            over: None,
        }
    }

    /// Color for values below the lowest level
    pub fn with_under(mut self, color: Rgba) -> Self {
        self.under = Some(color);
        self
    }

    /// Color for values above the highest level
    pub fn with_over(mut self, color: Rgba) -> Self {
        self.over = Some(color);
        self
    }

    pub fn colors(&self) -> &[Rgba] {
        &self.colors
    }

    pub fn under(&self) -> Option<Rgba> {
        self.under
    }

    pub fn over(&self) -> Option<Rgba> {
        self.over
    }

    /// Colors of the filled bands between the given levels.
    ///
    /// Band `k` is colored by sampling the list at the band's midpoint,
    /// normalized between the first and last level.
    pub fn band_palette(&self, levels: &LevelSet) -> BandPalette {
        let bands = (0..levels.band_count())
            .map(|k| self.map(levels.band_midpoint(k), levels.min(), levels.max()))
            .collect();
        BandPalette {
            bands,
            under: self.under,
            over: self.over,
        }
    }
}

impl Colormap for ListedColormap {
    fn map_normalized(&self, value: f64) -> Rgba {
        if value.is_nan() {
            return TRANSPARENT;
        }
        let n = self.colors.len();
        let index = ((value * n as f64).floor().max(0.0) as usize).min(n - 1);
        self.colors[index]
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// The color of every band, plus the extension colors
#[derive(Debug, Clone, PartialEq)]
pub struct BandPalette {
    pub bands: Vec<Rgba>,
    pub under: Option<Rgba>,
    pub over: Option<Rgba>,
}

impl BandPalette {
    /// Color for a classified value, `None` when it is not drawn
    pub fn color_for(&self, band: Band) -> Option<Rgba> {
        match band {
            Band::Inside(k) => self.bands.get(k).copied(),
            Band::Under => self.under,
            Band::Over => self.over,
            Band::Missing => None,
        }
    }

    /// Every color this palette can produce
    pub fn all_colors(&self) -> Vec<Rgba> {
        self.under
            .iter()
            .chain(self.bands.iter())
            .chain(self.over.iter())
            .copied()
            .collect()
    }
}

//! Colormaps for contour maps.
//!
//! This module builds discrete colormaps from a two-color ramp and a list of
//! contour levels.

pub mod colormap;
pub mod levels;
pub mod ramp;

pub use colormap::{BandPalette, Colormap, ListedColormap, Rgba, TRANSPARENT};
pub use levels::{default_levels, Band, LevelSet};
pub use ramp::{interpolate_hsl, parse_color, ColorRamp, ExtendMode};

//! Two-color ramps for contour maps.
//!
//! A [`ColorRamp`] interpolates from a start color to an end color in HSL
//! space, producing one color more than there are levels, and then splits
//! that list into band colors and under/over colors per its [`ExtendMode`].

use colorgrad::Color;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

use crate::colormaps::colormap::{Colormap, ListedColormap, Rgba};
use crate::colormaps::levels::LevelSet;
use crate::error::{GridMapError, Result};

/// How values outside the level range are colored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtendMode {
    /// Values below the first level get their own color
    Min,
    /// Values above the last level get their own color
    Max,
    /// Both sides get their own color
    Both,
    /// Out-of-range values are not drawn
    #[serde(alias = "neither")]
    None,
}

impl ExtendMode {
    pub fn extends_min(&self) -> bool {
        matches!(self, ExtendMode::Min | ExtendMode::Both)
    }

    pub fn extends_max(&self) -> bool {
        matches!(self, ExtendMode::Max | ExtendMode::Both)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExtendMode::Min => "min",
            ExtendMode::Max => "max",
            ExtendMode::Both => "both",
            ExtendMode::None => "none",
        }
    }
}

impl FromStr for ExtendMode {
    type Err = GridMapError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "min" => Ok(ExtendMode::Min),
            "max" => Ok(ExtendMode::Max),
            "both" => Ok(ExtendMode::Both),
            "none" | "neither" => Ok(ExtendMode::None),
            _ => Err(GridMapError::invalid_parameter(
                "extend",
                format!("Unknown extend mode: {}. Must be one of: min, max, both, none", s),
            )),
        }
    }
}

impl std::fmt::Display for ExtendMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Start and end colors, level boundaries and extend policy
#[derive(Debug, Clone)]
pub struct ColorRamp {
    pub start: Color,
    pub end: Color,
    pub levels: LevelSet,
    pub extend: ExtendMode,
}

impl ColorRamp {
    pub fn new(start: Color, end: Color, levels: LevelSet, extend: ExtendMode) -> Self {
        Self {
            start,
            end,
            levels,
            extend,
        }
    }

    /// Build a ramp from CSS color strings such as `#8CCBFE`
    pub fn from_strings(start: &str, end: &str, levels: LevelSet, extend: ExtendMode) -> Result<Self> {
        Ok(Self::new(parse_color(start)?, parse_color(end)?, levels, extend))
    }

    /// The `levels + 1` interpolated colors, before the extend split
    pub fn colors(&self) -> Vec<Rgba> {
        interpolate_hsl(&self.start, &self.end, self.levels.len() + 1)
    }

    /// Split the ramp colors into bands and extension colors.
    ///
    /// `min` reserves the first color for values below the first level,
    /// `max` the last color for values above the last level, `both` does
    /// both and `none` keeps every color as a band.
    pub fn build_colormap(&self) -> ListedColormap {
        let colors = self.colors();
        let n = colors.len();
        let name = format!(
            "{}-{}",
            self.start.to_hex_string(),
            self.end.to_hex_string()
        );

        let cmap = match self.extend {
            ExtendMode::Min => {
                ListedColormap::new(name, colors[1..].to_vec()).with_under(colors[0])
            }
            ExtendMode::Max => {
                ListedColormap::new(name, colors[..n - 1].to_vec()).with_over(colors[n - 1])
            }
            ExtendMode::Both => ListedColormap::new(name, colors[1..n - 1].to_vec())
                .with_under(colors[0])
                .with_over(colors[n - 1]),
            ExtendMode::None => ListedColormap::new(name, colors),
        };

        debug!(
            colormap = cmap.name(),
            extend = %self.extend,
            listed = cmap.colors().len(),
            under = cmap.under().is_some(),
            over = cmap.over().is_some(),
            "Built listed colormap"
        );
        cmap
    }
}

/// Parse a CSS color (hex, `rgb(...)`, named color)
pub fn parse_color(s: &str) -> Result<Color> {
    Color::from_html(s).map_err(|e| {
        GridMapError::invalid_parameter("color", format!("Invalid color {:?}: {}", s, e))
    })
}

/// `steps` colors from `start` to `end`, each of hue, saturation and
/// lightness moving linearly. The first and last colors are the inputs.
pub fn interpolate_hsl(start: &Color, end: &Color, steps: usize) -> Vec<Rgba> {
    match steps {
        0 => return Vec::new(),
        1 => return vec![start.to_rgba8()],
        _ => {}
    }

    let (h0, s0, l0, a0) = start.to_hsla();
    let (h1, s1, l1, a1) = end.to_hsla();
    let last = (steps - 1) as f64;

    (0..steps)
        .map(|i| {
            if i == 0 {
                return start.to_rgba8();
            }
            if i == steps - 1 {
                return end.to_rgba8();
            }
            let t = i as f64 / last;
            Color::from_hsla(
                lerp(h0, h1, t),
                lerp(s0, s1, t),
                lerp(l0, l1, t),
                lerp(a0, a1, t),
            )
            .to_rgba8()
        })
        .collect()
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    // Achromatic colors report NaN hue
    match (a.is_nan(), b.is_nan()) {
        (true, true) => 0.0,
        (true, false) => b,
        (false, true) => a,
        (false, false) => a + (b - a) * t,
    }
}

//! Configuration management for gridmap.
//!
//! This module handles the layered configuration system with the following precedence:
//! 1. Command-line arguments (highest priority)
//! 2. Environment variables
//! 3. JSON config file
//! 4. Default values (lowest priority)

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::colormaps::{default_levels, parse_color, ColorRamp, ExtendMode, LevelSet};
use crate::error::{GridMapError, Result};
use crate::map::{FigureSize, ProjectionKind};

/// Command-line arguments for gridmap
#[derive(Parser, Debug)]
#[command(name = "gridmap")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the delimited grid file (columns index, lon, lat, de)
    pub input_file: Option<PathBuf>,

    /// Field separator of the grid file
    #[arg(short, long, env = "GRIDMAP_SEPARATOR")]
    pub separator: Option<String>,

    /// Map projection (cyl, moll, hammer, sinu, robin, ortho)
    #[arg(short, long, env = "GRIDMAP_PROJECTION")]
    pub projection: Option<String>,

    /// Latitude of the projection center
    #[arg(long, env = "GRIDMAP_CENTER_LAT", allow_hyphen_values = true)]
    pub center_lat: Option<f64>,

    /// Longitude of the projection center
    #[arg(long, env = "GRIDMAP_CENTER_LON", allow_hyphen_values = true)]
    pub center_lon: Option<f64>,

    /// GeoJSON file with coastlines. Without it only the map outline is drawn
    #[arg(long, env = "GRIDMAP_COASTLINES")]
    pub coastlines: Option<PathBuf>,

    /// GeoJSON file with country borders
    #[arg(long, env = "GRIDMAP_BORDERS")]
    pub borders: Option<PathBuf>,

    /// Color of the lowest values
    #[arg(long, env = "GRIDMAP_MIN_COLOR")]
    pub min_color: Option<String>,

    /// Color of the highest values
    #[arg(long, env = "GRIDMAP_MAX_COLOR")]
    pub max_color: Option<String>,

    /// Contour levels, as "a,b,c" or "start:stop:step"
    #[arg(long, env = "GRIDMAP_LEVELS", allow_hyphen_values = true)]
    pub levels: Option<String>,

    /// Colorbar extension (min, max, both, none)
    #[arg(long, env = "GRIDMAP_EXTEND")]
    pub extend: Option<String>,

    /// Colorbar label
    #[arg(long, env = "GRIDMAP_LABEL")]
    pub label: Option<String>,

    /// Figure title
    #[arg(long, env = "GRIDMAP_TITLE")]
    pub title: Option<String>,

    /// Figure width in inches
    #[arg(long, env = "GRIDMAP_WIDTH_IN")]
    pub width_in: Option<f64>,

    /// Figure height in inches
    #[arg(long, env = "GRIDMAP_HEIGHT_IN")]
    pub height_in: Option<f64>,

    /// Figure resolution
    #[arg(long, env = "GRIDMAP_DPI")]
    pub dpi: Option<f64>,

    /// PNG logo placed at the lower-left corner of the map
    #[arg(long, env = "GRIDMAP_LOGO")]
    pub logo: Option<PathBuf>,

    /// Logo scale factor
    #[arg(long, env = "GRIDMAP_LOGO_ZOOM")]
    pub logo_zoom: Option<f64>,

    /// TrueType font for the title and colorbar text. Defaults to an
    /// installed sans-serif font; with none, text is left out
    #[arg(long, env = "GRIDMAP_FONT")]
    pub font: Option<PathBuf>,

    /// Output PNG path
    #[arg(short, long, env = "GRIDMAP_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Path to JSON configuration file
    #[arg(short, long, env = "GRIDMAP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "GRIDMAP_LOG_LEVEL")]
    pub log_level: Option<String>,
}

/// Input file configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Path to the grid file
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Field separator, a single character
    #[serde(default = "default_separator")]
    pub separator: String,
}

/// Projection and base map configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(default = "default_projection")]
    pub projection: String,

    #[serde(default)]
    pub center_lat: f64,

    #[serde(default)]
    pub center_lon: f64,

    #[serde(default)]
    pub coastlines: Option<PathBuf>,

    #[serde(default)]
    pub borders: Option<PathBuf>,
}

/// Color ramp configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorConfig {
    #[serde(default = "default_min_color")]
    pub min_color: String,

    #[serde(default = "default_max_color")]
    pub max_color: String,

    /// Level boundaries, a JSON array of numbers
    #[serde(default = "default_levels")]
    pub levels: LevelSet,

    #[serde(default = "default_extend")]
    pub extend: ExtendMode,

    #[serde(default = "default_colorbar_label")]
    pub colorbar_label: String,
}

/// Figure layout and output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigureConfig {
    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default = "default_width_in")]
    pub width_in: f64,

    #[serde(default = "default_height_in")]
    pub height_in: f64,

    #[serde(default = "default_dpi")]
    pub dpi: f64,

    #[serde(default)]
    pub logo: Option<PathBuf>,

    #[serde(default = "default_logo_zoom")]
    pub logo_zoom: f64,

    #[serde(default)]
    pub font: Option<PathBuf>,

    #[serde(default = "default_output")]
    pub output: PathBuf,
}

/// Complete configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub map: MapConfig,

    #[serde(default)]
    pub colors: ColorConfig,

    #[serde(default)]
    pub figure: FigureConfig,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Config {
    /// Load configuration from all sources with proper precedence
    pub fn load() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    /// Build the configuration from parsed arguments
    pub fn from_args(args: Args) -> Result<Self> {
        // Start with defaults
        let mut config = Config::default();

        // Load from JSON file if provided
        if let Some(config_path) = &args.config {
            let json_config = Self::load_from_file(config_path)?;
            config.merge(json_config);
        }

        // Override with command-line arguments and environment variables
        config.apply_args(args)?;

        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.input.file.is_some() {
            self.input.file = other.input.file;
        }
        self.input.separator = other.input.separator;
        self.map = other.map;
        self.colors = other.colors;
        self.figure = other.figure;
        self.log_level = other.log_level;
    }

    fn apply_args(&mut self, args: Args) -> Result<()> {
        if args.input_file.is_some() {
            self.input.file = args.input_file;
        }
        if let Some(separator) = args.separator {
            self.input.separator = separator;
        }

        if let Some(projection) = args.projection {
            self.map.projection = projection;
        }
        if let Some(lat) = args.center_lat {
            self.map.center_lat = lat;
        }
        if let Some(lon) = args.center_lon {
            self.map.center_lon = lon;
        }
        if args.coastlines.is_some() {
            self.map.coastlines = args.coastlines;
        }
        if args.borders.is_some() {
            self.map.borders = args.borders;
        }

        if let Some(color) = args.min_color {
            self.colors.min_color = color;
        }
        if let Some(color) = args.max_color {
            self.colors.max_color = color;
        }
        if let Some(levels) = args.levels {
            self.colors.levels = levels.parse()?;
        }
        if let Some(extend) = args.extend {
            self.colors.extend = extend.parse()?;
        }
        if let Some(label) = args.label {
            self.colors.colorbar_label = label;
        }

        if let Some(title) = args.title {
            self.figure.title = title;
        }
        if let Some(width) = args.width_in {
            self.figure.width_in = width;
        }
        if let Some(height) = args.height_in {
            self.figure.height_in = height;
        }
        if let Some(dpi) = args.dpi {
            self.figure.dpi = dpi;
        }
        if args.logo.is_some() {
            self.figure.logo = args.logo;
        }
        if let Some(zoom) = args.logo_zoom {
            self.figure.logo_zoom = zoom;
        }
        if args.font.is_some() {
            self.figure.font = args.font;
        }
        if let Some(output) = args.output {
            self.figure.output = output;
        }

        if let Some(level) = args.log_level {
            self.log_level = level;
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        match &self.input.file {
            Some(path) if !path.as_os_str().is_empty() => {}
            _ => {
                return Err(GridMapError::Config {
                    message: "An input grid file is required".to_string(),
                });
            }
        }

        self.separator()?;

        ProjectionKind::parse_projection(&self.map.projection).map_err(|e| GridMapError::Config {
            message: e.to_string(),
        })?;

        if !(-90.0..=90.0).contains(&self.map.center_lat) {
            return Err(GridMapError::Config {
                message: format!(
                    "Center latitude must be between -90 and 90, got {}",
                    self.map.center_lat
                ),
            });
        }
        if !self.map.center_lon.is_finite() {
            return Err(GridMapError::Config {
                message: format!("Center longitude must be finite, got {}", self.map.center_lon),
            });
        }

        for color in [&self.colors.min_color, &self.colors.max_color] {
            parse_color(color).map_err(|e| GridMapError::Config {
                message: e.to_string(),
            })?;
        }

        let figure = [
            ("width_in", self.figure.width_in),
            ("height_in", self.figure.height_in),
            ("dpi", self.figure.dpi),
            ("logo_zoom", self.figure.logo_zoom),
        ];
        for (name, value) in figure {
            if !value.is_finite() || value <= 0.0 {
                return Err(GridMapError::Config {
                    message: format!("figure.{} must be a positive number, got {}", name, value),
                });
            }
        }
        self.figure_size().pixels()?;

        // Validate log level
        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(GridMapError::Config {
                    message: format!(
                        "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                        self.log_level
                    ),
                });
            }
        }

        Ok(())
    }

    /// The single-character field separator
    pub fn separator(&self) -> Result<char> {
        let mut chars = self.input.separator.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(GridMapError::Config {
                message: format!(
                    "Separator must be a single character, got {:?}",
                    self.input.separator
                ),
            }),
        }
    }

    /// The configured color ramp
    pub fn color_ramp(&self) -> Result<ColorRamp> {
        ColorRamp::from_strings(
            &self.colors.min_color,
            &self.colors.max_color,
            self.colors.levels.clone(),
            self.colors.extend,
        )
    }

    pub fn figure_size(&self) -> FigureSize {
        FigureSize {
            width_in: self.figure.width_in,
            height_in: self.figure.height_in,
            dpi: self.figure.dpi,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: InputConfig::default(),
            map: MapConfig::default(),
            colors: ColorConfig::default(),
            figure: FigureConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            file: None,
            separator: default_separator(),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            projection: default_projection(),
            center_lat: 0.0,
            center_lon: 0.0,
            coastlines: None,
            borders: None,
        }
    }
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            min_color: default_min_color(),
            max_color: default_max_color(),
            levels: default_levels(),
            extend: default_extend(),
            colorbar_label: default_colorbar_label(),
        }
    }
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            width_in: default_width_in(),
            height_in: default_height_in(),
            dpi: default_dpi(),
            logo: None,
            logo_zoom: default_logo_zoom(),
            font: None,
            output: default_output(),
        }
    }
}

// Default value functions for serde
fn default_separator() -> String {
    ";".to_string()
}

fn default_projection() -> String {
    "moll".to_string()
}

fn default_min_color() -> String {
    "#8CCBFE".to_string()
}

fn default_max_color() -> String {
    "#0871B0".to_string()
}

fn default_extend() -> ExtendMode {
    ExtendMode::Min
}

fn default_colorbar_label() -> String {
    "Data values".to_string()
}

fn default_title() -> String {
    "Gridded Global Data".to_string()
}

fn default_width_in() -> f64 {
    16.0
}

fn default_height_in() -> f64 {
    9.0
}

fn default_dpi() -> f64 {
    96.0
}

fn default_logo_zoom() -> f64 {
    0.05
}

fn default_output() -> PathBuf {
    PathBuf::from("griddedGlobalData.png")
}

fn default_log_level() -> String {
    "info".to_string()
}

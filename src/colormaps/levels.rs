//! Contour level boundaries.
//!
//! A [`LevelSet`] is a strictly increasing list of at least two finite
//! boundaries. `n` levels delimit `n - 1` filled bands; values outside the
//! first and last level fall into the under/over extensions.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{GridMapError, Result};

/// Where a value falls relative to the level boundaries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    /// Below the first level
    Under,
    /// Inside band `k`, between level `k` and level `k + 1`
    Inside(usize),
    /// Above the last level
    Over,
    /// Not a number
    Missing,
}

/// Validated, strictly increasing contour levels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct LevelSet {
    levels: Vec<f64>,
}

impl LevelSet {
    pub fn new(levels: Vec<f64>) -> Result<Self> {
        if levels.len() < 2 {
            return Err(GridMapError::invalid_parameter(
                "levels",
                format!("at least two levels are required, got {}", levels.len()),
            ));
        }
        if let Some(bad) = levels.iter().find(|v| !v.is_finite()) {
            return Err(GridMapError::invalid_parameter(
                "levels",
                format!("level values must be finite, got {}", bad),
            ));
        }
        if let Some(pair) = levels.windows(2).find(|w| w[1] <= w[0]) {
            return Err(GridMapError::invalid_parameter(
                "levels",
                format!(
                    "level values must be strictly increasing ({} then {})",
                    pair[0], pair[1]
                ),
            ));
        }
        Ok(Self { levels })
    }

    /// Half-open range `start + i * step` for `i < ceil((stop - start) / step)`
    pub fn arange(start: f64, stop: f64, step: f64) -> Result<Self> {
        if step.is_nan() || step <= 0.0 || !start.is_finite() || !stop.is_finite() {
            return Err(GridMapError::invalid_parameter(
                "levels",
                format!("invalid range {}:{}:{}", start, stop, step),
            ));
        }
        let count = ((stop - start) / step).ceil().max(0.0) as usize;
        Self::new((0..count).map(|i| start + i as f64 * step).collect())
    }

    pub fn values(&self) -> &[f64] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Always false; a level set holds at least two levels
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Number of filled bands between the first and last level
    pub fn band_count(&self) -> usize {
        self.levels.len() - 1
    }

    pub fn min(&self) -> f64 {
        self.levels[0]
    }

    pub fn max(&self) -> f64 {
        self.levels[self.levels.len() - 1]
    }

    /// Midpoint of band `k`
    pub fn band_midpoint(&self, band: usize) -> f64 {
        (self.levels[band] + self.levels[band + 1]) / 2.0
    }

    /// Classify a value. Band `k` covers `(level[k], level[k + 1]]`; the
    /// first band also includes its lower boundary.
    pub fn classify(&self, value: f64) -> Band {
        if value.is_nan() {
            return Band::Missing;
        }
        if value < self.min() {
            return Band::Under;
        }
        if value > self.max() {
            return Band::Over;
        }
        // First index whose level is >= value
        let upper = self.levels.partition_point(|&level| level < value);
        Band::Inside(upper.saturating_sub(1))
    }

    /// Tick label for a level, with just enough decimals for the spacing
    pub fn format_level(&self, value: f64) -> String {
        let decimals = self
            .levels
            .windows(2)
            .map(|w| decimals_for(w[1] - w[0]))
            .max()
            .unwrap_or(0);
        format!("{:.*}", decimals, value)
    }
}

fn decimals_for(step: f64) -> usize {
    let mut decimals = 0;
    let mut scaled = step.abs();
    while decimals < 6 && (scaled - scaled.round()).abs() > 1e-6 * scaled.max(1.0) {
        scaled *= 10.0;
        decimals += 1;
    }
    decimals
}

impl TryFrom<Vec<f64>> for LevelSet {
    type Error = GridMapError;

    fn try_from(levels: Vec<f64>) -> Result<Self> {
        LevelSet::new(levels)
    }
}

impl From<LevelSet> for Vec<f64> {
    fn from(levels: LevelSet) -> Self {
        levels.levels
    }
}

impl FromStr for LevelSet {
    type Err = GridMapError;

    /// Parse `a,b,c` or `start:stop:step`
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let parse = |part: &str| {
            part.trim()
                .parse::<f64>()
                .map_err(|_| GridMapError::invalid_parameter("levels", format!("invalid number: {}", part)))
        };

        if s.contains(':') {
            let parts: Vec<&str> = s.split(':').collect();
            if parts.len() != 3 {
                return Err(GridMapError::invalid_parameter(
                    "levels",
                    format!("range must be start:stop:step, got {}", s),
                ));
            }
            return LevelSet::arange(parse(parts[0])?, parse(parts[1])?, parse(parts[2])?);
        }

        let values = s
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(parse)
            .collect::<Result<Vec<f64>>>()?;
        LevelSet::new(values)
    }
}

/// The level list used when none is configured: 0.5 to 1.0 in steps of 0.1
pub fn default_levels() -> LevelSet {
    LevelSet {
        levels: (0..6).map(|i| 0.5 + i as f64 * 0.1).collect(),
    }
}

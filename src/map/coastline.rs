//! Coastline and border linework read from GeoJSON.
//!
//! Only the line geometry is kept: every `LineString`, `MultiLineString`,
//! `Polygon` ring and `MultiPolygon` ring becomes one polyline of lon/lat
//! points. Other geometry types are skipped.

use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{GridMapError, Result};

/// A polyline of `(lon, lat)` points in degrees
pub type Polyline = Vec<(f64, f64)>;

/// A set of polylines to stroke on the map
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineLayer {
    pub name: String,
    pub lines: Vec<Polyline>,
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: Value,
}

impl LineLayer {
    /// Load a GeoJSON `FeatureCollection` file
    pub fn load(path: &Path, name: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let layer = Self::from_geojson(&content, name)?;
        info!(
            layer = name,
            path = %path.display(),
            lines = layer.lines.len(),
            points = layer.point_count(),
            "Loaded map linework"
        );
        Ok(layer)
    }

    /// Parse GeoJSON text
    pub fn from_geojson(content: &str, name: &str) -> Result<Self> {
        let collection: FeatureCollection = serde_json::from_str(content)?;
        let mut lines = Vec::new();

        for geometry in collection.features.into_iter().filter_map(|f| f.geometry) {
            match geometry.kind.as_str() {
                "LineString" => lines.push(parse_ring(&geometry.coordinates)?),
                "MultiLineString" | "Polygon" => {
                    for ring in as_array(&geometry.coordinates)? {
                        lines.push(parse_ring(ring)?);
                    }
                }
                "MultiPolygon" => {
                    for polygon in as_array(&geometry.coordinates)? {
                        for ring in as_array(polygon)? {
                            lines.push(parse_ring(ring)?);
                        }
                    }
                }
                other => debug!(layer = name, geometry = other, "Skipping geometry"),
            }
        }

        lines.retain(|line| line.len() >= 2);
        Ok(Self {
            name: name.to_string(),
            lines,
        })
    }

    pub fn point_count(&self) -> usize {
        self.lines.iter().map(Vec::len).sum()
    }
}

fn as_array(value: &Value) -> Result<&Vec<Value>> {
    value.as_array().ok_or_else(|| GridMapError::InvalidParameter {
        param: "geojson".to_string(),
        message: format!("expected a coordinate array, got {}", value),
    })
}

fn parse_ring(value: &Value) -> Result<Polyline> {
    as_array(value)?
        .iter()
        .map(|position| {
            let coords = as_array(position)?;
            match (
                coords.first().and_then(Value::as_f64),
                coords.get(1).and_then(Value::as_f64),
            ) {
                (Some(lon), Some(lat)) => Ok((lon, lat)),
                _ => Err(GridMapError::InvalidParameter {
                    param: "geojson".to_string(),
                    message: format!("invalid position: {}", position),
                }),
            }
        })
        .collect()
}

//! World map projections.
//!
//! Projections are named the way common GIS toolkits name them (`moll`,
//! `cyl`, ...) and centered on a longitude (and, for `ortho`, a latitude).
//! Planar coordinates are meters on a sphere, shifted so the lower-left
//! corner of the map is `(0, 0)`.

use ndarray::Array2;
use std::f64::consts::{FRAC_PI_2, PI, SQRT_2};
use std::str::FromStr;

use crate::error::{GridMapError, Result};

/// Sphere radius in meters
pub const EARTH_RADIUS: f64 = 6_370_997.0;

/// Supported projection families
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionKind {
    /// Equidistant cylindrical (plate carrée)
    Cylindrical,
    /// Mollweide equal-area
    Mollweide,
    /// Hammer-Aitoff equal-area
    Hammer,
    /// Sinusoidal equal-area
    Sinusoidal,
    /// Robinson compromise
    Robinson,
    /// Orthographic, a view of one hemisphere
    Orthographic,
}

impl ProjectionKind {
    pub fn name(&self) -> &'static str {
        match self {
            ProjectionKind::Cylindrical => "cyl",
            ProjectionKind::Mollweide => "moll",
            ProjectionKind::Hammer => "hammer",
            ProjectionKind::Sinusoidal => "sinu",
            ProjectionKind::Robinson => "robin",
            ProjectionKind::Orthographic => "ortho",
        }
    }

    /// Create a ProjectionKind from its short name
    pub fn parse_projection(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "cyl" | "cylindrical" => Ok(ProjectionKind::Cylindrical),
            "moll" | "mollweide" => Ok(ProjectionKind::Mollweide),
            "hammer" => Ok(ProjectionKind::Hammer),
            "sinu" | "sinusoidal" => Ok(ProjectionKind::Sinusoidal),
            "robin" | "robinson" => Ok(ProjectionKind::Robinson),
            "ortho" | "orthographic" => Ok(ProjectionKind::Orthographic),
            _ => Err(GridMapError::InvalidParameter {
                param: "projection".to_string(),
                message: format!(
                    "Unknown map projection: {}. Must be one of: cyl, moll, hammer, sinu, robin, ortho",
                    s
                ),
            }),
        }
    }
}

impl FromStr for ProjectionKind {
    type Err = GridMapError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ProjectionKind::parse_projection(s)
    }
}

/// A projection centered on a point
#[derive(Debug, Clone, PartialEq)]
pub struct MapProjection {
    pub kind: ProjectionKind,
    pub center_lat: f64,
    pub center_lon: f64,
}

impl MapProjection {
    pub fn new(kind: ProjectionKind, center_lat: f64, center_lon: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&center_lat) {
            return Err(GridMapError::InvalidParameter {
                param: "center_lat".to_string(),
                message: format!("Center latitude must be in the range -90 to 90, got {}", center_lat),
            });
        }
        if !center_lon.is_finite() {
            return Err(GridMapError::InvalidParameter {
                param: "center_lon".to_string(),
                message: format!("Center longitude must be finite, got {}", center_lon),
            });
        }
        Ok(Self {
            kind,
            center_lat,
            center_lon,
        })
    }

    /// Resolve a projection from its name
    pub fn from_name(name: &str, center_lat: f64, center_lon: f64) -> Result<Self> {
        Self::new(ProjectionKind::parse_projection(name)?, center_lat, center_lon)
    }

    /// Half width and half height of the map in meters
    pub fn half_extent(&self) -> (f64, f64) {
        let r = EARTH_RADIUS;
        match self.kind {
            ProjectionKind::Cylindrical | ProjectionKind::Sinusoidal => (PI * r, FRAC_PI_2 * r),
            ProjectionKind::Mollweide | ProjectionKind::Hammer => (2.0 * SQRT_2 * r, SQRT_2 * r),
            ProjectionKind::Robinson => (ROBINSON_X_SCALE * PI * r, ROBINSON_Y_SCALE * r),
            ProjectionKind::Orthographic => (r, r),
        }
    }

    /// Full map size in meters
    pub fn extent(&self) -> (f64, f64) {
        let (hw, hh) = self.half_extent();
        (2.0 * hw, 2.0 * hh)
    }

    /// Project a lon/lat point in degrees. `None` when the point is hidden
    /// (the far side of an orthographic view).
    pub fn project(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        if !lon.is_finite() || !lat.is_finite() {
            return None;
        }
        let lambda = normalize_longitude(lon - self.center_lon).to_radians();
        let phi = lat.clamp(-90.0, 90.0).to_radians();
        self.project_radians(lambda, phi)
    }

    /// Project a longitude given relative to the center. It is clamped to
    /// `[-180, 180]` instead of wrapped, so both map edges are reachable.
    pub fn project_relative(&self, rel_lon: f64, lat: f64) -> Option<(f64, f64)> {
        if !rel_lon.is_finite() || !lat.is_finite() {
            return None;
        }
        let lambda = rel_lon.clamp(-180.0, 180.0).to_radians();
        self.project_radians(lambda, lat.clamp(-90.0, 90.0).to_radians())
    }

    /// Project a longitude already relative to the center, in radians.
    /// `lambda` is not wrapped so the map edges at `±π` can be reached.
    fn project_radians(&self, lambda: f64, phi: f64) -> Option<(f64, f64)> {
        let r = EARTH_RADIUS;
        let (x, y) = match self.kind {
            ProjectionKind::Cylindrical => (r * lambda, r * phi),
            ProjectionKind::Sinusoidal => (r * lambda * phi.cos(), r * phi),
            ProjectionKind::Mollweide => {
                let theta = mollweide_theta(phi);
                (
                    r * 2.0 * SQRT_2 / PI * lambda * theta.cos(),
                    r * SQRT_2 * theta.sin(),
                )
            }
            ProjectionKind::Hammer => {
                let z = (1.0 + phi.cos() * (lambda / 2.0).cos()).sqrt();
                (
                    r * 2.0 * SQRT_2 * phi.cos() * (lambda / 2.0).sin() / z,
                    r * SQRT_2 * phi.sin() / z,
                )
            }
            ProjectionKind::Robinson => {
                let (px, py) = robinson_factors(phi.to_degrees().abs());
                (
                    r * ROBINSON_X_SCALE * px * lambda,
                    r * ROBINSON_Y_SCALE * py * phi.signum(),
                )
            }
            ProjectionKind::Orthographic => {
                let phi0 = self.center_lat.to_radians();
                let cos_c = phi0.sin() * phi.sin() + phi0.cos() * phi.cos() * lambda.cos();
                if cos_c < 0.0 {
                    return None;
                }
                (
                    r * phi.cos() * lambda.sin(),
                    r * (phi0.cos() * phi.sin() - phi0.sin() * phi.cos() * lambda.cos()),
                )
            }
        };
        let (hw, hh) = self.half_extent();
        Some((x + hw, y + hh))
    }

    /// Project whole lon/lat arrays; hidden points become `NaN`
    pub fn project_arrays(
        &self,
        lon: &Array2<f64>,
        lat: &Array2<f64>,
    ) -> Result<(Array2<f64>, Array2<f64>)> {
        if lon.shape() != lat.shape() {
            return Err(GridMapError::InvalidParameter {
                param: "grid".to_string(),
                message: format!(
                    "lon {:?} and lat {:?} arrays must have the same shape",
                    lon.shape(),
                    lat.shape()
                ),
            });
        }

        let mut x = Array2::from_elem(lon.dim(), f64::NAN);
        let mut y = Array2::from_elem(lon.dim(), f64::NAN);
        for ((idx, &lon_value), &lat_value) in lon.indexed_iter().zip(lat.iter()) {
            if let Some((px, py)) = self.project(lon_value, lat_value) {
                x[idx] = px;
                y[idx] = py;
            }
        }
        Ok((x, y))
    }

    /// Outline of the map in planar coordinates, as a closed ring
    pub fn boundary(&self, segments: usize) -> Vec<(f64, f64)> {
        let segments = segments.max(8);
        match self.kind {
            ProjectionKind::Orthographic => {
                let (hw, hh) = self.half_extent();
                (0..segments)
                    .map(|i| {
                        let a = 2.0 * PI * i as f64 / segments as f64;
                        (hw + EARTH_RADIUS * a.cos(), hh + EARTH_RADIUS * a.sin())
                    })
                    .collect()
            }
            _ => {
                // Up the eastern edge, then down the western edge
                let east = (0..=segments).filter_map(|i| {
                    let phi = -FRAC_PI_2 + PI * i as f64 / segments as f64;
                    self.project_radians(PI, phi)
                });
                let west = (0..=segments).filter_map(|i| {
                    let phi = FRAC_PI_2 - PI * i as f64 / segments as f64;
                    self.project_radians(-PI, phi)
                });
                east.chain(west).collect()
            }
        }
    }

    /// Relative longitude of a point in degrees, in `[-180, 180)`
    pub fn relative_longitude(&self, lon: f64) -> f64 {
        normalize_longitude(lon - self.center_lon)
    }
}

/// Normalize a longitude value to the range [-180, 180)
pub fn normalize_longitude(lon: f64) -> f64 {
    let mut normalized = ((lon + 180.0) % 360.0 + 360.0) % 360.0 - 180.0;

    // Exactly 180.0 belongs to the western edge
    if normalized == 180.0 {
        normalized = -180.0;
    }

    normalized
}

/// Solve `2θ + sin 2θ = π sin φ` by Newton iteration
fn mollweide_theta(phi: f64) -> f64 {
    if (phi.abs() - FRAC_PI_2).abs() < 1e-12 {
        return phi;
    }
    let target = PI * phi.sin();
    let mut theta = phi;
    for _ in 0..50 {
        let f = 2.0 * theta + (2.0 * theta).sin() - target;
        let df = 2.0 + 2.0 * (2.0 * theta).cos();
        if df.abs() < 1e-15 {
            break;
        }
        let step = f / df;
        theta -= step;
        if step.abs() < 1e-12 {
            break;
        }
    }
    theta
}

const ROBINSON_X_SCALE: f64 = 0.8487;
const ROBINSON_Y_SCALE: f64 = 1.3523;

/// Robinson table: (X, Y) every 5 degrees of latitude from 0 to 90
const ROBINSON_TABLE: [(f64, f64); 19] = [
    (1.0000, 0.0000),
    (0.9986, 0.0620),
    (0.9954, 0.1240),
    (0.9900, 0.1860),
    (0.9822, 0.2480),
    (0.9730, 0.3100),
    (0.9600, 0.3720),
    (0.9427, 0.4340),
    (0.9216, 0.4958),
    (0.8962, 0.5571),
    (0.8679, 0.6176),
    (0.8350, 0.6769),
    (0.7986, 0.7346),
    (0.7597, 0.7903),
    (0.7186, 0.8435),
    (0.6732, 0.8936),
    (0.6213, 0.9394),
    (0.5722, 0.9761),
    (0.5322, 1.0000),
];

/// Linear interpolation in the Robinson table for |lat| in degrees
fn robinson_factors(abs_lat: f64) -> (f64, f64) {
    let position = (abs_lat / 5.0).clamp(0.0, 18.0);
    let index = (position.floor() as usize).min(17);
    let t = position - index as f64;
    let (x0, y0) = ROBINSON_TABLE[index];
    let (x1, y1) = ROBINSON_TABLE[index + 1];
    (x0 + (x1 - x0) * t, y0 + (y1 - y0) * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn test_normalize_longitude() {
        assert_eq!(normalize_longitude(0.0), 0.0);
        assert_eq!(normalize_longitude(180.0), -180.0);
        assert_eq!(normalize_longitude(-180.0), -180.0);
        assert_eq!(normalize_longitude(190.0), -170.0);
        assert_eq!(normalize_longitude(-190.0), 170.0);
        assert_eq!(normalize_longitude(370.0), 10.0);
        assert_eq!(normalize_longitude(-370.0), -10.0);
    }

    #[test]
    fn test_parse_projection() {
        assert_eq!(
            ProjectionKind::from_str("moll").unwrap(),
            ProjectionKind::Mollweide
        );
        assert_eq!(
            ProjectionKind::from_str("CYL").unwrap(),
            ProjectionKind::Cylindrical
        );
        assert_eq!(
            ProjectionKind::from_str("robin").unwrap(),
            ProjectionKind::Robinson
        );
        assert!(ProjectionKind::from_str("merc").is_err());
        assert_eq!(ProjectionKind::Hammer.name(), "hammer");
    }

    #[test]
    fn test_center_maps_to_middle() {
        for name in ["cyl", "moll", "hammer", "sinu", "robin", "ortho"] {
            let projection = MapProjection::from_name(name, 0.0, 30.0).unwrap();
            let (hw, hh) = projection.half_extent();
            let (x, y) = projection.project(30.0, 0.0).unwrap();
            assert!(close(x, hw, 1e-6), "{}: x = {}", name, x);
            assert!(close(y, hh, 1e-6), "{}: y = {}", name, y);
        }
    }

    #[test]
    fn test_mollweide_edges() {
        let projection = MapProjection::from_name("moll", 0.0, 0.0).unwrap();
        let (w, h) = projection.extent();

        let (_, north) = projection.project(0.0, 90.0).unwrap();
        assert!(close(north, h, 1e-3));

        let (_, south) = projection.project(0.0, -90.0).unwrap();
        assert!(close(south, 0.0, 1e-3));

        // The western edge at the equator is x = 0
        let (west, _) = projection.project(-180.0, 0.0).unwrap();
        assert!(close(west, 0.0, 1e-3));
        assert!(w > h);
    }

    #[test]
    fn test_orthographic_hides_far_side() {
        let projection = MapProjection::from_name("ortho", 45.0, 0.0).unwrap();
        assert!(projection.project(0.0, 45.0).is_some());
        assert!(projection.project(180.0, -45.0).is_none());
    }

    #[test]
    fn test_project_arrays_marks_hidden_points() {
        let projection = MapProjection::from_name("ortho", 0.0, 0.0).unwrap();
        let lon = array![[0.0, 0.0], [180.0, 180.0]];
        let lat = array![[-10.0, 10.0], [-10.0, 10.0]];
        let (x, y) = projection.project_arrays(&lon, &lat).unwrap();
        assert!(x[[0, 0]].is_finite());
        assert!(y[[0, 1]].is_finite());
        assert!(x[[1, 0]].is_nan());
        assert!(y[[1, 1]].is_nan());
    }

    #[test]
    fn test_invalid_center_latitude() {
        assert!(MapProjection::from_name("moll", 91.0, 0.0).is_err());
        assert!(MapProjection::from_name("moll", 0.0, f64::NAN).is_err());
    }

    #[test]
    fn test_boundary_stays_inside_extent() {
        for name in ["cyl", "moll", "hammer", "sinu", "robin", "ortho"] {
            let projection = MapProjection::from_name(name, 0.0, 0.0).unwrap();
            let (w, h) = projection.extent();
            let ring = projection.boundary(64);
            assert!(ring.len() >= 64);
            for (x, y) in ring {
                assert!(x >= -1.0 && x <= w + 1.0, "{}: x = {}", name, x);
                assert!(y >= -1.0 && y <= h + 1.0, "{}: y = {}", name, y);
            }
        }
    }

    #[test]
    fn test_project_relative_reaches_both_edges() {
        let projection = MapProjection::from_name("cyl", 0.0, 0.0).unwrap();
        let (w, _) = projection.extent();
        let (east, _) = projection.project_relative(180.0, 0.0).unwrap();
        let (west, _) = projection.project_relative(-200.0, 0.0).unwrap();
        assert!(close(east, w, 1e-6));
        assert!(close(west, 0.0, 1e-6));
        assert_eq!(projection.project_relative(f64::NAN, 0.0), None);
    }

    #[test]
    fn test_robinson_table_endpoints() {
        assert_eq!(robinson_factors(0.0), (1.0, 0.0));
        let (x_pole, y_pole) = robinson_factors(90.0);
        assert!(close(x_pole, 0.5322, 1e-9));
        assert!(close(y_pole, 1.0, 1e-9));
        let (x, y) = robinson_factors(2.5);
        assert!(close(x, 0.9993, 1e-9));
        assert!(close(y, 0.031, 1e-9));
    }
}

//! Triangulation of a projected grid for filled contours.
//!
//! Every grid cell is split into two triangles. Values are interpolated
//! linearly inside a triangle, so band edges run straight across it.

use ndarray::Array2;
use tracing::debug;

use crate::error::{GridMapError, Result};
use crate::map::backend::ProjectedGrid;
use crate::map::projection::{MapProjection, ProjectionKind};

/// A triangle in planar map coordinates with a value at each vertex
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub points: [(f64, f64); 3],
    pub values: [f64; 3],
}

impl Triangle {
    /// Interpolated value at `p`, `None` when `p` is outside
    pub fn value_at(&self, p: (f64, f64)) -> Option<f64> {
        let [a, b, c] = self.points;
        let weights = barycentric(p, a, b, c)?;
        if weights.iter().any(|&w| w < -1e-9) {
            return None;
        }
        Some(
            weights
                .iter()
                .zip(self.values.iter())
                .map(|(w, v)| w * v)
                .sum(),
        )
    }

    /// `(min_x, min_y, max_x, max_y)`
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        self.points.iter().fold(
            (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
            |(x0, y0, x1, y1), &(x, y)| (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        )
    }
}

/// Barycentric weights of `p` in triangle `abc`; `None` if it is degenerate
pub fn barycentric(p: (f64, f64), a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> Option<[f64; 3]> {
    let det = (b.1 - c.1) * (a.0 - c.0) + (c.0 - b.0) * (a.1 - c.1);
    if det.abs() < f64::EPSILON {
        return None;
    }
    let wa = ((b.1 - c.1) * (p.0 - c.0) + (c.0 - b.0) * (p.1 - c.1)) / det;
    let wb = ((c.1 - a.1) * (p.0 - c.0) + (a.0 - c.0) * (p.1 - c.1)) / det;
    Some([wa, wb, 1.0 - wa - wb])
}

#[derive(Debug, Clone, Default)]
pub struct Triangulation {
    pub triangles: Vec<Triangle>,
    /// Triangles dropped for missing values or hidden vertices
    pub skipped: usize,
}

/// Split the projected grid into value-carrying triangles.
///
/// Triangles with a `NaN` value or a hidden vertex are skipped. A triangle
/// that jumps across the map seam is redrawn twice, unwrapped once to the
/// eastern and once to the western edge.
pub fn triangulate(
    projection: &MapProjection,
    points: &ProjectedGrid,
    data: &Array2<f64>,
) -> Result<Triangulation> {
    if data.dim() != points.dim() {
        return Err(GridMapError::InvalidParameter {
            param: "data".to_string(),
            message: format!(
                "data shape {:?} does not match coordinate shape {:?}",
                data.dim(),
                points.dim()
            ),
        });
    }

    let (num_lon, num_lat) = points.dim();
    let half_width = projection.half_extent().0;
    let mut result = Triangulation::default();
    let mut seam_cells = 0usize;

    for i in 0..num_lon.saturating_sub(1) {
        for j in 0..num_lat.saturating_sub(1) {
            let corners = [(i, j), (i + 1, j), (i + 1, j + 1), (i, j + 1)];
            for tri in [[0, 1, 2], [0, 2, 3]] {
                let idx = tri.map(|k| corners[k]);
                let values = idx.map(|p| data[p]);
                let xy = idx.map(|p| (points.x[p], points.y[p]));

                if values.iter().any(|v| v.is_nan())
                    || xy.iter().any(|(x, y)| !x.is_finite() || !y.is_finite())
                {
                    result.skipped += 1;
                    continue;
                }

                let (min_x, max_x) = xy
                    .iter()
                    .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(x, _)| {
                        (lo.min(x), hi.max(x))
                    });

                if max_x - min_x <= half_width {
                    result.triangles.push(Triangle { points: xy, values });
                    continue;
                }

                if projection.kind == ProjectionKind::Orthographic {
                    result.skipped += 1;
                    continue;
                }

                seam_cells += 1;
                let vertices = idx.map(|p| EdgeVertex {
                    rel_lon: projection.relative_longitude(points.lon[p]),
                    lat: points.lat[p],
                    value: data[p],
                });
                for east in [true, false] {
                    let unwrapped = vertices.map(|v| EdgeVertex {
                        rel_lon: match (east, v.rel_lon < 0.0) {
                            (true, true) => v.rel_lon + 360.0,
                            (false, false) => v.rel_lon - 360.0,
                            _ => v.rel_lon,
                        },
                        ..v
                    });
                    let edge = if east { 180.0 } else { -180.0 };
                    let clipped = clip_at_edge(&unwrapped, edge, east);
                    result.triangles.extend(project_fan(projection, &clipped));
                }
            }
        }
    }

    debug!(
        triangles = result.triangles.len(),
        skipped = result.skipped,
        seam_triangles = seam_cells,
        "Triangulated projected grid"
    );
    Ok(result)
}

/// A triangle corner before projection, longitude relative to the center
#[derive(Debug, Clone, Copy, PartialEq)]
struct EdgeVertex {
    rel_lon: f64,
    lat: f64,
    value: f64,
}

impl EdgeVertex {
    fn lerp(self, other: EdgeVertex, t: f64) -> EdgeVertex {
        EdgeVertex {
            rel_lon: self.rel_lon + t * (other.rel_lon - self.rel_lon),
            lat: self.lat + t * (other.lat - self.lat),
            value: self.value + t * (other.value - self.value),
        }
    }
}

/// Cut an unwrapped triangle at the map edge `edge`, keeping the part on
/// the map side. Latitude and value are interpolated along cut sides.
fn clip_at_edge(vertices: &[EdgeVertex], edge: f64, keep_below: bool) -> Vec<EdgeVertex> {
    let inside = |v: &EdgeVertex| {
        if keep_below {
            v.rel_lon <= edge
        } else {
            v.rel_lon >= edge
        }
    };

    let mut clipped = Vec::with_capacity(vertices.len() + 1);
    for (k, current) in vertices.iter().enumerate() {
        let next = &vertices[(k + 1) % vertices.len()];
        if inside(current) {
            clipped.push(*current);
        }
        if inside(current) != inside(next) {
            let t = (edge - current.rel_lon) / (next.rel_lon - current.rel_lon);
            clipped.push(current.lerp(*next, t));
        }
    }
    clipped
}

/// Project a convex polygon and split it into a triangle fan. Slivers with
/// no longitude extent are dropped.
fn project_fan(projection: &MapProjection, polygon: &[EdgeVertex]) -> Vec<Triangle> {
    if polygon.len() < 3 {
        return Vec::new();
    }
    let (lo, hi) = polygon
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v.rel_lon), hi.max(v.rel_lon))
        });
    if hi - lo < 1e-9 {
        return Vec::new();
    }

    let projected: Option<Vec<(f64, f64)>> = polygon
        .iter()
        .map(|v| projection.project_relative(v.rel_lon, v.lat))
        .collect();
    let Some(projected) = projected else {
        return Vec::new();
    };

    (1..polygon.len() - 1)
        .map(|k| Triangle {
            points: [projected[0], projected[k], projected[k + 1]],
            values: [polygon[0].value, polygon[k].value, polygon[k + 1].value],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(projection: &MapProjection, lons: &[f64], lats: &[f64]) -> ProjectedGrid {
        let lon = Array2::from_shape_fn((lons.len(), lats.len()), |(i, _)| lons[i]);
        let lat = Array2::from_shape_fn((lons.len(), lats.len()), |(_, j)| lats[j]);
        let (x, y) = projection.project_arrays(&lon, &lat).unwrap();
        ProjectedGrid { lon, lat, x, y }
    }

    #[test]
    fn test_barycentric_vertices() {
        let a = (0.0, 0.0);
        let b = (1.0, 0.0);
        let c = (0.0, 1.0);
        assert_eq!(barycentric(a, a, b, c), Some([1.0, 0.0, 0.0]));
        assert_eq!(barycentric((0.0, 0.0), a, a, a), None);

        let tri = Triangle {
            points: [a, b, c],
            values: [0.0, 1.0, 2.0],
        };
        let mid = tri.value_at((0.25, 0.25)).unwrap();
        assert!((mid - 0.75).abs() < 1e-12);
        assert_eq!(tri.value_at((1.0, 1.0)), None);
        assert_eq!(tri.bounds(), (0.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn test_two_triangles_per_cell() {
        let projection = MapProjection::from_name("cyl", 0.0, 0.0).unwrap();
        let points = project(&projection, &[-10.0, 0.0, 10.0], &[-5.0, 5.0]);
        let data = Array2::from_elem((3, 2), 1.0);

        let result = triangulate(&projection, &points, &data).unwrap();
        assert_eq!(result.triangles.len(), 4);
        assert_eq!(result.skipped, 0);
    }

    #[test]
    fn test_missing_values_skip_triangles() {
        let projection = MapProjection::from_name("cyl", 0.0, 0.0).unwrap();
        let points = project(&projection, &[-10.0, 0.0, 10.0], &[-5.0, 5.0]);
        let mut data = Array2::from_elem((3, 2), 1.0);
        data[[0, 0]] = f64::NAN;

        let result = triangulate(&projection, &points, &data).unwrap();
        assert_eq!(result.triangles.len(), 2);
        assert_eq!(result.skipped, 2);
    }

    #[test]
    fn test_seam_cells_are_unwrapped() {
        let projection = MapProjection::from_name("cyl", 0.0, 0.0).unwrap();
        // 180 wraps to the western edge, so the cell 170..180 crosses the seam
        let points = project(&projection, &[170.0, 180.0], &[-5.0, 5.0]);
        let data = Array2::from_elem((2, 2), 1.0);

        let result = triangulate(&projection, &points, &data).unwrap();
        // The western copy has no area left once cut at the edge
        assert_eq!(result.triangles.len(), 2);

        let (width, _) = projection.extent();
        for tri in &result.triangles {
            let (x0, _, x1, _) = tri.bounds();
            assert!(x1 - x0 <= width / 2.0);
        }
    }

    #[test]
    fn test_seam_cells_are_cut_at_the_edge() {
        let projection = MapProjection::from_name("cyl", 0.0, 0.0).unwrap();
        let points = project(&projection, &[170.0, 190.0], &[-5.0, 5.0]);
        let mut data = Array2::from_elem((2, 2), 0.0);
        data[[1, 0]] = 1.0;
        data[[1, 1]] = 1.0;

        let result = triangulate(&projection, &points, &data).unwrap();
        assert!(result.triangles.len() >= 4);

        let (width, _) = projection.extent();
        let mut edge_vertices = 0;
        for tri in &result.triangles {
            for (&(x, _), &value) in tri.points.iter().zip(tri.values.iter()) {
                assert!((0.0..=1.0).contains(&value));
                if x.abs() < 1.0 || (x - width).abs() < 1.0 {
                    // 180 is halfway between 170 and 190
                    assert!((value - 0.5).abs() < 1e-9, "edge value {}", value);
                    edge_vertices += 1;
                }
            }
        }
        assert!(edge_vertices >= 4);
    }

    #[test]
    fn test_clip_at_edge_interpolates() {
        let vertices = [
            EdgeVertex { rel_lon: 170.0, lat: 0.0, value: 0.0 },
            EdgeVertex { rel_lon: 190.0, lat: 0.0, value: 2.0 },
            EdgeVertex { rel_lon: 190.0, lat: 10.0, value: 2.0 },
        ];
        let clipped = clip_at_edge(&vertices, 180.0, true);
        assert_eq!(clipped.len(), 3);
        assert_eq!(clipped[0], vertices[0]);
        assert_eq!(clipped[1], EdgeVertex { rel_lon: 180.0, lat: 0.0, value: 1.0 });
        assert_eq!(clipped[2], EdgeVertex { rel_lon: 180.0, lat: 5.0, value: 1.0 });

        let other_side = clip_at_edge(&vertices, 180.0, false);
        assert_eq!(other_side.len(), 4);
    }

    #[test]
    fn test_shape_mismatch() {
        let projection = MapProjection::from_name("cyl", 0.0, 0.0).unwrap();
        let points = project(&projection, &[0.0, 10.0], &[0.0, 10.0]);
        let data = Array2::from_elem((3, 2), 1.0);
        assert!(triangulate(&projection, &points, &data).is_err());
    }
}

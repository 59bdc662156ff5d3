//! The in-memory lon/lat grid.
//!
//! A [`Grid`] holds three aligned `(num_lon, num_lat)` arrays. Longitude is
//! the slow axis (rows), latitude the fast axis (columns), which is the
//! layout a lon-major presorted file reshapes into.

use ndarray::Array2;

use crate::error::{GridAxis, GridMapError, Result};

/// A regular lon/lat grid of data values
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    /// Longitude of every grid point, indexed `[lon_index, lat_index]`
    pub lon: Array2<f64>,
    /// Latitude of every grid point, indexed `[lon_index, lat_index]`
    pub lat: Array2<f64>,
    /// Data value of every grid point (`NaN` marks a missing value)
    pub data: Array2<f64>,
}

impl Grid {
    /// Build a grid from three arrays, checking that their shapes agree.
    pub fn new(lon: Array2<f64>, lat: Array2<f64>, data: Array2<f64>) -> Result<Self> {
        if lon.shape() != lat.shape() || lon.shape() != data.shape() {
            return Err(GridMapError::InvalidParameter {
                param: "grid".to_string(),
                message: format!(
                    "lon {:?}, lat {:?} and data {:?} arrays must have the same shape",
                    lon.shape(),
                    lat.shape(),
                    data.shape()
                ),
            });
        }
        Ok(Self { lon, lat, data })
    }

    /// Grid dimensions as `(num_lon, num_lat)`
    pub fn shape(&self) -> (usize, usize) {
        self.lon.dim()
    }

    pub fn num_lon(&self) -> usize {
        self.lon.nrows()
    }

    pub fn num_lat(&self) -> usize {
        self.lon.ncols()
    }

    /// The distinct longitudes, one per row
    pub fn lon_values(&self) -> Vec<f64> {
        self.lon.column(0).to_vec()
    }

    /// The distinct latitudes, one per column
    pub fn lat_values(&self) -> Vec<f64> {
        self.lat.row(0).to_vec()
    }

    /// Data value at a grid index, if in bounds
    pub fn value_at(&self, lon_index: usize, lat_index: usize) -> Option<f64> {
        self.data.get((lon_index, lat_index)).copied()
    }

    /// Minimum and maximum of the finite data values, `None` if every value
    /// is missing
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.data
            .iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Number of missing (`NaN`) data values
    pub fn missing_count(&self) -> usize {
        self.data.iter().filter(|v| v.is_nan()).count()
    }

    /// Check that the reshape preserved lon-major ordering.
    ///
    /// The first pair compared is `lon[0][0]` against `lon[0][1]`: a file
    /// sorted by latitude first makes them differ. After that every row of
    /// `lon` and every column of `lat` must be constant.
    pub fn validate_ordering(&self) -> Result<()> {
        let (num_lon, num_lat) = self.shape();
        if num_lon == 0 || num_lat == 0 {
            return Err(GridMapError::EmptyGrid);
        }

        for i in 0..num_lon {
            let expected = self.lon[[i, 0]];
            for j in 1..num_lat {
                let found = self.lon[[i, j]];
                if found != expected {
                    return Err(GridMapError::GridOrdering {
                        axis: GridAxis::Lon,
                        position: (i, j),
                        expected,
                        found,
                    });
                }
            }
        }

        for j in 0..num_lat {
            let expected = self.lat[[0, j]];
            for i in 1..num_lon {
                let found = self.lat[[i, j]];
                if found != expected {
                    return Err(GridMapError::GridOrdering {
                        axis: GridAxis::Lat,
                        position: (i, j),
                        expected,
                        found,
                    });
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn sample_grid() -> Grid {
        Grid::new(
            array![[0.0, 0.0], [10.0, 10.0], [20.0, 20.0]],
            array![[-5.0, 5.0], [-5.0, 5.0], [-5.0, 5.0]],
            array![[1.0, 2.0], [3.0, f64::NAN], [5.0, 6.0]],
        )
        .unwrap()
    }

    #[test]
    fn test_shape_accessors() {
        let grid = sample_grid();
        assert_eq!(grid.shape(), (3, 2));
        assert_eq!(grid.num_lon(), 3);
        assert_eq!(grid.num_lat(), 2);
        assert_eq!(grid.lon_values(), vec![0.0, 10.0, 20.0]);
        assert_eq!(grid.lat_values(), vec![-5.0, 5.0]);
        assert_eq!(grid.value_at(2, 1), Some(6.0));
        assert_eq!(grid.value_at(3, 0), None);
    }

    #[test]
    fn test_value_range_skips_missing() {
        let grid = sample_grid();
        assert_eq!(grid.value_range(), Some((1.0, 6.0)));
        assert_eq!(grid.missing_count(), 1);
    }

    #[test]
    fn test_mismatched_shapes_rejected() {
        let result = Grid::new(
            array![[0.0, 0.0]],
            array![[0.0], [1.0]],
            array![[0.0, 0.0]],
        );
        assert!(matches!(
            result,
            Err(GridMapError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_ordering_passes_for_lon_major() {
        assert!(sample_grid().validate_ordering().is_ok());
    }

    #[test]
    fn test_ordering_fails_on_first_pair() {
        // Sorted by lat first: lon varies fastest
        let grid = Grid::new(
            array![[0.0, 10.0], [20.0, 0.0], [10.0, 20.0]],
            array![[-5.0, -5.0], [-5.0, 5.0], [5.0, 5.0]],
            array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]],
        )
        .unwrap();

        match grid.validate_ordering() {
            Err(GridMapError::GridOrdering {
                axis,
                position,
                expected,
                found,
            }) => {
                assert_eq!(axis, GridAxis::Lon);
                assert_eq!(position, (0, 1));
                assert_eq!(expected, 0.0);
                assert_eq!(found, 10.0);
            }
            other => panic!("Expected GridOrdering error, got {:?}", other),
        }
    }

    #[test]
    fn test_ordering_fails_on_latitude_column() {
        let grid = Grid::new(
            array![[0.0, 0.0], [10.0, 10.0]],
            array![[-5.0, 5.0], [5.0, -5.0]],
            array![[1.0, 2.0], [3.0, 4.0]],
        )
        .unwrap();

        match grid.validate_ordering() {
            Err(GridMapError::GridOrdering { axis, position, .. }) => {
                assert_eq!(axis, GridAxis::Lat);
                assert_eq!(position, (1, 0));
            }
            other => panic!("Expected GridOrdering error, got {:?}", other),
        }
    }

    #[test]
    fn test_single_latitude_grid_is_ordered() {
        let grid = Grid::new(
            array![[0.0], [10.0]],
            array![[0.0], [0.0]],
            array![[1.0], [2.0]],
        )
        .unwrap();
        assert!(grid.validate_ordering().is_ok());
    }
}

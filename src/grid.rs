// Copyright 2024 Mikael Lund
//
// Licensed under the Apache license, version 2.0 (the "license");
// you may not use this file except in compliance with the license.
// You may obtain a copy of the license at
//
//     http://www.apache.org/licenses/license-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the license is distributed on an "as is" basis,
// without warranties or conditions of any kind, either express or implied.
// See the license for the specific language governing permissions and
// limitations under the license.

//! ## Uniform grids
//!
//! Structured cube grids spanned by an origin and three step vectors,
//! as written to and read from cube files.

use crate::error::check_length;
use crate::{Cell, Error, Matrix3, Result, Vector3};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Structured grid of `n0·n1·n2` points, `origin + i0·s0 + i1·s1 + i2·s2`.
///
/// Points are enumerated with axis 2 running fastest and axis 0 slowest,
/// i.e. the flat index is `(i0·n1 + i1)·n2 + i2`. Output buffers of
/// [`eval_spline_cube`](crate::eval_spline_cube) follow the same order.
///
/// Axes flagged in `pbc` are periodic with lattice vector `nᵢ·sᵢ`; see [`UniformGrid::get_cell`].
///
/// # Examples
/// ```
/// use radialfield::{Matrix3, UniformGrid, Vector3};
/// let grid = UniformGrid::new(
///     Vector3::new(-1.0, 0.0, 0.0),
///     Matrix3::from_diagonal_element(0.5),
///     [2, 3, 4],
///     [false; 3],
/// ).unwrap();
/// assert_eq!(grid.npoint(), 24);
/// assert_eq!(grid.index(7), [0, 1, 3]);
/// assert_eq!(grid.point([0, 1, 3]), Vector3::new(-1.0, 0.5, 1.5));
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Deserialize, Serialize),
    serde(try_from = "GridData", into = "GridData")
)]
pub struct UniformGrid {
    origin: Vector3,
    /// Step vectors as rows
    grid_rvecs: Matrix3,
    shape: [usize; 3],
    pbc: [bool; 3],
}

impl UniformGrid {
    /// Create a grid; fails with [`Error::DegenerateGrid`] if the step vectors do not span space.
    pub fn new(
        origin: Vector3,
        grid_rvecs: Matrix3,
        shape: [usize; 3],
        pbc: [bool; 3],
    ) -> Result<Self> {
        let grid = Self {
            origin,
            grid_rvecs,
            shape,
            pbc,
        };
        grid.validate()?;
        Ok(grid)
    }

    /// Check that the step vectors are finite and linearly independent
    pub fn validate(&self) -> Result<()> {
        let finite = self.origin.iter().chain(self.grid_rvecs.iter()).all(|x| x.is_finite());
        let scale = (0..3).map(|i| self.step(i).norm()).product::<f64>();
        if !finite || !(self.grid_rvecs.determinant().abs() > 1e-12 * scale) {
            return Err(Error::DegenerateGrid);
        }
        if (0..3).any(|i| self.pbc[i] && self.shape[i] == 0) {
            return Err(Error::InvalidCell(
                "periodic grid axis without points".to_string(),
            ));
        }
        Ok(())
    }

    pub fn origin(&self) -> &Vector3 {
        &self.origin
    }

    /// Step vectors as matrix rows
    pub fn grid_rvecs(&self) -> &Matrix3 {
        &self.grid_rvecs
    }

    /// Step vector along `axis`
    pub fn step(&self, axis: usize) -> Vector3 {
        self.grid_rvecs.row(axis).transpose()
    }

    /// Number of points along each axis
    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    /// Periodic axes
    pub fn pbc(&self) -> [bool; 3] {
        self.pbc
    }

    /// Total number of grid points
    pub fn npoint(&self) -> usize {
        self.shape.iter().product()
    }

    /// Volume of one grid cell
    pub fn volume_element(&self) -> f64 {
        self.grid_rvecs.determinant().abs()
    }

    /// Flat position of grid index `[i0, i1, i2]`
    #[inline]
    pub fn flat_index(&self, index: [usize; 3]) -> usize {
        (index[0] * self.shape[1] + index[1]) * self.shape[2] + index[2]
    }

    /// Grid index `[i0, i1, i2]` of flat position `flat`
    #[inline]
    pub fn index(&self, flat: usize) -> [usize; 3] {
        let i2 = flat % self.shape[2];
        let rest = flat / self.shape[2];
        [rest / self.shape[1], rest % self.shape[1], i2]
    }

    /// Cartesian position of grid index `[i0, i1, i2]`
    #[inline]
    pub fn point(&self, index: [usize; 3]) -> Vector3 {
        self.origin
            + index[0] as f64 * self.step(0)
            + index[1] as f64 * self.step(1)
            + index[2] as f64 * self.step(2)
    }

    /// All grid points in flat order
    pub fn points(&self) -> impl ExactSizeIterator<Item = Vector3> + '_ {
        (0..self.npoint()).map(move |flat| self.point(self.index(flat)))
    }

    /// Periodic cell implied by the grid: lattice vector `nᵢ·sᵢ` for every periodic axis
    pub fn get_cell(&self) -> Result<Cell> {
        let rvecs: Vec<Vector3> = (0..3)
            .filter(|&i| self.pbc[i])
            .map(|i| self.shape[i] as f64 * self.step(i))
            .collect();
        Cell::new(&rvecs)
    }

    /// Integral of sampled `data` over the grid, Σ f · ΔV
    pub fn integrate(&self, data: &[f64]) -> Result<f64> {
        check_length(self.npoint(), data.len())?;
        Ok(data.iter().sum::<f64>() * self.volume_element())
    }
}

/// Serialized form of a grid, validated on load
#[cfg(feature = "serde")]
#[derive(Deserialize, Serialize)]
struct GridData {
    origin: Vector3,
    grid_rvecs: Matrix3,
    shape: [usize; 3],
    #[serde(default)]
    pbc: [bool; 3],
}

#[cfg(feature = "serde")]
impl TryFrom<GridData> for UniformGrid {
    type Error = Error;
    fn try_from(data: GridData) -> Result<Self> {
        Self::new(data.origin, data.grid_rvecs, data.shape, data.pbc)
    }
}

#[cfg(feature = "serde")]
impl From<UniformGrid> for GridData {
    fn from(grid: UniformGrid) -> Self {
        Self {
            origin: grid.origin,
            grid_rvecs: grid.grid_rvecs,
            shape: grid.shape,
            pbc: grid.pbc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn skewed_grid(pbc: [bool; 3]) -> UniformGrid {
        UniformGrid::new(
            Vector3::new(0.5, -1.0, 2.0),
            Matrix3::new(0.2, 0.0, 0.0, 0.05, 0.25, 0.0, 0.0, 0.02, 0.3),
            [4, 5, 6],
            pbc,
        )
        .unwrap()
    }

    #[test]
    fn test_enumeration_order() {
        let grid = skewed_grid([false; 3]);
        assert_eq!(grid.npoint(), 120);
        let mut flat = 0;
        for i0 in 0..4 {
            for i1 in 0..5 {
                for i2 in 0..6 {
                    assert_eq!(grid.flat_index([i0, i1, i2]), flat);
                    assert_eq!(grid.index(flat), [i0, i1, i2]);
                    flat += 1;
                }
            }
        }
        let points: Vec<Vector3> = grid.points().collect();
        assert_eq!(points.len(), 120);
        assert_eq!(points[0], *grid.origin());
        assert_relative_eq!(points[1], grid.origin() + grid.step(2));
        assert_relative_eq!(points[6], grid.origin() + grid.step(1));
        assert_relative_eq!(points[30], grid.origin() + grid.step(0));
    }

    #[test]
    fn test_get_cell() {
        let grid = skewed_grid([true, false, true]);
        let cell = grid.get_cell().unwrap();
        assert_eq!(cell.rank(), 2);
        assert_relative_eq!(cell.rvecs()[0], 4.0 * grid.step(0));
        assert_relative_eq!(cell.rvecs()[1], 6.0 * grid.step(2));
        assert_eq!(skewed_grid([false; 3]).get_cell().unwrap().rank(), 0);
    }

    #[test]
    fn test_integrate() {
        let grid = skewed_grid([false; 3]);
        let ones = vec![1.0; grid.npoint()];
        assert_relative_eq!(
            grid.integrate(&ones).unwrap(),
            120.0 * 0.2 * 0.25 * 0.3,
            max_relative = 1e-12
        );
        assert_eq!(
            grid.integrate(&ones[1..]),
            Err(Error::LengthMismatch {
                expected: 120,
                found: 119
            })
        );
    }

    #[test]
    fn test_degenerate() {
        let coplanar = Matrix3::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0);
        assert_eq!(
            UniformGrid::new(Vector3::zeros(), coplanar, [2, 2, 2], [false; 3]),
            Err(Error::DegenerateGrid)
        );
        assert_eq!(
            UniformGrid::new(Vector3::zeros(), Matrix3::zeros(), [2, 2, 2], [false; 3]),
            Err(Error::DegenerateGrid)
        );
        let nan = Matrix3::from_diagonal_element(f64::NAN);
        assert!(UniformGrid::new(Vector3::zeros(), nan, [2, 2, 2], [false; 3]).is_err());
        assert!(UniformGrid::new(
            Vector3::zeros(),
            Matrix3::identity(),
            [0, 2, 2],
            [true, false, false]
        )
        .is_err());
    }

    #[test]
    fn test_empty_grid() {
        let grid = UniformGrid::new(Vector3::zeros(), Matrix3::identity(), [3, 0, 2], [false; 3])
            .unwrap();
        assert_eq!(grid.npoint(), 0);
        assert_eq!(grid.points().count(), 0);
    }
}

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

//! ## Periodic cells
//!
//! A [`Cell`] holds zero to three lattice vectors 𝐫ᵢ and the matching reciprocal
//! vectors 𝐠ⱼ with 𝐫ᵢ·𝐠ⱼ = δᵢⱼ. Displacements are reduced to their shortest
//! periodic image with [`Cell::mic`].

use crate::{Error, Matrix3, Result, Vector3};
use itertools::iproduct;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Relative tolerance for linear dependence and orthogonality tests
const TOLERANCE: f64 = 1e-12;

/// Lattice with 0, 1, 2 or 3 periodic directions.
///
/// For ranks below three, the lattice vectors are completed internally with
/// orthonormal vectors so that fractional coordinates are always defined;
/// the completion vectors are never used for periodic reduction.
///
/// # Examples
/// ```
/// use radialfield::{Cell, Vector3};
/// let cell = Cell::cubic(10.0);
/// let delta = Vector3::new(12.0, -9.0, 4.0);
/// assert_eq!(cell.mic(&delta), Vector3::new(2.0, 1.0, 4.0));
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Deserialize, Serialize),
    serde(try_from = "CellData", into = "CellData")
)]
pub struct Cell {
    /// Number of periodic directions
    rank: usize,
    /// Lattice vectors, completed to a basis
    rvecs: [Vector3; 3],
    /// Reciprocal vectors, rᵢ·gⱼ = δᵢⱼ (no factor 2π)
    gvecs: [Vector3; 3],
    /// Rounding alone yields the minimum image
    orthogonal: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self::non_periodic()
    }
}

impl Cell {
    /// Create a cell from up to three linearly independent lattice vectors.
    pub fn new(rvecs: &[Vector3]) -> Result<Self> {
        let rank = rvecs.len();
        if rank > 3 {
            return Err(Error::InvalidCell(format!(
                "at most 3 lattice vectors allowed, got {rank}"
            )));
        }
        if rvecs.iter().any(|r| !r.iter().all(|x| x.is_finite())) {
            return Err(Error::InvalidCell(
                "lattice vectors must be finite".to_string(),
            ));
        }
        let basis = Self::complete_basis(rvecs);
        let matrix = Matrix3::from_rows(&[
            basis[0].transpose(),
            basis[1].transpose(),
            basis[2].transpose(),
        ]);
        let scale = basis.iter().map(|r| r.norm()).product::<f64>();
        if !(matrix.determinant().abs() > TOLERANCE * scale) {
            return Err(Error::InvalidCell(
                "lattice vectors are linearly dependent".to_string(),
            ));
        }
        let inverse = matrix
            .try_inverse()
            .ok_or_else(|| Error::InvalidCell("singular lattice".to_string()))?;
        let gvecs = [
            inverse.column(0).into_owned(),
            inverse.column(1).into_owned(),
            inverse.column(2).into_owned(),
        ];
        let orthogonal = iproduct!(0..rank, 0..rank)
            .filter(|(i, j)| i < j)
            .all(|(i, j)| {
                basis[i].dot(&basis[j]).abs() <= TOLERANCE * basis[i].norm() * basis[j].norm()
            });
        Ok(Self {
            rank,
            rvecs: basis,
            gvecs,
            orthogonal,
        })
    }

    /// Cell without periodicity; the minimum image is the displacement itself
    pub fn non_periodic() -> Self {
        Self {
            rank: 0,
            rvecs: [Vector3::x(), Vector3::y(), Vector3::z()],
            gvecs: [Vector3::x(), Vector3::y(), Vector3::z()],
            orthogonal: true,
        }
    }

    /// Cubic cell with side length `length`
    ///
    /// # Panics
    /// Panics if `length` is not finite and positive
    pub fn cubic(length: f64) -> Self {
        Self::new(&[
            Vector3::new(length, 0.0, 0.0),
            Vector3::new(0.0, length, 0.0),
            Vector3::new(0.0, 0.0, length),
        ])
        .expect("cubic cell needs a finite, positive side length")
    }

    /// Add orthonormal vectors until three directions are spanned
    fn complete_basis(rvecs: &[Vector3]) -> [Vector3; 3] {
        match rvecs {
            [] => [Vector3::x(), Vector3::y(), Vector3::z()],
            [r0] => {
                // axis least aligned with r0
                let axis = [Vector3::x(), Vector3::y(), Vector3::z()]
                    .into_iter()
                    .min_by(|a, b| a.dot(r0).abs().total_cmp(&b.dot(r0).abs()))
                    .unwrap_or_else(Vector3::x);
                let u = r0.cross(&axis).normalize();
                let v = r0.cross(&u).normalize();
                [*r0, u, v]
            }
            [r0, r1] => [*r0, *r1, r0.cross(r1).normalize()],
            _ => [rvecs[0], rvecs[1], rvecs[2]],
        }
    }

    /// Number of periodic directions, 0–3
    pub const fn rank(&self) -> usize {
        self.rank
    }

    /// Periodic lattice vectors
    pub fn rvecs(&self) -> &[Vector3] {
        &self.rvecs[..self.rank]
    }

    /// Reciprocal vectors of the periodic directions
    pub fn gvecs(&self) -> &[Vector3] {
        &self.gvecs[..self.rank]
    }

    /// Length, area or volume of the periodic unit, depending on the rank.
    /// Zero for a non-periodic cell.
    pub fn volume(&self) -> f64 {
        match self.rank {
            0 => 0.0,
            1 => self.rvecs[0].norm(),
            2 => self.rvecs[0].cross(&self.rvecs[1]).norm(),
            _ => self.rvecs[0].dot(&self.rvecs[1].cross(&self.rvecs[2])).abs(),
        }
    }

    /// Fractional coordinates with respect to the completed basis
    pub fn to_frac(&self, cart: &Vector3) -> Vector3 {
        Vector3::new(
            self.gvecs[0].dot(cart),
            self.gvecs[1].dot(cart),
            self.gvecs[2].dot(cart),
        )
    }

    /// Cartesian coordinates from fractional coordinates of the completed basis
    pub fn to_cart(&self, frac: &Vector3) -> Vector3 {
        self.rvecs[0] * frac.x + self.rvecs[1] * frac.y + self.rvecs[2] * frac.z
    }

    /// Subtract the nearest integer number of lattice vectors along each periodic direction.
    ///
    /// This is the minimum image for orthogonal lattices, and a close approximation otherwise.
    /// Halves are rounded away from zero.
    pub fn wrap(&self, delta: &Vector3) -> Vector3 {
        (0..self.rank).fold(*delta, |wrapped, i| {
            wrapped - self.gvecs[i].dot(delta).round() * self.rvecs[i]
        })
    }

    /// Shortest periodic image of the displacement `delta`.
    ///
    /// After [`Cell::wrap`], the ±1 neighbour images along all periodic directions
    /// are inspected and the strictly shortest is kept, so that equidistant images
    /// resolve to the wrapped one. Non-periodic components pass through unchanged.
    pub fn mic(&self, delta: &Vector3) -> Vector3 {
        if self.rank == 0 {
            return *delta;
        }
        let wrapped = self.wrap(delta);
        if self.orthogonal {
            return wrapped;
        }
        let shifts = |i: usize| -> RangeInclusive<i32> {
            if i < self.rank {
                -1..=1
            } else {
                0..=0
            }
        };
        let mut best = wrapped;
        let mut best_norm = wrapped.norm_squared();
        for (a, b, c) in iproduct!(shifts(0), shifts(1), shifts(2)) {
            if (a, b, c) == (0, 0, 0) {
                continue;
            }
            let image = wrapped
                + f64::from(a) * self.rvecs[0]
                + f64::from(b) * self.rvecs[1]
                + f64::from(c) * self.rvecs[2];
            let norm = image.norm_squared();
            if norm < best_norm {
                best = image;
                best_norm = norm;
            }
        }
        best
    }

    /// Distance between two points under the minimum image convention
    #[inline]
    pub fn distance(&self, a: &Vector3, b: &Vector3) -> f64 {
        self.mic(&(a - b)).norm()
    }
}

/// Serialized form of a cell; reciprocal vectors are rebuilt on load
#[cfg(feature = "serde")]
#[derive(Deserialize, Serialize)]
struct CellData {
    rvecs: Vec<Vector3>,
}

#[cfg(feature = "serde")]
impl TryFrom<CellData> for Cell {
    type Error = Error;
    fn try_from(data: CellData) -> Result<Self> {
        Self::new(&data.rvecs)
    }
}

#[cfg(feature = "serde")]
impl From<Cell> for CellData {
    fn from(cell: Cell) -> Self {
        Self {
            rvecs: cell.rvecs().to_vec(),
        }
    }
}

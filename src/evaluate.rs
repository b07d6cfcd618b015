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

//! ## Evaluation of radial functions on grids
//!
//! For every output point, the displacement from the center is reduced to its
//! minimum image, and the radial function is evaluated at the resulting distance.
//!
//! - [`eval_spline_cube`]: structured [`UniformGrid`], periodic along the grid's own `pbc` axes
//! - [`eval_spline_grid`]: arbitrary points under an explicit [`Cell`]
//! - [`eval_decomposition_grid`]: sum of several centered functions, see [`SplineSet`]
//!
//! All argument checks happen before the first write to `output`; when a call
//! fails, the buffer is left untouched. Output points are independent, so with the
//! `rayon` feature they are distributed over threads. Results do not depend on
//! the number of threads. Long evaluations can be split by passing sub-slices of
//! `points` and `output`.

use crate::error::check_length;
use crate::{Cell, Error, RadialFunction, Result, UniformGrid, Vector3};
#[cfg(feature = "rayon")]
use rayon::prelude::*;
use tracing::debug;

/// Value of `function` centered at `center`, seen from `point`
#[inline]
fn radial_value<S: RadialFunction + ?Sized>(
    function: &S,
    center: &Vector3,
    point: &Vector3,
    cell: &Cell,
) -> f64 {
    function.value(cell.mic(&(point - center)).norm())
}

/// Write `f(point)` into the matching output slot
fn fill<F>(output: &mut [f64], points: &[Vector3], f: F)
where
    F: Fn(&Vector3) -> f64 + Sync + Send,
{
    #[cfg(feature = "rayon")]
    output
        .par_iter_mut()
        .zip(points.par_iter())
        .for_each(|(value, point)| *value = f(point));
    #[cfg(not(feature = "rayon"))]
    output
        .iter_mut()
        .zip(points)
        .for_each(|(value, point)| *value = f(point));
}

/// Evaluate a radial function on all points of a uniform grid.
///
/// `output` is ordered like [`UniformGrid::points`]: axis 2 fastest, axis 0 slowest.
/// Periodicity is taken from the grid itself ([`UniformGrid::get_cell`]).
///
/// # Errors
/// [`Error::LengthMismatch`] if `output` does not hold one value per grid point,
/// [`Error::DegenerateGrid`] if the step vectors do not span space.
pub fn eval_spline_cube<S: RadialFunction + ?Sized>(
    spline: &S,
    center: &Vector3,
    output: &mut [f64],
    grid: &UniformGrid,
) -> Result<()> {
    grid.validate()?;
    check_length(grid.npoint(), output.len())?;
    let cell = grid.get_cell()?;
    debug!(
        npoint = grid.npoint(),
        shape = ?grid.shape(),
        rank = cell.rank(),
        "evaluating radial function on uniform grid"
    );
    if output.is_empty() {
        return Ok(());
    }

    // One row per (i0, i1); the row origin is shared by all points along axis 2
    let [_, n1, n2] = grid.shape();
    let fill_row = |(row, values): (usize, &mut [f64])| {
        let row_origin =
            grid.origin() + (row / n1) as f64 * grid.step(0) + (row % n1) as f64 * grid.step(1);
        let step = grid.step(2);
        for (i2, value) in values.iter_mut().enumerate() {
            let point = row_origin + i2 as f64 * step;
            *value = radial_value(spline, center, &point, &cell);
        }
    };
    #[cfg(feature = "rayon")]
    output.par_chunks_mut(n2).enumerate().for_each(fill_row);
    #[cfg(not(feature = "rayon"))]
    output.chunks_mut(n2).enumerate().for_each(fill_row);
    Ok(())
}

/// Evaluate a radial function on an arbitrary list of points.
///
/// `output[i]` receives the value at `points[i]`.
///
/// # Errors
/// [`Error::LengthMismatch`] if `output` and `points` differ in length.
pub fn eval_spline_grid<S: RadialFunction + ?Sized>(
    spline: &S,
    center: &Vector3,
    output: &mut [f64],
    points: &[Vector3],
    cell: &Cell,
) -> Result<()> {
    check_length(points.len(), output.len())?;
    debug!(
        npoint = points.len(),
        rank = cell.rank(),
        "evaluating radial function on points"
    );
    fill(output, points, |point| {
        radial_value(spline, center, point, cell)
    });
    Ok(())
}

/// Evaluate the sum of several centered radial functions on a list of points.
///
/// `splines[k]` is centered at `centers[k]`. See [`SplineSet::evaluate`].
///
/// # Errors
/// [`Error::SplineCenterMismatch`] if `splines` and `centers` differ in length,
/// [`Error::LengthMismatch`] if `output` and `points` differ in length.
pub fn eval_decomposition_grid<S: RadialFunction + ?Sized>(
    splines: &[&S],
    centers: &[Vector3],
    output: &mut [f64],
    points: &[Vector3],
    cell: &Cell,
) -> Result<()> {
    SplineSet::new(splines.to_vec(), centers.to_vec())?.evaluate(output, points, cell)
}

/// Radial functions paired one to one with their centers, e.g. one per atom.
///
/// # Examples
/// ```
/// use radialfield::{Cell, CubicSpline, RTransform, SplineSet, Vector3};
/// let spline = CubicSpline::new(
///     RTransform::linear(0.0, 2.0, 3).unwrap(),
///     vec![1.0, 0.5, 0.0],
///     vec![-0.5; 3],
///     Default::default(),
/// ).unwrap();
///
/// let atoms = SplineSet::from_pairs([
///     (&spline, Vector3::new(0.0, 0.0, 0.0)),
///     (&spline, Vector3::new(1.0, 0.0, 0.0)),
/// ]);
/// let points = [Vector3::new(0.5, 0.0, 0.0)];
/// let mut density = [0.0];
/// atoms.evaluate(&mut density, &points, &Cell::non_periodic()).unwrap();
/// assert!((density[0] - 1.5).abs() < 1e-12);
/// ```
#[derive(Debug)]
pub struct SplineSet<'a, S: ?Sized> {
    splines: Vec<&'a S>,
    centers: Vec<Vector3>,
}

impl<S: ?Sized> Clone for SplineSet<'_, S> {
    fn clone(&self) -> Self {
        Self {
            splines: self.splines.clone(),
            centers: self.centers.clone(),
        }
    }
}

impl<'a, S: RadialFunction + ?Sized> SplineSet<'a, S> {
    /// Pair `splines[k]` with `centers[k]`; fails unless both have the same length
    pub fn new(splines: Vec<&'a S>, centers: Vec<Vector3>) -> Result<Self> {
        if splines.len() != centers.len() {
            return Err(Error::SplineCenterMismatch {
                splines: splines.len(),
                centers: centers.len(),
            });
        }
        Ok(Self { splines, centers })
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (&'a S, Vector3)>) -> Self {
        let (splines, centers) = pairs.into_iter().unzip();
        Self { splines, centers }
    }

    /// Number of (spline, center) pairs
    pub fn len(&self) -> usize {
        self.splines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.splines.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a S, &Vector3)> + '_ {
        self.splines.iter().copied().zip(self.centers.iter())
    }

    /// Sum of all contributions at `point`, accumulated in pair order starting from zero
    #[inline]
    pub fn value(&self, point: &Vector3, cell: &Cell) -> f64 {
        self.iter().fold(0.0, |sum, (spline, center)| {
            sum + radial_value(spline, center, point, cell)
        })
    }

    /// Evaluate the summed field on a list of points.
    ///
    /// Each slot is accumulated independently, so the result equals evaluating every
    /// pair with [`eval_spline_grid`] and adding the buffers in pair order.
    ///
    /// # Errors
    /// [`Error::LengthMismatch`] if `output` and `points` differ in length.
    pub fn evaluate(&self, output: &mut [f64], points: &[Vector3], cell: &Cell) -> Result<()> {
        check_length(points.len(), output.len())?;
        debug!(
            npoint = points.len(),
            nspline = self.len(),
            rank = cell.rank(),
            "evaluating decomposition on points"
        );
        fill(output, points, |point| self.value(point, cell));
        Ok(())
    }
}

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

//! # Radialfield
//!
//! A library for reconstructing real-space scalar fields, such as atomic densities
//! or potentials, from radial cubic splines centered on atoms.
//!
//! Splines are evaluated on structured cube grids or on arbitrary point sets,
//! taking periodic boundary conditions into account through the minimum image
//! convention of a lattice [`Cell`]. Several centered splines can be summed into
//! a single field with [`eval_decomposition_grid`].
//!
//! ```
//! use radialfield::{eval_spline_grid, Cell, CubicSpline, Extrapolation, RTransform, Vector3};
//!
//! // y = 1 - r/4 on [0, 4]
//! let rtf = RTransform::linear(0.0, 4.0, 5).unwrap();
//! let y: Vec<f64> = rtf.radii().map(|r| 1.0 - r / 4.0).collect();
//! let d = vec![-0.25; 5];
//! let spline = CubicSpline::new(rtf, y, d, Extrapolation::Zero).unwrap();
//!
//! let points = [Vector3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 8.0)];
//! let mut output = [0.0; 2];
//! eval_spline_grid(&spline, &Vector3::zeros(), &mut output, &points, &Cell::non_periodic()).unwrap();
//! assert!((output[0] - 0.75).abs() < 1e-12);
//! assert_eq!(output[1], 0.0);
//! ```

#[cfg(test)]
extern crate approx;

/// A point in 3D space
pub type Vector3 = nalgebra::Vector3<f64>;
/// A stack-allocated 3x3 square matrix
pub type Matrix3 = nalgebra::Matrix3<f64>;

pub mod cell;
mod error;
pub mod evaluate;
pub mod grid;
pub mod spline;

pub use cell::Cell;
pub use error::{Error, Result};
pub use evaluate::{eval_decomposition_grid, eval_spline_cube, eval_spline_grid, SplineSet};
pub use grid::UniformGrid;
pub use spline::{CubicSpline, Extrapolation, RTransform, RadialFunction};

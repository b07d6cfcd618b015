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

use thiserror::Error;

/// Invalid-argument conditions reported before any output is written.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A buffer does not have the length required by the points it describes.
    #[error("length mismatch: expected {expected} values, found {found}")]
    LengthMismatch { expected: usize, found: usize },
    /// Splines and centers of a decomposition are not paired one to one.
    #[error("got {splines} splines but {centers} centers")]
    SplineCenterMismatch { splines: usize, centers: usize },
    /// Grid step vectors are zero or (nearly) coplanar.
    #[error("grid step vectors are degenerate")]
    DegenerateGrid,
    #[error("invalid cell: {0}")]
    InvalidCell(String),
    #[error("invalid spline: {0}")]
    InvalidSpline(String),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Fails with [`Error::LengthMismatch`] unless `found == expected`.
pub(crate) fn check_length(expected: usize, found: usize) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(Error::LengthMismatch { expected, found })
    }
}

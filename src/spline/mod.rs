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

//! ## Radial functions
//!
//! Module for one-dimensional functions of the distance to a center, 𝑓(𝑟),
//! and the cubic spline used to represent them.

use std::fmt::Debug;

mod cubic;
mod extrapolation;
mod rtransform;
pub use self::cubic::{CubicSpline, SplineCoeffs};
pub use self::extrapolation::Extrapolation;
pub use self::rtransform::RTransform;

/// Spherically symmetric function evaluated at a distance from its center.
///
/// Implementations must be pure so that grid evaluation can be split across threads.
pub trait RadialFunction: Debug + Sync {
    /// Function value at distance `r` ≥ 0.
    fn value(&self, r: f64) -> f64;

    /// Radial derivative, 𝑑𝑓/𝑑𝑟.
    ///
    /// The default implementation uses a central difference
    /// and should be overridden with the exact expression for better accuracy.
    fn derivative(&self, r: f64) -> f64 {
        const EPS: f64 = 1e-6;
        (self.value(r + EPS) - self.value(r - EPS)) / (2.0 * EPS)
    }

    /// Interval `(r_min, r_max)` where the function is interpolated rather than extrapolated
    fn domain(&self) -> (f64, f64) {
        (0.0, f64::INFINITY)
    }
}

impl<T: RadialFunction + ?Sized> RadialFunction for &T {
    #[inline]
    fn value(&self, r: f64) -> f64 {
        (**self).value(r)
    }
    #[inline]
    fn derivative(&self, r: f64) -> f64 {
        (**self).derivative(r)
    }
    fn domain(&self) -> (f64, f64) {
        (**self).domain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[derive(Debug)]
    struct Gaussian;

    impl RadialFunction for Gaussian {
        fn value(&self, r: f64) -> f64 {
            f64::exp(-r * r)
        }
    }

    #[test]
    fn test_default_derivative() {
        let r: f64 = 0.7;
        assert_relative_eq!(
            Gaussian.derivative(r),
            -2.0 * r * f64::exp(-r * r),
            epsilon = 1e-8
        );
        assert_eq!(Gaussian.domain(), (0.0, f64::INFINITY));
    }

    #[test]
    fn test_reference_forwards() {
        fn at<F: RadialFunction>(f: F, r: f64) -> (f64, f64) {
            (f.value(r), f.derivative(r))
        }
        assert_eq!(at(&Gaussian, 0.3), at(Gaussian, 0.3));
    }
}

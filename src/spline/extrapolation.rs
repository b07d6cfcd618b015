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

//! Behaviour of a spline outside its knot range.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Knot data at one end of a spline: radius, value and radial derivative
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Endpoint {
    pub r: f64,
    pub y: f64,
    pub d: f64,
}

/// Policy for evaluating a spline below its first or above its last knot.
///
/// | variant  | r < r_min                 | r > r_max          |
/// |----------|---------------------------|--------------------|
/// | `Clamp`  | first knot value          | 0                  |
/// | `Zero`   | 0                         | 0                  |
/// | `Cusp`   | y₀·exp(d₀/y₀·(r - r₀))    | 0                  |
/// | `Power`  | 0                         | yₙ·(r/rₙ)^p        |
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Extrapolation {
    /// Constant continuation towards the center, vanishing tail (default)
    #[default]
    Clamp,
    /// Zero on both sides
    Zero,
    /// Exponential continuation towards the center matching value and slope of the
    /// first knot, as for a nuclear cusp. Falls back to `Clamp` when y₀ = 0.
    Cusp,
    /// Power-law tail matching the last knot value, e.g. p = -1 for a Coulomb tail
    Power(f64),
}

impl Extrapolation {
    /// Value for `r` below the first knot
    pub(crate) fn left(&self, r: f64, first: &Endpoint) -> f64 {
        match *self {
            Self::Clamp => first.y,
            Self::Zero | Self::Power(_) => 0.0,
            Self::Cusp if first.y == 0.0 => first.y,
            Self::Cusp => first.y * f64::exp(first.d / first.y * (r - first.r)),
        }
    }

    /// Derivative for `r` below the first knot
    pub(crate) fn left_deriv(&self, r: f64, first: &Endpoint) -> f64 {
        match *self {
            Self::Clamp | Self::Zero | Self::Power(_) => 0.0,
            Self::Cusp if first.y == 0.0 => 0.0,
            Self::Cusp => first.d * f64::exp(first.d / first.y * (r - first.r)),
        }
    }

    /// Value for `r` above the last knot
    pub(crate) fn right(&self, r: f64, last: &Endpoint) -> f64 {
        match *self {
            Self::Clamp | Self::Zero | Self::Cusp => 0.0,
            Self::Power(p) => last.y * (r / last.r).powf(p),
        }
    }

    /// Derivative for `r` above the last knot
    pub(crate) fn right_deriv(&self, r: f64, last: &Endpoint) -> f64 {
        match *self {
            Self::Clamp | Self::Zero | Self::Cusp => 0.0,
            Self::Power(p) => p * last.y * (r / last.r).powf(p - 1.0) / last.r,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const FIRST: Endpoint = Endpoint {
        r: 0.5,
        y: 2.0,
        d: -3.0,
    };
    const LAST: Endpoint = Endpoint {
        r: 10.0,
        y: 0.1,
        d: -0.01,
    };

    #[test]
    fn test_default_is_clamp() {
        assert_eq!(Extrapolation::default(), Extrapolation::Clamp);
    }

    #[test]
    fn test_left() {
        assert_eq!(Extrapolation::Clamp.left(0.1, &FIRST), 2.0);
        assert_eq!(Extrapolation::Zero.left(0.1, &FIRST), 0.0);
        assert_eq!(Extrapolation::Power(-1.0).left(0.1, &FIRST), 0.0);
        // continuous with the first knot, growing towards r = 0 for negative slope
        assert_eq!(Extrapolation::Cusp.left(0.5, &FIRST), 2.0);
        assert_relative_eq!(
            Extrapolation::Cusp.left(0.0, &FIRST),
            2.0 * f64::exp(0.75)
        );
        assert_relative_eq!(Extrapolation::Cusp.left_deriv(0.5, &FIRST), -3.0);
        let zero = Endpoint { y: 0.0, ..FIRST };
        assert_eq!(Extrapolation::Cusp.left(0.1, &zero), 0.0);
    }

    #[test]
    fn test_right() {
        for policy in [
            Extrapolation::Clamp,
            Extrapolation::Zero,
            Extrapolation::Cusp,
        ] {
            assert_eq!(policy.right(12.0, &LAST), 0.0);
            assert_eq!(policy.right_deriv(12.0, &LAST), 0.0);
        }
        let coulomb = Extrapolation::Power(-1.0);
        assert_relative_eq!(coulomb.right(10.0, &LAST), 0.1);
        assert_relative_eq!(coulomb.right(20.0, &LAST), 0.05);
        assert_relative_eq!(coulomb.right_deriv(20.0, &LAST), -0.1 * 10.0 / 400.0);
    }
}

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

//! Radial knot grids.
//!
//! An [`RTransform`] maps a continuous knot index `t ∈ [0, n-1]` onto a radius
//! `r(t) ∈ [r_min, r_max]`. Splines are interpolated in `t`, so the choice of
//! transform decides where the knots are dense.

use crate::{Error, Result};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Mapping from knot index to radius.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RTransform {
    /// Uniform spacing in r: r(t) = r_min + t·Δr
    Linear { r_min: f64, r_max: f64, npoint: usize },
    /// Logarithmic spacing: r(t) = r_min·exp(α·t).
    /// Gives dense knots close to the nucleus, as needed for cusped densities.
    Exponential { r_min: f64, r_max: f64, npoint: usize },
    /// Power-law mapping: r(x) = r_min + (r_max - r_min)·x^p with x = t/(n-1).
    /// For p > 1, knots are denser at short range.
    PowerLaw {
        r_min: f64,
        r_max: f64,
        npoint: usize,
        power: f64,
    },
}

impl RTransform {
    /// Uniform knots on `[r_min, r_max]`
    pub fn linear(r_min: f64, r_max: f64, npoint: usize) -> Result<Self> {
        Self::check_range(r_min, r_max, npoint)?;
        Ok(Self::Linear {
            r_min,
            r_max,
            npoint,
        })
    }

    /// Logarithmically spaced knots; requires `r_min > 0`
    pub fn exponential(r_min: f64, r_max: f64, npoint: usize) -> Result<Self> {
        Self::check_range(r_min, r_max, npoint)?;
        if r_min <= 0.0 {
            return Err(Error::InvalidSpline(
                "exponential grid needs a positive r_min".to_string(),
            ));
        }
        Ok(Self::Exponential {
            r_min,
            r_max,
            npoint,
        })
    }

    /// Power-law spaced knots; requires `power >= 1`
    pub fn power_law(r_min: f64, r_max: f64, npoint: usize, power: f64) -> Result<Self> {
        Self::check_range(r_min, r_max, npoint)?;
        if !(power >= 1.0 && power.is_finite()) {
            return Err(Error::InvalidSpline(format!(
                "power-law exponent must be finite and >= 1, got {power}"
            )));
        }
        Ok(Self::PowerLaw {
            r_min,
            r_max,
            npoint,
            power,
        })
    }

    fn check_range(r_min: f64, r_max: f64, npoint: usize) -> Result<()> {
        if npoint < 2 {
            return Err(Error::InvalidSpline(format!(
                "need at least 2 knots, got {npoint}"
            )));
        }
        if !(r_min.is_finite() && r_max.is_finite() && r_min >= 0.0 && r_min < r_max) {
            return Err(Error::InvalidSpline(format!(
                "invalid radial range [{r_min}, {r_max}]"
            )));
        }
        Ok(())
    }

    /// Number of knots
    pub const fn npoint(&self) -> usize {
        match *self {
            Self::Linear { npoint, .. }
            | Self::Exponential { npoint, .. }
            | Self::PowerLaw { npoint, .. } => npoint,
        }
    }

    /// Radius of the first knot
    pub const fn r_min(&self) -> f64 {
        match *self {
            Self::Linear { r_min, .. }
            | Self::Exponential { r_min, .. }
            | Self::PowerLaw { r_min, .. } => r_min,
        }
    }

    /// Radius of the last knot
    pub const fn r_max(&self) -> f64 {
        match *self {
            Self::Linear { r_max, .. }
            | Self::Exponential { r_max, .. }
            | Self::PowerLaw { r_max, .. } => r_max,
        }
    }

    /// Index of the last knot as a float, n - 1
    #[inline]
    fn t_max(&self) -> f64 {
        (self.npoint() - 1) as f64
    }

    /// Radius at continuous knot index `t`.
    ///
    /// The end points are returned exactly.
    pub fn radius(&self, t: f64) -> f64 {
        if t == self.t_max() {
            return self.r_max();
        }
        match *self {
            Self::Linear { r_min, r_max, .. } => r_min + t * (r_max - r_min) / self.t_max(),
            Self::Exponential { r_min, r_max, .. } => {
                let alpha = (r_max / r_min).ln() / self.t_max();
                r_min * f64::exp(alpha * t)
            }
            Self::PowerLaw {
                r_min,
                r_max,
                power,
                ..
            } => r_min + (r_max - r_min) * (t / self.t_max()).powf(power),
        }
    }

    /// Derivative of the radius with respect to the knot index, 𝑑𝑟/𝑑𝑡
    pub fn deriv(&self, t: f64) -> f64 {
        match *self {
            Self::Linear { r_min, r_max, .. } => (r_max - r_min) / self.t_max(),
            Self::Exponential { r_min, r_max, .. } => {
                let alpha = (r_max / r_min).ln() / self.t_max();
                r_min * alpha * f64::exp(alpha * t)
            }
            Self::PowerLaw {
                r_min,
                r_max,
                power,
                ..
            } => {
                let x = t / self.t_max();
                (r_max - r_min) * power * x.powf(power - 1.0) / self.t_max()
            }
        }
    }

    /// Continuous knot index of radius `r`; the inverse of [`RTransform::radius`]
    pub fn inverse(&self, r: f64) -> f64 {
        if r == self.r_max() {
            return self.t_max();
        }
        match *self {
            Self::Linear { r_min, r_max, .. } => (r - r_min) * self.t_max() / (r_max - r_min),
            Self::Exponential { r_min, r_max, .. } => {
                (r / r_min).ln() * self.t_max() / (r_max / r_min).ln()
            }
            Self::PowerLaw {
                r_min,
                r_max,
                power,
                ..
            } => self.t_max() * ((r - r_min) / (r_max - r_min)).powf(power.recip()),
        }
    }

    /// Radii of all knots
    pub fn radii(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.npoint()).map(move |i| self.radius(i as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_linear() {
        let rtf = RTransform::linear(0.0, 5.0, 6).unwrap();
        let radii: Vec<f64> = rtf.radii().collect();
        assert_eq!(radii, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(rtf.deriv(2.5), 1.0);
        assert_eq!(rtf.inverse(3.5), 3.5);
        assert_eq!(rtf.inverse(5.0), 5.0);
    }

    #[test]
    fn test_exponential() {
        let rtf = RTransform::exponential(1e-3, 20.0, 100).unwrap();
        assert_eq!(rtf.radius(0.0), 1e-3);
        assert_eq!(rtf.radius(99.0), 20.0);
        for t in [0.0, 13.3, 50.0, 98.7] {
            assert_relative_eq!(rtf.inverse(rtf.radius(t)), t, epsilon = 1e-9);
        }
        // dr/dt = α r for an exponential grid
        let alpha = (20.0_f64 / 1e-3).ln() / 99.0;
        assert_relative_eq!(rtf.deriv(40.0), alpha * rtf.radius(40.0), max_relative = 1e-12);
    }

    #[test]
    fn test_power_law() {
        let rtf = RTransform::power_law(0.0, 10.0, 11, 2.0).unwrap();
        assert_relative_eq!(rtf.radius(5.0), 2.5);
        assert_relative_eq!(rtf.inverse(2.5), 5.0);
        // dr/dt = range·p·x^(p-1) / (n-1)
        assert_relative_eq!(rtf.deriv(5.0), 10.0 * 2.0 * 0.5 / 10.0);
        assert_eq!(rtf.deriv(0.0), 0.0);
    }

    #[test]
    fn test_deriv_matches_finite_difference() {
        let transforms = [
            RTransform::linear(0.5, 8.0, 40).unwrap(),
            RTransform::exponential(1e-4, 30.0, 150).unwrap(),
            RTransform::power_law(0.0, 15.0, 80, 3.0).unwrap(),
        ];
        const EPS: f64 = 1e-5;
        for rtf in transforms {
            let t = 17.3;
            let numeric = (rtf.radius(t + EPS) - rtf.radius(t - EPS)) / (2.0 * EPS);
            assert_relative_eq!(rtf.deriv(t), numeric, max_relative = 1e-6);
        }
    }

    #[test]
    fn test_invalid() {
        assert!(RTransform::linear(0.0, 5.0, 1).is_err());
        assert!(RTransform::linear(5.0, 1.0, 10).is_err());
        assert!(RTransform::exponential(0.0, 1.0, 10).is_err());
        assert!(RTransform::power_law(0.0, 1.0, 10, 0.5).is_err());
        assert!(RTransform::linear(0.0, f64::INFINITY, 10).is_err());
    }
}

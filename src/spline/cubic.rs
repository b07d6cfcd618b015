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

//! Radial cubic Hermite splines.
//!
//! A [`CubicSpline`] is defined by knot values yᵢ and radial derivatives dᵢ = 𝑑𝑦/𝑑𝑟
//! on the radii of an [`RTransform`]. Interpolation happens in knot index space
//! `t`, where the knots are equidistant, using 𝑑𝑦/𝑑𝑡 = 𝑑𝑦/𝑑𝑟 · 𝑑𝑟/𝑑𝑡.
//!
//! - **C¹ continuous**, exact at knots
//! - **Precomputed coefficients**: one table lookup and a Horner evaluation per call
//! - **O(1) lookup** through the inverse transform; calls need not arrive in sorted order
//!
//! # Example
//!
//! ```
//! use radialfield::{CubicSpline, Extrapolation, RTransform, RadialFunction};
//!
//! // Exact for cubic polynomials: y = r³ on [0, 2]
//! let rtf = RTransform::linear(0.0, 2.0, 3).unwrap();
//! let y: Vec<f64> = rtf.radii().map(|r| r.powi(3)).collect();
//! let d: Vec<f64> = rtf.radii().map(|r| 3.0 * r * r).collect();
//! let spline = CubicSpline::new(rtf, y, d, Extrapolation::Zero).unwrap();
//! assert!((spline.value(1.5) - 3.375).abs() < 1e-12);
//! assert_eq!(spline.value(2.5), 0.0);
//! ```

use super::extrapolation::Endpoint;
use super::{Extrapolation, RTransform, RadialFunction};
use crate::{Error, Result};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};

/// Precomputed cubic polynomial for one knot interval.
///
/// For ε ∈ [0, 1], the fractional position in the interval:
/// ```text
/// y(ε) = c[0] + c[1]·ε + c[2]·ε² + c[3]·ε³
/// ```
#[derive(Clone, Copy, Default, PartialEq)]
#[repr(C, align(32))] // 32-byte aligned for AVX loads
pub struct SplineCoeffs {
    pub c: [f64; 4],
}

impl Debug for SplineCoeffs {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "SplineCoeffs {{ c: {:?} }}", self.c)
    }
}

/// Cubic Hermite spline as a function of the radial distance.
#[derive(Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Deserialize, Serialize),
    serde(try_from = "SplineData", into = "SplineData")
)]
pub struct CubicSpline {
    rtransform: RTransform,
    /// Knot values
    y: Vec<f64>,
    /// Radial derivatives at the knots
    d: Vec<f64>,
    extrapolation: Extrapolation,
    /// Polynomial per knot interval, in t-space
    coeffs: Vec<SplineCoeffs>,
}

impl CubicSpline {
    /// Create a spline from knot values `y` and radial derivatives `d`.
    ///
    /// Fails if `y` or `d` do not have one entry per knot, or contain non-finite values.
    pub fn new(
        rtransform: RTransform,
        y: Vec<f64>,
        d: Vec<f64>,
        extrapolation: Extrapolation,
    ) -> Result<Self> {
        let n = rtransform.npoint();
        if n < 2 {
            return Err(Error::InvalidSpline(format!(
                "need at least 2 knots, got {n}"
            )));
        }
        if y.len() != n || d.len() != n {
            return Err(Error::InvalidSpline(format!(
                "expected {n} values and derivatives, got {} and {}",
                y.len(),
                d.len()
            )));
        }
        if !y.iter().chain(d.iter()).all(|v| v.is_finite()) {
            return Err(Error::InvalidSpline(
                "knot values and derivatives must be finite".to_string(),
            ));
        }
        let coeffs = Self::compute_cubic_hermite_coeffs(&rtransform, &y, &d);
        Ok(Self {
            rtransform,
            y,
            d,
            extrapolation,
            coeffs,
        })
    }

    /// Spline that is zero everywhere, on the knots of `rtransform`
    pub fn zero(rtransform: RTransform) -> Result<Self> {
        let n = rtransform.npoint();
        Self::new(rtransform, vec![0.0; n], vec![0.0; n], Extrapolation::Zero)
    }

    /// Compute Hermite coefficients in t-space.
    ///
    /// For each interval, with the knot slopes converted to 𝑑𝑦/𝑑𝑡:
    /// ```text
    /// c₀ = yᵢ
    /// c₁ = ẏᵢ
    /// c₂ = 3(yᵢ₊₁ - yᵢ) - 2ẏᵢ - ẏᵢ₊₁
    /// c₃ = 2(yᵢ - yᵢ₊₁) + ẏᵢ + ẏᵢ₊₁
    /// ```
    fn compute_cubic_hermite_coeffs(
        rtransform: &RTransform,
        y: &[f64],
        d: &[f64],
    ) -> Vec<SplineCoeffs> {
        let dt: Vec<f64> = d
            .iter()
            .enumerate()
            .map(|(i, d)| d * rtransform.deriv(i as f64))
            .collect();

        y.windows(2)
            .zip(dt.windows(2))
            .map(|(y, dt)| SplineCoeffs {
                c: [
                    y[0],
                    dt[0],
                    3.0 * (y[1] - y[0]) - 2.0 * dt[0] - dt[1],
                    2.0 * (y[0] - y[1]) + dt[0] + dt[1],
                ],
            })
            .collect()
    }

    pub fn rtransform(&self) -> &RTransform {
        &self.rtransform
    }

    /// Knot values
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Radial derivatives at the knots
    pub fn d(&self) -> &[f64] {
        &self.d
    }

    pub fn extrapolation(&self) -> Extrapolation {
        self.extrapolation
    }

    pub fn coefficients(&self) -> &[SplineCoeffs] {
        &self.coeffs
    }

    fn first(&self) -> Endpoint {
        Endpoint {
            r: self.rtransform.r_min(),
            y: self.y[0],
            d: self.d[0],
        }
    }

    fn last(&self) -> Endpoint {
        let n = self.y.len();
        Endpoint {
            r: self.rtransform.r_max(),
            y: self.y[n - 1],
            d: self.d[n - 1],
        }
    }

    /// Interval index and fractional position ε ∈ [0, 1] for r inside the domain
    #[inline]
    fn locate(&self, r: f64) -> (usize, f64) {
        let t = self.rtransform.inverse(r);
        let i = (t.max(0.0) as usize).min(self.coeffs.len() - 1);
        (i, t - i as f64)
    }
}

impl RadialFunction for CubicSpline {
    /// Interpolated value inside `[r_min, r_max]`, both ends included;
    /// outside, the [`Extrapolation`] policy applies.
    #[inline]
    fn value(&self, r: f64) -> f64 {
        let (r_min, r_max) = self.domain();
        if r < r_min {
            return self.extrapolation.left(r, &self.first());
        }
        if r > r_max {
            return self.extrapolation.right(r, &self.last());
        }
        if r == r_max {
            return self.last().y;
        }
        let (i, eps) = self.locate(r);
        let c = &self.coeffs[i].c;
        c[0] + eps * (c[1] + eps * (c[2] + eps * c[3]))
    }

    #[inline]
    fn derivative(&self, r: f64) -> f64 {
        let (r_min, r_max) = self.domain();
        if r < r_min {
            return self.extrapolation.left_deriv(r, &self.first());
        }
        if r > r_max {
            return self.extrapolation.right_deriv(r, &self.last());
        }
        let (i, eps) = self.locate(r);
        if eps == 0.0 {
            return self.d[i];
        }
        if eps == 1.0 {
            return self.d[i + 1];
        }
        let c = &self.coeffs[i].c;
        let dydt = c[1] + eps * (2.0 * c[2] + eps * 3.0 * c[3]);
        dydt / self.rtransform.deriv(i as f64 + eps)
    }

    #[inline]
    fn domain(&self) -> (f64, f64) {
        (self.rtransform.r_min(), self.rtransform.r_max())
    }
}

impl Debug for CubicSpline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CubicSpline")
            .field("n_points", &self.y.len())
            .field("r_range", &self.domain())
            .field("rtransform", &self.rtransform)
            .field("extrapolation", &self.extrapolation)
            .finish()
    }
}

/// Serialized form of a spline; coefficients are rebuilt on load
#[cfg(feature = "serde")]
#[derive(Deserialize, Serialize)]
struct SplineData {
    rtransform: RTransform,
    y: Vec<f64>,
    d: Vec<f64>,
    #[serde(default)]
    extrapolation: Extrapolation,
}

#[cfg(feature = "serde")]
impl TryFrom<SplineData> for CubicSpline {
    type Error = Error;
    fn try_from(data: SplineData) -> Result<Self> {
        Self::new(data.rtransform, data.y, data.d, data.extrapolation)
    }
}

#[cfg(feature = "serde")]
impl From<CubicSpline> for SplineData {
    fn from(spline: CubicSpline) -> Self {
        Self {
            rtransform: spline.rtransform,
            y: spline.y,
            d: spline.d,
            extrapolation: spline.extrapolation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Spline of a Slater-type density, e^(-2r), on an exponential grid
    fn slater(extrapolation: Extrapolation) -> CubicSpline {
        let rtf = RTransform::exponential(1e-4, 20.0, 1000).unwrap();
        let y = rtf.radii().map(|r| f64::exp(-2.0 * r)).collect();
        let d = rtf.radii().map(|r| -2.0 * f64::exp(-2.0 * r)).collect();
        CubicSpline::new(rtf, y, d, extrapolation).unwrap()
    }

    #[test]
    fn test_exact_at_knots() {
        let spline = slater(Extrapolation::Clamp);
        let rtf = *spline.rtransform();
        for (r, y) in rtf.radii().zip(spline.y()) {
            assert_relative_eq!(spline.value(r), *y, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_cubic_polynomial_is_reproduced() {
        // Hermite interpolation is exact for cubics on any knot grid
        let f = |r: f64| 1.0 - 2.0 * r + 0.5 * r * r - 0.1 * r.powi(3);
        let df = |r: f64| -2.0 + r - 0.3 * r * r;
        let rtf = RTransform::power_law(0.0, 4.0, 9, 2.0).unwrap();
        let y = rtf.radii().map(f).collect();
        let d = rtf.radii().map(df).collect();
        let spline = CubicSpline::new(rtf, y, d, Extrapolation::Zero).unwrap();
        for i in 0..100 {
            let r = 0.04 * i as f64;
            // t-space cubic is not an r-space cubic on a power-law grid, only close to it
            assert_relative_eq!(spline.value(r), f(r), epsilon = 1e-2);
        }

        let rtf = RTransform::linear(0.0, 4.0, 5).unwrap();
        let y = rtf.radii().map(f).collect();
        let d = rtf.radii().map(df).collect();
        let spline = CubicSpline::new(rtf, y, d, Extrapolation::Zero).unwrap();
        for i in 0..100 {
            let r = 0.04 * i as f64;
            assert_relative_eq!(spline.value(r), f(r), epsilon = 1e-12);
            assert_relative_eq!(spline.derivative(r), df(r), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_slater_accuracy() {
        let spline = slater(Extrapolation::Clamp);
        for i in 0..400 {
            // offset by 0.37 to avoid grid alignment
            let r = (i as f64 + 0.37) * 0.015;
            let exact = f64::exp(-2.0 * r);
            assert_relative_eq!(spline.value(r), exact, max_relative = 1e-5);
            assert_relative_eq!(spline.derivative(r), -2.0 * exact, max_relative = 1e-3);
        }
    }

    #[test]
    fn test_domain_boundaries() {
        let rtf = RTransform::linear(0.0, 5.0, 6).unwrap();
        let y: Vec<f64> = rtf.radii().map(|r| 10.0 - r).collect();
        let spline = CubicSpline::new(rtf, y, vec![-1.0; 6], Extrapolation::Clamp).unwrap();
        assert_eq!(spline.domain(), (0.0, 5.0));
        assert_eq!(spline.value(5.0), 5.0);
        assert_eq!(spline.value(0.0), 10.0);
        assert_eq!(spline.value(5.0 + 1e-12), 0.0);
        assert_eq!(spline.value(10.0), 0.0);
        assert_eq!(spline.derivative(5.0), -1.0);
    }

    #[test]
    fn test_below_domain_policies() {
        let r = 1e-6;
        assert_eq!(slater(Extrapolation::Clamp).value(r), slater(Extrapolation::Clamp).y()[0]);
        assert_eq!(slater(Extrapolation::Zero).value(r), 0.0);
        // exponential continuation reproduces the Slater function itself
        assert_relative_eq!(
            slater(Extrapolation::Cusp).value(r),
            f64::exp(-2.0 * r),
            max_relative = 1e-12
        );
        assert_relative_eq!(slater(Extrapolation::Cusp).value(0.0), 1.0, max_relative = 1e-12);
    }

    #[test]
    fn test_power_tail() {
        let spline = slater(Extrapolation::Power(-2.0));
        let y_last = f64::exp(-40.0);
        assert_relative_eq!(spline.value(40.0), y_last / 4.0, max_relative = 1e-12);
        assert_eq!(spline.value(0.0), 0.0);
    }

    #[test]
    fn test_nan_propagates() {
        assert!(slater(Extrapolation::Clamp).value(f64::NAN).is_nan());
    }

    #[test]
    fn test_zero_spline() {
        let spline = CubicSpline::zero(RTransform::linear(0.0, 3.0, 4).unwrap()).unwrap();
        for r in [0.0, 0.5, 2.99, 3.0, 7.0] {
            assert_eq!(spline.value(r), 0.0);
        }
    }

    #[test]
    fn test_invalid_input() {
        let rtf = RTransform::linear(0.0, 1.0, 3).unwrap();
        assert!(CubicSpline::new(rtf, vec![0.0; 3], vec![0.0; 2], Extrapolation::Zero).is_err());
        assert!(CubicSpline::new(rtf, vec![0.0; 2], vec![0.0; 3], Extrapolation::Zero).is_err());
        assert!(
            CubicSpline::new(rtf, vec![0.0, f64::NAN, 0.0], vec![0.0; 3], Extrapolation::Zero)
                .is_err()
        );
    }
}

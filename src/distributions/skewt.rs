//! Skew-t line-of-sight velocity density and its analytic moments.
//!
//! Parameterization `(w, v_c, alpha, nu)`: scale, location, skewness and
//! degrees of freedom. With `z = (v - v_c) / w`,
//!
//! ```text
//! p(v) = 2/w · t_nu(z) · T_{nu+1}( alpha z sqrt((nu + 1) / (z² + nu)) )
//! ```
//!
//! where `t_nu` / `T_nu` are the standard Student-t density and CDF.
//!
//! Moments use `delta = alpha / sqrt(1 + alpha²)` and
//! `b_nu = sqrt(nu/π) Γ((nu-1)/2) / Γ(nu/2)`; the mean needs `nu > 1`, the
//! variance `nu > 2`, skewness `nu > 3` and kurtosis `nu > 4`.
use crate::{
    distributions::errors::{DistError, DistResult},
    moments::LosMoments,
};
use statrs::{
    distribution::{Continuous, ContinuousCDF, StudentsT},
    function::gamma::ln_gamma,
};
use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkewTParams {
    pub w: f64,
    pub v_c: f64,
    pub alpha: f64,
    pub nu: f64,
}

impl SkewTParams {
    /// # Errors
    /// - [`DistError::InvalidScale`] unless `w` is finite and positive.
    /// - [`DistError::InvalidDof`] unless `nu` is finite and positive.
    /// - [`DistError::NonFiniteParameter`] for non-finite `v_c` or `alpha`.
    pub fn new(w: f64, v_c: f64, alpha: f64, nu: f64) -> DistResult<Self> {
        if !(w.is_finite() && w > 0.0) {
            return Err(DistError::InvalidScale { value: w });
        }
        if !(nu.is_finite() && nu > 0.0) {
            return Err(DistError::InvalidDof { value: nu });
        }
        if !v_c.is_finite() {
            return Err(DistError::NonFiniteParameter { name: "v_c", value: v_c });
        }
        if !alpha.is_finite() {
            return Err(DistError::NonFiniteParameter { name: "alpha", value: alpha });
        }
        Ok(Self { w, v_c, alpha, nu })
    }

    /// Recover `(w, v_c)` from a target mean and standard deviation once the
    /// shape `(alpha, nu)` is known.
    ///
    /// # Errors
    /// - [`DistError::MomentUndefined`] for `nu <= 2` (no finite variance).
    /// - Validation errors from [`SkewTParams::new`].
    pub fn from_shape(mean: f64, std: f64, alpha: f64, nu: f64) -> DistResult<Self> {
        if nu.is_nan() || nu <= 2.0 {
            return Err(DistError::MomentUndefined { order: 2, nu });
        }
        let scaled_var = variance_factor(alpha, nu);
        if !(scaled_var.is_finite() && scaled_var > 0.0) {
            return Err(DistError::MomentUndefined { order: 2, nu });
        }
        let w = std / scaled_var.sqrt();
        let v_c = mean - w * delta(alpha) * b_nu(nu);
        Self::new(w, v_c, alpha, nu)
    }

    pub fn pdf(&self, v: f64) -> f64 {
        skewt_pdf(v, self.w, self.v_c, self.alpha, self.nu)
    }

    pub fn mean(&self) -> DistResult<f64> {
        if self.nu.is_nan() || self.nu <= 1.0 {
            return Err(DistError::MomentUndefined { order: 1, nu: self.nu });
        }
        Ok(self.v_c + self.w * delta(self.alpha) * b_nu(self.nu))
    }

    pub fn std(&self) -> DistResult<f64> {
        if self.nu.is_nan() || self.nu <= 2.0 {
            return Err(DistError::MomentUndefined { order: 2, nu: self.nu });
        }
        Ok(self.w * variance_factor(self.alpha, self.nu).sqrt())
    }

    /// Mean, std, skewness and excess kurtosis.
    ///
    /// # Errors
    /// - [`DistError::MomentUndefined`] for `nu <= 4`.
    pub fn moments(&self) -> DistResult<LosMoments> {
        if self.nu.is_nan() || self.nu <= 4.0 {
            return Err(DistError::MomentUndefined { order: 4, nu: self.nu });
        }
        Ok(LosMoments {
            mean: self.mean()?,
            std: self.std()?,
            gamma1: skewness(self.alpha, self.nu),
            gamma2: excess_kurtosis(self.alpha, self.nu),
        })
    }
}

/// Skew-t density; `NaN` when the parameters are inadmissible.
pub fn skewt_pdf(v: f64, w: f64, v_c: f64, alpha: f64, nu: f64) -> f64 {
    if w.is_nan() || nu.is_nan() || w <= 0.0 || nu <= 0.0 {
        return f64::NAN;
    }
    let (Ok(t_nu), Ok(t_nu1)) = (StudentsT::new(0.0, 1.0, nu), StudentsT::new(0.0, 1.0, nu + 1.0))
    else {
        return f64::NAN;
    };
    let z = (v - v_c) / w;
    let arg = alpha * z * ((nu + 1.0) / (z * z + nu)).sqrt();
    2.0 / w * t_nu.pdf(z) * t_nu1.cdf(arg)
}

/// `alpha / sqrt(1 + alpha²)`.
pub fn delta(alpha: f64) -> f64 {
    alpha / alpha.mul_add(alpha, 1.0).sqrt()
}

/// `sqrt(nu/π) Γ((nu-1)/2) / Γ(nu/2)`, defined for `nu > 1`.
pub fn b_nu(nu: f64) -> f64 {
    (nu / PI).sqrt() * (ln_gamma(0.5 * (nu - 1.0)) - ln_gamma(0.5 * nu)).exp()
}

/// `nu/(nu-2) - delta² b²`: variance in units of `w²`.
fn variance_factor(alpha: f64, nu: f64) -> f64 {
    let db = delta(alpha) * b_nu(nu);
    nu / (nu - 2.0) - db * db
}

/// Standardized skewness of the skew-t; `NaN` for `nu <= 3`.
pub fn skewness(alpha: f64, nu: f64) -> f64 {
    if nu.is_nan() || nu <= 3.0 {
        return f64::NAN;
    }
    let d = delta(alpha);
    let b = b_nu(nu);
    let d2 = d * d;
    let b2 = b * b;
    let num = nu * (3.0 - d2) / (nu - 3.0) - 3.0 * nu / (nu - 2.0) + 2.0 * d2 * b2;
    d * b * num * variance_factor(alpha, nu).powf(-1.5)
}

/// Excess kurtosis of the skew-t; `NaN` for `nu <= 4`.
pub fn excess_kurtosis(alpha: f64, nu: f64) -> f64 {
    if nu.is_nan() || nu <= 4.0 {
        return f64::NAN;
    }
    let d = delta(alpha);
    let b = b_nu(nu);
    let d2b2 = d * d * b * b;
    let num = 3.0 * nu * nu / ((nu - 2.0) * (nu - 4.0))
        - 4.0 * d2b2 * nu * (3.0 - d * d) / (nu - 3.0)
        + 6.0 * d2b2 * nu / (nu - 2.0)
        - 3.0 * d2b2 * d2b2;
    num * variance_factor(alpha, nu).powi(-2) - 3.0
}

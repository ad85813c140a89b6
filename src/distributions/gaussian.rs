//! Gaussian line-of-sight velocity density.
use crate::{
    distributions::errors::{DistError, DistResult},
    moments::LosMoments,
};
use statrs::distribution::{Continuous, Normal};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianParams {
    pub loc: f64,
    pub scale: f64,
}

impl GaussianParams {
    /// # Errors
    /// - [`DistError::NonFiniteParameter`] for a non-finite `loc`.
    /// - [`DistError::InvalidScale`] unless `scale` is finite and positive.
    pub fn new(loc: f64, scale: f64) -> DistResult<Self> {
        if !loc.is_finite() {
            return Err(DistError::NonFiniteParameter { name: "loc", value: loc });
        }
        if !(scale.is_finite() && scale > 0.0) {
            return Err(DistError::InvalidScale { value: scale });
        }
        Ok(Self { loc, scale })
    }

    /// Moment matching is the identity for this family.
    pub fn from_moments(moments: &LosMoments) -> DistResult<Self> {
        Self::new(moments.mean, moments.std)
    }

    pub fn pdf(&self, v: f64) -> f64 {
        match Normal::new(self.loc, self.scale) {
            Ok(normal) => normal.pdf(v),
            Err(_) => f64::NAN,
        }
    }

    pub fn moments(&self) -> LosMoments {
        LosMoments { mean: self.loc, std: self.scale, gamma1: 0.0, gamma2: 0.0 }
    }
}

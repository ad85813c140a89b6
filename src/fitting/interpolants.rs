//! Smooth parameter fields over `(r_perp, r_parallel)`.
use crate::{
    distributions::{DistributionParameters, VelocityFamily},
    fitting::errors::{FitError, FitResult},
    interpolation::BicubicSpline,
};

/// One natural bicubic spline per parameter field of the family.
#[derive(Debug, Clone)]
pub struct ParameterInterpolants {
    family: VelocityFamily,
    splines: Vec<BicubicSpline>,
}

impl ParameterInterpolants {
    /// `splines` must follow [`VelocityFamily::field_names`] order.
    pub(crate) fn new(family: VelocityFamily, splines: Vec<BicubicSpline>) -> Self {
        Self { family, splines }
    }

    pub fn family(&self) -> VelocityFamily {
        self.family
    }

    /// Splines in field order.
    pub fn splines(&self) -> &[BicubicSpline] {
        &self.splines
    }

    /// `((r_perp_min, r_perp_max), (r_parallel_min, r_parallel_max))`.
    pub fn domain(&self) -> ((f64, f64), (f64, f64)) {
        self.splines[0].domain()
    }

    pub fn field(&self, name: &str) -> FitResult<&BicubicSpline> {
        let index = self.family.field_index(name)?;
        Ok(&self.splines[index])
    }

    /// One field at one separation.
    ///
    /// # Errors
    /// - `Dist(UnknownField)` for a name outside the family.
    /// - `Interp(OutOfDomain)` outside the fitted grid.
    pub fn field_value(&self, name: &str, r_perp: f64, r_parallel: f64) -> FitResult<f64> {
        Ok(self.field(name)?.eval(r_perp, r_parallel)?)
    }

    /// All fields at one separation, validated as distribution parameters.
    pub fn at(&self, r_perp: f64, r_parallel: f64) -> FitResult<DistributionParameters> {
        let fields = self
            .splines
            .iter()
            .map(|s| s.eval(r_perp, r_parallel))
            .collect::<Result<Vec<f64>, _>>()?;
        Ok(DistributionParameters::from_fields(self.family, &fields)?)
    }

    pub fn w(&self, r_perp: f64, r_parallel: f64) -> FitResult<f64> {
        self.skewt_field("w", r_perp, r_parallel)
    }

    pub fn v_c(&self, r_perp: f64, r_parallel: f64) -> FitResult<f64> {
        self.skewt_field("v_c", r_perp, r_parallel)
    }

    pub fn alpha(&self, r_perp: f64, r_parallel: f64) -> FitResult<f64> {
        self.skewt_field("alpha", r_perp, r_parallel)
    }

    pub fn nu(&self, r_perp: f64, r_parallel: f64) -> FitResult<f64> {
        self.skewt_field("nu", r_perp, r_parallel)
    }

    fn skewt_field(&self, name: &str, r_perp: f64, r_parallel: f64) -> FitResult<f64> {
        if self.family != VelocityFamily::SkewT {
            return Err(FitError::FamilyMismatch {
                expected: VelocityFamily::SkewT,
                found: self.family,
            });
        }
        self.field_value(name, r_perp, r_parallel)
    }
}

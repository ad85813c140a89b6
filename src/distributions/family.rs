//! Velocity-family dispatch: one tag, one parameter enum.
use crate::{
    distributions::{
        errors::{DistError, DistResult},
        gaussian::GaussianParams,
        skewt::SkewTParams,
    },
    moments::LosMoments,
};
use std::str::FromStr;

const GAUSSIAN_FIELDS: [&str; 2] = ["loc", "scale"];
const SKEWT_FIELDS: [&str; 4] = ["w", "v_c", "alpha", "nu"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VelocityFamily {
    Gaussian,
    SkewT,
}

impl VelocityFamily {
    /// Parameter fields in storage order.
    pub fn field_names(self) -> &'static [&'static str] {
        match self {
            VelocityFamily::Gaussian => &GAUSSIAN_FIELDS,
            VelocityFamily::SkewT => &SKEWT_FIELDS,
        }
    }

    pub fn n_fields(self) -> usize {
        self.field_names().len()
    }

    /// # Errors
    /// - [`DistError::UnknownField`] if `name` is not a field of this family.
    pub fn field_index(self, name: &str) -> DistResult<usize> {
        self.field_names()
            .iter()
            .position(|f| *f == name)
            .ok_or_else(|| DistError::UnknownField { name: name.to_string() })
    }

    /// Density at `v` from raw fields; `NaN` if they are inadmissible.
    pub fn density_from_fields(self, fields: &[f64], v: f64) -> f64 {
        DistributionParameters::from_fields(self, fields).map_or(f64::NAN, |p| p.pdf(v))
    }
}

impl FromStr for VelocityFamily {
    type Err = DistError;

    /// Accepts `gaussian` and `skewt` / `skew-t` / `skew_t`, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gaussian" => Ok(VelocityFamily::Gaussian),
            "skewt" | "skew-t" | "skew_t" => Ok(VelocityFamily::SkewT),
            _ => Err(DistError::UnknownFamily { name: s.to_string() }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DistributionParameters {
    Gaussian(GaussianParams),
    SkewT(SkewTParams),
}

impl DistributionParameters {
    pub fn family(&self) -> VelocityFamily {
        match self {
            DistributionParameters::Gaussian(_) => VelocityFamily::Gaussian,
            DistributionParameters::SkewT(_) => VelocityFamily::SkewT,
        }
    }

    pub fn pdf(&self, v: f64) -> f64 {
        match self {
            DistributionParameters::Gaussian(p) => p.pdf(v),
            DistributionParameters::SkewT(p) => p.pdf(v),
        }
    }

    /// Fields in the order of [`VelocityFamily::field_names`].
    pub fn fields(&self) -> Vec<f64> {
        match *self {
            DistributionParameters::Gaussian(p) => vec![p.loc, p.scale],
            DistributionParameters::SkewT(p) => vec![p.w, p.v_c, p.alpha, p.nu],
        }
    }

    /// # Errors
    /// - [`DistError::FieldCountMismatch`] for the wrong slice length.
    /// - Parameter validation errors of the family.
    pub fn from_fields(family: VelocityFamily, fields: &[f64]) -> DistResult<Self> {
        if fields.len() != family.n_fields() {
            return Err(DistError::FieldCountMismatch {
                expected: family.n_fields(),
                found: fields.len(),
            });
        }
        match family {
            VelocityFamily::Gaussian => {
                GaussianParams::new(fields[0], fields[1]).map(DistributionParameters::Gaussian)
            }
            VelocityFamily::SkewT => SkewTParams::new(fields[0], fields[1], fields[2], fields[3])
                .map(DistributionParameters::SkewT),
        }
    }

    pub fn moments(&self) -> DistResult<LosMoments> {
        match self {
            DistributionParameters::Gaussian(p) => Ok(p.moments()),
            DistributionParameters::SkewT(p) => p.moments(),
        }
    }
}

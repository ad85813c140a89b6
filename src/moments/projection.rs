//! Line-of-sight projection of radial/transverse moments.
//!
//! For a pair at `(r_perp, r_parallel)` with `r = |(r_perp, r_parallel)|`
//! and `mu = r_parallel / r`, the n-th line-of-sight moment is
//!
//! ```text
//! sum_{k=0}^{n} C(n, k) mu^k (1 - mu^2)^{(n-k)/2} M(k, n-k)(r)
//! ```
//!
//! [`project`] checks every needed `M(k, n-k)` up front, so evaluation only
//! fails on bad separations.
use crate::{
    distributions::VelocityFamily,
    moments::{
        errors::{MomentError, MomentResult},
        moment_set::{MomentKey, MomentMode, MomentSet},
    },
};
use ndarray::{Array1, Array2, ArrayView1};
use statrs::function::factorial::binomial;

/// Largest order addressable with single-digit moment names.
pub const MAX_ORDER: u8 = 9;

/// The n-th line-of-sight moment as a function of `(r_perp, r_parallel)`.
#[derive(Debug, Clone)]
pub struct LosMoment {
    set: MomentSet,
    order: u8,
    mode: MomentMode,
}

/// Project `set` onto the line of sight at order `n`.
///
/// # Errors
/// - [`MomentError::InvalidOrder`] for `n > MAX_ORDER`.
/// - [`MomentError::MissingMoment`] for the first required moment absent
///   from `set`.
pub fn project(set: &MomentSet, n: u8, mode: MomentMode) -> MomentResult<LosMoment> {
    if n > MAX_ORDER {
        return Err(MomentError::InvalidOrder {
            n,
            reason: "Moment names support single-digit orders only.",
        });
    }
    let needed: Vec<MomentKey> = (0..=n).map(|k| MomentKey::new(mode, k, n - k)).collect();
    set.require(&needed)?;
    Ok(LosMoment { set: set.clone(), order: n, mode })
}

impl LosMoment {
    pub fn order(&self) -> u8 {
        self.order
    }

    pub fn mode(&self) -> MomentMode {
        self.mode
    }

    /// Evaluate at one separation.
    ///
    /// # Errors
    /// - [`MomentError::InvalidSeparation`] for non-finite or negative inputs.
    /// - [`MomentError::ZeroSeparation`] at the origin.
    pub fn eval(&self, r_perp: f64, r_parallel: f64) -> MomentResult<f64> {
        if !(r_perp.is_finite() && r_parallel.is_finite()) || r_perp < 0.0 {
            return Err(MomentError::InvalidSeparation { r_perp, r_parallel });
        }
        let r = r_perp.hypot(r_parallel);
        if r == 0.0 {
            return Err(MomentError::ZeroSeparation);
        }
        let mu = r_parallel / r;
        let sin = r_perp / r;
        let n = self.order;
        let mut total = 0.0;
        for k in 0..=n {
            let key = MomentKey::new(self.mode, k, n - k);
            let m = self.set.moment(&key, r)?;
            if m != 0.0 {
                total += binomial(n as u64, k as u64)
                    * mu.powi(k as i32)
                    * sin.powi((n - k) as i32)
                    * m;
            }
        }
        Ok(total)
    }

    /// Evaluate on paired arrays: `out[i] = eval(r_perp[i], r_parallel[i])`.
    ///
    /// # Errors
    /// - [`MomentError::ShapeMismatch`] for unequal lengths.
    pub fn eval_pairs(
        &self, r_perp: ArrayView1<f64>, r_parallel: ArrayView1<f64>,
    ) -> MomentResult<Array1<f64>> {
        if r_perp.len() != r_parallel.len() {
            return Err(MomentError::ShapeMismatch {
                expected: r_perp.len(),
                found: r_parallel.len(),
            });
        }
        r_perp.iter().zip(r_parallel.iter()).map(|(&p, &l)| self.eval(p, l)).collect()
    }

    /// Evaluate on the outer product: `out[i, j] = eval(r_perp[i], r_parallel[j])`.
    pub fn eval_grid(
        &self, r_perp: ArrayView1<f64>, r_parallel: ArrayView1<f64>,
    ) -> MomentResult<Array2<f64>> {
        let mut out = Array2::zeros((r_perp.len(), r_parallel.len()));
        for (i, &p) in r_perp.iter().enumerate() {
            for (j, &l) in r_parallel.iter().enumerate() {
                out[[i, j]] = self.eval(p, l)?;
            }
        }
        Ok(out)
    }
}

/// Line-of-sight summary at one separation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LosMoments {
    pub mean: f64,
    pub std: f64,
    /// Standardized skewness `c3 / c2^1.5`.
    pub gamma1: f64,
    /// Excess kurtosis `c4 / c2^2 - 3`.
    pub gamma2: f64,
}

impl LosMoments {
    /// # Errors
    /// - [`MomentError::NonFiniteMoment`] for any non-finite field.
    /// - [`MomentError::NonPositiveVariance`] for `std <= 0` (reported with
    ///   NaN coordinates; callers that know the node re-tag it).
    pub fn new(mean: f64, std: f64, gamma1: f64, gamma2: f64) -> MomentResult<Self> {
        for (name, value) in [("mean", mean), ("std", std), ("gamma1", gamma1), ("gamma2", gamma2)]
        {
            if !value.is_finite() {
                return Err(MomentError::NonFiniteMoment { name, value });
            }
        }
        if std <= 0.0 {
            return Err(MomentError::NonPositiveVariance {
                r_perp: f64::NAN,
                r_parallel: f64::NAN,
                value: std * std.abs(),
            });
        }
        Ok(Self { mean, std, gamma1, gamma2 })
    }
}

/// Mean, standard deviation, skewness and excess kurtosis along the line of
/// sight, as needed by one velocity family.
///
/// Gaussian: orders 1 (raw) and 2 (central) only; `gamma1 = gamma2 = 0`.
/// Skew-t: orders 1 (raw) and 2–4 (central).
#[derive(Debug, Clone)]
pub struct ProjectedMoments {
    family: VelocityFamily,
    mean: LosMoment,
    c2: LosMoment,
    c3: Option<LosMoment>,
    c4: Option<LosMoment>,
}

impl ProjectedMoments {
    /// # Errors
    /// - [`MomentError::MissingMoment`] for the first moment `family` needs
    ///   that `set` lacks.
    pub fn new(set: &MomentSet, family: VelocityFamily) -> MomentResult<Self> {
        let mean = project(set, 1, MomentMode::Raw)?;
        let c2 = project(set, 2, MomentMode::Central)?;
        let (c3, c4) = match family {
            VelocityFamily::Gaussian => (None, None),
            VelocityFamily::SkewT => (
                Some(project(set, 3, MomentMode::Central)?),
                Some(project(set, 4, MomentMode::Central)?),
            ),
        };
        Ok(Self { family, mean, c2, c3, c4 })
    }

    pub fn family(&self) -> VelocityFamily {
        self.family
    }

    pub fn mean(&self, r_perp: f64, r_parallel: f64) -> MomentResult<f64> {
        self.mean.eval(r_perp, r_parallel)
    }

    pub fn std(&self, r_perp: f64, r_parallel: f64) -> MomentResult<f64> {
        self.variance(r_perp, r_parallel).map(f64::sqrt)
    }

    pub fn gamma1(&self, r_perp: f64, r_parallel: f64) -> MomentResult<f64> {
        Ok(self.at(r_perp, r_parallel)?.gamma1)
    }

    pub fn gamma2(&self, r_perp: f64, r_parallel: f64) -> MomentResult<f64> {
        Ok(self.at(r_perp, r_parallel)?.gamma2)
    }

    /// All four summaries at one separation, projecting `c2` once.
    ///
    /// # Errors
    /// - Separation errors from [`LosMoment::eval`].
    /// - [`MomentError::NonPositiveVariance`] when `c2 <= 0`.
    /// - [`MomentError::NonFiniteMoment`] for non-finite results.
    pub fn at(&self, r_perp: f64, r_parallel: f64) -> MomentResult<LosMoments> {
        let mean = self.mean.eval(r_perp, r_parallel)?;
        let c2 = self.variance(r_perp, r_parallel)?;
        let gamma1 = match &self.c3 {
            Some(c3) => c3.eval(r_perp, r_parallel)? / c2.powf(1.5),
            None => 0.0,
        };
        let gamma2 = match &self.c4 {
            Some(c4) => c4.eval(r_perp, r_parallel)? / (c2 * c2) - 3.0,
            None => 0.0,
        };
        LosMoments::new(mean, c2.sqrt(), gamma1, gamma2)
    }

    fn variance(&self, r_perp: f64, r_parallel: f64) -> MomentResult<f64> {
        let c2 = self.c2.eval(r_perp, r_parallel)?;
        if c2.is_nan() || c2 <= 0.0 {
            return Err(MomentError::NonPositiveVariance { r_perp, r_parallel, value: c2 });
        }
        Ok(c2)
    }
}

//! Skew-t moment matching.
//!
//! Given target `(gamma1, gamma2)`, solve
//!
//! ```text
//! skewness(alpha, nu)        = gamma1
//! excess_kurtosis(alpha, nu) = gamma2
//! ```
//!
//! for the shape, then recover `(w, v_c)` in closed form from the mean and
//! standard deviation. The root finder runs in `(alpha, t)` with
//! `nu = 4 + softplus(t)`, so every iterate has finite kurtosis.
use crate::{
    distributions::{
        DistributionParameters, GaussianParams, SkewTParams, VelocityFamily, excess_kurtosis,
        skewness,
    },
    fitting::errors::{FailureReason, FitError, FitResult},
    moments::LosMoments,
    optimization::{
        errors::{OptError, OptResult},
        numerical_stability::{DOF_FLOOR, bounded_below, bounded_below_inv},
        root_finder::{Residuals, RootOptions, RootProblem, Theta, solve_root},
    },
};
use ndarray::array;

/// Default `(alpha0, nu0)` seed.
pub const DEFAULT_SEED: (f64, f64) = (-0.7, 5.0);

/// Target standardized moments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeTargets {
    pub gamma1: f64,
    pub gamma2: f64,
}

/// Residuals `target - model` in solver coordinates `(alpha, t)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShapeEquations;

impl RootProblem for ShapeEquations {
    type Data = ShapeTargets;

    fn residuals(&self, theta: &Theta, data: &ShapeTargets) -> OptResult<Residuals> {
        let (alpha, nu) = to_shape(theta);
        Ok(array![data.gamma1 - skewness(alpha, nu), data.gamma2 - excess_kurtosis(alpha, nu)])
    }

    fn check(&self, theta: &Theta, data: &ShapeTargets) -> OptResult<()> {
        if theta.len() != 2 {
            return Err(OptError::ResidualDimMismatch { expected: 2, found: theta.len() });
        }
        if let Some((index, value)) =
            [data.gamma1, data.gamma2].into_iter().enumerate().find(|(_, v)| !v.is_finite())
        {
            return Err(OptError::NonFiniteResidual { index, value });
        }
        Ok(())
    }
}

fn to_shape(theta: &Theta) -> (f64, f64) {
    (theta[0], bounded_below(theta[1], DOF_FLOOR))
}

/// Seeded skew-t shape solver.
///
/// Default: [`RootOptions::default`] and [`DEFAULT_SEED`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkewTSolver {
    options: RootOptions,
    seed: (f64, f64),
}

impl Default for SkewTSolver {
    fn default() -> Self {
        Self { options: RootOptions::default(), seed: DEFAULT_SEED }
    }
}

impl SkewTSolver {
    /// # Errors
    /// - [`FitError::InvalidSeed`] unless `alpha0` is finite and `nu0 > 4`.
    pub fn new(options: RootOptions, seed: (f64, f64)) -> FitResult<Self> {
        validate_seed(seed)?;
        Ok(Self { options, seed })
    }

    /// Same options, different seed.
    pub fn with_seed(&self, seed: (f64, f64)) -> FitResult<Self> {
        Self::new(self.options, seed)
    }

    pub fn seed(&self) -> (f64, f64) {
        self.seed
    }

    pub fn options(&self) -> &RootOptions {
        &self.options
    }

    /// Solve for `(alpha, nu)` matching `(gamma1, gamma2)`.
    ///
    /// # Errors
    /// - `FitFailure { NonFinite }` for non-finite targets.
    /// - `FitFailure { NotConverged }` when the residual stays above
    ///   tolerance (the target is not reachable from this seed, or at all).
    /// - `FitFailure { InvalidDof }` if the solution leaves `nu > 4`.
    /// - `FitFailure { Solver }` for errors raised by the root finder.
    pub fn solve_shape(&self, gamma1: f64, gamma2: f64) -> FitResult<(f64, f64)> {
        if !(gamma1.is_finite() && gamma2.is_finite()) {
            return Err(FitError::failure(FailureReason::NonFinite));
        }
        let (alpha0, nu0) = self.seed;
        let theta0 = array![alpha0, bounded_below_inv(nu0, DOF_FLOOR)];
        let targets = ShapeTargets { gamma1, gamma2 };

        let outcome = solve_root(&ShapeEquations, &theta0, &targets, &self.options)
            .map_err(|e| FitError::failure(FailureReason::Solver { text: e.to_string() }))?;
        if !outcome.converged {
            log::debug!(
                "skew-t shape solve for (gamma1 = {gamma1}, gamma2 = {gamma2}) stopped at \
                 max residual {:.3e} ({})",
                outcome.residual_norm,
                outcome.status
            );
            return Err(FitError::failure(FailureReason::NotConverged {
                residual: outcome.residual_norm,
            }));
        }

        let (alpha, nu) = to_shape(&outcome.theta_hat);
        if !alpha.is_finite() {
            return Err(FitError::failure(FailureReason::NonFinite));
        }
        if nu.is_nan() || nu <= DOF_FLOOR {
            return Err(FitError::failure(FailureReason::InvalidDof { nu }));
        }
        Ok((alpha, nu))
    }

    /// Full parameter set `(w, v_c, alpha, nu)` for the target moments.
    ///
    /// # Errors
    /// - Anything from [`SkewTSolver::solve_shape`].
    /// - `FitFailure { InvalidParameters }` if `(w, v_c)` cannot be formed.
    pub fn solve(&self, moments: &LosMoments) -> FitResult<SkewTParams> {
        let (alpha, nu) = self.solve_shape(moments.gamma1, moments.gamma2)?;
        shape_to_params(moments, alpha, nu)
    }
}

/// Combine a solved shape with the target mean/std.
pub(crate) fn shape_to_params(moments: &LosMoments, alpha: f64, nu: f64) -> FitResult<SkewTParams> {
    SkewTParams::from_shape(moments.mean, moments.std, alpha, nu).map_err(|e| {
        FitError::failure(FailureReason::InvalidParameters { text: e.to_string() })
    })
}

fn validate_seed((alpha, nu): (f64, f64)) -> FitResult<()> {
    if !alpha.is_finite() || !nu.is_finite() || nu <= DOF_FLOOR {
        return Err(FitError::InvalidSeed { alpha, nu });
    }
    Ok(())
}

impl VelocityFamily {
    /// Moment matching for this family.
    ///
    /// Gaussian: `loc = mean`, `scale = std`. Skew-t: [`SkewTSolver::solve`].
    ///
    /// # Errors
    /// - Gaussian: `FitFailure { InvalidParameters }` for a non-positive std.
    /// - Skew-t: see [`SkewTSolver::solve`].
    pub fn parameters_from_moments(
        self, moments: &LosMoments, solver: &SkewTSolver,
    ) -> FitResult<DistributionParameters> {
        match self {
            VelocityFamily::Gaussian => GaussianParams::from_moments(moments)
                .map(DistributionParameters::Gaussian)
                .map_err(|e| {
                    FitError::failure(FailureReason::InvalidParameters { text: e.to_string() })
                }),
            VelocityFamily::SkewT => solver.solve(moments).map(DistributionParameters::SkewT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn round_trip(mean: f64, std: f64, gamma1: f64, gamma2: f64) -> LosMoments {
        let target = LosMoments::new(mean, std, gamma1, gamma2).unwrap();
        let params = SkewTSolver::default().solve(&target).unwrap();
        assert!(params.nu > 4.0);
        params.moments().unwrap()
    }

    #[test]
    // Purpose
    // -------
    // Solving and re-computing moments reproduces the targets.
    //
    // Given
    // -----
    // - (mean, std, gamma1, gamma2) = (-6, 2, -1, 3.2).
    //
    // Expect
    // ------
    // - nu > 1 and every moment back to two decimal places.
    fn solve_round_trips_reference_case() {
        // Arrange / Act
        let back = round_trip(-6.0, 2.0, -1.0, 3.2);

        // Assert
        assert_abs_diff_eq!(back.mean, -6.0, epsilon = 5e-3);
        assert_abs_diff_eq!(back.std, 2.0, epsilon = 5e-3);
        assert_abs_diff_eq!(back.gamma1, -1.0, epsilon = 5e-3);
        assert_abs_diff_eq!(back.gamma2, 3.2, epsilon = 5e-3);
    }

    #[test]
    // Purpose
    // -------
    // Round trip across symmetric, mildly skewed and nearly Gaussian targets.
    //
    // Given
    // -----
    // - (0, 6, 0, 0.2), (-3, 2, 0.52, 2.27), (0, 5, -0.025, 0.23).
    //
    // Expect
    // ------
    // - Moments reproduced to 1e-6.
    fn solve_round_trips_across_shapes() {
        for (mean, std, g1, g2) in [(0.0, 6.0, 0.0, 0.2), (-3.0, 2.0, 0.52, 2.27), (0.0, 5.0, -0.025, 0.23)]
        {
            let back = round_trip(mean, std, g1, g2);
            assert_abs_diff_eq!(back.mean, mean, epsilon = 1e-6);
            assert_relative_eq!(back.std, std, max_relative = 1e-6);
            assert_abs_diff_eq!(back.gamma1, g1, epsilon = 1e-6);
            assert_abs_diff_eq!(back.gamma2, g2, epsilon = 1e-6);
        }
    }

    #[test]
    // Purpose
    // -------
    // Unreachable targets are reported as fit failures, not returned.
    //
    // Given
    // -----
    // - gamma1 = 1.78 with gamma2 = 2.7 from seed (1, 5): excess kurtosis
    //   too small for that skewness.
    //
    // Expect
    // ------
    // - `FitFailure { NotConverged }`.
    fn infeasible_target_is_fit_failure() {
        let solver = SkewTSolver::default().with_seed((1.0, 5.0)).unwrap();
        let err = solver.solve_shape(1.78, 2.7).unwrap_err();
        assert!(matches!(
            err,
            FitError::FitFailure { reason: FailureReason::NotConverged { .. }, .. }
        ));
    }

    #[test]
    // Purpose
    // -------
    // Seeds are validated and non-finite targets rejected up front.
    //
    // Given
    // -----
    // - Seed nu0 = 4 and a NaN target.
    //
    // Expect
    // ------
    // - `InvalidSeed` and `FitFailure { NonFinite }`.
    fn seeds_and_targets_are_validated() {
        assert!(matches!(
            SkewTSolver::new(RootOptions::default(), (0.0, 4.0)),
            Err(FitError::InvalidSeed { .. })
        ));
        assert_eq!(
            SkewTSolver::default().solve_shape(f64::NAN, 1.0),
            Err(FitError::failure(FailureReason::NonFinite))
        );
    }

    #[test]
    // Purpose
    // -------
    // Gaussian moment matching is the identity.
    //
    // Given
    // -----
    // - mean = 1.5, std = 0.5.
    //
    // Expect
    // ------
    // - loc = 1.5, scale = 0.5.
    fn gaussian_parameters_are_the_moments() {
        let m = LosMoments::new(1.5, 0.5, 0.0, 0.0).unwrap();
        let p = VelocityFamily::Gaussian
            .parameters_from_moments(&m, &SkewTSolver::default())
            .unwrap();
        assert_eq!(p, DistributionParameters::Gaussian(GaussianParams::new(1.5, 0.5).unwrap()));
    }
}

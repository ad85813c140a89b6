//! Public surface for square nonlinear systems.
//!
//! - [`RootProblem`]: trait users implement for `F(θ) = 0`.
//! - [`RootOptions`] and [`Tolerances`]: solver configuration.
//! - [`RootOutcome`]: normalized result returned by [`solve_root`](super::solve_root).
use crate::optimization::{
    errors::{OptError, OptResult},
    root_finder::{
        FnEvalMap, Jac, Residuals, Theta,
        validation::{max_abs, validate_theta_hat, verify_positive},
    },
};
use argmin::core::TerminationStatus;

/// User-implemented residual system.
///
/// Required:
/// - `residuals(&Theta, &Data) -> OptResult<Residuals>`: evaluate `F(θ)`.
///   Returning non-finite entries is allowed away from the starting point;
///   the line search treats them as rejected trial steps.
/// - `check(&Theta, &Data) -> OptResult<()>`: called once on the seed.
///
/// Optional:
/// - `jacobian(&Theta, &Data) -> OptResult<Jac>`: analytic `∂F/∂θ`. When not
///   implemented, central differences are used row by row.
pub trait RootProblem {
    type Data;

    // Required methods
    fn residuals(&self, theta: &Theta, data: &Self::Data) -> OptResult<Residuals>;
    fn check(&self, theta: &Theta, data: &Self::Data) -> OptResult<()>;

    // Optional methods
    fn jacobian(&self, _theta: &Theta, _data: &Self::Data) -> OptResult<Jac> {
        Err(OptError::JacobianNotImplemented)
    }
}

/// Stopping rules for the damped Newton iteration.
///
/// - `residual_tol`: a run succeeds only when `max_i |F_i(θ̂)| <= residual_tol`.
/// - `step_tol`: stop once an accepted step is shorter than this (L2 norm).
/// - `max_iter`: hard cap on Newton iterations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub residual_tol: f64,
    pub step_tol: f64,
    pub max_iter: usize,
}

impl Tolerances {
    /// Construct validated tolerances.
    ///
    /// # Errors
    /// - [`OptError::InvalidResidualTol`] / [`OptError::InvalidStepTol`] for
    ///   non-finite or non-positive tolerances.
    /// - [`OptError::InvalidMaxIter`] if `max_iter == 0`.
    pub fn new(residual_tol: f64, step_tol: f64, max_iter: usize) -> OptResult<Self> {
        verify_positive(residual_tol)
            .map_err(|reason| OptError::InvalidResidualTol { tol: residual_tol, reason })?;
        verify_positive(step_tol)
            .map_err(|reason| OptError::InvalidStepTol { tol: step_tol, reason })?;
        if max_iter == 0 {
            return Err(OptError::InvalidMaxIter {
                max_iter,
                reason: "Maximum iterations must be greater than zero.",
            });
        }
        Ok(Self { residual_tol, step_tol, max_iter })
    }
}

impl Default for Tolerances {
    fn default() -> Self {
        Self { residual_tol: 1e-8, step_tol: 1e-12, max_iter: 200 }
    }
}

/// Solver-level configuration.
///
/// Default: `Tolerances::default()`, 40 step halvings, not verbose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootOptions {
    pub tols: Tolerances,
    pub max_backtracks: usize,
    pub verbose: bool,
}

impl RootOptions {
    /// Create solver options.
    ///
    /// # Errors
    /// - [`OptError::InvalidBacktracks`] if `max_backtracks == 0`.
    pub fn new(tols: Tolerances, max_backtracks: usize, verbose: bool) -> OptResult<Self> {
        if max_backtracks == 0 {
            return Err(OptError::InvalidBacktracks {
                max_backtracks,
                reason: "At least one step halving must be allowed.",
            });
        }
        Ok(Self { tols, max_backtracks, verbose })
    }
}

impl Default for RootOptions {
    fn default() -> Self {
        Self { tols: Tolerances::default(), max_backtracks: 40, verbose: false }
    }
}

/// Canonical result returned by `solve_root`.
///
/// - `theta_hat`: final iterate.
/// - `residuals`: `F(θ̂)`.
/// - `residual_norm`: `max_i |F_i(θ̂)|`.
/// - `converged`: `residual_norm <= residual_tol`.
/// - `status`: argmin termination status, as text.
/// - `iterations`, `fn_evals`: counters reported by argmin.
#[derive(Debug, Clone, PartialEq)]
pub struct RootOutcome {
    pub theta_hat: Theta,
    pub residuals: Residuals,
    pub residual_norm: f64,
    pub converged: bool,
    pub status: String,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
}

impl RootOutcome {
    /// Build a validated outcome from raw solver state.
    ///
    /// # Errors
    /// - Propagates `validate_theta_hat` failures (missing or non-finite θ̂).
    pub fn new(
        theta_hat_opt: Option<Theta>, residuals: Residuals, residual_tol: f64,
        termination: &TerminationStatus, iterations: u64, fn_evals: FnEvalMap,
    ) -> OptResult<Self> {
        let theta_hat = validate_theta_hat(theta_hat_opt)?;
        let residual_norm = max_abs(&residuals);
        let converged = residual_norm.is_finite() && residual_norm <= residual_tol;
        let status = match termination {
            TerminationStatus::NotTerminated => "Not terminated".to_string(),
            other => format!("{other:?}"),
        };
        Ok(Self {
            theta_hat,
            residuals,
            residual_norm,
            converged,
            status,
            iterations: iterations as usize,
            fn_evals,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Reject non-positive and non-finite tolerances.
    //
    // Given
    // -----
    // - Zero residual tolerance, NaN step tolerance, zero iterations.
    //
    // Expect
    // ------
    // - The matching `OptError` variant for each.
    fn tolerances_reject_invalid_values() {
        assert!(matches!(
            Tolerances::new(0.0, 1e-12, 10),
            Err(OptError::InvalidResidualTol { .. })
        ));
        assert!(matches!(
            Tolerances::new(1e-8, f64::NAN, 10),
            Err(OptError::InvalidStepTol { .. })
        ));
        assert!(matches!(Tolerances::new(1e-8, 1e-12, 0), Err(OptError::InvalidMaxIter { .. })));
        assert!(matches!(
            RootOptions::new(Tolerances::default(), 0, false),
            Err(OptError::InvalidBacktracks { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // `converged` reflects the residual tolerance, not the termination reason.
    //
    // Given
    // -----
    // - A terminated status with residual above tolerance.
    //
    // Expect
    // ------
    // - `converged == false` and `residual_norm` equals the largest |F_i|.
    fn outcome_convergence_uses_residual() {
        let status = TerminationStatus::Terminated(
            argmin::core::TerminationReason::SolverConverged,
        );
        let out = RootOutcome::new(
            Some(ndarray::array![0.0, 1.0]),
            ndarray::array![1e-3, -2e-3],
            1e-8,
            &status,
            4,
            FnEvalMap::new(),
        )
        .unwrap();

        assert!(!out.converged);
        assert_eq!(out.residual_norm, 2e-3);
        assert_eq!(out.iterations, 4);
    }
}

//! High-level entry point: find `θ̂` with `F(θ̂) ≈ 0`.
use crate::optimization::{
    errors::OptResult,
    root_finder::{
        RootOptions, RootOutcome, RootProblem, Theta, adapter::ArgMinAdapter, run::run_newton,
    },
};

/// Solve the square system `F(θ) = 0` by damped Newton from `theta0`.
///
/// Calls `f.check(theta0, data)` once, then iterates. The returned outcome
/// carries `converged == true` only when `max|F(θ̂)| <= opts.tols.residual_tol`;
/// a non-converged outcome is not an error at this level.
///
/// # Errors
/// - Anything `check` rejects.
/// - `OptError::NonFiniteResidual` if `F(theta0)` is not finite.
/// - Backend and validation errors from the run.
pub fn solve_root<F: RootProblem>(
    f: &F, theta0: &Theta, data: &F::Data, opts: &RootOptions,
) -> OptResult<RootOutcome> {
    f.check(theta0, data)?;
    let problem = ArgMinAdapter::new(f, data);
    run_newton(theta0.clone(), opts, problem)
}

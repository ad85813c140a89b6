//! Execution helper that runs the damped Newton solver on a residual system
//! and returns a crate-friendly [`RootOutcome`].
use crate::optimization::{
    errors::OptResult,
    root_finder::{
        RootOptions, RootOutcome, RootProblem, Theta, adapter::ArgMinAdapter,
        solver::DampedNewton,
    },
};
#[cfg(feature = "obs_slog")]
use crate::optimization::root_finder::validation::max_abs;
#[cfg(feature = "obs_slog")]
use argmin::core::Operator;
use argmin::core::{Executor, State};

/// Run damped Newton from `theta0`.
///
/// Wires up the adapter, initial parameter, iteration cap and a target cost
/// of `½(residual_tol / 100)²` so the iteration polishes past the acceptance
/// threshold before stopping.
///
/// # Feature flags
/// With `obs_slog` and `opts.verbose`, a terminal slog observer is attached
/// with `ObserverMode::Always` and the starting residual norm is printed.
///
/// # Errors
/// - Propagates argmin runtime errors and user residual errors via
///   `From<argmin::core::Error> for OptError`.
/// - Propagates `RootOutcome::new` validation errors.
pub fn run_newton<'a, F>(
    theta0: Theta, opts: &RootOptions, problem: ArgMinAdapter<'a, F>,
) -> OptResult<RootOutcome>
where
    F: RootProblem,
{
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        log_initial_state(&theta0, &problem)?;
    }
    let (f, data) = (problem.f, problem.data);
    let solver = DampedNewton::new(opts.tols.step_tol, opts.max_backtracks);
    let target = 0.5 * (opts.tols.residual_tol * 1e-2).powi(2);
    let max_iter = opts.tols.max_iter as u64;

    let mut executor = Executor::new(problem, solver)
        .configure(|state| state.param(theta0).max_iters(max_iter).target_cost(target));
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        executor = executor.add_observer(observer, argmin::core::observers::ObserverMode::Always);
    }

    let mut result = executor.run()?.state().clone();
    let iterations = result.get_iter();
    let fn_evals = result.get_func_counts().clone();
    let termination = result.get_termination_status().clone();
    let theta_hat = result.take_best_param();
    let residuals = match &theta_hat {
        Some(theta) => f.residuals(theta, data)?,
        None => Theta::from_elem(0, f64::NAN),
    };
    RootOutcome::new(
        theta_hat,
        residuals,
        opts.tols.residual_tol,
        &termination,
        iterations,
        fn_evals,
    )
}

#[cfg(feature = "obs_slog")]
fn log_initial_state<F>(theta0: &Theta, problem: &ArgMinAdapter<'_, F>) -> OptResult<()>
where
    F: RootProblem,
{
    let residuals = problem.apply(theta0)?;
    eprintln!("init: max|F(theta0)| = {:.6e}", max_abs(&residuals));
    Ok(())
}

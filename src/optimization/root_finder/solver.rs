//! Damped Newton iteration as an argmin `Solver`.
//!
//! Each iteration solves `J d = -F` for the Newton direction (falling back
//! to the merit-function descent direction `-Jᵀ F` when `J` is singular),
//! then halves the step until `½‖F‖²` shows sufficient decrease. A failed
//! line search ends the run with the current iterate; success is judged by
//! the caller against the residual tolerance.
use crate::optimization::{
    errors::OptError,
    root_finder::{
        types::{Jac, Residuals, RootState, Theta},
        validation::half_sq_norm,
    },
};
use argmin::core::{
    ArgminError, Error, Jacobian, KV, Operator, Problem, Solver, State, TerminationReason,
    TerminationStatus,
};
use argmin_math::ArgminL2Norm;
use nalgebra::{DMatrix, DVector};

/// Sufficient-decrease constant for the backtracking test.
const ARMIJO_C: f64 = 1e-4;

#[derive(Debug, Clone)]
pub struct DampedNewton {
    step_tol: f64,
    max_backtracks: usize,
    last_step: f64,
    stalled: bool,
}

impl DampedNewton {
    pub fn new(step_tol: f64, max_backtracks: usize) -> Self {
        Self { step_tol, max_backtracks, last_step: f64::INFINITY, stalled: false }
    }
}

impl<O> Solver<O, RootState> for DampedNewton
where
    O: Operator<Param = Theta, Output = Residuals> + Jacobian<Param = Theta, Jacobian = Jac>,
{
    const NAME: &'static str = "Damped Newton";

    fn init(
        &mut self, problem: &mut Problem<O>, state: RootState,
    ) -> Result<(RootState, Option<KV>), Error> {
        let theta = state.get_param().ok_or_else(|| ArgminError::NotInitialized {
            text: "Damped Newton requires an initial parameter vector.".to_string(),
        })?;
        let residuals = problem.apply(theta)?;
        if let Some((index, &value)) = residuals.iter().enumerate().find(|(_, r)| !r.is_finite())
        {
            return Err(OptError::NonFiniteResidual { index, value }.into());
        }
        let cost = half_sq_norm(&residuals);
        self.last_step = f64::INFINITY;
        self.stalled = false;
        Ok((state.residuals(residuals).cost(cost), None))
    }

    fn next_iter(
        &mut self, problem: &mut Problem<O>, mut state: RootState,
    ) -> Result<(RootState, Option<KV>), Error> {
        let theta = state.take_param().ok_or_else(|| ArgminError::NotInitialized {
            text: "Damped Newton lost its parameter vector.".to_string(),
        })?;
        let residuals = problem.apply(&theta)?;
        let jac = problem.jacobian(&theta)?;
        let merit = half_sq_norm(&residuals);
        let direction = newton_direction(&jac, &residuals);

        let mut lambda = 1.0;
        for _ in 0..self.max_backtracks {
            let trial = &theta + &(&direction * lambda);
            let trial_residuals = problem.apply(&trial)?;
            let trial_merit = half_sq_norm(&trial_residuals);
            if trial_merit.is_finite() && trial_merit <= (1.0 - ARMIJO_C * lambda) * merit {
                self.last_step = lambda * direction.l2_norm();
                let state =
                    state.param(trial).residuals(trial_residuals).jacobian(jac).cost(trial_merit);
                return Ok((state, None));
            }
            lambda *= 0.5;
        }

        self.stalled = true;
        self.last_step = 0.0;
        Ok((state.param(theta).residuals(residuals).jacobian(jac).cost(merit), None))
    }

    fn terminate(&mut self, _state: &RootState) -> TerminationStatus {
        if self.stalled || self.last_step < self.step_tol {
            return TerminationStatus::Terminated(TerminationReason::SolverConverged);
        }
        TerminationStatus::NotTerminated
    }
}

/// Newton direction `-J⁻¹F`, or `-JᵀF` when the LU solve fails.
fn newton_direction(jac: &Jac, residuals: &Residuals) -> Theta {
    let (rows, cols) = jac.dim();
    let j = DMatrix::from_fn(rows, cols, |i, k| jac[[i, k]]);
    let rhs = DVector::from_iterator(rows, residuals.iter().map(|r| -r));
    match j.clone().lu().solve(&rhs) {
        Some(d) if d.iter().all(|v| v.is_finite()) => d.iter().copied().collect(),
        _ => {
            let d = j.transpose() * rhs;
            d.iter().copied().collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // A non-singular Jacobian yields the exact Newton step.
    //
    // Given
    // -----
    // - J = diag(2, 4), F = (2, -4).
    //
    // Expect
    // ------
    // - d = (-1, 1).
    fn newton_direction_solves_linear_system() {
        let d = newton_direction(&array![[2.0, 0.0], [0.0, 4.0]], &array![2.0, -4.0]);
        assert_abs_diff_eq!(d[0], -1.0, epsilon = 1e-14);
        assert_abs_diff_eq!(d[1], 1.0, epsilon = 1e-14);
    }

    #[test]
    // Purpose
    // -------
    // A singular Jacobian falls back to the gradient of ½‖F‖².
    //
    // Given
    // -----
    // - J with identical rows, F = (1, 1).
    //
    // Expect
    // ------
    // - d = -JᵀF.
    fn newton_direction_falls_back_on_singular_jacobian() {
        let d = newton_direction(&array![[1.0, 2.0], [1.0, 2.0]], &array![1.0, 1.0]);
        assert_abs_diff_eq!(d[0], -2.0, epsilon = 1e-14);
        assert_abs_diff_eq!(d[1], -4.0, epsilon = 1e-14);
    }
}

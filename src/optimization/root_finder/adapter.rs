//! Adapter that exposes a user `RootProblem` as an argmin operator.
//!
//! `Operator::apply` evaluates the residual vector `F(θ)`; `Jacobian`
//! returns the user's analytic Jacobian when available and otherwise builds
//! it row by row with central differences of each residual component.
use std::cell::RefCell;

use crate::optimization::{
    errors::OptError,
    root_finder::{
        traits::RootProblem,
        types::{Jac, Residuals, Theta},
        validation::{validate_jacobian, validate_residuals},
    },
};
use argmin::core::{Error, Jacobian, Operator};
use finitediff::FiniteDiff;

/// Bridges a user `RootProblem` to argmin's `Operator` and `Jacobian`.
#[derive(Debug)]
pub struct ArgMinAdapter<'a, F: RootProblem> {
    pub f: &'a F,
    pub data: &'a F::Data,
}

impl<'a, F: RootProblem> ArgMinAdapter<'a, F> {
    pub fn new(f: &'a F, data: &'a F::Data) -> Self {
        Self { f, data }
    }
}

impl<'a, F: RootProblem> Operator for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Output = Residuals;

    /// Evaluate `F(θ)` and check its length.
    ///
    /// Non-finite entries are passed through; the solver decides whether they
    /// are fatal (starting point) or just a rejected trial step.
    fn apply(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        let residuals = self.f.residuals(theta, self.data)?;
        validate_residuals(&residuals, theta.len())?;
        Ok(residuals)
    }
}

impl<'a, F: RootProblem> Jacobian for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Jacobian = Jac;

    /// Evaluate `∂F/∂θ` at `θ`.
    ///
    /// Finite-difference branch: each row `i` is the central-difference
    /// gradient of `θ ↦ F_i(θ)`. The FD closure must return `f64`, so the
    /// first residual error is parked in a `RefCell` and surfaced afterwards.
    ///
    /// # Errors
    /// - Propagates user errors other than `JacobianNotImplemented`.
    /// - Propagates residual errors raised during differencing.
    /// - Returns validation errors for wrong shape or non-finite entries.
    fn jacobian(&self, theta: &Self::Param) -> Result<Self::Jacobian, Error> {
        let dim = theta.len();
        match self.f.jacobian(theta, self.data) {
            Ok(jac) => {
                validate_jacobian(&jac, dim)?;
                Ok(jac)
            }
            Err(OptError::JacobianNotImplemented) => {
                let closure_err: RefCell<Option<Error>> = RefCell::new(None);
                let mut jac = Jac::zeros((dim, dim));
                for row in 0..dim {
                    let component = |t: &Theta| -> f64 {
                        match self.apply(t) {
                            Ok(res) => res[row],
                            Err(e) => {
                                let mut slot = closure_err.borrow_mut();
                                if slot.is_none() {
                                    *slot = Some(e);
                                }
                                f64::NAN
                            }
                        }
                    };
                    let grad = theta.central_diff(&component);
                    jac.row_mut(row).assign(&grad);
                }
                if let Some(err) = closure_err.take() {
                    return Err(err);
                }
                validate_jacobian(&jac, dim)?;
                Ok(jac)
            }
            Err(e) => Err(e.into()),
        }
    }
}

//! root_finder — damped Newton for small square nonlinear systems.
//!
//! Purpose
//! -------
//! Solve `F(θ) = 0` for a handful of unconstrained parameters, used to
//! invert the skewness/kurtosis map of the skew-t distribution. Callers
//! implement [`RootProblem`], pick [`RootOptions`], and receive a
//! [`RootOutcome`] without touching argmin generics.
//!
//! Key behaviors
//! -------------
//! - [`ArgMinAdapter`] exposes a `RootProblem` as an argmin `Operator` plus
//!   `Jacobian`, with central finite differences when no analytic Jacobian
//!   is supplied.
//! - [`DampedNewton`] is an argmin `Solver`: Newton direction via an LU solve
//!   (nalgebra), steepest-descent fallback, step halving on `½‖F‖²`.
//! - [`solve_root`] validates the seed, runs the executor and reports
//!   residual-based convergence.
//!
//! Invariants & assumptions
//! ------------------------
//! - Systems are square: `residuals.len() == theta.len()`.
//! - `F(θ₀)` must be finite; later non-finite trial points are treated as
//!   rejected steps.
//!
//! Conventions
//! -----------
//! - `converged` means `max|F(θ̂)| <= residual_tol`; an argmin termination
//!   reason alone never implies success.
//! - Progress output is only produced behind the `obs_slog` feature.
//!
//! Testing notes
//! -------------
//! - Unit tests cover tolerance validation, FD Jacobians, the direction
//!   fallback and end-to-end solves on toy systems with and without a root.

pub mod adapter;
pub mod api;
pub mod run;
pub mod solver;
pub mod traits;
pub mod types;
pub mod validation;

pub use self::adapter::ArgMinAdapter;
pub use self::api::solve_root;
pub use self::solver::DampedNewton;
pub use self::traits::{RootOptions, RootOutcome, RootProblem, Tolerances};
pub use self::types::{FnEvalMap, Jac, Residuals, RootState, Theta};

pub mod prelude {
    pub use super::api::solve_root;
    pub use super::traits::{RootOptions, RootOutcome, RootProblem, Tolerances};
    pub use super::types::{Jac, Residuals, Theta};
}

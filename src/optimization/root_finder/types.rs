//! root_finder::types — numeric aliases shared by the root-finding stack.
//!
//! `Theta` is the unconstrained coordinate vector, `Residuals` the value of
//! the system `F(θ)` whose zero is sought, and `Jac` the dense
//! `residuals × parameters` Jacobian. `RootState` is the argmin state the
//! damped Newton solver iterates on.
use argmin::core::IterState;
use ndarray::{Array1, Array2};
use std::collections::HashMap;

/// Unconstrained parameter vector.
pub type Theta = Array1<f64>;

/// Residual vector `F(θ)`; same length as `Theta` for a square system.
pub type Residuals = Array1<f64>;

/// Dense Jacobian `∂F_i/∂θ_j`.
pub type Jac = Array2<f64>;

/// Function-evaluation counters reported by argmin (`"operator_count"`, ...).
pub type FnEvalMap = HashMap<String, u64>;

/// Solver state: parameters, Jacobian and residuals tracked, cost is `½‖F‖²`.
pub type RootState = IterState<Theta, (), Jac, (), Residuals, f64>;

//! optimization — root finding, numerical helpers, and unified error surface.
//!
//! Purpose
//! -------
//! Provide the numerical machinery behind distribution fitting: an
//! argmin-backed damped Newton solver for small nonlinear systems, guarded
//! scalar transforms for bounded parameters, and a single error/result
//! surface.
//!
//! Key behaviors
//! -------------
//! - [`root_finder`]: implement `RootProblem`, call `solve_root`, receive a
//!   `RootOutcome` with residual-based convergence.
//! - [`numerical_stability`]: softplus-based maps between unconstrained
//!   solver coordinates and bounded model parameters.
//! - [`errors`]: `OptError` / `OptResult<T>`, including recovery of user
//!   errors that travelled through argmin.
//!
//! Conventions
//! -----------
//! - Public entry points that can fail return `OptResult<T>`; callers never
//!   see raw argmin errors.
//! - Nothing in this module logs; verbosity is limited to the optional
//!   `obs_slog` observer.
//!
//! Downstream usage
//! ----------------
//! - `fitting::solver` implements `RootProblem` for the skew-t shape
//!   equations and maps `OptError` into fitting failures.

pub mod errors;
pub mod numerical_stability;
pub mod root_finder;

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::numerical_stability::prelude::*;
    pub use super::root_finder::prelude::*;
}

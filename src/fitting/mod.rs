//! fitting — moment matching from projected moments to distribution fields.
//!
//! Purpose
//! -------
//! Turn line-of-sight moments into parameters of a [`VelocityFamily`] at every
//! node of a separation grid, and turn those node tables into smooth
//! parameter fields.
//!
//! Key behaviors
//! -------------
//! - [`SkewTSolver`] solves `(gamma1, gamma2) -> (alpha, nu)` with a damped
//!   Newton root finder in the unconstrained coordinates `(alpha, t)`,
//!   `nu = 4 + softplus(t)`; `(w, v_c)` then follow in closed form.
//! - [`LookupTable`] precomputes `(alpha, nu)` over a `(gamma1, gamma2)`
//!   grid and interpolates it, as a faster alternative to per-node solves.
//! - [`ParameterGrid`] fits every node (optionally in parallel), records
//!   per-node failures, and builds [`ParameterInterpolants`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Every solved skew-t has `nu > 4`, so its first four moments exist.
//! - A grid with failed nodes never produces interpolants.
//!
//! Conventions
//! -----------
//! - Node-level problems are `FitError::FitFailure`; everything else
//!   (configuration, axes, I/O) is a distinct variant and aborts.
//! - Field order follows [`VelocityFamily::field_names`].
//!
//! Downstream usage
//! ----------------
//! - `streaming::LineOfSightPdf` wraps [`ParameterInterpolants`].
//! - `model::StreamingModel` drives fit → interpolate in one call.
//!
//! [`VelocityFamily`]: crate::distributions::VelocityFamily
//! [`VelocityFamily::field_names`]: crate::distributions::VelocityFamily::field_names

pub mod errors;
pub mod grid;
pub mod interpolants;
pub mod lookup_table;
pub mod solver;

pub use self::errors::{FailureReason, FitError, FitResult};
pub use self::grid::{FitStrategy, NodeFailure, ParameterGrid};
pub use self::interpolants::ParameterInterpolants;
pub use self::lookup_table::{LookupTable, LookupTableSpec};
pub use self::solver::{DEFAULT_SEED, ShapeEquations, ShapeTargets, SkewTSolver};

pub mod prelude {
    pub use super::errors::{FitError, FitResult};
    pub use super::grid::{FitStrategy, ParameterGrid};
    pub use super::interpolants::ParameterInterpolants;
    pub use super::lookup_table::{LookupTable, LookupTableSpec};
    pub use super::solver::SkewTSolver;
}

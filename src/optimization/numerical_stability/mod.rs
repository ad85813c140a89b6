//! numerical_stability — guarded scalar transforms for solver coordinates.
//!
//! Purpose
//! -------
//! Keep bounded model parameters (currently the skew-t degrees of freedom)
//! inside their admissible range while the root finder works on
//! unconstrained reals.
//!
//! Key behaviors
//! -------------
//! - `safe_softplus` / `safe_softplus_inv` switch to the identity above a
//!   fixed cutoff so `f64` arithmetic never overflows.
//! - `bounded_below` / `bounded_below_inv` shift softplus by a floor such as
//!   [`DOF_FLOOR`].
//!
//! Conventions
//! -----------
//! - Pure functions, no logging or allocation; safe in tight loops.
//! - Inadmissible inverse inputs map to `NaN` rather than panicking;
//!   callers validate seeds before transforming.

pub mod transformations;

pub use self::transformations::{
    DOF_FLOOR, bounded_below, bounded_below_inv, safe_softplus, safe_softplus_inv,
};

pub mod prelude {
    pub use super::transformations::{
        DOF_FLOOR, bounded_below, bounded_below_inv, safe_softplus, safe_softplus_inv,
    };
}

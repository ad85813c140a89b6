//! Errors for moment sets and their line-of-sight projection.

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

pub type MomentResult<T> = Result<T, MomentError>;

#[derive(Debug, Clone, PartialEq)]
pub enum MomentError {
    // ---- Configuration ----
    /// A moment needed by the projection was never supplied.
    MissingMoment { name: String },
    /// Moment names look like `c_20` / `m_10`.
    InvalidMomentName { name: String, reason: &'static str },
    /// Projection order outside the supported range.
    InvalidOrder { n: u8, reason: &'static str },
    /// Velocity quadrature settings for density projection.
    InvalidProjectionOptions { reason: &'static str },

    // ---- Evaluation ----
    /// The projection angle is undefined at zero separation.
    ZeroSeparation,
    /// Separations must be finite and non-negative.
    InvalidSeparation { r_perp: f64, r_parallel: f64 },
    /// Paired separation arrays must have equal length.
    ShapeMismatch { expected: usize, found: usize },
    /// Projected variance must be positive for a standard deviation to exist.
    NonPositiveVariance { r_perp: f64, r_parallel: f64, value: f64 },
    /// A projected moment evaluated to NaN or infinity.
    NonFiniteMoment { name: &'static str, value: f64 },
}

impl std::error::Error for MomentError {}

impl std::fmt::Display for MomentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MomentError::MissingMoment { name } => {
                write!(f, "Missing moment '{name}' required by the projection")
            }
            MomentError::InvalidMomentName { name, reason } => {
                write!(f, "Invalid moment name '{name}': {reason}")
            }
            MomentError::InvalidOrder { n, reason } => {
                write!(f, "Invalid projection order {n}: {reason}")
            }
            MomentError::InvalidProjectionOptions { reason } => {
                write!(f, "Invalid projection options: {reason}")
            }
            MomentError::ZeroSeparation => {
                write!(f, "Line-of-sight angle is undefined at zero separation")
            }
            MomentError::InvalidSeparation { r_perp, r_parallel } => {
                write!(f, "Invalid separation (r_perp = {r_perp}, r_parallel = {r_parallel})")
            }
            MomentError::ShapeMismatch { expected, found } => {
                write!(f, "Separation arrays differ in length: {expected} vs {found}")
            }
            MomentError::NonPositiveVariance { r_perp, r_parallel, value } => {
                write!(
                    f,
                    "Projected variance {value} is not positive at (r_perp = {r_perp}, \
                     r_parallel = {r_parallel})"
                )
            }
            MomentError::NonFiniteMoment { name, value } => {
                write!(f, "Projected {name} is not finite: {value}")
            }
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<MomentError> for PyErr {
    fn from(err: MomentError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

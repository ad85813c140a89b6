//! Errors for line-of-sight densities and the streaming integral.
use crate::{fitting::FitError, interpolation::InterpError};

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

pub type StreamResult<T> = Result<T, StreamError>;

#[derive(Debug, Clone, PartialEq)]
pub enum StreamError {
    // ---- StreamingOptions ----
    /// Integration limit needs to be positive and finite.
    InvalidLimit { limit: f64, reason: &'static str },
    /// Offset around zero displacement must satisfy `0 < epsilon < limit`.
    InvalidEpsilon { epsilon: f64, limit: f64 },
    /// Each half needs at least three quadrature samples.
    InvalidPoints { n_points: usize },

    // ---- Inputs ----
    /// Array shapes disagree.
    ShapeMismatch { expected: (usize, usize), found: (usize, usize) },
    /// Separations must be finite and non-negative.
    InvalidSeparation { index: usize, value: f64 },
    /// Direction cosines must lie in `[-1, 1]`.
    InvalidMu { index: usize, value: f64 },

    // ---- Wrapped ----
    Fit(FitError),
    Interp(InterpError),
}

impl std::error::Error for StreamError {}

impl std::fmt::Display for StreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamError::InvalidLimit { limit, reason } => {
                write!(f, "Invalid integration limit {limit}: {reason}")
            }
            StreamError::InvalidEpsilon { epsilon, limit } => {
                write!(f, "Invalid epsilon {epsilon}: must satisfy 0 < epsilon < limit ({limit})")
            }
            StreamError::InvalidPoints { n_points } => {
                write!(f, "Invalid number of quadrature points {n_points}: at least 3 required")
            }
            StreamError::ShapeMismatch { expected, found } => {
                write!(f, "Shape mismatch: expected {expected:?}, found {found:?}")
            }
            StreamError::InvalidSeparation { index, value } => {
                write!(f, "Invalid separation at index {index}: {value}, must be finite and >= 0")
            }
            StreamError::InvalidMu { index, value } => {
                write!(f, "Invalid mu at index {index}: {value}, must lie in [-1, 1]")
            }
            StreamError::Fit(err) => write!(f, "{err}"),
            StreamError::Interp(err) => write!(f, "{err}"),
        }
    }
}

impl From<FitError> for StreamError {
    fn from(err: FitError) -> Self {
        StreamError::Fit(err)
    }
}

impl From<InterpError> for StreamError {
    fn from(err: InterpError) -> Self {
        StreamError::Interp(err)
    }
}

#[cfg(feature = "python-bindings")]
impl From<StreamError> for PyErr {
    fn from(err: StreamError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

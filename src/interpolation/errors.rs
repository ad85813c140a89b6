//! Errors for axis construction and bicubic interpolation.

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

pub type InterpResult<T> = Result<T, InterpError>;

#[derive(Debug, Clone, PartialEq)]
pub enum InterpError {
    // ---- Axis construction ----
    /// Axis specifications need at least two nodes.
    AxisTooShort { axis: &'static str, len: usize },
    /// Axis nodes must be strictly increasing.
    NonIncreasingAxis { axis: &'static str, index: usize },
    /// Axis nodes must be finite.
    NonFiniteAxis { axis: &'static str, index: usize, value: f64 },
    /// Geometric axes need positive endpoints; linear ones need start < stop.
    InvalidAxisSpec { axis: &'static str, start: f64, stop: f64, reason: &'static str },

    // ---- Node values ----
    /// Node table shape must be (len(x), len(y)).
    ShapeMismatch { expected: (usize, usize), found: (usize, usize) },
    /// Natural splines need finite node values everywhere.
    NonFiniteValue { i: usize, j: usize, value: f64 },

    // ---- Queries ----
    /// Query lies outside the node range of an axis.
    OutOfDomain { axis: &'static str, value: f64, min: f64, max: f64 },
    /// Grid evaluation needs non-decreasing query axes.
    UnsortedQuery { axis: &'static str, index: usize },
}

impl std::error::Error for InterpError {}

impl std::fmt::Display for InterpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InterpError::AxisTooShort { axis, len } => {
                write!(f, "Axis '{axis}' has {len} nodes; at least 2 are required")
            }
            InterpError::NonIncreasingAxis { axis, index } => {
                write!(f, "Axis '{axis}' is not strictly increasing at index {index}")
            }
            InterpError::NonFiniteAxis { axis, index, value } => {
                write!(f, "Axis '{axis}' has non-finite node {value} at index {index}")
            }
            InterpError::InvalidAxisSpec { axis, start, stop, reason } => {
                write!(f, "Invalid spec for axis '{axis}' [{start}, {stop}]: {reason}")
            }
            InterpError::ShapeMismatch { expected, found } => {
                write!(f, "Node table shape mismatch: expected {expected:?}, found {found:?}")
            }
            InterpError::NonFiniteValue { i, j, value } => {
                write!(f, "Non-finite node value {value} at ({i}, {j})")
            }
            InterpError::OutOfDomain { axis, value, min, max } => {
                write!(f, "Query {value} on axis '{axis}' is outside [{min}, {max}]")
            }
            InterpError::UnsortedQuery { axis, index } => {
                write!(f, "Query axis '{axis}' is not sorted at index {index}")
            }
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<InterpError> for PyErr {
    fn from(err: InterpError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

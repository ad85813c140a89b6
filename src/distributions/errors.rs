//! Errors for velocity distributions.

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

pub type DistResult<T> = Result<T, DistError>;

#[derive(Debug, Clone, PartialEq)]
pub enum DistError {
    // ---- Parameters ----
    /// Scale (`scale` or `w`) must be finite and positive.
    InvalidScale { value: f64 },
    /// Degrees of freedom must be finite and positive.
    InvalidDof { value: f64 },
    /// Location and skewness must be finite.
    NonFiniteParameter { name: &'static str, value: f64 },

    // ---- Field tables ----
    /// Field slice length does not match the family.
    FieldCountMismatch { expected: usize, found: usize },
    /// Field name not known for the family.
    UnknownField { name: String },
    /// Family name not recognised.
    UnknownFamily { name: String },

    // ---- Moments ----
    /// The requested moment does not exist for these degrees of freedom.
    MomentUndefined { order: u8, nu: f64 },

    // ---- Backend ----
    /// Wrapper for statrs construction errors.
    Backend { text: String },
}

impl std::error::Error for DistError {}

impl std::fmt::Display for DistError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DistError::InvalidScale { value } => {
                write!(f, "Invalid scale {value}: must be finite and positive")
            }
            DistError::InvalidDof { value } => {
                write!(f, "Invalid degrees of freedom {value}: must be finite and positive")
            }
            DistError::NonFiniteParameter { name, value } => {
                write!(f, "Parameter '{name}' must be finite, got {value}")
            }
            DistError::FieldCountMismatch { expected, found } => {
                write!(f, "Expected {expected} parameter fields, found {found}")
            }
            DistError::UnknownField { name } => write!(f, "Unknown parameter field '{name}'"),
            DistError::UnknownFamily { name } => {
                write!(f, "Unknown velocity family '{name}': expected 'gaussian' or 'skewt'")
            }
            DistError::MomentUndefined { order, nu } => {
                write!(f, "Moment of order {order} is undefined for nu = {nu}")
            }
            DistError::Backend { text } => write!(f, "Distribution backend error: {text}"),
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<DistError> for PyErr {
    fn from(err: DistError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

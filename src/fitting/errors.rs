//! Errors for moment matching, lookup tables and parameter grids.
use crate::{
    distributions::{DistError, VelocityFamily},
    interpolation::InterpError,
    moments::MomentError,
    optimization::errors::OptError,
};

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

pub type FitResult<T> = Result<T, FitError>;

/// Why a single moment-matching problem failed.
#[derive(Debug, Clone, PartialEq)]
pub enum FailureReason {
    /// Root finder stopped with `max|F|` above tolerance.
    NotConverged { residual: f64 },
    /// Solution left the admissible degrees-of-freedom range.
    InvalidDof { nu: f64 },
    /// Target moments or the solution were NaN/infinite.
    NonFinite,
    /// Lookup-table cell has no valid solution (a failed table node).
    Infeasible,
    /// Target shape lies outside the lookup-table domain.
    OutsideTable { gamma1: f64, gamma2: f64 },
    /// Projected moments at the node are unusable (e.g. non-positive variance).
    InvalidMoments { text: String },
    /// Moments solved but the resulting parameters are invalid.
    InvalidParameters { text: String },
    /// The root finder itself raised an error.
    Solver { text: String },
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::NotConverged { residual } => {
                write!(f, "not converged (max residual {residual:.3e})")
            }
            FailureReason::InvalidDof { nu } => write!(f, "invalid degrees of freedom {nu}"),
            FailureReason::NonFinite => write!(f, "non-finite moments or solution"),
            FailureReason::Infeasible => write!(f, "no valid table solution nearby"),
            FailureReason::OutsideTable { gamma1, gamma2 } => {
                write!(f, "(gamma1 = {gamma1}, gamma2 = {gamma2}) outside lookup table")
            }
            FailureReason::InvalidMoments { text } => write!(f, "invalid moments: {text}"),
            FailureReason::InvalidParameters { text } => write!(f, "invalid parameters: {text}"),
            FailureReason::Solver { text } => write!(f, "solver error: {text}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FitError {
    // ---- Numerical ----
    /// Moment matching failed; `node` is the grid index when known.
    FitFailure { node: Option<(usize, usize)>, reason: FailureReason },

    // ---- Configuration ----
    /// Seeds need finite `alpha` and `nu > 4`.
    InvalidSeed { alpha: f64, nu: f64 },
    /// Interpolants need every grid node fitted.
    IncompleteGrid { failed: usize, first: (usize, usize) },
    /// Requested field or operation does not apply to this family.
    FamilyMismatch { expected: VelocityFamily, found: VelocityFamily },
    /// Lookup-table file content is inconsistent.
    TableFormat { reason: String },

    // ---- Wrapped ----
    Csv { text: String },
    Moment(MomentError),
    Dist(DistError),
    Interp(InterpError),
    Opt(OptError),
}

impl FitError {
    pub fn failure(reason: FailureReason) -> Self {
        FitError::FitFailure { node: None, reason }
    }

    pub fn is_fit_failure(&self) -> bool {
        matches!(self, FitError::FitFailure { .. })
    }
}

impl std::error::Error for FitError {}

impl std::fmt::Display for FitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FitError::FitFailure { node: Some((i, j)), reason } => {
                write!(f, "Fit failure at grid node ({i}, {j}): {reason}")
            }
            FitError::FitFailure { node: None, reason } => write!(f, "Fit failure: {reason}"),
            FitError::InvalidSeed { alpha, nu } => {
                write!(f, "Invalid seed (alpha = {alpha}, nu = {nu}): need finite alpha and nu > 4")
            }
            FitError::IncompleteGrid { failed, first } => {
                write!(f, "{failed} grid nodes failed to fit (first at {first:?})")
            }
            FitError::FamilyMismatch { expected, found } => {
                write!(f, "Velocity family mismatch: expected {expected:?}, found {found:?}")
            }
            FitError::TableFormat { reason } => write!(f, "Malformed lookup table: {reason}"),
            FitError::Csv { text } => write!(f, "CSV error: {text}"),
            FitError::Moment(e) => write!(f, "{e}"),
            FitError::Dist(e) => write!(f, "{e}"),
            FitError::Interp(e) => write!(f, "{e}"),
            FitError::Opt(e) => write!(f, "{e}"),
        }
    }
}

impl From<MomentError> for FitError {
    fn from(err: MomentError) -> Self {
        FitError::Moment(err)
    }
}

impl From<DistError> for FitError {
    fn from(err: DistError) -> Self {
        FitError::Dist(err)
    }
}

impl From<InterpError> for FitError {
    fn from(err: InterpError) -> Self {
        FitError::Interp(err)
    }
}

impl From<OptError> for FitError {
    fn from(err: OptError) -> Self {
        FitError::Opt(err)
    }
}

impl From<csv::Error> for FitError {
    fn from(err: csv::Error) -> Self {
        FitError::Csv { text: err.to_string() }
    }
}

#[cfg(feature = "python-bindings")]
impl From<FitError> for PyErr {
    fn from(err: FitError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

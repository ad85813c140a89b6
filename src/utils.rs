//! PyO3 conversion helpers shared by the Python bindings in `lib.rs`.
#[cfg(feature = "python-bindings")]
use numpy::{IntoPyArray, PyArrayMethods, PyReadonlyArray1};

#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyTypeError, prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::fitting::{DEFAULT_SEED, SkewTSolver};

/// Borrow a contiguous 1-D `float64` view of a numpy array, or copy any
/// float sequence (list, tuple, `pandas.Series` via `to_numpy`) into one.
#[cfg(feature = "python-bindings")]
pub fn extract_f64_array<'py>(
    py: Python<'py>, raw: &Bound<'py, PyAny>,
) -> PyResult<PyReadonlyArray1<'py, f64>> {
    if let Ok(array) = raw.extract::<PyReadonlyArray1<f64>>() {
        if array.as_slice().is_ok() {
            return Ok(array);
        }
    }
    let source = match raw.call_method0("to_numpy") {
        Ok(converted) => converted,
        Err(_) => raw.clone(),
    };
    let values: Vec<f64> = source.extract().map_err(|_| {
        PyTypeError::new_err("expected a 1-D numpy.ndarray or a sequence of float64 velocities")
    })?;
    Ok(values.into_pyarray(py).readonly())
}

/// Skew-t solver with an optional Python-supplied `(alpha0, nu0)` seed.
#[cfg(feature = "python-bindings")]
pub fn solver_from_seed(seed: Option<(f64, f64)>) -> PyResult<SkewTSolver> {
    Ok(SkewTSolver::default().with_seed(seed.unwrap_or(DEFAULT_SEED))?)
}

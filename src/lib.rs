//! streaming_model — redshift-space correlation functions from pairwise
//! velocity moments.
//!
//! Purpose
//! -------
//! Implement the streaming model: project radial/transverse pairwise
//! velocity moments onto the line of sight, fit a Gaussian or skew-t density
//! to them over a `(r_perp, r_parallel)` grid, and convolve that density with
//! a real-space correlation function to obtain `xi(s, mu)` in redshift space.
//! With the `python-bindings` feature the crate also builds the
//! `_streaming_model` extension module.
//!
//! Key behaviors
//! -------------
//! - [`moments`]: `MomentSet` and the binomial line-of-sight projection.
//! - [`distributions`]: Gaussian and skew-t densities and closed-form moments.
//! - [`optimization`]: argmin-driven damped Newton root finder.
//! - [`fitting`]: moment matching, the `(gamma1, gamma2) -> (alpha, nu)`
//!   lookup table, parameter grids and their interpolants.
//! - [`interpolation`]: bicubic splines on rectilinear grids.
//! - [`streaming`]: line-of-sight densities and the streaming integral.
//! - [`model`]: one-call construction of the whole pipeline.
//!
//! Invariants & assumptions
//! ------------------------
//! - Fitted skew-t densities always have `nu > 4`.
//! - Interpolants never extrapolate; the streaming integral masks
//!   out-of-grid separations to zero contribution.
//!
//! Conventions
//! -----------
//! - Errors are per-module enums converted upward with `From`, and into
//!   Python `ValueError`s at the PyO3 boundary.
//! - Diagnostics go through the `log` facade; the crate installs no logger.
//!
//! Downstream usage
//! ----------------
//! - Rust callers typically use [`StreamingModel::build`] followed by
//!   [`StreamingModel::redshift_tpcf`], or assemble the stages by hand to
//!   control fit failures.
//! - The Python extension exposes the skew-t moment map and density under
//!   `streaming_model.skewt`.

pub mod distributions;
pub mod fitting;
pub mod interpolation;
pub mod model;
pub mod moments;
pub mod optimization;
pub mod streaming;
pub mod utils;

pub use crate::model::{ModelOptions, StreamingModel};

#[cfg(feature = "python-bindings")]
use numpy::{IntoPyArray, PyArray1};

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    distributions::SkewTParams,
    moments::LosMoments,
    utils::{extract_f64_array, solver_from_seed},
};

/// moments_to_skewt — skew-t parameters matching line-of-sight moments.
///
/// Parameters
/// ----------
/// - `mean`, `std`, `gamma1`, `gamma2`: target moments, `std > 0`.
/// - `seed`: optional `(alpha0, nu0)` with `nu0 > 4`; defaults to
///   `(-0.7, 5.0)`.
///
/// Returns
/// -------
/// `(w, v_c, alpha, nu)`.
///
/// Errors
/// ------
/// `ValueError` for invalid moments or seeds and for fit failures.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(signature = (mean, std, gamma1, gamma2, seed=None))]
fn moments_to_skewt(
    mean: f64, std: f64, gamma1: f64, gamma2: f64, seed: Option<(f64, f64)>,
) -> PyResult<(f64, f64, f64, f64)> {
    let target = LosMoments::new(mean, std, gamma1, gamma2)?;
    let params = solver_from_seed(seed)?.solve(&target)?;
    Ok((params.w, params.v_c, params.alpha, params.nu))
}

/// skewt_moments — `(mean, std, gamma1, gamma2)` of a skew-t with `nu > 4`.
#[cfg(feature = "python-bindings")]
#[pyfunction]
fn skewt_moments(w: f64, v_c: f64, alpha: f64, nu: f64) -> PyResult<(f64, f64, f64, f64)> {
    let moments = SkewTParams::new(w, v_c, alpha, nu)?.moments()?;
    Ok((moments.mean, moments.std, moments.gamma1, moments.gamma2))
}

/// skewt_pdf — skew-t density evaluated at every velocity in `v`.
#[cfg(feature = "python-bindings")]
#[pyfunction]
fn skewt_pdf<'py>(
    py: Python<'py>, v: &Bound<'py, PyAny>, w: f64, v_c: f64, alpha: f64, nu: f64,
) -> PyResult<Bound<'py, PyArray1<f64>>> {
    let params = SkewTParams::new(w, v_c, alpha, nu)?;
    let v = extract_f64_array(py, v)?;
    Ok(v.as_array().mapv(|x| params.pdf(x)).into_pyarray(py))
}

/// Module initializer for `_streaming_model`.
///
/// Registers the `skewt` submodule and inserts it into `sys.modules` so that
/// `import streaming_model.skewt` works.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _streaming_model<'py>(py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let skewt_mod = PyModule::new(py, "skewt")?;
    skewt(m, &skewt_mod)?;

    py.import("sys")?.getattr("modules")?.set_item("streaming_model.skewt", skewt_mod)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn skewt<'py>(parent: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(moments_to_skewt, m)?)?;
    m.add_function(wrap_pyfunction!(skewt_moments, m)?)?;
    m.add_function(wrap_pyfunction!(skewt_pdf, m)?)?;
    parent.add_submodule(m)?;
    Ok(())
}

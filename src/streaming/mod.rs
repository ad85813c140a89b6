//! streaming — line-of-sight densities and the streaming integral.
//!
//! Purpose
//! -------
//! Map a real-space correlation function `xi_r(r)` to redshift space by
//! convolving `1 + xi_r` with the line-of-sight pairwise velocity density.
//!
//! Key behaviors
//! -------------
//! - [`LosDensity`] abstracts `p(v_los | r_perp, r_parallel)`; it is
//!   implemented by [`LineOfSightPdf`] (fitted parameter fields) and by any
//!   `Fn(f64, f64, f64) -> f64 + Sync`.
//! - [`LineOfSightPdf::pdf_grid`] sorts unsorted separation axes before
//!   querying the interpolants and scatters the results back.
//! - [`integrate`] splits the displacement range at zero, integrates both
//!   halves with composite Simpson, and subtracts one.
//!
//! Invariants & assumptions
//! ------------------------
//! - `StreamingOptions` satisfy `0 < epsilon < limit` and `n_points >= 3`.
//! - `s >= 0` and `mu ∈ [-1, 1]`.
//!
//! Conventions
//! -----------
//! - Results are indexed `xi[[s_bin, mu_bin]]`.
//! - Non-finite density samples (e.g. separations outside the fitted grid)
//!   contribute zero and are reported once per call through `log::warn!`.
//!
//! Testing notes
//! -------------
//! - A unit Gaussian with `xi_r(r) = r^2` integrates to `2 + s^2` in closed
//!   form and anchors the quadrature tests.

pub mod errors;
pub mod integrator;
pub mod los_pdf;
pub mod quadrature;

pub use self::errors::{StreamError, StreamResult};
pub use self::integrator::{StreamingOptions, StreamingResult, integrate, streaming_integrand};
pub use self::los_pdf::{LineOfSightPdf, LosDensity};
pub use self::quadrature::simpson_weights;

pub mod prelude {
    pub use super::errors::{StreamError, StreamResult};
    pub use super::integrator::{StreamingOptions, StreamingResult, integrate};
    pub use super::los_pdf::{LineOfSightPdf, LosDensity};
}

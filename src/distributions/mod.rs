//! distributions — line-of-sight velocity densities.
//!
//! Purpose
//! -------
//! The two parametric families the streaming model convolves with:
//! Gaussian `(loc, scale)` and skew-t `(w, v_c, alpha, nu)`.
//!
//! Key behaviors
//! -------------
//! - Densities via statrs (`Normal`, `StudentsT`).
//! - Closed-form skew-t moments and the inverse map `(mean, std, alpha, nu)
//!   -> (w, v_c)`.
//! - [`VelocityFamily`] / [`DistributionParameters`] dispatch between the two
//!   without duplicated call sites; moment matching for each family lives in
//!   `fitting`.
//!
//! Conventions
//! -----------
//! - Constructors validate; raw-field densities return `NaN` for
//!   inadmissible fields so vectorized callers can mask them.

pub mod errors;
pub mod family;
pub mod gaussian;
pub mod skewt;

pub use self::errors::{DistError, DistResult};
pub use self::family::{DistributionParameters, VelocityFamily};
pub use self::gaussian::GaussianParams;
pub use self::skewt::{SkewTParams, b_nu, delta, excess_kurtosis, skewness, skewt_pdf};

pub mod prelude {
    pub use super::errors::{DistError, DistResult};
    pub use super::family::{DistributionParameters, VelocityFamily};
    pub use super::gaussian::GaussianParams;
    pub use super::skewt::SkewTParams;
}

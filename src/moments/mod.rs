//! moments — velocity moments and their line-of-sight projection.
//!
//! Purpose
//! -------
//! Hold the radial/transverse pairwise-velocity moments of a tracer sample
//! as functions of separation and project them onto the line of sight.
//!
//! Key behaviors
//! -------------
//! - [`MomentSet`] stores callables keyed by [`MomentKey`] (`c_20`, `m_10`,
//!   ...) and answers symmetry-fixed moments itself.
//! - [`project`] builds the n-th line-of-sight moment [`LosMoment`].
//! - [`ProjectedMoments`] combines orders 1–4 into [`LosMoments`]
//!   (mean, std, gamma1, gamma2) for a chosen velocity family.
//! - [`project_pdf`](pdf_projection::project_pdf) projects a full joint
//!   radial/transverse density rather than its moments.
//!
//! Invariants & assumptions
//! ------------------------
//! - Odd transverse orders and first-order central moments are zero;
//!   `M(0,0) = 1`. These cannot be overridden.
//! - `r_perp >= 0`; the separation must be non-zero.
//!
//! Conventions
//! -----------
//! - Missing moments fail when a projection is built, never at evaluation.
//! - Kurtosis uses the fourth central moment: `gamma2 = c4 / c2² - 3`.

pub mod errors;
pub mod moment_set;
pub mod pdf_projection;
pub mod projection;

pub use self::errors::{MomentError, MomentResult};
pub use self::moment_set::{MomentFn, MomentKey, MomentMode, MomentSet};
pub use self::pdf_projection::{ProjectionOptions, project_pdf};
pub use self::projection::{LosMoment, LosMoments, MAX_ORDER, ProjectedMoments, project};

pub mod prelude {
    pub use super::errors::{MomentError, MomentResult};
    pub use super::moment_set::{MomentKey, MomentMode, MomentSet};
    pub use super::projection::{LosMoments, ProjectedMoments, project};
}

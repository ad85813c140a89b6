//! interpolation — rectilinear axes and bicubic surfaces.
//!
//! Purpose
//! -------
//! Turn per-node tables (fitted distribution parameters, lookup-table shape
//! parameters) into smooth callables of two coordinates.
//!
//! Key behaviors
//! -------------
//! - [`AxisSpec`] materializes geometric, linear or explicit node axes.
//! - [`BicubicSpline`] evaluates bicubic Hermite patches, with natural-spline
//!   slopes (C², finite tables) or local slopes (tables with NaN holes).
//! - Single-point, masked and sorted-grid evaluation paths.
//!
//! Invariants & assumptions
//! ------------------------
//! - Axes are finite and strictly increasing with at least two nodes.
//! - Grid queries must be non-decreasing; callers with unsorted queries sort,
//!   evaluate and scatter back.
//!
//! Conventions
//! -----------
//! - Queries within `1e-12` (relative) of an end node are snapped onto it.
//! - No extrapolation: outside the node range is an error or `NaN`,
//!   depending on [`DomainPolicy`].

pub mod axis;
pub mod bicubic;
pub mod errors;

pub use self::axis::{AxisSpec, geomspace, linspace, sort_permutation};
pub use self::bicubic::{BicubicSpline, DomainPolicy};
pub use self::errors::{InterpError, InterpResult};

pub mod prelude {
    pub use super::axis::AxisSpec;
    pub use super::bicubic::{BicubicSpline, DomainPolicy};
    pub use super::errors::{InterpError, InterpResult};
}

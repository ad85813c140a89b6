//! Validation helpers for the root finder.
//!
//! - [`verify_positive`]: shared tolerance rule (finite and `> 0`).
//! - [`validate_residuals`] / [`validate_jacobian`]: shape and finiteness.
//! - [`validate_theta_hat`]: final iterate exists and is finite.
use crate::optimization::{
    errors::{OptError, OptResult},
    root_finder::{Jac, Residuals, Theta},
};

/// Return a reason string when `tol` is not finite and strictly positive.
pub fn verify_positive(tol: f64) -> Result<(), &'static str> {
    if !tol.is_finite() {
        return Err("Tolerance must be finite.");
    }
    if tol <= 0.0 {
        return Err("Tolerance must be positive.");
    }
    Ok(())
}

/// Residual vector must match the parameter dimension.
///
/// # Errors
/// Returns [`OptError::ResidualDimMismatch`] on length mismatch.
pub fn validate_residuals(residuals: &Residuals, dim: usize) -> OptResult<()> {
    if residuals.len() != dim {
        return Err(OptError::ResidualDimMismatch { expected: dim, found: residuals.len() });
    }
    Ok(())
}

/// Jacobian must be `dim × dim` with finite entries.
///
/// # Errors
/// - [`OptError::JacobianDimMismatch`] for the wrong shape.
/// - [`OptError::InvalidJacobian`] at the first non-finite entry.
pub fn validate_jacobian(jac: &Jac, dim: usize) -> OptResult<()> {
    if jac.dim() != (dim, dim) {
        return Err(OptError::JacobianDimMismatch { expected: (dim, dim), found: jac.dim() });
    }
    if let Some(((row, col), &value)) = jac.indexed_iter().find(|(_, v)| !v.is_finite()) {
        return Err(OptError::InvalidJacobian { row, col, value });
    }
    Ok(())
}

/// Ensure the solver returned a finite θ̂.
///
/// # Errors
/// - [`OptError::MissingThetaHat`] if absent.
/// - [`OptError::InvalidThetaHat`] at the first non-finite entry.
pub fn validate_theta_hat(theta_hat: Option<Theta>) -> OptResult<Theta> {
    let theta_hat = theta_hat.ok_or(OptError::MissingThetaHat)?;
    if let Some((index, &value)) = theta_hat.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(OptError::InvalidThetaHat {
            index,
            value,
            reason: "Estimated parameters must be finite.",
        });
    }
    Ok(theta_hat)
}

/// Infinity norm; `NaN` if any entry is `NaN`.
pub fn max_abs(residuals: &Residuals) -> f64 {
    residuals.iter().fold(0.0_f64, |acc, r| if r.is_nan() { f64::NAN } else { acc.max(r.abs()) })
}

/// `½‖F‖²`, the merit function minimized by the line search.
pub fn half_sq_norm(residuals: &Residuals) -> f64 {
    0.5 * residuals.dot(residuals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // `max_abs` must not hide NaN behind `f64::max`.
    //
    // Given
    // -----
    // - A residual vector containing NaN.
    //
    // Expect
    // ------
    // - NaN result.
    fn max_abs_propagates_nan() {
        assert!(max_abs(&array![1.0, f64::NAN]).is_nan());
        assert!(max_abs(&array![f64::NAN, 1.0]).is_nan());
        assert_eq!(max_abs(&array![-3.0, 2.0]), 3.0);
    }

    #[test]
    // Purpose
    // -------
    // Shape and finiteness checks on Jacobians.
    //
    // Given
    // -----
    // - A 2×1 Jacobian and a 2×2 Jacobian with an infinite entry.
    //
    // Expect
    // ------
    // - Dimension mismatch and invalid-entry errors respectively.
    fn jacobian_validation_reports_shape_and_values() {
        let bad_shape = Jac::zeros((2, 1));
        assert!(matches!(
            validate_jacobian(&bad_shape, 2),
            Err(OptError::JacobianDimMismatch { .. })
        ));

        let bad_value = array![[1.0, 0.0], [f64::INFINITY, 1.0]];
        assert!(matches!(
            validate_jacobian(&bad_value, 2),
            Err(OptError::InvalidJacobian { row: 1, col: 0, .. })
        ));
    }
}

//! Scalar reparameterizations used by the shape solver.
//!
//! The root finder works on unconstrained reals. Shape parameters with a
//! hard lower bound (the skew-t degrees of freedom must stay above the
//! kurtosis pole at 4) are mapped through a guarded softplus so every
//! trial point of a damped Newton step is admissible.

/// Lower bound on the skew-t degrees of freedom.
///
/// The fourth standardized moment of a Student-t diverges as `nu → 4⁺`;
/// the mapping below keeps `nu` strictly above it.
pub const DOF_FLOOR: f64 = 4.0;

/// Input above which softplus is evaluated as the identity.
const SOFTPLUS_CUTOFF: f64 = 20.0;

/// Stable `ln(1 + exp(x))`, mapping ℝ → (0, ∞).
pub fn safe_softplus(x: f64) -> f64 {
    if x > SOFTPLUS_CUTOFF { x } else { x.exp().ln_1p() }
}

/// Stable inverse of [`safe_softplus`] on `(0, ∞)`: `ln(exp(x) - 1)`.
///
/// # Parameters
/// - `x`: softplus output, finite and `> 0`.
pub fn safe_softplus_inv(x: f64) -> f64 {
    if x > SOFTPLUS_CUTOFF { x } else { x.exp_m1().ln() }
}

/// Map an unconstrained `t` into `(floor, ∞)` as `floor + softplus(t)`.
pub fn bounded_below(t: f64, floor: f64) -> f64 {
    floor + safe_softplus(t)
}

/// Inverse of [`bounded_below`].
///
/// # Returns
/// - The unconstrained coordinate, or `NaN` when `x <= floor`.
pub fn bounded_below_inv(x: f64, floor: f64) -> f64 {
    let excess = x - floor;
    if excess > 0.0 { safe_softplus_inv(excess) } else { f64::NAN }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    // Purpose
    // -------
    // Check the guarded softplus against the naive formula on a safe grid.
    //
    // Given
    // -----
    // - Inputs in [-10, 10].
    //
    // Expect
    // ------
    // - Agreement with `ln(1 + exp(x))` to machine precision.
    fn softplus_matches_naive_formula() {
        for x in [-10.0, -1.0, 0.0, 0.5, 3.0, 10.0] {
            let naive = (1.0 + f64::exp(x)).ln();
            assert_relative_eq!(safe_softplus(x), naive, max_relative = 1e-12);
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify that softplus and its inverse compose to the identity,
    // including past the identity cutoff.
    //
    // Given
    // -----
    // - Positive outputs spanning small and large magnitudes.
    //
    // Expect
    // ------
    // - `softplus(softplus_inv(x)) == x` within tolerance.
    fn softplus_inverse_roundtrips() {
        for x in [1e-6, 0.1, 1.0, 3.6, 19.0, 25.0, 1e3] {
            assert_relative_eq!(safe_softplus(safe_softplus_inv(x)), x, max_relative = 1e-10);
        }
    }

    #[test]
    // Purpose
    // -------
    // Ensure the bounded mapping never reaches its floor and that the inverse
    // rejects inadmissible values.
    //
    // Given
    // -----
    // - Very negative unconstrained inputs and a value at the floor.
    //
    // Expect
    // ------
    // - Mapped values strictly above `DOF_FLOOR`.
    // - `bounded_below_inv(DOF_FLOOR, DOF_FLOOR)` is NaN.
    fn bounded_below_respects_floor() {
        assert!(bounded_below(-30.0, DOF_FLOOR) > DOF_FLOOR);
        assert!(bounded_below(-700.0, DOF_FLOOR) >= DOF_FLOOR);
        assert!(bounded_below_inv(DOF_FLOOR, DOF_FLOOR).is_nan());
        assert_relative_eq!(
            bounded_below(bounded_below_inv(5.0, DOF_FLOOR), DOF_FLOOR),
            5.0,
            max_relative = 1e-12
        );
    }
}

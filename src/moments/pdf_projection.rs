//! Projection of a joint radial/transverse velocity density onto the line
//! of sight.
//!
//! With `cosθ = r_parallel / r` and `sinθ = r_perp / r`, a pair with radial
//! velocity `v_r` and line-of-sight velocity `v_los` has transverse velocity
//! `v_t = (v_los - v_r cosθ) / sinθ`, so
//!
//! ```text
//! p_los(v_los) = ∫ p(v_r, (v_los - v_r cosθ)/sinθ | r) / sinθ dv_r
//! ```
//!
//! evaluated with a fixed composite Simpson rule over `v_r`.
use crate::{
    moments::errors::{MomentError, MomentResult},
    streaming::quadrature::{linspace, simpson_weights},
};
use ndarray::{Array3, ArrayView1};
use rayon::prelude::*;

/// Velocity quadrature for [`project_pdf`].
///
/// Default: `v_r ∈ [-100, 100]` with 300 samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionOptions {
    pub v_r_min: f64,
    pub v_r_max: f64,
    pub n_v_r: usize,
}

impl ProjectionOptions {
    /// # Errors
    /// - [`MomentError::InvalidProjectionOptions`] for a reversed or
    ///   non-finite range, or fewer than 3 samples.
    pub fn new(v_r_min: f64, v_r_max: f64, n_v_r: usize) -> MomentResult<Self> {
        if !(v_r_min.is_finite() && v_r_max.is_finite()) || v_r_min >= v_r_max {
            return Err(MomentError::InvalidProjectionOptions {
                reason: "Velocity range must be finite with v_r_min < v_r_max.",
            });
        }
        if n_v_r < 3 {
            return Err(MomentError::InvalidProjectionOptions {
                reason: "At least 3 velocity samples are required.",
            });
        }
        Ok(Self { v_r_min, v_r_max, n_v_r })
    }
}

impl Default for ProjectionOptions {
    fn default() -> Self {
        Self { v_r_min: -100.0, v_r_max: 100.0, n_v_r: 300 }
    }
}

/// Line-of-sight density on `r_perp × r_parallel × v_los`.
///
/// `pdf_rt(v_r, v_t, r)` is the joint radial/transverse density at
/// separation `r`. Nodes are independent and evaluated in parallel.
///
/// # Errors
/// - [`MomentError::InvalidSeparation`] for any `r_perp <= 0` (the
///   projection divides by `sinθ`) or non-finite separation.
pub fn project_pdf<P>(
    pdf_rt: P, r_perp: ArrayView1<f64>, r_parallel: ArrayView1<f64>, v_los: ArrayView1<f64>,
    opts: &ProjectionOptions,
) -> MomentResult<Array3<f64>>
where
    P: Fn(f64, f64, f64) -> f64 + Sync,
{
    if let Some(&bad) = r_perp.iter().find(|p| !(p.is_finite() && **p > 0.0)) {
        return Err(MomentError::InvalidSeparation { r_perp: bad, r_parallel: f64::NAN });
    }
    if let Some(&bad) = r_parallel.iter().find(|l| !l.is_finite()) {
        return Err(MomentError::InvalidSeparation { r_perp: f64::NAN, r_parallel: bad });
    }

    let v_r = linspace(opts.v_r_min, opts.v_r_max, opts.n_v_r);
    let weights = simpson_weights(opts.v_r_min, opts.v_r_max, opts.n_v_r);
    let (n_perp, n_par, n_v) = (r_perp.len(), r_parallel.len(), v_los.len());

    let columns: Vec<Vec<f64>> = (0..n_perp * n_par)
        .into_par_iter()
        .map(|node| {
            let (i, j) = (node / n_par, node % n_par);
            let r = r_perp[i].hypot(r_parallel[j]);
            let cos = r_parallel[j] / r;
            let sin = r_perp[i] / r;
            v_los
                .iter()
                .map(|&v| {
                    v_r.iter()
                        .zip(weights.iter())
                        .map(|(&vr, &wk)| wk * pdf_rt(vr, (v - vr * cos) / sin, r))
                        .sum::<f64>()
                        / sin
                })
                .collect()
        })
        .collect();

    let mut out = Array3::zeros((n_perp, n_par, n_v));
    for (node, column) in columns.into_iter().enumerate() {
        let (i, j) = (node / n_par, node % n_par);
        for (k, value) in column.into_iter().enumerate() {
            out[[i, j, k]] = value;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;
    use statrs::distribution::{Continuous, Normal};

    #[test]
    // Purpose
    // -------
    // Independent Gaussian components project to a Gaussian whose variance is
    // `mu² σ_r² + (1-mu²) σ_t²`.
    //
    // Given
    // -----
    // - σ_r = 3, σ_t = 2, zero means, r_perp = 4, r_parallel = 3.
    //
    // Expect
    // ------
    // - p_los matches N(0, 0.36·9 + 0.64·4) at several velocities.
    fn gaussian_components_project_to_gaussian() {
        // Arrange
        let radial = Normal::new(0.0, 3.0).unwrap();
        let transverse = Normal::new(0.0, 2.0).unwrap();
        let joint = move |vr: f64, vt: f64, _r: f64| radial.pdf(vr) * transverse.pdf(vt);
        let v_los = array![-5.0, -1.0, 0.0, 2.5];
        let opts = ProjectionOptions::new(-40.0, 40.0, 801).unwrap();

        // Act
        let out =
            project_pdf(joint, array![4.0].view(), array![3.0].view(), v_los.view(), &opts)
                .unwrap();

        // Assert
        let expected = Normal::new(0.0, (0.36_f64 * 9.0 + 0.64 * 4.0).sqrt()).unwrap();
        for (k, &v) in v_los.iter().enumerate() {
            assert_relative_eq!(out[[0, 0, k]], expected.pdf(v), max_relative = 1e-6);
        }
    }

    #[test]
    // Purpose
    // -------
    // Purely parallel pairs are rejected rather than divided by zero.
    //
    // Given
    // -----
    // - r_perp = 0.
    //
    // Expect
    // ------
    // - `InvalidSeparation`.
    fn zero_transverse_separation_is_rejected() {
        let err = project_pdf(
            |_, _, _| 1.0,
            array![0.0].view(),
            array![1.0].view(),
            array![0.0].view(),
            &ProjectionOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, MomentError::InvalidSeparation { .. }));
    }
}

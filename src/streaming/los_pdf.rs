//! Line-of-sight pairwise velocity densities.
//!
//! [`LosDensity`] is the seam between the streaming integral and whatever
//! produces `p(v_los | r_perp, r_parallel)`: fitted interpolants
//! ([`LineOfSightPdf`]) or any plain closure.
use crate::{
    distributions::{DistributionParameters, VelocityFamily},
    fitting::ParameterInterpolants,
    interpolation::{DomainPolicy, sort_permutation},
    streaming::errors::{StreamError, StreamResult},
};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

/// A density over line-of-sight velocity, conditioned on separation.
pub trait LosDensity: Sync {
    /// Density at one point. Out-of-domain or invalid inputs give `NaN`.
    fn density(&self, v_los: f64, r_perp: f64, r_parallel: f64) -> f64;

    /// Densities on a grid: row `i` is at `r_perp[i]`, column `j` at
    /// `r_parallel[j]`, and `v_los[[i, j]]` is the velocity queried there.
    ///
    /// Neither axis needs to be sorted.
    ///
    /// # Errors
    /// - [`StreamError::ShapeMismatch`] unless `v_los` is
    ///   `(r_perp.len(), r_parallel.len())`.
    fn density_grid(
        &self, v_los: ArrayView2<f64>, r_perp: ArrayView1<f64>, r_parallel: ArrayView1<f64>,
    ) -> StreamResult<Array2<f64>> {
        check_grid_shape(v_los, r_perp, r_parallel)?;
        Ok(Array2::from_shape_fn(v_los.dim(), |(i, j)| {
            self.density(v_los[[i, j]], r_perp[i], r_parallel[j])
        }))
    }
}

impl<F> LosDensity for F
where
    F: Fn(f64, f64, f64) -> f64 + Sync,
{
    fn density(&self, v_los: f64, r_perp: f64, r_parallel: f64) -> f64 {
        self(v_los, r_perp, r_parallel)
    }
}

/// Density of the fitted family, with parameters read off smooth fields.
#[derive(Debug, Clone)]
pub struct LineOfSightPdf {
    params: ParameterInterpolants,
}

impl From<ParameterInterpolants> for LineOfSightPdf {
    fn from(params: ParameterInterpolants) -> Self {
        Self::new(params)
    }
}

impl LineOfSightPdf {
    pub fn new(params: ParameterInterpolants) -> Self {
        Self { params }
    }

    pub fn family(&self) -> VelocityFamily {
        self.params.family()
    }

    pub fn interpolants(&self) -> &ParameterInterpolants {
        &self.params
    }

    /// Interpolated parameters at one separation.
    pub fn parameters(&self, r_perp: f64, r_parallel: f64) -> StreamResult<DistributionParameters> {
        Ok(self.params.at(r_perp, r_parallel)?)
    }

    /// Density at one point.
    ///
    /// # Errors
    /// - Out-of-domain separations and invalid interpolated parameters.
    pub fn pdf(&self, v_los: f64, r_perp: f64, r_parallel: f64) -> StreamResult<f64> {
        Ok(self.parameters(r_perp, r_parallel)?.pdf(v_los))
    }

    /// Grid evaluation (layout as in [`LosDensity::density_grid`]).
    ///
    /// Each separation axis is sorted, every parameter field is evaluated on
    /// the sorted outer product, and results are scattered back to the
    /// caller's order. Nodes whose interpolated fields are inadmissible give
    /// `NaN`.
    ///
    /// # Errors
    /// - [`StreamError::ShapeMismatch`] for a mis-shaped `v_los`.
    /// - Out-of-domain queries under [`DomainPolicy::Strict`].
    pub fn pdf_grid(
        &self, v_los: ArrayView2<f64>, r_perp: ArrayView1<f64>, r_parallel: ArrayView1<f64>,
        policy: DomainPolicy,
    ) -> StreamResult<Array2<f64>> {
        check_grid_shape(v_los, r_perp, r_parallel)?;
        let (sorted_perp, rank_perp) = sorted_with_ranks(r_perp);
        let (sorted_par, rank_par) = sorted_with_ranks(r_parallel);

        let fields = self
            .params
            .splines()
            .iter()
            .map(|s| s.eval_grid(sorted_perp.view(), sorted_par.view(), policy))
            .collect::<Result<Vec<_>, _>>()?;

        let family = self.family();
        let mut node = vec![0.0; fields.len()];
        Ok(Array2::from_shape_fn(v_los.dim(), |(i, j)| {
            let (a, b) = (rank_perp[i], rank_par[j]);
            for (slot, field) in node.iter_mut().zip(&fields) {
                *slot = field[[a, b]];
            }
            family.density_from_fields(&node, v_los[[i, j]])
        }))
    }
}

impl LosDensity for LineOfSightPdf {
    fn density(&self, v_los: f64, r_perp: f64, r_parallel: f64) -> f64 {
        self.pdf(v_los, r_perp, r_parallel).unwrap_or(f64::NAN)
    }

    /// Masked: separations outside the fitted grid give `NaN`.
    fn density_grid(
        &self, v_los: ArrayView2<f64>, r_perp: ArrayView1<f64>, r_parallel: ArrayView1<f64>,
    ) -> StreamResult<Array2<f64>> {
        self.pdf_grid(v_los, r_perp, r_parallel, DomainPolicy::Mask)
    }
}

fn check_grid_shape(
    v_los: ArrayView2<f64>, r_perp: ArrayView1<f64>, r_parallel: ArrayView1<f64>,
) -> StreamResult<()> {
    let expected = (r_perp.len(), r_parallel.len());
    if v_los.dim() != expected {
        return Err(StreamError::ShapeMismatch { expected, found: v_los.dim() });
    }
    Ok(())
}

/// Sorted copy of `values` and, for each original index, its sorted position.
fn sorted_with_ranks(values: ArrayView1<f64>) -> (Array1<f64>, Vec<usize>) {
    let order = sort_permutation(values);
    let mut rank = vec![0; order.len()];
    for (position, &original) in order.iter().enumerate() {
        rank[original] = position;
    }
    let sorted = order.iter().map(|&k| values[k]).collect();
    (sorted, rank)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        fitting::{FitStrategy, ParameterGrid, SkewTSolver},
        interpolation::linspace,
        moments::{MomentSet, ProjectedMoments},
    };
    use approx::assert_relative_eq;
    use ndarray::array;
    use statrs::distribution::{Continuous, Normal};

    // Projected mean is -r_parallel and the std is 2 everywhere; natural
    // splines reproduce both exactly.
    fn linear_gaussian_pdf() -> LineOfSightPdf {
        let set = MomentSet::new()
            .with("m_10", |r| -r)
            .and_then(|s| s.with("c_20", |_| 4.0))
            .and_then(|s| s.with("c_02", |_| 4.0))
            .unwrap();
        let moments = ProjectedMoments::new(&set, VelocityFamily::Gaussian).unwrap();
        let grid = ParameterGrid::fit(
            &moments,
            linspace(1.0, 30.0, 12),
            linspace(0.5, 40.0, 15),
            &FitStrategy::PerNode,
            &SkewTSolver::default(),
            false,
        )
        .unwrap();
        LineOfSightPdf::new(grid.interpolate().unwrap())
    }

    fn expected(v: f64, r_parallel: f64) -> f64 {
        Normal::new(-r_parallel, 2.0).unwrap().pdf(v)
    }

    #[test]
    // Purpose
    // -------
    // Point evaluation reads the interpolated parameters.
    //
    // Given
    // -----
    // - The linear Gaussian fields at an off-node separation.
    //
    // Expect
    // ------
    // - Density equals N(-r_parallel, 2) at v.
    fn pdf_matches_interpolated_gaussian() {
        let pdf = linear_gaussian_pdf();

        let value = pdf.pdf(-3.0, 7.3, 4.1).unwrap();

        assert_relative_eq!(value, expected(-3.0, 4.1), max_relative = 1e-10);
    }

    #[test]
    // Purpose
    // -------
    // Grid evaluation with unsorted axes returns results in the caller's
    // order.
    //
    // Given
    // -----
    // - r_perp = [20, 2, 9, 2] (unsorted, with a duplicate) and
    //   r_parallel = [30, 1, 12] with a distinct v_los per cell.
    //
    // Expect
    // ------
    // - Every cell equals the point evaluation at its own coordinates.
    fn pdf_grid_restores_caller_order() {
        // Arrange
        let pdf = linear_gaussian_pdf();
        let r_perp = array![20.0, 2.0, 9.0, 2.0];
        let r_parallel = array![30.0, 1.0, 12.0];
        let v = Array2::from_shape_fn((4, 3), |(i, j)| -25.0 + 4.0 * i as f64 + 3.0 * j as f64);

        // Act
        let grid = pdf.pdf_grid(v.view(), r_perp.view(), r_parallel.view(), DomainPolicy::Strict).unwrap();

        // Assert
        for i in 0..4 {
            for j in 0..3 {
                let point = pdf.pdf(v[[i, j]], r_perp[i], r_parallel[j]).unwrap();
                assert_relative_eq!(grid[[i, j]], point, max_relative = 1e-12);
                assert_relative_eq!(grid[[i, j]], expected(v[[i, j]], r_parallel[j]), max_relative = 1e-10);
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // Strict queries outside the grid fail; the masked trait path gives NaN.
    //
    // Given
    // -----
    // - r_parallel = 0.1 below the fitted range [0.5, 40].
    //
    // Expect
    // ------
    // - `pdf` and strict `pdf_grid` error; `density_grid` yields NaN there
    //   and finite values elsewhere.
    fn out_of_domain_is_error_or_nan() {
        let pdf = linear_gaussian_pdf();
        let r_perp = array![5.0];
        let r_parallel = array![0.1, 3.0];
        let v = array![[0.0, -3.0]];

        assert!(matches!(
            pdf.pdf(0.0, 5.0, 0.1),
            Err(StreamError::Fit(crate::fitting::FitError::Interp(_)))
        ));
        assert!(pdf.pdf_grid(v.view(), r_perp.view(), r_parallel.view(), DomainPolicy::Strict).is_err());
        let masked = pdf.density_grid(v.view(), r_perp.view(), r_parallel.view()).unwrap();
        assert!(masked[[0, 0]].is_nan());
        assert!(masked[[0, 1]].is_finite());
    }

    #[test]
    // Purpose
    // -------
    // Closures are densities and share the shape check.
    //
    // Given
    // -----
    // - A closure and a mis-shaped velocity table.
    //
    // Expect
    // ------
    // - Grid evaluation maps the closure; a (2, 2) table against (1, 2)
    //   axes is a shape mismatch.
    fn closures_are_densities() {
        let density = |v: f64, rp: f64, rl: f64| v + 10.0 * rp + 100.0 * rl;
        let ok = density.density_grid(array![[1.0, 2.0]].view(), array![3.0].view(), array![4.0, 5.0].view()).unwrap();
        assert_eq!(ok, array![[431.0, 532.0]]);

        let err = density
            .density_grid(Array2::zeros((2, 2)).view(), array![3.0].view(), array![4.0, 5.0].view())
            .unwrap_err();
        assert_eq!(err, StreamError::ShapeMismatch { expected: (1, 2), found: (2, 2) });
    }
}

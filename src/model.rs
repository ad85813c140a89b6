//! End-to-end streaming model: moments → parameter grid → density → integral.
use crate::{
    distributions::VelocityFamily,
    fitting::{FitResult, FitStrategy, ParameterGrid, SkewTSolver},
    interpolation::AxisSpec,
    moments::{MomentSet, ProjectedMoments},
    streaming::{LineOfSightPdf, StreamResult, StreamingOptions, StreamingResult, integrate},
};
use ndarray::ArrayView1;

/// Construction settings for [`StreamingModel`].
#[derive(Debug, Clone)]
pub struct ModelOptions {
    pub family: VelocityFamily,
    pub strategy: FitStrategy,
    pub r_perp: AxisSpec,
    pub r_parallel: AxisSpec,
    pub solver: SkewTSolver,
    /// Fit grid nodes on the rayon pool.
    pub parallel: bool,
}

impl Default for ModelOptions {
    /// Skew-t, per-node solves, 200 geometric nodes on `[0.71, 200]` per
    /// axis, parallel.
    fn default() -> Self {
        let axis = AxisSpec::Geometric { start: 0.71, stop: 200.0, n: 200 };
        Self {
            family: VelocityFamily::SkewT,
            strategy: FitStrategy::PerNode,
            r_perp: axis.clone(),
            r_parallel: axis,
            solver: SkewTSolver::default(),
            parallel: true,
        }
    }
}

impl ModelOptions {
    pub fn for_family(family: VelocityFamily) -> Self {
        Self { family, ..Self::default() }
    }
}

/// A fitted line-of-sight density ready for streaming integrals.
#[derive(Debug, Clone)]
pub struct StreamingModel {
    grid: ParameterGrid,
    pdf: LineOfSightPdf,
}

impl StreamingModel {
    /// Project `set`, fit the parameter grid and build the density.
    ///
    /// # Errors
    /// - `FitError::Moment` for moments the family needs but `set` lacks.
    /// - `FitError::Interp` for invalid axes.
    /// - `FitError::IncompleteGrid` if any node fails; fit the grid with
    ///   [`ParameterGrid::fit`], repair it with
    ///   [`ParameterGrid::refit_failed`] and use [`StreamingModel::from_grid`]
    ///   to handle failures explicitly.
    pub fn build(set: &MomentSet, opts: &ModelOptions) -> FitResult<Self> {
        let moments = ProjectedMoments::new(set, opts.family)?;
        let grid = ParameterGrid::fit(
            &moments,
            opts.r_perp.values("r_perp")?,
            opts.r_parallel.values("r_parallel")?,
            &opts.strategy,
            &opts.solver,
            opts.parallel,
        )?;
        Self::from_grid(grid)
    }

    /// # Errors
    /// - `FitError::IncompleteGrid` while `grid` has failed nodes.
    pub fn from_grid(grid: ParameterGrid) -> FitResult<Self> {
        let pdf = LineOfSightPdf::new(grid.interpolate()?);
        Ok(Self { grid, pdf })
    }

    pub fn family(&self) -> VelocityFamily {
        self.grid.family()
    }

    pub fn grid(&self) -> &ParameterGrid {
        &self.grid
    }

    pub fn los_pdf(&self) -> &LineOfSightPdf {
        &self.pdf
    }

    /// Redshift-space correlation function `xi[[s_bin, mu_bin]]`.
    pub fn redshift_tpcf<X>(
        &self, s: ArrayView1<f64>, mu: ArrayView1<f64>, xi_real: &X, opts: &StreamingOptions,
    ) -> StreamResult<StreamingResult>
    where
        X: Fn(f64) -> f64 + Sync,
    {
        integrate(s, mu, xi_real, &self.pdf, opts)
    }
}

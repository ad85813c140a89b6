//! Per-node distribution fits over a `(r_perp, r_parallel)` grid.
//!
//! Every node is an independent moment-matching problem, so nodes are fitted
//! as a rayon task set indexed by grid coordinates. Failures are recorded per
//! node instead of aborting the whole grid; the caller decides whether to
//! retry them ([`ParameterGrid::refit_failed`]) or give up.
use crate::{
    distributions::{DistributionParameters, VelocityFamily},
    fitting::{
        errors::{FailureReason, FitError, FitResult},
        interpolants::ParameterInterpolants,
        lookup_table::LookupTable,
        solver::{SkewTSolver, shape_to_params},
    },
    interpolation::{BicubicSpline, axis::validate_axis},
    moments::{MomentError, ProjectedMoments},
};
use ndarray::{Array1, Array3, ArrayView1, ArrayView2, Axis};
use rayon::prelude::*;
use std::{sync::Arc, time::Instant};

/// How skew-t shapes are obtained at each node.
#[derive(Debug, Clone, Default)]
pub enum FitStrategy {
    /// One nonlinear solve per node.
    #[default]
    PerNode,
    /// Interpolate `(alpha, nu)` from a precomputed table.
    Table(Arc<LookupTable>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeFailure {
    pub i: usize,
    pub j: usize,
    pub r_perp: f64,
    pub r_parallel: f64,
    pub reason: FailureReason,
}

#[derive(Debug, Clone)]
pub struct ParameterGrid {
    family: VelocityFamily,
    r_perp: Array1<f64>,
    r_parallel: Array1<f64>,
    /// `(n_perp, n_parallel, n_fields)`; failed nodes hold `NaN`.
    values: Array3<f64>,
    failures: Vec<NodeFailure>,
}

impl ParameterGrid {
    /// Fit every node of `r_perp × r_parallel`.
    ///
    /// # Errors
    /// - Axis validation errors (axes must be strictly increasing).
    /// - Non-node errors (anything other than a fit failure) abort the fit.
    pub fn fit(
        moments: &ProjectedMoments, r_perp: Array1<f64>, r_parallel: Array1<f64>,
        strategy: &FitStrategy, solver: &SkewTSolver, parallel: bool,
    ) -> FitResult<Self> {
        validate_axis("r_perp", r_perp.view())?;
        validate_axis("r_parallel", r_parallel.view())?;
        let family = moments.family();
        let (n_perp, n_par) = (r_perp.len(), r_parallel.len());
        let start = Instant::now();

        let nodes: Vec<(usize, usize)> =
            (0..n_perp).flat_map(|i| (0..n_par).map(move |j| (i, j))).collect();
        let fit_one = |&(i, j): &(usize, usize)| {
            fit_node(moments, strategy, solver, r_perp[i], r_parallel[j])
        };
        let results: Vec<FitResult<DistributionParameters>> = if parallel {
            nodes.par_iter().map(fit_one).collect()
        } else {
            nodes.iter().map(fit_one).collect()
        };

        let mut grid = Self {
            family,
            values: Array3::from_elem((n_perp, n_par, family.n_fields()), f64::NAN),
            r_perp,
            r_parallel,
            failures: Vec::new(),
        };
        for (&(i, j), result) in nodes.iter().zip(results) {
            grid.store(i, j, result)?;
        }

        log::debug!(
            "parameter grid: fitted {} nodes ({:?}) in {:?}",
            n_perp * n_par,
            family,
            start.elapsed()
        );
        grid.warn_failures();
        Ok(grid)
    }

    /// Retry failed nodes with a per-node solve seeded at `seed`.
    ///
    /// Returns the number of nodes still failing.
    ///
    /// # Errors
    /// - [`FitError::InvalidSeed`] for an inadmissible seed.
    /// - Non-node errors raised while refitting.
    pub fn refit_failed(
        &mut self, moments: &ProjectedMoments, solver: &SkewTSolver, seed: (f64, f64),
    ) -> FitResult<usize> {
        let solver = solver.with_seed(seed)?;
        let pending = std::mem::take(&mut self.failures);
        let results: Vec<FitResult<DistributionParameters>> = pending
            .par_iter()
            .map(|f| fit_node(moments, &FitStrategy::PerNode, &solver, f.r_perp, f.r_parallel))
            .collect();
        for (failure, result) in pending.iter().zip(results) {
            self.store(failure.i, failure.j, result)?;
        }
        log::debug!(
            "parameter grid: refit {} nodes, {} still failing",
            pending.len(),
            self.failures.len()
        );
        Ok(self.failures.len())
    }

    fn store(
        &mut self, i: usize, j: usize, result: FitResult<DistributionParameters>,
    ) -> FitResult<()> {
        match result {
            Ok(params) => {
                for (k, value) in params.fields().into_iter().enumerate() {
                    self.values[[i, j, k]] = value;
                }
                Ok(())
            }
            Err(FitError::FitFailure { reason, .. }) => {
                self.values.slice_mut(ndarray::s![i, j, ..]).fill(f64::NAN);
                self.failures.push(NodeFailure {
                    i,
                    j,
                    r_perp: self.r_perp[i],
                    r_parallel: self.r_parallel[j],
                    reason,
                });
                Ok(())
            }
            Err(other) => Err(other),
        }
    }

    fn warn_failures(&self) {
        if let Some(first) = self.failures.first() {
            log::warn!(
                "parameter grid: {} of {} nodes failed to fit; first at (r_perp = {}, \
                 r_parallel = {}): {}",
                self.failures.len(),
                self.r_perp.len() * self.r_parallel.len(),
                first.r_perp,
                first.r_parallel,
                first.reason
            );
        }
    }

    pub fn family(&self) -> VelocityFamily {
        self.family
    }

    pub fn r_perp(&self) -> ArrayView1<'_, f64> {
        self.r_perp.view()
    }

    pub fn r_parallel(&self) -> ArrayView1<'_, f64> {
        self.r_parallel.view()
    }

    pub fn failures(&self) -> &[NodeFailure] {
        &self.failures
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Node table of one field, `(n_perp, n_parallel)`.
    pub fn field(&self, name: &str) -> FitResult<ArrayView2<'_, f64>> {
        let k = self.family.field_index(name)?;
        Ok(self.values.index_axis(Axis(2), k))
    }

    /// Parameters fitted at node `(i, j)`.
    ///
    /// # Errors
    /// - `FitFailure` carrying the node's recorded reason.
    pub fn parameters_at(&self, i: usize, j: usize) -> FitResult<DistributionParameters> {
        if let Some(f) = self.failures.iter().find(|f| f.i == i && f.j == j) {
            return Err(FitError::FitFailure { node: Some((i, j)), reason: f.reason.clone() });
        }
        let fields: Vec<f64> = self.values.slice(ndarray::s![i, j, ..]).to_vec();
        Ok(DistributionParameters::from_fields(self.family, &fields)?)
    }

    /// Natural bicubic interpolant per field.
    ///
    /// # Errors
    /// - [`FitError::IncompleteGrid`] while any node is unfitted.
    pub fn interpolate(&self) -> FitResult<ParameterInterpolants> {
        if let Some(first) = self.failures.first() {
            return Err(FitError::IncompleteGrid {
                failed: self.failures.len(),
                first: (first.i, first.j),
            });
        }
        let splines = (0..self.family.n_fields())
            .map(|k| {
                BicubicSpline::natural(
                    self.r_perp.clone(),
                    self.r_parallel.clone(),
                    self.values.index_axis(Axis(2), k).to_owned(),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ParameterInterpolants::new(self.family, splines))
    }
}

/// Fit one node; moment and parameter problems become node failures.
fn fit_node(
    moments: &ProjectedMoments, strategy: &FitStrategy, solver: &SkewTSolver, r_perp: f64,
    r_parallel: f64,
) -> FitResult<DistributionParameters> {
    let target = moments.at(r_perp, r_parallel).map_err(|e| match e {
        MomentError::NonPositiveVariance { .. } | MomentError::NonFiniteMoment { .. } => {
            FitError::failure(FailureReason::InvalidMoments { text: e.to_string() })
        }
        other => FitError::Moment(other),
    })?;
    match (moments.family(), strategy) {
        (VelocityFamily::SkewT, FitStrategy::Table(table)) => {
            let (alpha, nu) = table.shape_at(target.gamma1, target.gamma2)?;
            shape_to_params(&target, alpha, nu).map(DistributionParameters::SkewT)
        }
        (family, _) => family.parameters_from_moments(&target, solver),
    }
}

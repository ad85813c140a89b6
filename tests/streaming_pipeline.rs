//! Integration tests for the streaming-model pipeline.
//!
//! Purpose
//! -------
//! - Validate moments → parameter grid → interpolants → line-of-sight
//!   density → streaming integral end to end, for both velocity families
//!   and both fitting strategies.
//!
//! Coverage
//! --------
//! - `fitting::ParameterGrid` with per-node solves and with a lookup table,
//!   including a CSV round trip of the table.
//! - `fitting::ParameterInterpolants` off-node accuracy against direct
//!   solves and strict domain handling.
//! - `model::StreamingModel` against an independent closure density built
//!   from the exact projected moments.
//!
//! Exclusions
//! ----------
//! - Closed-form checks of single components (projection formula, skew-t
//!   normalization, quadrature) live in the unit tests of each module.
use approx::assert_relative_eq;
use ndarray::{Array1, array};
use statrs::distribution::{Continuous, Normal};
use std::sync::Arc;
use streaming_model::{
    ModelOptions, StreamingModel,
    distributions::{DistributionParameters, VelocityFamily},
    fitting::{FitError, FitStrategy, LookupTable, LookupTableSpec, ParameterGrid, SkewTSolver},
    interpolation::{AxisSpec, InterpError, geomspace},
    moments::{MomentSet, ProjectedMoments},
    streaming::{StreamError, StreamingOptions, integrate},
};

/// Purpose
/// -------
/// Isotropic skew-t moment set with closed-form line-of-sight shapes.
///
/// With `c_20 = c_02 = σ²`, `c_40 = c_04 = 3σ⁴(1+k)`, `c_22 = σ⁴(1+k)`,
/// `c_30 = sσ³` and `c_12 = sσ³/3`, the projection gives
/// `gamma1 = s mu` and `gamma2 = 3k`, which stay inside the feasible
/// skew-t region for `s = -0.4`, `k ∈ (0.3, 0.7)`.
fn skewt_moment_set() -> MomentSet {
    fn sigma2(r: f64) -> f64 {
        4.0 + 20.0 / (1.0 + r / 5.0)
    }
    fn kurt(r: f64) -> f64 {
        0.3 + 0.4 / (1.0 + r / 10.0)
    }
    const SKEW: f64 = -0.4;

    MomentSet::new()
        .with("m_10", |r| -r / (1.0 + r / 10.0))
        .and_then(|m| m.with("c_20", sigma2))
        .and_then(|m| m.with("c_02", sigma2))
        .and_then(|m| m.with("c_30", |r| SKEW * sigma2(r).powf(1.5)))
        .and_then(|m| m.with("c_12", |r| SKEW * sigma2(r).powf(1.5) / 3.0))
        .and_then(|m| m.with("c_40", |r| 3.0 * sigma2(r).powi(2) * (1.0 + kurt(r))))
        .and_then(|m| m.with("c_04", |r| 3.0 * sigma2(r).powi(2) * (1.0 + kurt(r))))
        .and_then(|m| m.with("c_22", |r| sigma2(r).powi(2) * (1.0 + kurt(r))))
        .expect("valid moment names")
}

fn gaussian_moment_set() -> MomentSet {
    MomentSet::new()
        .with("m_10", |r| -2.0 * r / (1.0 + (r / 8.0).powi(2)))
        .and_then(|m| m.with("c_20", |r| 4.0 + 20.0 / (1.0 + r / 5.0)))
        .and_then(|m| m.with("c_02", |r| 3.0 + 15.0 / (1.0 + r / 5.0)))
        .expect("valid moment names")
}

fn skewt_fields(params: DistributionParameters) -> [f64; 4] {
    match params {
        DistributionParameters::SkewT(p) => [p.w, p.v_c, p.alpha, p.nu],
        other => panic!("expected skew-t parameters, found {other:?}"),
    }
}

fn assert_fields_close(found: [f64; 4], expected: [f64; 4], tol: f64) {
    for (f, e) in found.iter().zip(expected) {
        assert!(
            (f - e).abs() <= tol * e.abs().max(1.0),
            "found {found:?}, expected {expected:?}"
        );
    }
}

#[test]
// Purpose
// -------
// Interpolated skew-t parameters agree with direct solves off the nodes.
//
// Given
// -----
// - The isotropic skew-t set on a 12×12 geometric grid over [1, 60].
// - Off-node queries across the grid, near both edges and the diagonal.
//
// Expect
// ------
// - Complete grid; every field within 1e-2 (relative to max(1, |x|)) of the
//   per-point solve.
fn skewt_grid_interpolation_matches_direct_solves() {
    // Arrange
    let moments = ProjectedMoments::new(&skewt_moment_set(), VelocityFamily::SkewT).unwrap();
    let solver = SkewTSolver::default();
    let axis = geomspace(1.0, 60.0, 12);

    // Act
    let grid =
        ParameterGrid::fit(&moments, axis.clone(), axis, &FitStrategy::PerNode, &solver, true)
            .unwrap();
    let interpolants = grid.interpolate().unwrap();

    // Assert
    assert!(grid.is_complete());
    for (rp, rl) in [(7.3, 11.9), (2.2, 30.5), (45.0, 1.7), (1.5, 1.5), (20.0, 20.0)] {
        let direct = VelocityFamily::SkewT
            .parameters_from_moments(&moments.at(rp, rl).unwrap(), &solver)
            .unwrap();
        let interpolated = interpolants.at(rp, rl).unwrap();
        assert_fields_close(skewt_fields(interpolated), skewt_fields(direct), 1e-2);
        assert_relative_eq!(
            interpolants.nu(rp, rl).unwrap(),
            skewt_fields(interpolated)[3],
            max_relative = 1e-14
        );
    }
}

#[test]
// Purpose
// -------
// The lookup-table strategy reproduces per-node solves, also after a CSV
// round trip of the table.
//
// Given
// -----
// - A 13×17 table on gamma1 ∈ [-0.5, 0.1], gamma2 ∈ [0.8, 2.4], which
//   covers every node shape of the isotropic skew-t set.
//
// Expect
// ------
// - No failed table nodes; node parameters within 2e-3 of per-node fits;
//   the re-read table gives identical grids.
fn lookup_table_strategy_matches_per_node_fits() {
    // Arrange
    let moments = ProjectedMoments::new(&skewt_moment_set(), VelocityFamily::SkewT).unwrap();
    let solver = SkewTSolver::default();
    let spec = LookupTableSpec {
        gamma1: AxisSpec::Linear { start: -0.5, stop: 0.1, n: 13 },
        gamma2: AxisSpec::Linear { start: 0.8, stop: 2.4, n: 17 },
    };
    let axis = geomspace(1.0, 60.0, 12);

    // Act
    let table = LookupTable::build(&spec, &solver).unwrap();
    let mut csv = Vec::new();
    table.write_csv(&mut csv).unwrap();
    let reread = LookupTable::read_csv(csv.as_slice()).unwrap();

    let fit = |strategy: FitStrategy| {
        ParameterGrid::fit(&moments, axis.clone(), axis.clone(), &strategy, &solver, true).unwrap()
    };
    let per_node = fit(FitStrategy::PerNode);
    let tabulated = fit(FitStrategy::Table(Arc::new(table.clone())));
    let tabulated_reread = fit(FitStrategy::Table(Arc::new(reread)));

    // Assert
    assert_eq!(table.n_failed(), 0);
    assert!(tabulated.is_complete());
    for i in 0..axis.len() {
        for j in 0..axis.len() {
            let expected = skewt_fields(per_node.parameters_at(i, j).unwrap());
            let found = skewt_fields(tabulated.parameters_at(i, j).unwrap());
            assert_fields_close(found, expected, 2e-3);
        }
    }
    for name in VelocityFamily::SkewT.field_names() {
        assert_eq!(tabulated.field(name).unwrap(), tabulated_reread.field(name).unwrap());
    }
}

#[test]
// Purpose
// -------
// A lookup table that does not cover the node shapes yields per-node
// failures, not silently extrapolated parameters.
//
// Given
// -----
// - A table on gamma2 ∈ [2.5, 4] while the set has gamma2 < 2.1 everywhere.
//
// Expect
// ------
// - Every node fails with `OutsideTable`; interpolation is refused;
//   per-node refits repair the grid.
fn lookup_table_outside_shapes_fail_per_node() {
    let moments = ProjectedMoments::new(&skewt_moment_set(), VelocityFamily::SkewT).unwrap();
    let solver = SkewTSolver::default();
    let spec = LookupTableSpec {
        gamma1: AxisSpec::Linear { start: -0.5, stop: 0.1, n: 4 },
        gamma2: AxisSpec::Linear { start: 2.5, stop: 4.0, n: 4 },
    };
    let table = Arc::new(LookupTable::build(&spec, &solver).unwrap());
    let axis = geomspace(2.0, 30.0, 4);

    let mut grid = ParameterGrid::fit(
        &moments,
        axis.clone(),
        axis,
        &FitStrategy::Table(table),
        &solver,
        false,
    )
    .unwrap();

    assert_eq!(grid.failures().len(), 16);
    assert!(grid.failures().iter().all(|f| matches!(
        f.reason,
        streaming_model::fitting::FailureReason::OutsideTable { .. }
    )));
    assert!(matches!(
        StreamingModel::from_grid(grid.clone()),
        Err(FitError::IncompleteGrid { failed: 16, first: (0, 0) })
    ));

    let remaining = grid.refit_failed(&moments, &solver, solver.seed()).unwrap();
    assert_eq!(remaining, 0);
    assert!(StreamingModel::from_grid(grid).is_ok());
}

#[test]
// Purpose
// -------
// The full Gaussian model reproduces a streaming integral computed with the
// exact projected moments.
//
// Given
// -----
// - A Gaussian model on a 60×60 geometric grid over [0.5, 150].
// - A reference closure density using `ProjectedMoments` directly, masked
//   to the same separation domain.
// - xi_r(r) = (r / 5)^-1.8.
//
// Expect
// ------
// - `xi[[s_bin, mu_bin]]` of shape (4, 3), finite, and within
//   1e-2 (1 + |xi|) of the reference.
fn gaussian_model_matches_exact_moment_density() {
    // Arrange
    let set = gaussian_moment_set();
    let axis = AxisSpec::Geometric { start: 0.5, stop: 150.0, n: 60 };
    let opts = ModelOptions {
        r_perp: axis.clone(),
        r_parallel: axis,
        ..ModelOptions::for_family(VelocityFamily::Gaussian)
    };
    let model = StreamingModel::build(&set, &opts).unwrap();
    let exact = ProjectedMoments::new(&set, VelocityFamily::Gaussian).unwrap();
    let inside = |x: f64| (0.5..=150.0).contains(&x);
    let reference = |v: f64, rp: f64, rl: f64| {
        if !(inside(rp) && inside(rl)) {
            return f64::NAN;
        }
        let m = exact.at(rp, rl).unwrap();
        Normal::new(m.mean, m.std).unwrap().pdf(v)
    };
    let xi_real = |r: f64| (r / 5.0).powf(-1.8);
    let s: Array1<f64> = array![5.0, 10.0, 20.0, 40.0];
    let mu = array![0.1, 0.5, 0.9];
    let stream_opts = StreamingOptions::default();

    // Act
    let result = model.redshift_tpcf(s.view(), mu.view(), &xi_real, &stream_opts).unwrap();
    let expected = integrate(s.view(), mu.view(), &xi_real, &reference, &stream_opts).unwrap();

    // Assert
    assert_eq!(model.family(), VelocityFamily::Gaussian);
    assert_eq!(result.xi().dim(), (4, 3));
    assert_eq!(result.s(), s.view());
    for ((i, j), &value) in result.xi().indexed_iter() {
        let want = expected.xi()[[i, j]];
        assert!(value.is_finite());
        assert!((value - want).abs() <= 1e-2 * (1.0 + want.abs()), "({i}, {j}): {value} vs {want}");
    }
}

#[test]
// Purpose
// -------
// Queries strictly outside the fitted separation grid are errors.
//
// Given
// -----
// - A Gaussian model on [1, 50] × [1, 50].
//
// Expect
// ------
// - `OutOfDomain` from the interpolants and from the strict density, on
//   either axis.
fn queries_outside_grid_are_rejected() {
    let axis = AxisSpec::Geometric { start: 1.0, stop: 50.0, n: 10 };
    let opts = ModelOptions {
        r_perp: axis.clone(),
        r_parallel: axis,
        ..ModelOptions::for_family(VelocityFamily::Gaussian)
    };
    let model = StreamingModel::build(&gaussian_moment_set(), &opts).unwrap();
    let interpolants = model.los_pdf().interpolants();

    assert!(matches!(
        interpolants.field_value("loc", 0.5, 10.0),
        Err(FitError::Interp(InterpError::OutOfDomain { axis: "x", .. }))
    ));
    assert!(matches!(
        interpolants.field_value("scale", 10.0, 50.5),
        Err(FitError::Interp(InterpError::OutOfDomain { axis: "y", .. }))
    ));
    assert!(matches!(
        model.los_pdf().pdf(0.0, 60.0, 10.0),
        Err(StreamError::Fit(FitError::Interp(InterpError::OutOfDomain { .. })))
    ));
    assert!(model.los_pdf().pdf(0.0, 50.0, 1.0).unwrap().is_finite());
    assert!(matches!(interpolants.alpha(10.0, 10.0), Err(FitError::FamilyMismatch { .. })));
}

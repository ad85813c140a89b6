//! Precomputed `(gamma1, gamma2) -> (alpha, nu)` inverse map.
//!
//! The table solves the skew-t shape equations once on a regular grid of
//! skewness/kurtosis values and interpolates afterwards, replacing one
//! nonlinear solve per separation node with two spline evaluations. Nodes
//! with no solution are stored as `NaN`; the bicubic patches touching them
//! evaluate to `NaN` and lookups there are reported as infeasible.
use crate::{
    fitting::{
        errors::{FailureReason, FitError, FitResult},
        solver::SkewTSolver,
    },
    interpolation::{AxisSpec, BicubicSpline, InterpError},
    optimization::numerical_stability::DOF_FLOOR,
};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use rayon::prelude::*;
use std::{
    io::{Read, Write},
    time::Instant,
};

const HEADER: [&str; 4] = ["gamma1", "gamma2", "alpha", "nu"];

/// Node layout of the table.
///
/// Default: `gamma1 ∈ [-1, 1.5]` (26 nodes), `gamma2 ∈ [0, 4]` (41 nodes).
#[derive(Debug, Clone, PartialEq)]
pub struct LookupTableSpec {
    pub gamma1: AxisSpec,
    pub gamma2: AxisSpec,
}

impl Default for LookupTableSpec {
    fn default() -> Self {
        Self {
            gamma1: AxisSpec::Linear { start: -1.0, stop: 1.5, n: 26 },
            gamma2: AxisSpec::Linear { start: 0.0, stop: 4.0, n: 41 },
        }
    }
}

#[derive(Debug, Clone)]
pub struct LookupTable {
    alpha: BicubicSpline,
    nu: BicubicSpline,
}

impl LookupTable {
    /// Solve every node of `spec` (in parallel) and build the interpolants.
    ///
    /// Failed nodes are kept as `NaN` and counted in the log; they are not an
    /// error here since the default domain deliberately overlaps the
    /// infeasible region.
    ///
    /// # Errors
    /// - Axis errors from `spec`.
    pub fn build(spec: &LookupTableSpec, solver: &SkewTSolver) -> FitResult<Self> {
        let gamma1 = spec.gamma1.values("gamma1")?;
        let gamma2 = spec.gamma2.values("gamma2")?;
        let (n1, n2) = (gamma1.len(), gamma2.len());
        let start = Instant::now();

        let shapes: Vec<(f64, f64)> = (0..n1 * n2)
            .into_par_iter()
            .map(|node| {
                solver
                    .solve_shape(gamma1[node / n2], gamma2[node % n2])
                    .unwrap_or((f64::NAN, f64::NAN))
            })
            .collect();

        let alpha = Array2::from_shape_fn((n1, n2), |(i, j)| shapes[i * n2 + j].0);
        let nu = Array2::from_shape_fn((n1, n2), |(i, j)| shapes[i * n2 + j].1);
        let table = Self::from_nodes(gamma1, gamma2, alpha, nu)?;

        let failed = table.n_failed();
        log::debug!("lookup table: solved {} nodes in {:?}", n1 * n2, start.elapsed());
        if failed > 0 {
            log::warn!("lookup table: {failed} of {} nodes have no skew-t solution", n1 * n2);
        }
        Ok(table)
    }

    /// Build from precomputed node values (`NaN` marks invalid nodes).
    ///
    /// # Errors
    /// - Axis or shape errors from the interpolation layer.
    pub fn from_nodes(
        gamma1: Array1<f64>, gamma2: Array1<f64>, alpha: Array2<f64>, nu: Array2<f64>,
    ) -> FitResult<Self> {
        let alpha = BicubicSpline::local(gamma1.clone(), gamma2.clone(), alpha)?;
        let nu = BicubicSpline::local(gamma1, gamma2, nu)?;
        Ok(Self { alpha, nu })
    }

    pub fn gamma1(&self) -> ArrayView1<'_, f64> {
        self.alpha.x()
    }

    pub fn gamma2(&self) -> ArrayView1<'_, f64> {
        self.alpha.y()
    }

    pub fn alpha(&self) -> ArrayView2<'_, f64> {
        self.alpha.values().view()
    }

    pub fn nu(&self) -> ArrayView2<'_, f64> {
        self.nu.values().view()
    }

    /// Number of nodes without a valid solution.
    pub fn n_failed(&self) -> usize {
        self.alpha
            .values()
            .iter()
            .zip(self.nu.values().iter())
            .filter(|(a, n)| !(a.is_finite() && n.is_finite()))
            .count()
    }

    /// Interpolated `(alpha, nu)` at `(gamma1, gamma2)`.
    ///
    /// # Errors
    /// - `FitFailure { OutsideTable }` outside the table domain.
    /// - `FitFailure { Infeasible }` in cells touching failed nodes.
    /// - `FitFailure { InvalidDof }` if interpolation undershoots `nu > 4`.
    pub fn shape_at(&self, gamma1: f64, gamma2: f64) -> FitResult<(f64, f64)> {
        let outside = |e: InterpError| match e {
            InterpError::OutOfDomain { .. } => {
                FitError::failure(FailureReason::OutsideTable { gamma1, gamma2 })
            }
            other => FitError::Interp(other),
        };
        let alpha = self.alpha.eval(gamma1, gamma2).map_err(outside)?;
        let nu = self.nu.eval(gamma1, gamma2).map_err(outside)?;
        if !(alpha.is_finite() && nu.is_finite()) {
            return Err(FitError::failure(FailureReason::Infeasible));
        }
        if nu <= DOF_FLOOR {
            return Err(FitError::failure(FailureReason::InvalidDof { nu }));
        }
        Ok((alpha, nu))
    }

    /// Write one row per node, `gamma1`-major, with a header line.
    pub fn write_csv<W: Write>(&self, writer: W) -> FitResult<()> {
        let mut out = csv::Writer::from_writer(writer);
        out.write_record(HEADER)?;
        let (g1, g2) = (self.gamma1(), self.gamma2());
        let (alpha, nu) = (self.alpha(), self.nu());
        for i in 0..g1.len() {
            for j in 0..g2.len() {
                out.write_record(
                    [g1[i], g2[j], alpha[[i, j]], nu[[i, j]]].map(|v| v.to_string()),
                )?;
            }
        }
        out.flush().map_err(|e| FitError::Csv { text: e.to_string() })?;
        Ok(())
    }

    /// Read a table written by [`LookupTable::write_csv`] (any row order).
    ///
    /// # Errors
    /// - [`FitError::Csv`] for unreadable input or unparsable numbers.
    /// - [`FitError::TableFormat`] for missing columns or rows that do not
    ///   form a complete rectangular grid.
    pub fn read_csv<R: Read>(reader: R) -> FitResult<Self> {
        let mut input = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let headers = input.headers()?.clone();
        let columns: Vec<usize> = HEADER
            .iter()
            .map(|name| {
                headers.iter().position(|h| h == *name).ok_or_else(|| FitError::TableFormat {
                    reason: format!("missing column '{name}'"),
                })
            })
            .collect::<FitResult<_>>()?;

        let mut rows: Vec<[f64; 4]> = Vec::new();
        for record in input.records() {
            let record = record?;
            let mut row = [0.0; 4];
            for (slot, &col) in row.iter_mut().zip(columns.iter()) {
                let field = record.get(col).unwrap_or_default();
                *slot = field.parse().map_err(|_| FitError::TableFormat {
                    reason: format!("cannot parse '{field}' as a number"),
                })?;
            }
            rows.push(row);
        }

        let gamma1 = unique_sorted(rows.iter().map(|r| r[0]));
        let gamma2 = unique_sorted(rows.iter().map(|r| r[1]));
        let (n1, n2) = (gamma1.len(), gamma2.len());
        if rows.len() != n1 * n2 {
            return Err(FitError::TableFormat {
                reason: format!("{} rows do not form a {n1} x {n2} grid", rows.len()),
            });
        }

        let mut alpha = Array2::from_elem((n1, n2), f64::NAN);
        let mut nu = Array2::from_elem((n1, n2), f64::NAN);
        let mut seen = Array2::from_elem((n1, n2), false);
        for row in &rows {
            let i = gamma1.partition_point(|&g| g < row[0]);
            let j = gamma2.partition_point(|&g| g < row[1]);
            if seen[[i, j]] {
                return Err(FitError::TableFormat {
                    reason: format!("duplicate node ({}, {})", row[0], row[1]),
                });
            }
            seen[[i, j]] = true;
            alpha[[i, j]] = row[2];
            nu[[i, j]] = row[3];
        }
        Self::from_nodes(Array1::from(gamma1), Array1::from(gamma2), alpha, nu)
    }
}

fn unique_sorted(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut out: Vec<f64> = values.collect();
    out.sort_by(f64::total_cmp);
    out.dedup();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn small_spec() -> LookupTableSpec {
        LookupTableSpec {
            gamma1: AxisSpec::Linear { start: -0.5, stop: 0.5, n: 11 },
            gamma2: AxisSpec::Linear { start: 1.0, stop: 3.0, n: 11 },
        }
    }

    #[test]
    // Purpose
    // -------
    // Interpolated shapes agree with direct solves inside a feasible table.
    //
    // Given
    // -----
    // - An 11×11 table on gamma1 ∈ [-0.5, 0.5], gamma2 ∈ [1, 3].
    //
    // Expect
    // ------
    // - No failed nodes; off-node (alpha, nu) close to the direct solution.
    fn table_matches_direct_solve_off_nodes() {
        // Arrange
        let solver = SkewTSolver::default();
        let table = LookupTable::build(&small_spec(), &solver).unwrap();

        // Act / Assert
        assert_eq!(table.n_failed(), 0);
        for (g1, g2) in [(-0.23, 1.37), (0.11, 2.52), (0.42, 1.81)] {
            let (alpha_t, nu_t) = table.shape_at(g1, g2).unwrap();
            let (alpha_d, nu_d) = solver.solve_shape(g1, g2).unwrap();
            assert_abs_diff_eq!(alpha_t, alpha_d, epsilon = 2e-2);
            assert_abs_diff_eq!(nu_t / nu_d, 1.0, epsilon = 1e-2);
        }
    }

    #[test]
    // Purpose
    // -------
    // Lookups outside the table or next to failed nodes are fit failures.
    //
    // Given
    // -----
    // - A 3×3 table with one NaN node.
    //
    // Expect
    // ------
    // - `OutsideTable` beyond the domain, `Infeasible` in the NaN cell.
    fn table_reports_outside_and_infeasible() {
        let g = Array1::from(vec![0.0, 1.0, 2.0]);
        let mut alpha = Array2::from_elem((3, 3), 0.5);
        let nu = Array2::from_elem((3, 3), 8.0);
        alpha[[0, 0]] = f64::NAN;
        let table = LookupTable::from_nodes(g.clone(), g, alpha, nu).unwrap();

        assert!(matches!(
            table.shape_at(2.5, 1.0),
            Err(FitError::FitFailure { reason: FailureReason::OutsideTable { .. }, .. })
        ));
        assert_eq!(table.shape_at(0.5, 0.5), Err(FitError::failure(FailureReason::Infeasible)));
        assert_eq!(table.n_failed(), 1);
        let (a, n) = table.shape_at(1.5, 1.5).unwrap();
        assert_abs_diff_eq!(a, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(n, 8.0, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // CSV persistence keeps node values, including failed nodes.
    //
    // Given
    // -----
    // - A 2×3 table with one NaN node, written and read back.
    //
    // Expect
    // ------
    // - Identical axes and node values; NaN preserved.
    fn csv_persistence_keeps_nodes() {
        // Arrange
        let g1 = Array1::from(vec![-0.5, 0.5]);
        let g2 = Array1::from(vec![1.0, 2.0, 3.0]);
        let alpha = Array2::from_shape_fn((2, 3), |(i, j)| i as f64 - 0.1 * j as f64);
        let mut nu = Array2::from_elem((2, 3), 9.25);
        nu[[1, 2]] = f64::NAN;
        let table = LookupTable::from_nodes(g1, g2, alpha.clone(), nu).unwrap();

        // Act
        let mut buf = Vec::new();
        table.write_csv(&mut buf).unwrap();
        let back = LookupTable::read_csv(buf.as_slice()).unwrap();

        // Assert
        assert_eq!(back.gamma1(), table.gamma1());
        assert_eq!(back.gamma2(), table.gamma2());
        assert_eq!(back.alpha(), alpha.view());
        assert!(back.nu()[[1, 2]].is_nan());
        assert_eq!(back.nu()[[0, 0]], 9.25);
        assert_eq!(back.n_failed(), 1);
    }

    #[test]
    // Purpose
    // -------
    // Incomplete files are rejected.
    //
    // Given
    // -----
    // - Three rows on a 2×2 grid; a file without the `nu` column.
    //
    // Expect
    // ------
    // - `TableFormat` errors.
    fn csv_rejects_incomplete_tables() {
        let partial = "gamma1,gamma2,alpha,nu\n0,0,1,5\n0,1,1,5\n1,0,1,5\n";
        assert!(matches!(
            LookupTable::read_csv(partial.as_bytes()),
            Err(FitError::TableFormat { .. })
        ));
        let missing = "gamma1,gamma2,alpha\n0,0,1\n";
        assert!(matches!(
            LookupTable::read_csv(missing.as_bytes()),
            Err(FitError::TableFormat { .. })
        ));
    }
}

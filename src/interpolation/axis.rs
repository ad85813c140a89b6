//! Axis construction and lookup helpers.
use crate::interpolation::errors::{InterpError, InterpResult};
use ndarray::{Array1, ArrayView1};

/// How to lay out the nodes of one interpolation axis.
#[derive(Debug, Clone, PartialEq)]
pub enum AxisSpec {
    /// `n` nodes evenly spaced in `ln x` on `[start, stop]`; both ends `> 0`.
    Geometric { start: f64, stop: f64, n: usize },
    /// `n` evenly spaced nodes on `[start, stop]`.
    Linear { start: f64, stop: f64, n: usize },
    /// Caller-supplied, strictly increasing nodes.
    Explicit(Vec<f64>),
}

impl AxisSpec {
    /// Materialize and validate the nodes.
    ///
    /// # Errors
    /// - [`InterpError::AxisTooShort`] for fewer than two nodes.
    /// - [`InterpError::InvalidAxisSpec`] for reversed/non-finite endpoints or
    ///   non-positive geometric endpoints.
    /// - Any [`validate_axis`] failure for explicit nodes.
    pub fn values(&self, axis: &'static str) -> InterpResult<Array1<f64>> {
        let nodes = match *self {
            AxisSpec::Geometric { start, stop, n } => {
                check_endpoints(axis, start, stop, n)?;
                if start <= 0.0 {
                    return Err(InterpError::InvalidAxisSpec {
                        axis,
                        start,
                        stop,
                        reason: "Geometric axes need positive endpoints.",
                    });
                }
                geomspace(start, stop, n)
            }
            AxisSpec::Linear { start, stop, n } => {
                check_endpoints(axis, start, stop, n)?;
                linspace(start, stop, n)
            }
            AxisSpec::Explicit(ref nodes) => Array1::from(nodes.clone()),
        };
        validate_axis(axis, nodes.view())?;
        Ok(nodes)
    }
}

fn check_endpoints(axis: &'static str, start: f64, stop: f64, n: usize) -> InterpResult<()> {
    if n < 2 {
        return Err(InterpError::AxisTooShort { axis, len: n });
    }
    if !(start.is_finite() && stop.is_finite()) || start >= stop {
        return Err(InterpError::InvalidAxisSpec {
            axis,
            start,
            stop,
            reason: "Endpoints must be finite with start < stop.",
        });
    }
    Ok(())
}

/// `n` evenly spaced points on `[start, stop]`, endpoints exact.
pub fn linspace(start: f64, stop: f64, n: usize) -> Array1<f64> {
    match n {
        0 => Array1::zeros(0),
        1 => Array1::from_elem(1, start),
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            let mut out = Array1::from_shape_fn(n, |i| start + step * i as f64);
            out[n - 1] = stop;
            out
        }
    }
}

/// `n` points evenly spaced in log on `[start, stop]`, endpoints exact.
pub fn geomspace(start: f64, stop: f64, n: usize) -> Array1<f64> {
    let mut out = linspace(start.ln(), stop.ln(), n).mapv(f64::exp);
    if n >= 2 {
        out[0] = start;
        out[n - 1] = stop;
    }
    out
}

/// Check an axis: at least two finite, strictly increasing nodes.
pub fn validate_axis(axis: &'static str, nodes: ArrayView1<f64>) -> InterpResult<()> {
    if nodes.len() < 2 {
        return Err(InterpError::AxisTooShort { axis, len: nodes.len() });
    }
    if let Some((index, &value)) = nodes.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(InterpError::NonFiniteAxis { axis, index, value });
    }
    if let Some(index) = (1..nodes.len()).find(|&i| nodes[i] <= nodes[i - 1]) {
        return Err(InterpError::NonIncreasingAxis { axis, index });
    }
    Ok(())
}

/// Index `i` of the cell `[nodes[i], nodes[i+1]]` containing `x`.
///
/// Assumes `x` has already been checked against the domain.
pub fn locate_cell(nodes: ArrayView1<f64>, x: f64) -> usize {
    let n = nodes.len();
    let upper = nodes.as_slice().map_or_else(
        || nodes.iter().take_while(|&&node| node <= x).count(),
        |s| s.partition_point(|&node| node <= x),
    );
    upper.saturating_sub(1).min(n - 2)
}

/// Clamp `x` onto `[min, max]` when it lies within rounding distance of the
/// range; `None` if it is genuinely outside (or NaN).
pub fn snap_to_domain(x: f64, min: f64, max: f64) -> Option<f64> {
    let slack = 1e-12 * min.abs().max(max.abs()).max(1.0);
    if x >= min - slack && x <= max + slack { Some(x.clamp(min, max)) } else { None }
}

/// Stable argsort; NaN sorts last.
pub fn sort_permutation(values: ArrayView1<f64>) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    order
}

/// First index at which `values` decreases, if any.
pub fn first_unsorted(values: ArrayView1<f64>) -> Option<usize> {
    (1..values.len()).find(|&i| values[i] < values[i - 1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Geometric axes hit both endpoints and have constant ratio.
    //
    // Given
    // -----
    // - `Geometric { 0.71, 200, 5 }`.
    //
    // Expect
    // ------
    // - Exact endpoints and equal successive ratios.
    fn geometric_axis_has_exact_endpoints() {
        let nodes = AxisSpec::Geometric { start: 0.71, stop: 200.0, n: 5 }.values("r").unwrap();
        assert_eq!(nodes[0], 0.71);
        assert_eq!(nodes[4], 200.0);
        let ratio = nodes[1] / nodes[0];
        for i in 1..4 {
            assert_relative_eq!(nodes[i + 1] / nodes[i], ratio, max_relative = 1e-12);
        }
    }

    #[test]
    // Purpose
    // -------
    // Invalid specs are rejected with a descriptive error.
    //
    // Given
    // -----
    // - A geometric axis through zero, a one-node axis, a non-increasing list.
    //
    // Expect
    // ------
    // - `InvalidAxisSpec`, `AxisTooShort`, `NonIncreasingAxis`.
    fn invalid_axis_specs_are_rejected() {
        assert!(matches!(
            AxisSpec::Geometric { start: 0.0, stop: 1.0, n: 4 }.values("r"),
            Err(InterpError::InvalidAxisSpec { .. })
        ));
        assert!(matches!(
            AxisSpec::Linear { start: 0.0, stop: 1.0, n: 1 }.values("r"),
            Err(InterpError::AxisTooShort { .. })
        ));
        assert!(matches!(
            AxisSpec::Explicit(vec![1.0, 2.0, 2.0]).values("r"),
            Err(InterpError::NonIncreasingAxis { index: 2, .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Cell lookup at interior points, nodes and the upper boundary.
    //
    // Given
    // -----
    // - Nodes [0, 1, 2, 4].
    //
    // Expect
    // ------
    // - The last node maps to the last cell.
    fn locate_cell_handles_boundaries() {
        let nodes = array![0.0, 1.0, 2.0, 4.0];
        assert_eq!(locate_cell(nodes.view(), 0.0), 0);
        assert_eq!(locate_cell(nodes.view(), 0.5), 0);
        assert_eq!(locate_cell(nodes.view(), 1.0), 1);
        assert_eq!(locate_cell(nodes.view(), 3.9), 2);
        assert_eq!(locate_cell(nodes.view(), 4.0), 2);
    }
}

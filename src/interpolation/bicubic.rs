//! Bicubic Hermite interpolation on a rectilinear grid.
//!
//! Every cell is a bicubic patch fixed by node values and the derivatives
//! `∂z/∂x`, `∂z/∂y`, `∂²z/∂x∂y` at its four corners. Two ways of choosing
//! those derivatives are provided:
//!
//! - [`BicubicSpline::natural`]: slopes of 1-D natural cubic splines along
//!   each axis. The patches then reproduce the tensor-product natural spline
//!   (C² across cells). Requires finite node values.
//! - [`BicubicSpline::local`]: three-point finite-difference slopes. Only
//!   cells whose corners are all finite produce finite values, so holes in
//!   the table (failed nodes) stay local.
use crate::interpolation::{
    axis::{first_unsorted, locate_cell, snap_to_domain, validate_axis},
    errors::{InterpError, InterpResult},
};
use ndarray::{Array1, Array2, ArrayView1, Axis};

/// What to do with queries outside the node range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainPolicy {
    /// Fail with [`InterpError::OutOfDomain`].
    Strict,
    /// Return `NaN` for the offending entries.
    Mask,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BicubicSpline {
    x: Array1<f64>,
    y: Array1<f64>,
    z: Array2<f64>,
    zx: Array2<f64>,
    zy: Array2<f64>,
    zxy: Array2<f64>,
}

/// Hermite weights of one query coordinate inside its cell:
/// `[value_lo, value_hi, slope_lo, slope_hi]`.
#[derive(Debug, Clone, Copy)]
struct AxisWeights {
    cell: usize,
    w: [f64; 4],
}

impl BicubicSpline {
    /// Natural-spline derivatives; C² interpolant.
    ///
    /// # Errors
    /// - Axis validation failures.
    /// - [`InterpError::ShapeMismatch`] if `z` is not `(len(x), len(y))`.
    /// - [`InterpError::NonFiniteValue`] for any non-finite node value.
    pub fn natural(x: Array1<f64>, y: Array1<f64>, z: Array2<f64>) -> InterpResult<Self> {
        check_table(&x, &y, &z)?;
        if let Some(((i, j), &value)) = z.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(InterpError::NonFiniteValue { i, j, value });
        }
        Ok(Self::with_slopes(x, y, z, natural_slopes))
    }

    /// Local finite-difference derivatives; tolerates `NaN` nodes.
    ///
    /// # Errors
    /// - Axis validation failures and [`InterpError::ShapeMismatch`].
    pub fn local(x: Array1<f64>, y: Array1<f64>, z: Array2<f64>) -> InterpResult<Self> {
        check_table(&x, &y, &z)?;
        Ok(Self::with_slopes(x, y, z, local_slopes))
    }

    fn with_slopes(
        x: Array1<f64>, y: Array1<f64>, z: Array2<f64>,
        slopes: fn(ArrayView1<f64>, ArrayView1<f64>) -> Array1<f64>,
    ) -> Self {
        let mut zx = Array2::zeros(z.dim());
        for (j, column) in z.axis_iter(Axis(1)).enumerate() {
            zx.column_mut(j).assign(&slopes(x.view(), column));
        }
        let mut zy = Array2::zeros(z.dim());
        for (i, row) in z.axis_iter(Axis(0)).enumerate() {
            zy.row_mut(i).assign(&slopes(y.view(), row));
        }
        let mut zxy = Array2::zeros(z.dim());
        for (j, column) in zy.axis_iter(Axis(1)).enumerate() {
            zxy.column_mut(j).assign(&slopes(x.view(), column));
        }
        Self { x, y, z, zx, zy, zxy }
    }

    pub fn x(&self) -> ArrayView1<'_, f64> {
        self.x.view()
    }

    pub fn y(&self) -> ArrayView1<'_, f64> {
        self.y.view()
    }

    /// Node values the spline interpolates.
    pub fn values(&self) -> &Array2<f64> {
        &self.z
    }

    /// `((x_min, x_max), (y_min, y_max))`.
    pub fn domain(&self) -> ((f64, f64), (f64, f64)) {
        let (nx, ny) = self.z.dim();
        ((self.x[0], self.x[nx - 1]), (self.y[0], self.y[ny - 1]))
    }

    /// Evaluate at one point.
    ///
    /// # Errors
    /// - [`InterpError::OutOfDomain`] when either coordinate is outside the
    ///   node range (or NaN).
    pub fn eval(&self, xq: f64, yq: f64) -> InterpResult<f64> {
        let wx = axis_weights(self.x.view(), xq).ok_or_else(|| self.out_of_domain("x", xq))?;
        let wy = axis_weights(self.y.view(), yq).ok_or_else(|| self.out_of_domain("y", yq))?;
        Ok(self.combine(&wx, &wy))
    }

    /// Evaluate at one point, `NaN` outside the domain.
    pub fn eval_masked(&self, xq: f64, yq: f64) -> f64 {
        match (axis_weights(self.x.view(), xq), axis_weights(self.y.view(), yq)) {
            (Some(wx), Some(wy)) => self.combine(&wx, &wy),
            _ => f64::NAN,
        }
    }

    /// Evaluate on the outer product `xs × ys`.
    ///
    /// Both query axes must be non-decreasing. Hermite weights are computed
    /// once per query coordinate.
    ///
    /// # Errors
    /// - [`InterpError::UnsortedQuery`] for a decreasing query axis.
    /// - [`InterpError::OutOfDomain`] under [`DomainPolicy::Strict`].
    pub fn eval_grid(
        &self, xs: ArrayView1<f64>, ys: ArrayView1<f64>, policy: DomainPolicy,
    ) -> InterpResult<Array2<f64>> {
        if let Some(index) = first_unsorted(xs) {
            return Err(InterpError::UnsortedQuery { axis: "x", index });
        }
        if let Some(index) = first_unsorted(ys) {
            return Err(InterpError::UnsortedQuery { axis: "y", index });
        }
        let wxs = self.query_weights("x", self.x.view(), xs, policy)?;
        let wys = self.query_weights("y", self.y.view(), ys, policy)?;

        Ok(Array2::from_shape_fn((xs.len(), ys.len()), |(i, j)| match (&wxs[i], &wys[j]) {
            (Some(wx), Some(wy)) => self.combine(wx, wy),
            _ => f64::NAN,
        }))
    }

    fn query_weights(
        &self, axis: &'static str, nodes: ArrayView1<f64>, queries: ArrayView1<f64>,
        policy: DomainPolicy,
    ) -> InterpResult<Vec<Option<AxisWeights>>> {
        queries
            .iter()
            .map(|&q| match (axis_weights(nodes, q), policy) {
                (None, DomainPolicy::Strict) => Err(self.out_of_domain(axis, q)),
                (w, _) => Ok(w),
            })
            .collect()
    }

    fn combine(&self, wx: &AxisWeights, wy: &AxisWeights) -> f64 {
        let (i, j) = (wx.cell, wy.cell);
        let mut acc = 0.0;
        for a in 0..4 {
            let ii = i + (a & 1);
            let dx = a >= 2;
            for b in 0..4 {
                let jj = j + (b & 1);
                let dy = b >= 2;
                let node = match (dx, dy) {
                    (false, false) => self.z[[ii, jj]],
                    (true, false) => self.zx[[ii, jj]],
                    (false, true) => self.zy[[ii, jj]],
                    (true, true) => self.zxy[[ii, jj]],
                };
                acc += wx.w[a] * wy.w[b] * node;
            }
        }
        acc
    }

    fn out_of_domain(&self, axis: &'static str, value: f64) -> InterpError {
        let ((x0, x1), (y0, y1)) = self.domain();
        let (min, max) = if axis == "x" { (x0, x1) } else { (y0, y1) };
        InterpError::OutOfDomain { axis, value, min, max }
    }
}

fn check_table(x: &Array1<f64>, y: &Array1<f64>, z: &Array2<f64>) -> InterpResult<()> {
    validate_axis("x", x.view())?;
    validate_axis("y", y.view())?;
    if z.dim() != (x.len(), y.len()) {
        return Err(InterpError::ShapeMismatch { expected: (x.len(), y.len()), found: z.dim() });
    }
    Ok(())
}

fn axis_weights(nodes: ArrayView1<f64>, q: f64) -> Option<AxisWeights> {
    let n = nodes.len();
    let q = snap_to_domain(q, nodes[0], nodes[n - 1])?;
    let cell = locate_cell(nodes, q);
    let h = nodes[cell + 1] - nodes[cell];
    let t = (q - nodes[cell]) / h;
    let t2 = t * t;
    let t3 = t2 * t;
    let w = [
        2.0 * t3 - 3.0 * t2 + 1.0,
        -2.0 * t3 + 3.0 * t2,
        (t3 - 2.0 * t2 + t) * h,
        (t3 - t2) * h,
    ];
    Some(AxisWeights { cell, w })
}

/// Node slopes of the natural cubic spline through `(x, f)`.
fn natural_slopes(x: ArrayView1<f64>, f: ArrayView1<f64>) -> Array1<f64> {
    let n = x.len();
    let h: Vec<f64> = (0..n - 1).map(|i| x[i + 1] - x[i]).collect();
    let secant: Vec<f64> = (0..n - 1).map(|i| (f[i + 1] - f[i]) / h[i]).collect();

    // Second derivatives m[0] = m[n-1] = 0; Thomas sweep on the interior.
    let mut m = vec![0.0; n];
    if n > 2 {
        let interior = n - 2;
        let mut diag = vec![0.0; interior];
        let mut rhs = vec![0.0; interior];
        for k in 0..interior {
            let i = k + 1;
            diag[k] = 2.0 * (h[i - 1] + h[i]);
            rhs[k] = 6.0 * (secant[i] - secant[i - 1]);
        }
        for k in 1..interior {
            let factor = h[k] / diag[k - 1];
            diag[k] -= factor * h[k];
            rhs[k] -= factor * rhs[k - 1];
        }
        m[interior] = rhs[interior - 1] / diag[interior - 1];
        for k in (0..interior - 1).rev() {
            m[k + 1] = (rhs[k] - h[k + 1] * m[k + 2]) / diag[k];
        }
    }

    let mut slopes = Array1::zeros(n);
    for i in 0..n - 1 {
        slopes[i] = secant[i] - h[i] * (2.0 * m[i] + m[i + 1]) / 6.0;
    }
    slopes[n - 1] = secant[n - 2] + h[n - 2] * (m[n - 2] + 2.0 * m[n - 1]) / 6.0;
    slopes
}

/// Three-point slopes; one-sided where a neighbour is missing or NaN.
fn local_slopes(x: ArrayView1<f64>, f: ArrayView1<f64>) -> Array1<f64> {
    let n = x.len();
    Array1::from_shape_fn(n, |i| {
        let left = (i > 0 && f[i - 1].is_finite()).then(|| (x[i] - x[i - 1], f[i] - f[i - 1]));
        let right =
            (i + 1 < n && f[i + 1].is_finite()).then(|| (x[i + 1] - x[i], f[i + 1] - f[i]));
        match (left, right) {
            (Some((hl, dl)), Some((hr, dr))) => {
                (hl * hl * dr + hr * hr * dl) / (hl * hr * (hl + hr))
            }
            (Some((hl, dl)), None) => dl / hl,
            (None, Some((hr, dr))) => dr / hr,
            (None, None) => 0.0,
        }
    })
}

//! The streaming integral from real to redshift space.
//!
//! For every `(s, mu)` with `s_parallel = s mu` and
//! `s_perp = s sqrt(1 - mu^2)`,
//!
//! ```text
//! xi_s = ∫ p(v = (s_parallel - y) sign(y) | s_perp, |y|) (1 + xi_r(sqrt(s_perp^2 + y^2))) dy - 1
//! ```
//!
//! The integrand jumps at `y = 0`, so `[-limit, -epsilon]` and
//! `[epsilon, limit]` are integrated separately with composite Simpson on
//! `n_points` samples each. Non-finite density samples contribute zero.
use crate::streaming::{
    errors::{StreamError, StreamResult},
    los_pdf::LosDensity,
    quadrature::{integrate_rows, linspace, simpson_weights},
};
use ndarray::{Array1, Array2, ArrayView1};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamingOptions {
    pub limit: f64,
    pub epsilon: f64,
    pub n_points: usize,
}

impl StreamingOptions {
    /// # Errors
    /// - [`StreamError::InvalidLimit`] unless `limit` is positive and finite.
    /// - [`StreamError::InvalidEpsilon`] unless `0 < epsilon < limit`.
    /// - [`StreamError::InvalidPoints`] for fewer than 3 samples per half.
    pub fn new(limit: f64, epsilon: f64, n_points: usize) -> StreamResult<Self> {
        if !limit.is_finite() {
            return Err(StreamError::InvalidLimit { limit, reason: "must be finite" });
        }
        if limit <= 0.0 {
            return Err(StreamError::InvalidLimit { limit, reason: "must be positive" });
        }
        if epsilon.is_nan() || epsilon <= 0.0 || epsilon >= limit {
            return Err(StreamError::InvalidEpsilon { epsilon, limit });
        }
        if n_points < 3 {
            return Err(StreamError::InvalidPoints { n_points });
        }
        Ok(Self { limit, epsilon, n_points })
    }
}

impl Default for StreamingOptions {
    /// `limit = 120`, `epsilon = 1e-4`, `n_points = 300`.
    fn default() -> Self {
        Self { limit: 120.0, epsilon: 1e-4, n_points: 300 }
    }
}

/// Redshift-space correlation function on an `(s, mu)` grid.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamingResult {
    s: Array1<f64>,
    mu: Array1<f64>,
    xi: Array2<f64>,
}

impl StreamingResult {
    pub fn s(&self) -> ArrayView1<'_, f64> {
        self.s.view()
    }

    pub fn mu(&self) -> ArrayView1<'_, f64> {
        self.mu.view()
    }

    /// `xi[[s_bin, mu_bin]]`.
    pub fn xi(&self) -> &Array2<f64> {
        &self.xi
    }

    pub fn into_xi(self) -> Array2<f64> {
        self.xi
    }
}

/// Integrand table for every `(s, mu)` pair and displacement sample.
///
/// Rows run over pairs in `s`-major order (`row = i_s * mu.len() + i_mu`),
/// columns over `y`. Non-finite densities are replaced by zero.
///
/// # Errors
/// - Invalid `s` / `mu` values.
/// - Errors from [`LosDensity::density_grid`].
pub fn streaming_integrand<P, X>(
    s: ArrayView1<f64>, mu: ArrayView1<f64>, y: ArrayView1<f64>, xi_real: &X, pdf: &P,
) -> StreamResult<Array2<f64>>
where
    P: LosDensity + ?Sized,
    X: Fn(f64) -> f64 + Sync,
{
    check_inputs(s, mu)?;
    let (s_perp, s_parallel) = pair_components(s, mu);
    Ok(integrand_table(s_perp.view(), s_parallel.view(), y, xi_real, pdf)?.0)
}

/// Redshift-space correlation function at every `(s[i], mu[j])`.
///
/// The two halves of the displacement range are evaluated concurrently.
///
/// # Errors
/// - [`StreamError::InvalidSeparation`] / [`StreamError::InvalidMu`] for
///   inputs outside `s >= 0`, `mu ∈ [-1, 1]`.
/// - Errors from [`LosDensity::density_grid`].
pub fn integrate<P, X>(
    s: ArrayView1<f64>, mu: ArrayView1<f64>, xi_real: &X, pdf: &P, opts: &StreamingOptions,
) -> StreamResult<StreamingResult>
where
    P: LosDensity + ?Sized,
    X: Fn(f64) -> f64 + Sync,
{
    check_inputs(s, mu)?;
    let (s_perp, s_parallel) = pair_components(s, mu);
    let half = |a: f64, b: f64| -> StreamResult<(Array1<f64>, usize)> {
        let y = linspace(a, b, opts.n_points);
        let weights = simpson_weights(a, b, opts.n_points);
        let (table, masked) = integrand_table(s_perp.view(), s_parallel.view(), y.view(), xi_real, pdf)?;
        Ok((integrate_rows(table.view(), weights.view()), masked))
    };
    let (left, right) = rayon::join(
        || half(-opts.limit, -opts.epsilon),
        || half(opts.epsilon, opts.limit),
    );
    let ((left, masked_left), (right, masked_right)) = (left?, right?);

    let masked = masked_left + masked_right;
    if masked > 0 {
        log::warn!(
            "streaming integral: {masked} of {} density samples were non-finite and set to zero",
            2 * s_perp.len() * opts.n_points
        );
    }

    let n_mu = mu.len();
    let xi = Array2::from_shape_fn((s.len(), n_mu), |(i, j)| {
        let row = i * n_mu + j;
        left[row] + right[row] - 1.0
    });
    Ok(StreamingResult { s: s.to_owned(), mu: mu.to_owned(), xi })
}

fn check_inputs(s: ArrayView1<f64>, mu: ArrayView1<f64>) -> StreamResult<()> {
    if let Some((index, &value)) = s.iter().enumerate().find(|(_, v)| !v.is_finite() || **v < 0.0) {
        return Err(StreamError::InvalidSeparation { index, value });
    }
    if let Some((index, &value)) =
        mu.iter().enumerate().find(|(_, v)| !(-1.0..=1.0).contains(*v))
    {
        return Err(StreamError::InvalidMu { index, value });
    }
    Ok(())
}

/// `(s_perp, s_parallel)` for every pair, `s`-major.
fn pair_components(s: ArrayView1<f64>, mu: ArrayView1<f64>) -> (Array1<f64>, Array1<f64>) {
    let mut s_perp = Vec::with_capacity(s.len() * mu.len());
    let mut s_parallel = Vec::with_capacity(s.len() * mu.len());
    for &si in s {
        for &mj in mu {
            s_perp.push(si * (1.0 - mj * mj).max(0.0).sqrt());
            s_parallel.push(si * mj);
        }
    }
    (Array1::from(s_perp), Array1::from(s_parallel))
}

/// Integrand table and the number of masked density samples.
fn integrand_table<P, X>(
    s_perp: ArrayView1<f64>, s_parallel: ArrayView1<f64>, y: ArrayView1<f64>, xi_real: &X, pdf: &P,
) -> StreamResult<(Array2<f64>, usize)>
where
    P: LosDensity + ?Sized,
    X: Fn(f64) -> f64 + Sync,
{
    let dim = (s_perp.len(), y.len());
    let v_los = Array2::from_shape_fn(dim, |(i, j)| (s_parallel[i] - y[j]) * sign(y[j]));
    let abs_y = y.mapv(f64::abs);
    let mut table = pdf.density_grid(v_los.view(), s_perp, abs_y.view())?;

    let mut masked = 0;
    for ((i, j), p) in table.indexed_iter_mut() {
        if p.is_finite() {
            *p *= 1.0 + xi_real(s_perp[i].hypot(y[j]));
        } else {
            *p = 0.0;
            masked += 1;
        }
    }
    Ok((table, masked))
}

/// `sign(0) = 0`, unlike `f64::signum`.
fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

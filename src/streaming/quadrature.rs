//! Fixed-sample composite quadrature on uniform grids.
use ndarray::{Array1, ArrayView1, ArrayView2};

pub use crate::interpolation::axis::linspace;

/// Composite Simpson weights for `n` equally spaced samples on `[a, b]`.
///
/// With an even number of intervals this is the classic `h/3 (1, 4, 2, …, 4, 1)`
/// rule. With an odd number the last (resp. first) interval is covered by the
/// trapezoid rule and the two variants are averaged. `n == 2` falls back to
/// the trapezoid rule; `n < 2` yields zero weights.
pub fn simpson_weights(a: f64, b: f64, n: usize) -> Array1<f64> {
    let mut w = Array1::zeros(n);
    if n < 2 {
        return w;
    }
    let h = (b - a) / (n - 1) as f64;
    if n == 2 {
        w.fill(0.5 * h);
        return w;
    }
    if n % 2 == 1 {
        add_simpson(&mut w, 0, n, h, 1.0);
        return w;
    }
    // Simpson on [0, n-1) plus trapezoid on the last interval ...
    add_simpson(&mut w, 0, n - 1, h, 0.5);
    w[n - 2] += 0.25 * h;
    w[n - 1] += 0.25 * h;
    // ... averaged with trapezoid on the first interval plus Simpson on [1, n).
    w[0] += 0.25 * h;
    w[1] += 0.25 * h;
    add_simpson(&mut w, 1, n - 1, h, 0.5);
    w
}

/// Add `scale ×` Simpson weights for `len` samples (odd) starting at `start`.
fn add_simpson(w: &mut Array1<f64>, start: usize, len: usize, h: f64, scale: f64) {
    let third = scale * h / 3.0;
    for k in 0..len {
        let coeff = if k == 0 || k == len - 1 {
            1.0
        } else if k % 2 == 1 {
            4.0
        } else {
            2.0
        };
        w[start + k] += coeff * third;
    }
}

/// `Σ w_k f_k`.
pub fn integrate(values: ArrayView1<f64>, weights: ArrayView1<f64>) -> f64 {
    values.dot(&weights)
}

/// Row-wise quadrature of a `(rows, samples)` table.
pub fn integrate_rows(values: ArrayView2<f64>, weights: ArrayView1<f64>) -> Array1<f64> {
    values.dot(&weights)
}

//! Central finite differences over closures.
//!
//! Truncation error is O(h^2); `h = 1e-6` keeps round-off below 1e-8 for the
//! magnitudes the kernel works with.

use nalgebra::{DMatrix, DVector};

/// Default central-difference step.
pub const STEP: f64 = 1e-6;

/// Gradient of a scalar function at `x`.
pub fn numerical_gradient<F>(f: F, x: &DVector<f64>, h: f64) -> DVector<f64>
where
    F: Fn(&DVector<f64>) -> f64,
{
    let mut grad = DVector::zeros(x.len());
    let mut probe = x.clone();
    for i in 0..x.len() {
        probe[i] = x[i] + h;
        let plus = f(&probe);
        probe[i] = x[i] - h;
        let minus = f(&probe);
        probe[i] = x[i];
        grad[i] = (plus - minus) / (2.0 * h);
    }
    grad
}

/// Jacobian of a vector function at `x` (rows = outputs, cols = inputs).
pub fn numerical_jacobian<F>(f: F, x: &DVector<f64>, h: f64) -> DMatrix<f64>
where
    F: Fn(&DVector<f64>) -> DVector<f64>,
{
    let n_out = f(x).len();
    let mut jac = DMatrix::zeros(n_out, x.len());
    let mut probe = x.clone();
    for j in 0..x.len() {
        probe[j] = x[j] + h;
        let plus = f(&probe);
        probe[j] = x[j] - h;
        let minus = f(&probe);
        probe[j] = x[j];
        jac.set_column(j, &((plus - minus) / (2.0 * h)));
    }
    jac
}

/// Hessian of a scalar function, as the Jacobian of its analytic gradient.
///
/// Differencing a supplied gradient is far better conditioned than second
/// differences of the function itself.
pub fn numerical_hessian<G>(grad: G, x: &DVector<f64>, h: f64) -> DMatrix<f64>
where
    G: Fn(&DVector<f64>) -> DVector<f64>,
{
    let jac = numerical_jacobian(grad, x, h);
    (&jac + jac.transpose()) * 0.5
}

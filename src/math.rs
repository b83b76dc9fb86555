//! Numerical helpers shared by the solvers
//!
//! Small pure functions over nalgebra types: interpolation, trapezoidal
//! quadrature on a node grid, and the damped Gauss-Newton building blocks used
//! by the slip iteration.

use nalgebra::{DMatrix, DVector};

/// Linear interpolation of y at x between two (x, y) pairs
pub fn interpolate(x: f64, first: (f64, f64), second: (f64, f64)) -> f64 {
    let (x1, y1) = first;
    let (x2, y2) = second;
    if (x2 - x1).abs() < f64::EPSILON {
        return y1;
    }
    y1 + (y2 - y1) * (x - x1) / (x2 - x1)
}

/// Trapezoidal quadrature of sampled values over a node grid
pub fn trapezoidal(positions: &[f64], values: &[f64]) -> f64 {
    debug_assert_eq!(positions.len(), values.len());
    positions
        .windows(2)
        .zip(values.windows(2))
        .map(|(x, y)| 0.5 * (y[0] + y[1]) * (x[1] - x[0]))
        .sum()
}

/// Forward finite-difference Jacobian of a vector residual
///
/// The step per component is proportional to the component magnitude with an
/// absolute floor. Returns `None` when any perturbed evaluation fails.
pub fn forward_difference_jacobian(
    mut residual: impl FnMut(&DVector<f64>) -> Option<DVector<f64>>,
    x: &DVector<f64>,
    residual_at_x: &DVector<f64>,
) -> Option<DMatrix<f64>> {
    let n = residual_at_x.len();
    let m = x.len();
    let mut jacobian = DMatrix::zeros(n, m);
    let mut perturbed = x.clone();
    for j in 0..m {
        let h = (1e-6 * x[j].abs()).max(1e-8);
        perturbed[j] = x[j] + h;
        let r = residual(&perturbed)?;
        perturbed[j] = x[j];
        for i in 0..n {
            jacobian[(i, j)] = (r[i] - residual_at_x[i]) / h;
        }
    }
    Some(jacobian)
}

/// One damped Gauss-Newton step: solve (J^T J + lambda * diag(J^T J)) d = J^T f
///
/// The inner system is solved by QR decomposition; `None` signals a singular
/// system.
pub fn damped_least_squares_step(
    jacobian: &DMatrix<f64>,
    residual: &DVector<f64>,
    lambda: f64,
) -> Option<DVector<f64>> {
    let jtj = jacobian.transpose() * jacobian;
    let rhs = jacobian.transpose() * residual;
    let mut system = jtj.clone();
    for i in 0..system.nrows() {
        // keep the damping effective even on vanishing diagonal entries
        let diagonal = jtj[(i, i)].max(1e-12);
        system[(i, i)] += lambda * diagonal;
    }
    system.qr().solve(&rhs)
}

pub mod integration;
pub mod interpolation;
pub mod linalg;
pub mod quadrature;

pub use integration::{cumulative_trapezoid, trapezoid};
pub(crate) use interpolation::interpolate_clamped;
pub use interpolation::{validate_grid, InterpolationError};
pub use linalg::{least_squares, lu_factorize, lu_solve, LuDecomposition, LuError};
pub use quadrature::{gauss_legendre, QuadratureError, QuadratureRule};

use faer::Mat;

pub type DenseMatrix = Mat<f64>;

/// Evaluate `sum c_k x^k` by Horner's rule.
pub fn polynomial(coefficients: &[f64], x: f64) -> f64 {
    coefficients
        .iter()
        .rev()
        .fold(0.0, |accumulator, coefficient| accumulator * x + coefficient)
}

/// `count` points evenly spaced in log from `lower` to `upper` (both > 0).
pub fn log_spaced(lower: f64, upper: f64, count: usize) -> Vec<f64> {
    if count < 2 {
        return vec![lower; count];
    }
    let ln_lower = lower.ln();
    let step = (upper.ln() - ln_lower) / (count - 1) as f64;
    (0..count)
        .map(|index| (ln_lower + step * index as f64).exp())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{interpolate_clamped, log_spaced, polynomial};

    #[test]
    fn horner_matches_expanded_polynomial() {
        let value = polynomial(&[1.0, -2.0, 0.5], 3.0);
        assert!((value - (1.0 - 6.0 + 4.5)).abs() < 1.0e-15);
        assert_eq!(polynomial(&[], 2.0), 0.0);
    }

    #[test]
    fn log_spacing_hits_both_ends() {
        let grid = log_spaced(100.0, 10_000.0, 3);
        assert!((grid[0] - 100.0).abs() < 1.0e-9);
        assert!((grid[1] - 1_000.0).abs() < 1.0e-9);
        assert!((grid[2] - 10_000.0).abs() < 1.0e-9);
    }

    #[test]
    fn clamped_interpolation_is_reachable_from_the_module_root() {
        let grid = log_spaced(1.0, 100.0, 3);
        let values = [0.0, 1.0, 2.0];
        assert!((interpolate_clamped(10.0, &grid, &values) - 1.0).abs() < 1.0e-12);
        assert_eq!(interpolate_clamped(1_000.0, &grid, &values), 2.0);
    }
}

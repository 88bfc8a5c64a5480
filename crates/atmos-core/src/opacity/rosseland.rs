//! Depth-wise mean opacities: Rosseland mean and the 500 nm reference.

use super::{continuum_ln_kappa, DepthAbsorbers, OpacityError, OpacityTable};
use crate::common::planck::planck_lambda_derivative;

pub const REFERENCE_WAVELENGTH_NM: f64 = 500.0;

/// Trapezoid weight of every grid point.
fn trapezoid_weights(grid: &[f64]) -> Vec<f64> {
    let count = grid.len();
    (0..count)
        .map(|index| {
            let left = if index > 0 { grid[index] - grid[index - 1] } else { 0.0 };
            let right = if index + 1 < count { grid[index + 1] - grid[index] } else { 0.0 };
            0.5 * (left + right)
        })
        .collect()
}

/// ln kappa_R per depth: the dB/dT-weighted harmonic mean over `table`.
pub fn rosseland_mean(table: &OpacityTable, temperatures: &[f64]) -> Result<Vec<f64>, OpacityError> {
    if table.depth_count() != temperatures.len() {
        return Err(OpacityError::DepthMismatch {
            expected: table.depth_count(),
            actual: temperatures.len(),
        });
    }
    let weights = trapezoid_weights(&table.wavelengths_nm);
    Ok(temperatures
        .iter()
        .enumerate()
        .map(|(depth, temperature)| {
            let (mut numerator, mut denominator) = (0.0, 0.0);
            for ((lambda, weight), column) in table.wavelengths_nm.iter().zip(&weights).zip(&table.ln_kappa) {
                let derivative = planck_lambda_derivative(*lambda, *temperature) * weight;
                numerator += derivative * (-column[depth]).exp();
                denominator += derivative;
            }
            (denominator / numerator).ln()
        })
        .collect())
}

/// ln kappa at 500 nm per depth.
pub fn reference_opacity(absorbers: &[DepthAbsorbers], log_kap_fudge: f64) -> Vec<f64> {
    absorbers
        .iter()
        .map(|depth| continuum_ln_kappa(depth, REFERENCE_WAVELENGTH_NM, log_kap_fudge))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{reference_opacity, rosseland_mean, trapezoid_weights};
    use crate::opacity::test_support::photosphere;
    use crate::opacity::{continuum_table, OpacityError, OpacityTable};
    use crate::domain::ExecutionMode;
    use crate::numerics::log_spaced;

    #[test]
    fn grey_opacity_is_its_own_rosseland_mean() {
        let grid = log_spaced(100.0, 20_000.0, 120);
        let table = OpacityTable {
            ln_kappa: vec![vec![0.3, -1.2]; grid.len()],
            wavelengths_nm: grid,
        };
        let mean = rosseland_mean(&table, &[4_000.0, 9_000.0]).expect("mean");
        assert!((mean[0] - 0.3).abs() < 1.0e-12);
        assert!((mean[1] + 1.2).abs() < 1.0e-12);
    }

    #[test]
    fn harmonic_mean_is_bounded_by_extremes() {
        let grid = log_spaced(150.0, 5_000.0, 250);
        let depths = vec![photosphere(5_800.0, 1.0e17)];
        let table = continuum_table(&grid, &depths, 0.0, ExecutionMode::Serial).expect("table");
        let mean = rosseland_mean(&table, &[5_800.0]).expect("mean")[0];
        let low = table.ln_kappa.iter().map(|row| row[0]).fold(f64::INFINITY, f64::min);
        let high = table.ln_kappa.iter().map(|row| row[0]).fold(f64::NEG_INFINITY, f64::max);
        assert!(mean > low && mean < high);
        let reference = reference_opacity(&depths, 0.0)[0];
        assert!(reference.is_finite());
    }

    #[test]
    fn depth_count_must_match() {
        let table = OpacityTable {
            wavelengths_nm: vec![400.0, 500.0],
            ln_kappa: vec![vec![0.0], vec![0.0]],
        };
        assert!(matches!(
            rosseland_mean(&table, &[5_000.0, 6_000.0]),
            Err(OpacityError::DepthMismatch { expected: 1, actual: 2 })
        ));
        assert_eq!(trapezoid_weights(&[0.0, 1.0, 3.0]), vec![0.5, 1.5, 1.0]);
    }
}

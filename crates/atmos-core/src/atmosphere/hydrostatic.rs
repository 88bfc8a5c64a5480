//! Hydrostatic equilibrium on the Rosseland optical depth scale.
//!
//! dP/dtau = g / kappa is integrated as
//! P^(3/2) = P0^(3/2) + 1.5 g Int tau P_guess^(1/2) / kappa d ln tau,
//! which keeps the pressure positive and increasing by construction.

use serde::Serialize;

use crate::common::constants::RADIATION_DENSITY;
use crate::domain::errors::AtmosError;
use crate::numerics::cumulative_trapezoid;

/// Radiation pressure may take at most this fraction of the total.
pub const MAX_RADIATION_FRACTION: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HydrostaticError {
    #[error("hydrostatic integration needs at least 2 depths, got {actual}")]
    TooFewDepths { actual: usize },
    #[error("{name} has {actual} entries for {expected} depths")]
    LengthMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("{name} must be positive and finite at depth {depth}, got {value}")]
    NonPositive {
        name: &'static str,
        depth: usize,
        value: f64,
    },
}

impl From<HydrostaticError> for AtmosError {
    fn from(error: HydrostaticError) -> Self {
        AtmosError::computation("HSE.INTEGRATE", error.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PressureStructure {
    pub total: Vec<f64>,
    pub gas: Vec<f64>,
    /// Radiation pressure as applied, after the cap.
    pub radiation: Vec<f64>,
    /// Depths where a T^4 radiation pressure exceeded the cap.
    pub capped: Vec<usize>,
}

#[derive(Debug, Clone, Copy)]
pub struct HydrostaticInput<'a> {
    pub gravity: f64,
    pub ln_tau: &'a [f64],
    /// ln kappa (cm^2/g) the pressure is integrated against.
    pub ln_kappa: &'a [f64],
    pub temperature: &'a [f64],
    /// Total pressure of the previous pass, used inside the integrand.
    pub total_guess: &'a [f64],
}

pub fn radiation_pressure(temperature: f64) -> f64 {
    RADIATION_DENSITY * temperature.powi(4) / 3.0
}

fn check_length(name: &'static str, expected: usize, values: &[f64]) -> Result<(), HydrostaticError> {
    if values.len() == expected {
        Ok(())
    } else {
        Err(HydrostaticError::LengthMismatch {
            name,
            expected,
            actual: values.len(),
        })
    }
}

fn check_positive(name: &'static str, values: &[f64]) -> Result<(), HydrostaticError> {
    match values
        .iter()
        .enumerate()
        .find(|(_, value)| !(value.is_finite() && **value > 0.0))
    {
        Some((depth, value)) => Err(HydrostaticError::NonPositive {
            name,
            depth,
            value: *value,
        }),
        None => Ok(()),
    }
}

/// Total, gas and radiation pressure at every depth.
///
/// The surface total pressure is `g tau_0 / kappa_0`.
pub fn integrate_pressure(input: HydrostaticInput<'_>) -> Result<PressureStructure, HydrostaticError> {
    let count = input.ln_tau.len();
    if count < 2 {
        return Err(HydrostaticError::TooFewDepths { actual: count });
    }
    check_length("ln kappa", count, input.ln_kappa)?;
    check_length("temperature", count, input.temperature)?;
    check_length("pressure guess", count, input.total_guess)?;
    check_positive("gravity", &[input.gravity])?;
    check_positive("temperature", input.temperature)?;
    check_positive("pressure guess", input.total_guess)?;

    let surface = input.gravity * input.ln_tau[0].exp() / input.ln_kappa[0].exp();
    let integrand: Vec<f64> = (0..count)
        .map(|depth| (input.ln_tau[depth] + 0.5 * input.total_guess[depth].ln() - input.ln_kappa[depth]).exp())
        .collect();
    let accumulated = cumulative_trapezoid(
        input.ln_tau,
        &integrand,
        surface.powf(1.5) / (1.5 * input.gravity),
    );

    let total: Vec<f64> = accumulated
        .iter()
        .map(|sum| (1.5 * input.gravity * sum).powf(2.0 / 3.0))
        .collect();
    check_positive("total pressure", &total)?;
    let mut capped = Vec::new();
    let radiation: Vec<f64> = input
        .temperature
        .iter()
        .zip(&total)
        .enumerate()
        .map(|(depth, (temperature, total))| {
            let limit = MAX_RADIATION_FRACTION * total;
            let radiation = radiation_pressure(*temperature);
            if radiation > limit {
                capped.push(depth);
                limit
            } else {
                radiation
            }
        })
        .collect();
    let gas = total
        .iter()
        .zip(&radiation)
        .map(|(total, radiation)| total - radiation)
        .collect();
    Ok(PressureStructure {
        total,
        gas,
        radiation,
        capped,
    })
}

/// Geometric depth z (cm) from dz = dtau / (kappa rho), zero at the top.
pub fn depth_scale(ln_tau: &[f64], ln_kappa: &[f64], density: &[f64]) -> Result<Vec<f64>, HydrostaticError> {
    check_length("ln kappa", ln_tau.len(), ln_kappa)?;
    check_length("density", ln_tau.len(), density)?;
    check_positive("density", density)?;
    let integrand: Vec<f64> = (0..ln_tau.len())
        .map(|depth| (ln_tau[depth] - ln_kappa[depth]).exp() / density[depth])
        .collect();
    Ok(cumulative_trapezoid(ln_tau, &integrand, 0.0))
}

#[cfg(test)]
mod tests {
    use super::{depth_scale, integrate_pressure, radiation_pressure, HydrostaticError, HydrostaticInput};

    fn assert_scalar_close(label: &str, expected: f64, actual: f64, abs_tol: f64, rel_tol: f64) {
        let tolerance = abs_tol.max(rel_tol * expected.abs());
        assert!(
            (expected - actual).abs() <= tolerance,
            "{label}: expected {expected}, got {actual}, tolerance {tolerance}"
        );
    }

    fn ln_tau() -> Vec<f64> {
        (0..200)
            .map(|index| (-6.0 + 8.0 * index as f64 / 199.0) * std::f64::consts::LN_10)
            .collect()
    }

    #[test]
    fn constant_opacity_gives_linear_pressure() {
        let ln_tau = ln_tau();
        let count = ln_tau.len();
        let gravity = 2.74e4;
        let ln_kappa = vec![0.0; count];
        let temperature = vec![1.0; count];
        let mut guess: Vec<f64> = ln_tau.iter().map(|ln| gravity * ln.exp()).collect();
        for _ in 0..4 {
            let pressure = integrate_pressure(HydrostaticInput {
                gravity,
                ln_tau: &ln_tau,
                ln_kappa: &ln_kappa,
                temperature: &temperature,
                total_guess: &guess,
            })
            .expect("pressure");
            guess = pressure.total;
        }
        assert_scalar_close("P(tau = 100)", gravity * 100.0, guess[count - 1], 0.0, 5.0e-3);
        let pressure = integrate_pressure(HydrostaticInput {
            gravity,
            ln_tau: &ln_tau,
            ln_kappa: &ln_kappa,
            temperature: &temperature,
            total_guess: &guess,
        })
        .expect("pressure");
        assert!(pressure.capped.is_empty());
        assert!(guess.windows(2).all(|pair| pair[1] > pair[0]));
    }

    #[test]
    fn radiation_pressure_is_capped_at_half_the_total() {
        let ln_tau = ln_tau();
        let count = ln_tau.len();
        let pressure = integrate_pressure(HydrostaticInput {
            gravity: 10.0,
            ln_tau: &ln_tau,
            ln_kappa: &vec![0.0; count],
            temperature: &vec![50_000.0; count],
            total_guess: &vec![1.0; count],
        })
        .expect("pressure");
        assert_eq!(pressure.capped.len(), count);
        for ((total, gas), radiation) in pressure.total.iter().zip(&pressure.gas).zip(&pressure.radiation) {
            assert!(*gas >= 0.5 * total - 1.0e-12 * total);
            assert_scalar_close("P_gas + P_rad", *total, gas + radiation, 0.0, 1.0e-12);
            assert!(*radiation < radiation_pressure(50_000.0));
        }
        assert!((radiation_pressure(5_780.0) - 2.815).abs() < 0.01);
    }

    #[test]
    fn depth_scale_starts_at_zero_and_grows() {
        let ln_tau = ln_tau();
        let count = ln_tau.len();
        let z = depth_scale(&ln_tau, &vec![0.0; count], &vec![1.0e-7; count]).expect("depth");
        assert_eq!(z[0], 0.0);
        assert!(z.windows(2).all(|pair| pair[1] > pair[0]));
        assert_scalar_close("z(tau = 100)", 100.0e7, z[count - 1], 0.0, 1.0e-3);
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        let ln_tau = ln_tau();
        let error = integrate_pressure(HydrostaticInput {
            gravity: 1.0,
            ln_tau: &ln_tau,
            ln_kappa: &[0.0],
            temperature: &[],
            total_guess: &[],
        })
        .expect_err("mismatch");
        assert!(matches!(error, HydrostaticError::LengthMismatch { name: "ln kappa", .. }));
        let count = ln_tau.len();
        let mut density = vec![1.0; count];
        density[3] = 0.0;
        assert!(matches!(
            depth_scale(&ln_tau, &vec![0.0; count], &density),
            Err(HydrostaticError::NonPositive { depth: 3, .. })
        ));
    }
}

//! Scaled PHOENIX reference models: seeds for P_gas and P_e and the optional
//! reference temperature law.
//!
//! Pressures scale with gravity through an exponent that runs linearly in ln tau
//! from the top to the bottom of the model, with metallicity as Z^(-/+ m) and with
//! helium through the mean particle mass (Gray, 3rd ed., ch. 9).

use super::reference_data::{
    DWARF_10000_ELECTRON_PRESSURE, DWARF_10000_GAS_PRESSURE, DWARF_10000_TEMPERATURE,
    DWARF_5000_ELECTRON_PRESSURE, DWARF_5000_GAS_PRESSURE, DWARF_5000_TEMPERATURE,
    GIANT_4250_ELECTRON_PRESSURE, GIANT_4250_GAS_PRESSURE, GIANT_4250_TEMPERATURE, REFERENCE_TAU,
};
use crate::common::constants::LN10;
use crate::numerics::interpolate_clamped;

/// He/H by number in the reference models (A12 = 10.93).
pub const REFERENCE_HELIUM: f64 = 0.085_113_803_820_237_6;
/// Stars hotter than this are seeded from the 10 000 K model.
pub const HOT_MODEL_TEFF: f64 = 7_300.0;
/// Cooler stars with log g below this are seeded from the giant.
pub const GIANT_MODEL_LOG_G: f64 = 3.25;

/// Teff sensitivity of ln P_e, above and below the tau = 0.1..10 ramp.
const OMEGA_UPPER: f64 = 0.001_2;
const OMEGA_LOWER: f64 = 0.001_5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceModel {
    pub name: &'static str,
    pub teff: f64,
    pub log_g: f64,
    temperature: &'static [f64; 64],
    gas_pressure: &'static [f64; 64],
    electron_pressure: &'static [f64; 64],
    /// ln P_gas gravity exponent at the (top, bottom) of the depth grid.
    gas_gravity_exponent: (f64, f64),
    electron_gravity_exponent: (f64, f64),
    /// ln P_gas shifts by `-m ln Z`, ln P_e by `+m ln Z`.
    metallicity_exponent: f64,
}

pub const GIANT_4250: ReferenceModel = ReferenceModel {
    name: "phoenix-4250-2.0",
    teff: 4_250.0,
    log_g: 2.0,
    temperature: &GIANT_4250_TEMPERATURE,
    gas_pressure: &GIANT_4250_GAS_PRESSURE,
    electron_pressure: &GIANT_4250_ELECTRON_PRESSURE,
    gas_gravity_exponent: (0.54, 0.64),
    electron_gravity_exponent: (0.48, 0.33),
    metallicity_exponent: 1.0 / 3.0,
};

pub const DWARF_5000: ReferenceModel = ReferenceModel {
    name: "phoenix-5000-4.5",
    teff: 5_000.0,
    log_g: 4.5,
    temperature: &DWARF_5000_TEMPERATURE,
    gas_pressure: &DWARF_5000_GAS_PRESSURE,
    electron_pressure: &DWARF_5000_ELECTRON_PRESSURE,
    gas_gravity_exponent: (0.54, 0.64),
    electron_gravity_exponent: (0.48, 0.33),
    metallicity_exponent: 1.0 / 3.0,
};

pub const DWARF_10000: ReferenceModel = ReferenceModel {
    name: "phoenix-10000-4.0",
    teff: 10_000.0,
    log_g: 4.0,
    temperature: &DWARF_10000_TEMPERATURE,
    gas_pressure: &DWARF_10000_GAS_PRESSURE,
    electron_pressure: &DWARF_10000_ELECTRON_PRESSURE,
    gas_gravity_exponent: (0.53, 0.85),
    electron_gravity_exponent: (0.53, 0.82),
    metallicity_exponent: 0.5,
};

/// Stellar parameters the reference pressures are scaled to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceScaling {
    pub teff: f64,
    pub log_g: f64,
    pub log_z: f64,
    /// He/H by number.
    pub helium: f64,
}

pub fn select_model(teff: f64, log_g: f64) -> &'static ReferenceModel {
    if teff >= HOT_MODEL_TEFF {
        &DWARF_10000
    } else if log_g < GIANT_MODEL_LOG_G {
        &GIANT_4250
    } else {
        &DWARF_5000
    }
}

fn reference_ln_tau() -> Vec<f64> {
    REFERENCE_TAU[1..].iter().map(|tau| tau.ln()).collect()
}

/// ln of `values` (surface point dropped) at every `ln_tau`.
fn interpolate_ln(values: &[f64; 64], ln_tau: &[f64]) -> Vec<f64> {
    let grid = reference_ln_tau();
    let ln_values: Vec<f64> = values[1..].iter().map(|value| value.ln()).collect();
    ln_tau
        .iter()
        .map(|query| interpolate_clamped(*query, &grid, &ln_values))
        .collect()
}

/// Exponent running linearly in ln tau across the target grid.
fn ramp((top, bottom): (f64, f64), ln_tau: &[f64], index: usize) -> f64 {
    let (first, last) = (ln_tau[0], ln_tau[ln_tau.len() - 1]);
    if last > first {
        top + (bottom - top) * (ln_tau[index] - first) / (last - first)
    } else {
        top
    }
}

fn omega(ln_tau: f64) -> f64 {
    let (upper, lower) = (0.1_f64.ln(), 10.0_f64.ln());
    if ln_tau < upper {
        OMEGA_UPPER
    } else if ln_tau > lower {
        OMEGA_LOWER
    } else {
        OMEGA_UPPER + (OMEGA_LOWER - OMEGA_UPPER) * (ln_tau - upper) / (lower - upper)
    }
}

fn helium_shift(helium: f64, weight: f64) -> f64 {
    weight * ((1.0 + 4.0 * helium).ln() - (1.0 + 4.0 * REFERENCE_HELIUM).ln())
}

impl ReferenceModel {
    /// T(tau) scaled by Teff / Teff_ref.
    pub fn temperature(&self, teff: f64, ln_tau: &[f64]) -> Vec<f64> {
        interpolate_ln(self.temperature, ln_tau)
            .iter()
            .map(|ln_t| teff * ln_t.exp() / self.teff)
            .collect()
    }

    pub fn gas_pressure(&self, scaling: &ReferenceScaling, ln_tau: &[f64]) -> Vec<f64> {
        let ln_g = scaling.log_g * LN10;
        let ln_g_ref = self.log_g * LN10;
        let mut pressure: Vec<f64> = interpolate_ln(self.gas_pressure, ln_tau)
            .iter()
            .enumerate()
            .map(|(index, ln_p)| {
                let exponent = ramp(self.gas_gravity_exponent, ln_tau, index);
                (ln_p + exponent * (ln_g - ln_g_ref)
                    - self.metallicity_exponent * scaling.log_z * LN10
                    + helium_shift(scaling.helium, 2.0 / 3.0))
                .exp()
            })
            .collect();
        // The surface value must stay below the next one in.
        if pressure.len() > 1 && pressure[0] >= pressure[1] {
            pressure[0] = 0.5 * pressure[1];
        }
        pressure
    }

    pub fn electron_pressure(&self, scaling: &ReferenceScaling, ln_tau: &[f64]) -> Vec<f64> {
        let ln_g = scaling.log_g * LN10;
        let ln_g_ref = self.log_g * LN10;
        let teff_scaled = self.teff < DWARF_10000.teff || scaling.teff < DWARF_10000.teff;
        interpolate_ln(self.electron_pressure, ln_tau)
            .iter()
            .enumerate()
            .map(|(index, ln_p)| {
                let exponent = ramp(self.electron_gravity_exponent, ln_tau, index);
                let teff_term = if teff_scaled {
                    omega(ln_tau[index]) * (scaling.teff - self.teff)
                } else {
                    0.0
                };
                (ln_p + exponent * (ln_g - ln_g_ref)
                    + teff_term
                    + self.metallicity_exponent * scaling.log_z * LN10
                    + helium_shift(scaling.helium, 1.0 / 3.0))
                .exp()
            })
            .collect()
    }
}

//! Planck function per unit wavelength and its temperature derivative.

use super::constants::{BOLTZMANN, C_LIGHT, PLANCK};

const NM_TO_CM: f64 = 1.0e-7;

/// hc / (lambda k T) for `wavelength_nm`.
fn photon_ratio(wavelength_nm: f64, temperature: f64) -> f64 {
    PLANCK * C_LIGHT / (wavelength_nm * NM_TO_CM * BOLTZMANN * temperature)
}

/// B_lambda(T) in erg s^-1 cm^-2 cm^-1 sr^-1.
pub fn planck_lambda(wavelength_nm: f64, temperature: f64) -> f64 {
    let lambda = wavelength_nm * NM_TO_CM;
    let x = photon_ratio(wavelength_nm, temperature);
    if x > 700.0 {
        return 0.0;
    }
    2.0 * PLANCK * C_LIGHT * C_LIGHT / lambda.powi(5) / x.exp_m1()
}

/// dB_lambda/dT, same units as [`planck_lambda`] per K.
pub fn planck_lambda_derivative(wavelength_nm: f64, temperature: f64) -> f64 {
    let x = photon_ratio(wavelength_nm, temperature);
    if x > 700.0 {
        return 0.0;
    }
    let stimulated = -(-x).exp_m1();
    planck_lambda(wavelength_nm, temperature) * x / (stimulated * temperature)
}

/// Stimulated-emission correction 1 - exp(-h nu / k T).
pub fn stimulated_emission(wavelength_nm: f64, temperature: f64) -> f64 {
    -(-photon_ratio(wavelength_nm, temperature)).exp_m1()
}

//! Rayleigh scattering by H I, He I and H2.

use super::absorbers::DepthAbsorbers;
use crate::common::constants::C_LIGHT_NM;

/// c in Angstrom/s.
const C_ANGSTROM: f64 = 2.997_925e18;
/// Frequencies above these caps are evaluated at the cap.
const HYDROGEN_CAP: f64 = 2.463e15;
const HELIUM_CAP: f64 = 5.15e15;

fn squared_wavelength(frequency: f64, cap: f64) -> f64 {
    let lambda = C_ANGSTROM / frequency.min(cap);
    lambda * lambda
}

fn hydrogen_sigma(frequency: f64) -> f64 {
    let ww = squared_wavelength(frequency, HYDROGEN_CAP);
    (5.799e-13 + 1.422e-6 / ww + 2.784 / (ww * ww)) / (ww * ww)
}

fn helium_sigma(frequency: f64) -> f64 {
    let ww = squared_wavelength(frequency, HELIUM_CAP);
    let correction = 1.0 + (2.44e5 + 5.94e10 / (ww - 2.90e5)) / ww;
    5.484e-14 / (ww * ww) * correction * correction
}

fn molecular_hydrogen_sigma(frequency: f64) -> f64 {
    let ww = squared_wavelength(frequency, HYDROGEN_CAP);
    (8.14e-13 + 1.28e-6 / ww + 1.61 / (ww * ww)) / (ww * ww)
}

/// Rayleigh extinction (cm^-1).
pub fn rayleigh_scattering(absorbers: &DepthAbsorbers, wavelength_nm: f64) -> f64 {
    let frequency = C_LIGHT_NM / wavelength_nm;
    hydrogen_sigma(frequency) * 2.0 * absorbers.hydrogen_ground
        + helium_sigma(frequency) * absorbers.helium_ground
        + molecular_hydrogen_sigma(frequency) * absorbers.molecular_hydrogen
}

#[cfg(test)]
mod tests {
    use super::{hydrogen_sigma, molecular_hydrogen_sigma};
    use crate::common::constants::C_LIGHT_NM;

    #[test]
    fn cross_section_follows_lambda_to_the_minus_four_in_the_red() {
        let ratio = hydrogen_sigma(C_LIGHT_NM / 500.0) / hydrogen_sigma(C_LIGHT_NM / 1_000.0);
        assert!(ratio > 16.0 && ratio < 20.0, "ratio {ratio}");
    }

    #[test]
    fn hydrogen_cross_section_has_textbook_magnitude() {
        // ~ 1e-27 cm^2 per atom at 500 nm.
        let sigma = hydrogen_sigma(C_LIGHT_NM / 500.0);
        assert!(sigma > 5.0e-28 && sigma < 5.0e-27, "sigma {sigma}");
        assert!(molecular_hydrogen_sigma(C_LIGHT_NM / 500.0) > sigma);
    }

    #[test]
    fn far_ultraviolet_is_capped() {
        let capped = hydrogen_sigma(5.0e15);
        assert_eq!(capped, hydrogen_sigma(2.463e15));
    }
}

//! Hydrogen and helium continuum: H I bound-free and free-free, H- bound-free and
//! free-free, H2+, He I, He- free-free and electron scattering.
//!
//! Cross sections follow Gray, "The Observation and Analysis of Stellar
//! Photospheres". Every term returns a linear extinction coefficient (cm^-1).

use super::absorbers::DepthAbsorbers;
use crate::common::constants::{BOLTZMANN_EV, HC_EV_NM, LOG10E, THETA_SCALE, THOMSON_CROSS_SECTION};
use crate::numerics::polynomial;

/// Rydberg constant for hydrogen (nm^-1).
const RYDBERG_NM: f64 = 1.096_8e-2;
const HYDROGEN_IONIZATION_EV: f64 = 13.598_433;
const HYDROGEN_LEVELS: u32 = 10;
const HYDROGENIC_PREFACTOR: f64 = 1.044_9e-26;
const HELIUM_EXCITATION_EV: f64 = 10.92;

const H_MINUS_BF: [f64; 7] = [
    1.996_54,
    -1.182_67e-5,
    2.642_43e-6,
    -4.405_24e-10,
    3.239_92e-14,
    -1.395_68e-18,
    2.787_01e-23,
];

const H_MINUS_FF: [[f64; 5]; 3] = [
    [-2.276_3, -1.685_0, 0.766_61, -0.053_346, 0.0],
    [15.282_7, -9.284_6, 1.993_81, -0.142_631, 0.0],
    [-197.789, 190.266, -67.977_5, 10.691_3, -0.625_151],
];

const H2_PLUS_SIGMA: [f64; 4] = [-1_040.54, 1_345.71, -547.628, 71.968_4];
const H2_PLUS_ENERGY: [f64; 4] = [-54.053_2, 32.713, -6.669_9, 0.457_4];

const HE_MINUS_FF: [[f64; 5]; 4] = [
    [9.667_36, -71.762_42, 105.295_76, -56.492_59, 10.692_06],
    [-10.506_14, 48.288_02, -70.433_63, 37.800_99, -7.154_45],
    [2.740_20, -10.621_44, 15.505_18, -8.338_45, 1.579_60],
    [-0.199_23, 0.774_85, -1.132_00, 0.609_94, -0.115_64],
];

/// Linear H/He extinction at one depth and wavelength, broken down by source.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HydrogenHelium {
    pub hydrogen_bound_free: f64,
    pub hydrogen_free_free: f64,
    pub h_minus_bound_free: f64,
    pub h_minus_free_free: f64,
    pub h2_plus: f64,
    pub helium: f64,
    pub he_minus_free_free: f64,
    pub electron_scattering: f64,
}

impl HydrogenHelium {
    pub fn total(&self) -> f64 {
        self.hydrogen_bound_free
            + self.hydrogen_free_free
            + self.h_minus_bound_free
            + self.h_minus_free_free
            + self.h2_plus
            + self.helium
            + self.he_minus_free_free
            + self.electron_scattering
    }
}

pub fn hydrogen_helium(absorbers: &DepthAbsorbers, wavelength_nm: f64) -> HydrogenHelium {
    let temperature = absorbers.temperature;
    let theta = THETA_SCALE / temperature;
    let lambda_a = 10.0 * wavelength_nm;
    let log_lambda_a = lambda_a.log10();
    let photon_ev = HC_EV_NM / wavelength_nm;
    let stimulated = 1.0 - 10.0_f64.powf(-theta * photon_ev);
    let gaunt_scale = 0.345_6 * (RYDBERG_NM * wavelength_nm).powf(-1.0 / 3.0);
    let lambda_cubed = lambda_a.powi(3);

    // Hydrogenic cross sections per neutral H atom.
    let bound_free_sigma = (1..=HYDROGEN_LEVELS)
        .filter(|n| wavelength_nm <= f64::from(n * n) / RYDBERG_NM)
        .map(|n| {
            let n2 = f64::from(n * n);
            let gaunt = 1.0 - gaunt_scale * (wavelength_nm * RYDBERG_NM / n2 - 0.5);
            let excitation = HYDROGEN_IONIZATION_EV - HC_EV_NM * RYDBERG_NM / n2;
            gaunt / (n2 * f64::from(n)) * 10.0_f64.powf(-theta * excitation)
        })
        .sum::<f64>()
        * HYDROGENIC_PREFACTOR
        * lambda_cubed
        * stimulated;
    let free_free_gaunt = 1.0 + gaunt_scale * (LOG10E / (theta * photon_ev) + 0.5);
    let free_free_sigma = HYDROGENIC_PREFACTOR
        * lambda_cubed
        * free_free_gaunt
        * (LOG10E / (2.0 * theta * HYDROGEN_IONIZATION_EV))
        * 10.0_f64.powf(-theta * HYDROGEN_IONIZATION_EV)
        * stimulated;

    let mut terms = HydrogenHelium {
        hydrogen_bound_free: bound_free_sigma * absorbers.hydrogen_neutral,
        hydrogen_free_free: free_free_sigma * absorbers.hydrogen_neutral,
        electron_scattering: THOMSON_CROSS_SECTION * absorbers.electron_density,
        ..HydrogenHelium::default()
    };

    let h_minus_window = temperature > 1_000.0 && temperature < 10_000.0;
    if h_minus_window && wavelength_nm > 225.0 && wavelength_nm < 1_500.0 {
        let alpha = polynomial(&H_MINUS_BF, lambda_a) * 1.0e-18;
        terms.h_minus_bound_free = 4.158e-10
            * alpha
            * absorbers.electron_pressure
            * theta.powf(2.5)
            * 10.0_f64.powf(0.754 * theta)
            * stimulated
            * absorbers.hydrogen_neutral;
    }
    if h_minus_window && wavelength_nm > 260.0 && wavelength_nm < 11_390.0 {
        let log_theta = theta.log10();
        let f: Vec<f64> = H_MINUS_FF
            .iter()
            .map(|row| polynomial(row, log_lambda_a))
            .collect();
        let exponent = f[0] + f[1] * log_theta + f[2] * log_theta * log_theta;
        terms.h_minus_free_free =
            1.0e-26 * absorbers.electron_pressure * 10.0_f64.powf(exponent) * absorbers.hydrogen_neutral;
    }
    if temperature < 4_000.0 && wavelength_nm > 380.0 && wavelength_nm < 2_500.0 {
        let sigma = polynomial(&H2_PLUS_SIGMA, log_lambda_a);
        if sigma > 0.0 {
            let energy = polynomial(&H2_PLUS_ENERGY, log_lambda_a);
            terms.h2_plus = 2.51e-42
                * sigma
                * 10.0_f64.powf(-energy * theta)
                * absorbers.hydrogen_ion
                * stimulated
                * absorbers.hydrogen_neutral;
        }
    }
    if temperature > 10_000.0 && wavelength_nm > 22.8 {
        // Hydrogenic approximation for excited He I.
        let excitation = (-HELIUM_EXCITATION_EV / (BOLTZMANN_EV * temperature)).exp();
        terms.helium =
            4.0 * excitation * (bound_free_sigma + free_free_sigma) * absorbers.helium_neutral;
    }
    if theta > 0.5 && theta < 2.0 && wavelength_nm > 500.0 && wavelength_nm < 15_000.0 {
        let c: Vec<f64> = HE_MINUS_FF.iter().map(|row| polynomial(row, theta)).collect();
        let log_alpha = polynomial(&c, log_lambda_a);
        terms.he_minus_free_free =
            1.0e-26 * 10.0_f64.powf(log_alpha) * absorbers.electron_pressure * absorbers.helium_neutral;
    }

    terms
}

#[cfg(test)]
mod tests {
    use super::hydrogen_helium;
    use crate::opacity::absorbers::DepthAbsorbers;

    fn solar_photosphere() -> DepthAbsorbers {
        DepthAbsorbers {
            temperature: 6_000.0,
            density: 3.0e-7,
            electron_density: 5.0e13,
            electron_pressure: 5.0e13 * 1.380_648_8e-16 * 6_000.0,
            hydrogen_neutral: 1.2e17,
            hydrogen_ion: 1.0e13,
            helium_neutral: 1.0e16,
            molecular_hydrogen: 0.0,
            titanium_oxide: 0.0,
            hydrogen_ground: 6.0e16,
            helium_ground: 1.0e16,
            carbon_i_ground: 1.0e12,
            magnesium_ii_ground: 1.0e12,
            aluminium_i_ground: 1.0e9,
            iron_i_ground: 1.0e10,
        }
    }

    #[test]
    fn h_minus_dominates_the_visible_solar_continuum() {
        let terms = hydrogen_helium(&solar_photosphere(), 500.0);
        let h_minus = terms.h_minus_bound_free + terms.h_minus_free_free;
        assert!(h_minus > 0.5 * terms.total(), "{terms:?}");
        assert!(terms.hydrogen_bound_free < h_minus);
    }

    #[test]
    fn balmer_edge_raises_hydrogen_bound_free() {
        let mut hot = solar_photosphere();
        hot.temperature = 9_000.0;
        let redward = hydrogen_helium(&hot, 370.0).hydrogen_bound_free;
        let blueward = hydrogen_helium(&hot, 360.0).hydrogen_bound_free;
        assert!(blueward > 2.0 * redward, "{blueward} vs {redward}");
    }

    #[test]
    fn thomson_term_is_grey_and_always_present() {
        let absorbers = solar_photosphere();
        let blue = hydrogen_helium(&absorbers, 300.0).electron_scattering;
        let red = hydrogen_helium(&absorbers, 3_000.0).electron_scattering;
        assert_eq!(blue, red);
        assert!((blue - 0.6648e-24 * 5.0e13).abs() < 1.0e-20);
        assert!(hydrogen_helium(&absorbers, 500.0).total() > 0.0);
    }
}

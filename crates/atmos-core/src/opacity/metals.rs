//! Metal bound-free edges: C I, Mg II, Al I and Fe I, after the fits used in
//! ATLAS (Kurucz 1970).

use super::absorbers::DepthAbsorbers;
use crate::common::constants::{BOLTZMANN_EV, C_LIGHT_NM};
use crate::common::planck::stimulated_emission;

const CARBON_RYDBERG: f64 = 109_732.298;
/// Second radiation constant hc/k (cm K).
const C2: f64 = 1.438_8;

const IRON_WEIGHTS: [f64; 48] = [
    25.0, 35.0, 21.0, 15.0, 9.0, 35.0, 33.0, 21.0, 27.0, 49.0, 9.0, 21.0, 27.0, 9.0, 9.0, 25.0,
    33.0, 15.0, 35.0, 3.0, 5.0, 11.0, 15.0, 13.0, 15.0, 9.0, 21.0, 15.0, 21.0, 25.0, 35.0, 9.0,
    5.0, 45.0, 27.0, 21.0, 15.0, 21.0, 15.0, 25.0, 21.0, 35.0, 5.0, 15.0, 45.0, 35.0, 55.0, 25.0,
];

/// Lower-level energies (cm^-1).
const IRON_LEVELS: [f64; 48] = [
    500.0, 7_500.0, 12_500.0, 17_500.0, 19_000.0, 19_500.0, 19_500.0, 21_000.0, 22_000.0,
    23_000.0, 23_000.0, 24_000.0, 24_000.0, 24_500.0, 24_500.0, 26_000.0, 26_500.0, 26_500.0,
    27_000.0, 27_500.0, 28_500.0, 29_000.0, 29_500.0, 29_500.0, 29_500.0, 30_000.0, 31_500.0,
    31_500.0, 33_500.0, 33_500.0, 34_000.0, 34_500.0, 34_500.0, 35_000.0, 35_500.0, 37_000.0,
    37_000.0, 37_000.0, 38_500.0, 40_000.0, 40_000.0, 41_000.0, 41_000.0, 43_000.0, 43_000.0,
    43_000.0, 43_000.0, 44_000.0,
];

/// Edge wavenumbers (cm^-1).
const IRON_EDGES: [f64; 48] = [
    63_500.0, 58_500.0, 53_500.0, 59_500.0, 45_000.0, 44_500.0, 44_500.0, 43_000.0, 58_000.0,
    41_000.0, 54_000.0, 40_000.0, 40_000.0, 57_500.0, 55_500.0, 38_000.0, 57_500.0, 57_500.0,
    37_000.0, 54_500.0, 53_500.0, 55_000.0, 34_500.0, 34_500.0, 34_500.0, 34_000.0, 32_500.0,
    32_500.0, 32_500.0, 32_500.0, 32_000.0, 29_500.0, 29_500.0, 31_000.0, 30_500.0, 29_000.0,
    27_000.0, 54_000.0, 27_500.0, 24_000.0, 47_000.0, 23_000.0, 44_000.0, 42_000.0, 42_000.0,
    21_000.0, 42_000.0, 42_000.0,
];

/// Seaton's threshold fit for photoionization cross sections.
fn seaton(threshold: f64, cross_section: f64, power: f64, shape: f64, frequency: f64) -> f64 {
    let ratio = threshold / frequency;
    let exponent = (2.0 * power + 0.01).floor() as i32;
    cross_section * (shape + ratio * (1.0 - shape)) * ratio.powi(exponent).sqrt()
}

fn lorentz_bump(energy: f64, slope: f64, offset: f64) -> f64 {
    (slope * energy + offset) / (energy * energy + 1.0)
}

fn carbon_i(frequency: f64, wavenumber: f64, kt_ev: f64, ground: f64) -> f64 {
    if frequency < 2.076_1e15 {
        return 0.0;
    }
    let rydberg_fit = |edge: f64| 10.0_f64.powf(-16.8 - (wavenumber - edge) / 3.0 / CARBON_RYDBERG);
    let x1100 = if frequency >= 2.725_4e15 {
        10.0_f64.powf(-16.80 - (wavenumber - 90_777.0) / 3.0 / CARBON_RYDBERG)
            * seaton(2.725_4e15, 1.219e-17, 2.0, 3.317, frequency)
    } else {
        0.0
    };
    let x1240 = if frequency >= 2.419_6e15 {
        rydberg_fit(80_627.76)
            + lorentz_bump((wavenumber - 93_917.0) * 2.0 / 9_230.0, 22.0e-18, 26.0e-18)
            + lorentz_bump((wavenumber - 111_130.0) * 2.0 / 2_743.0, -10.5e-18, 46.0e-18)
    } else {
        0.0
    };
    let x1444 = rydberg_fit(69_172.4)
        + lorentz_bump((wavenumber - 97_700.0) * 2.0 / 2_743.0, 68.0e-18, 118.0e-18);

    (9.0 * x1100
        + 5.0 * (-1.264 / kt_ev).exp() * x1240
        + (-2.683 / kt_ev).exp() * x1444)
        * ground
}

fn magnesium_ii(frequency: f64, kt_ev: f64, ground: f64) -> f64 {
    if frequency < 2.564_306e15 {
        return 0.0;
    }
    let x824 = if frequency >= 3.635_492e15 {
        seaton(3.635_492e15, 1.40e-19, 4.0, 6.7, frequency)
    } else {
        0.0
    };
    let x1169 = 5.11e-19 * (2.564_306e15 / frequency).powi(3);
    (2.0 * x824 + 6.0 * (-4.43 / kt_ev).exp() * x1169) * ground
}

fn aluminium_i(frequency: f64, ground: f64) -> f64 {
    if frequency < 1.443e15 {
        return 0.0;
    }
    6.0 * 6.5e-17 * (1.443e15 / frequency).powi(5) * ground
}

fn iron_i(wavenumber: f64, temperature: f64, ground: f64) -> f64 {
    if wavenumber < 21_000.0 {
        return 0.0;
    }
    IRON_EDGES
        .iter()
        .zip(IRON_WEIGHTS.iter().zip(&IRON_LEVELS))
        .filter(|(edge, _)| **edge < wavenumber)
        .map(|(edge, (weight, level))| {
            let detuning = (edge + 3_000.0 - wavenumber) / edge / 0.1;
            let cross_section = 3.0e-18 / (1.0 + detuning.powi(4));
            cross_section * weight * (-level * C2 / temperature).exp()
        })
        .sum::<f64>()
        * ground
}

/// Total metal bound-free extinction (cm^-1), stimulated emission included.
pub fn metal_bound_free(absorbers: &DepthAbsorbers, wavelength_nm: f64) -> f64 {
    let temperature = absorbers.temperature;
    let frequency = C_LIGHT_NM / wavelength_nm;
    let wavenumber = 1.0e7 / wavelength_nm;
    let kt_ev = BOLTZMANN_EV * temperature;

    let sum = carbon_i(frequency, wavenumber, kt_ev, absorbers.carbon_i_ground)
        + magnesium_ii(frequency, kt_ev, absorbers.magnesium_ii_ground)
        + aluminium_i(frequency, absorbers.aluminium_i_ground)
        + iron_i(wavenumber, temperature, absorbers.iron_i_ground);
    sum * stimulated_emission(wavelength_nm, temperature)
}

#[cfg(test)]
mod tests {
    use super::{aluminium_i, iron_i, metal_bound_free, seaton};
    use crate::opacity::absorbers::DepthAbsorbers;

    #[test]
    fn seaton_fit_equals_cross_section_at_threshold() {
        let value = seaton(3.0e15, 2.0e-18, 2.0, 3.0, 3.0e15);
        assert!((value - 2.0e-18).abs() < 1.0e-30);
    }

    #[test]
    fn edges_switch_on_at_threshold() {
        assert_eq!(aluminium_i(1.4e15, 1.0), 0.0);
        assert!(aluminium_i(1.5e15, 1.0) > 0.0);
        assert_eq!(iron_i(20_000.0, 5_000.0, 1.0), 0.0);
        let below = iron_i(40_000.0, 5_000.0, 1.0);
        let above = iron_i(50_000.0, 5_000.0, 1.0);
        assert!(below > 0.0 && above > below);
    }

    #[test]
    fn red_continuum_has_no_metal_edges() {
        let absorbers = DepthAbsorbers {
            temperature: 5_000.0,
            density: 1.0e-7,
            electron_density: 1.0e13,
            electron_pressure: 7.0,
            hydrogen_neutral: 1.0e17,
            hydrogen_ion: 1.0e12,
            helium_neutral: 1.0e16,
            molecular_hydrogen: 0.0,
            titanium_oxide: 0.0,
            hydrogen_ground: 5.0e16,
            helium_ground: 1.0e16,
            carbon_i_ground: 1.0e12,
            magnesium_ii_ground: 1.0e12,
            aluminium_i_ground: 1.0e9,
            iron_i_ground: 1.0e10,
        };
        assert_eq!(metal_bound_free(&absorbers, 800.0), 0.0);
        assert!(metal_bound_free(&absorbers, 150.0) > 0.0);
    }
}

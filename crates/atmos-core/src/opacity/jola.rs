//! TiO electronic band opacity in the Just-Overlapping-Line Approximation
//! (Zeidler-Stadler & Koester 1982).
//!
//! Each band is treated as a single vibrational transition whose rotational lines
//! merge into a continuous df/dw. The P, R and Q branch shapes come from the
//! upper/lower rotational constants; the shape is normalised numerically over the
//! band window so that it integrates to the band oscillator strength.

use super::{ln_per_mass, DepthAbsorbers, OpacityFeature};
use crate::common::constants::{C_LIGHT, PI_E2_OVER_MC};
use crate::common::planck::stimulated_emission;
use crate::domain::config::{JolaConfig, OscillatorStrengthSource};
use crate::numerics::trapezoid;

/// Wavelength points per band window.
pub const JOLA_POINTS: usize = 50;
/// hc/k (cm K).
const C2: f64 = 1.438_8;
const HARTREE_CM: f64 = 219_474.6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JolaSystem {
    pub name: &'static str,
    /// Band origin (cm^-1).
    pub origin: f64,
    /// Rotational constant of the upper state (cm^-1).
    pub upper_b: f64,
    pub lower_b: f64,
    pub lambda_start_nm: f64,
    pub lambda_end_nm: f64,
    /// Change in electronic orbital angular momentum; 0 means no Q branch.
    pub delta_lambda: u8,
    pub jorgensen_f: f64,
    /// |Re|^2 in atomic units.
    pub transition_moment: f64,
}

/// The seven optical/near-IR TiO systems. Constants for gamma', delta, epsilon and phi
/// are literature approximations.
pub const TIO_SYSTEMS: [JolaSystem; 7] = [
    system("TiO alpha", 19_341.7, 0.489_888, 0.535_431, 405.0, 630.0, 0, 0.17, 0.84),
    system("TiO beta", 17_840.6, 0.5, 0.537_602, 490.0, 580.0, 1, 0.28, 4.63),
    system("TiO gamma", 14_095.9, 0.507_39, 0.535_431, 570.0, 865.0, 1, 0.15, 5.24),
    system("TiO gamma'", 16_148.5, 0.515_8, 0.535_431, 530.0, 790.0, 1, 0.14, 2.0),
    system("TiO delta", 11_267.8, 0.512_7, 0.537_602, 800.0, 1_000.0, 1, 0.048, 1.5),
    system("TiO epsilon", 11_893.1, 0.476_6, 0.535_431, 780.0, 900.0, 1, 0.005_2, 0.12),
    system("TiO phi", 9_054.0, 0.512_7, 0.549_0, 1_000.0, 1_250.0, 1, 0.052, 1.2),
];

#[allow(clippy::too_many_arguments)]
const fn system(
    name: &'static str,
    origin: f64,
    upper_b: f64,
    lower_b: f64,
    lambda_start_nm: f64,
    lambda_end_nm: f64,
    delta_lambda: u8,
    jorgensen_f: f64,
    transition_moment: f64,
) -> JolaSystem {
    JolaSystem {
        name,
        origin,
        upper_b,
        lower_b,
        lambda_start_nm,
        lambda_end_nm,
        delta_lambda,
        jorgensen_f,
        transition_moment,
    }
}

impl JolaSystem {
    pub fn oscillator_strength(&self, source: OscillatorStrengthSource) -> f64 {
        match source {
            OscillatorStrengthSource::Jorgensen => self.jorgensen_f,
            OscillatorStrengthSource::Allen => {
                2.0 / 3.0 * (self.origin / HARTREE_CM) * self.transition_moment
            }
        }
    }

    /// (P, R, Q) branch weights.
    pub fn branch_weights(&self) -> (f64, f64, f64) {
        if self.delta_lambda == 0 {
            (0.5, 0.5, 0.0)
        } else {
            (0.25, 0.25, 0.5)
        }
    }

    /// `JOLA_POINTS` wavelengths spanning the band, both ends included.
    pub fn window(&self) -> Vec<f64> {
        let step = (self.lambda_end_nm - self.lambda_start_nm) / (JOLA_POINTS - 1) as f64;
        (0..JOLA_POINTS)
            .map(|index| self.lambda_start_nm + step * index as f64)
            .collect()
    }

    /// Unnormalised df/dw at wavenumber `w` for thermal parameter `x = hcB''/kT`.
    fn shape(&self, wavenumber: f64, x: f64) -> f64 {
        let (p_weight, r_weight, q_weight) = self.branch_weights();
        let b_sum = self.upper_b + self.lower_b;
        let b_diff = self.upper_b - self.lower_b;
        let head_m = -b_sum / (2.0 * b_diff);
        let head_w = self.origin - b_diff * head_m * head_m;

        let mut value = 0.0;
        let discriminant = (wavenumber - head_w) / b_diff;
        if discriminant > 0.0 {
            let root = discriminant.sqrt();
            for m in [head_m + root, head_m - root] {
                let weight = if m < 0.0 { p_weight } else { r_weight };
                value += weight * (-x * (m * m - m)).exp() / (b_sum + 2.0 * m * b_diff).abs();
            }
        }
        let q_argument = (wavenumber - self.origin) / b_diff;
        if q_weight > 0.0 && q_argument > 0.0 {
            let m = -0.5 + (0.25 + q_argument).sqrt();
            value += q_weight * (-x * (m * m - m)).exp() / b_diff.abs();
        }
        x * value
    }

    /// Cross section per molecule (cm^2) across the window at `temperature`.
    pub fn cross_sections(&self, window: &[f64], temperature: f64, strength: f64) -> Vec<f64> {
        let x = C2 * self.lower_b / temperature;
        // Ascending wavenumber for the normalisation integral.
        let wavenumbers: Vec<f64> = window.iter().rev().map(|lambda| 1.0e7 / lambda).collect();
        let shape: Vec<f64> = wavenumbers.iter().map(|w| self.shape(*w, x)).collect();
        let area = trapezoid(&wavenumbers, &shape);
        if !(area > 0.0 && area.is_finite()) {
            return vec![0.0; window.len()];
        }
        shape
            .iter()
            .rev()
            .map(|value| PI_E2_OVER_MC * strength * value / area / C_LIGHT)
            .collect()
    }
}

/// True when band opacity applies to a star of `teff`.
pub fn bands_active(config: &JolaConfig, teff: f64) -> bool {
    config.enabled && teff <= config.teff_threshold
}

/// One opacity feature per TiO system; empty when bands are switched off.
pub fn tio_features(config: &JolaConfig, teff: f64, absorbers: &[DepthAbsorbers]) -> Vec<OpacityFeature> {
    if !bands_active(config, teff) {
        return Vec::new();
    }
    TIO_SYSTEMS
        .iter()
        .map(|system| band_feature(system, config, absorbers))
        .collect()
}

pub fn band_feature(system: &JolaSystem, config: &JolaConfig, absorbers: &[DepthAbsorbers]) -> OpacityFeature {
    let window = system.window();
    let strength = system.oscillator_strength(config.f_source) * config.quantum_s;
    let by_depth: Vec<Vec<f64>> = absorbers
        .iter()
        .map(|depth| {
            system
                .cross_sections(&window, depth.temperature, strength)
                .iter()
                .zip(&window)
                .map(|(sigma, lambda)| {
                    let linear = sigma
                        * depth.titanium_oxide
                        * stimulated_emission(*lambda, depth.temperature);
                    ln_per_mass(linear, depth.density)
                })
                .collect()
        })
        .collect();
    let ln_kappa = (0..window.len())
        .map(|point| by_depth.iter().map(|row| row[point]).collect())
        .collect();
    OpacityFeature {
        id: system.name.to_string(),
        wavelengths_nm: window,
        ln_kappa,
    }
}

#[cfg(test)]
mod tests {
    use super::{bands_active, band_feature, tio_features, JOLA_POINTS, TIO_SYSTEMS};
    use crate::common::constants::{C_LIGHT, PI_E2_OVER_MC};
    use crate::domain::config::{JolaConfig, OscillatorStrengthSource};
    use crate::numerics::trapezoid;
    use crate::opacity::test_support::photosphere;
    use crate::opacity::{continuum_ln_kappa, LN_KAPPA_FLOOR};

    #[test]
    fn branch_weights_follow_delta_lambda() {
        assert_eq!(TIO_SYSTEMS[0].branch_weights(), (0.5, 0.5, 0.0));
        assert_eq!(TIO_SYSTEMS[2].branch_weights(), (0.25, 0.25, 0.5));
        assert_eq!(TIO_SYSTEMS[0].window().len(), JOLA_POINTS);
    }

    #[test]
    fn band_window_covers_both_band_limits() {
        for system in &TIO_SYSTEMS {
            let window = system.window();
            assert_eq!(window[0], system.lambda_start_nm);
            let last = window[JOLA_POINTS - 1];
            assert!(
                (last - system.lambda_end_nm).abs() < 1.0e-9,
                "{} ends at {last}",
                system.name
            );
            assert!(window.windows(2).all(|pair| pair[1] > pair[0]));
        }
    }

    #[test]
    fn cross_section_integrates_to_the_oscillator_strength() {
        let system = &TIO_SYSTEMS[2];
        let window = system.window();
        let sigma = system.cross_sections(&window, 3_500.0, 0.15);
        let wavenumbers: Vec<f64> = window.iter().rev().map(|lambda| 1.0e7 / lambda).collect();
        let values: Vec<f64> = sigma.iter().rev().copied().collect();
        let f = trapezoid(&wavenumbers, &values) * C_LIGHT / PI_E2_OVER_MC;
        assert!((f - 0.15).abs() < 1.0e-9, "f = {f}");
    }

    #[test]
    fn allen_strength_uses_the_transition_moment() {
        let alpha = &TIO_SYSTEMS[0];
        let allen = alpha.oscillator_strength(OscillatorStrengthSource::Allen);
        assert!((allen - 2.0 / 3.0 * 19_341.7 / 219_474.6 * 0.84).abs() < 1.0e-12);
        assert_eq!(alpha.oscillator_strength(OscillatorStrengthSource::Jorgensen), 0.17);
    }

    #[test]
    fn bands_switch_off_above_threshold_or_when_disabled() {
        let config = JolaConfig::default();
        assert!(bands_active(&config, 3_600.0));
        assert!(!bands_active(&config, 5_780.0));
        let disabled = JolaConfig { enabled: false, ..config };
        let depths = vec![photosphere(3_600.0, 1.0e16)];
        assert!(tio_features(&disabled, 3_600.0, &depths).is_empty());
        assert_eq!(tio_features(&config, 3_600.0, &depths).len(), TIO_SYSTEMS.len());
    }

    #[test]
    fn cool_star_bands_exceed_the_continuum() {
        let depth = photosphere(3_600.0, 1.0e16);
        let feature = band_feature(&TIO_SYSTEMS[2], &JolaConfig::default(), &[depth]);
        let peak = feature.ln_kappa.iter().map(|row| row[0]).fold(LN_KAPPA_FLOOR, f64::max);
        let continuum = continuum_ln_kappa(&depth, 700.0, 0.0);
        assert!(peak > continuum, "band {peak} vs continuum {continuum}");
    }
}

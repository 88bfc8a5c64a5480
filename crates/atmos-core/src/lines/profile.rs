//! Per-depth line absorption profiles: Voigt cores with van der Waals style
//! collisional damping, plus linear Stark wings for the Balmer series.

use super::grid::LineGrid;
use super::hjerting::voigt;
use crate::common::constants::{C_LIGHT, PI};

/// Gas pressure (dyn/cm^2) and temperature at which the damping scale is quoted.
const DAMPING_REFERENCE_PRESSURE: f64 = 1.22e5;
const DAMPING_REFERENCE_TEMPERATURE: f64 = 6_400.0;
const DAMPING_SCALE: f64 = 1.0e9;
const DAMPING_TEMPERATURE_EXPONENT: f64 = 0.7;

/// Stark wings are only added beyond this many Doppler widths.
const STARK_CORE_LIMIT: f64 = 2.0;
/// Holtsmark normal field strength per N_e^(2/3) (esu).
const HOLTSMARK_SCALE: f64 = 1.249e-9;
const STARK_UNIT: f64 = 3.162_3e7;

/// (nearest Balmer center in nm, Griem K) pairs.
const BALMER_STARK: [(f64, f64); 5] = [
    (656.28, 2.56e-3),
    (486.13, 7.06e-3),
    (434.05, 1.19e-2),
    (410.17, 1.94e-2),
    (397.01, 2.95e-2),
];

/// Thermodynamic state a profile depends on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileDepth {
    pub temperature: f64,
    pub gas_pressure: f64,
    pub electron_density: f64,
}

/// Total damping rate (s^-1): collisions scaled by 10^logGammaCol plus radiation.
pub fn damping_rate(depth: &ProfileDepth, log_gamma_col: f64, natural_rate: f64) -> f64 {
    let collisional = DAMPING_SCALE
        * (depth.gas_pressure / DAMPING_REFERENCE_PRESSURE)
        * (DAMPING_REFERENCE_TEMPERATURE / depth.temperature).powf(DAMPING_TEMPERATURE_EXPONENT)
        * 10f64.powf(log_gamma_col);
    collisional + natural_rate
}

/// Voigt damping parameter `a` for a rate in s^-1 and a Doppler width in nm.
pub fn damping_parameter(center_nm: f64, doppler_width_nm: f64, gamma: f64) -> f64 {
    let center_cm = center_nm * 1.0e-7;
    let doppler_cm = doppler_width_nm * 1.0e-7;
    center_cm * center_cm * gamma / (4.0 * PI * C_LIGHT * doppler_cm)
}

fn griem_constant(center_nm: f64) -> f64 {
    BALMER_STARK
        .iter()
        .min_by(|left, right| {
            (left.0 - center_nm)
                .abs()
                .total_cmp(&(right.0 - center_nm).abs())
        })
        .map_or(BALMER_STARK[0].1, |pair| pair.1)
        * STARK_UNIT
}

/// Linear Stark wing (per Å) at `offset_angstrom` from a Balmer line center.
pub fn stark_wing(center_nm: f64, offset_angstrom: f64, electron_density: f64) -> f64 {
    if electron_density <= 0.0 || offset_angstrom == 0.0 {
        return 0.0;
    }
    let field = HOLTSMARK_SCALE * electron_density.powf(2.0 / 3.0);
    let center_alpha = center_nm * 10.0 / field;
    let delta_alpha = offset_angstrom.abs() / field;
    griem_constant(center_nm)
        * ((center_alpha + delta_alpha) / center_alpha).sqrt()
        * delta_alpha.powf(-2.5)
        / field
}

/// Profile phi (per Hz) at every grid point for one depth. Integrates to ~1 over frequency.
pub fn absorption_profile(
    grid: &LineGrid,
    depth: &ProfileDepth,
    log_gamma_col: f64,
    natural_rate: f64,
    hydrogen: bool,
) -> Vec<f64> {
    let gamma = damping_rate(depth, log_gamma_col, natural_rate);
    let a = damping_parameter(grid.center_nm, grid.doppler_width_nm, gamma);
    let center_cm = grid.center_nm * 1.0e-7;
    let doppler_cm = grid.doppler_width_nm * 1.0e-7;
    let to_frequency = center_cm * center_cm / C_LIGHT;
    grid.v
        .iter()
        .map(|v| {
            let mut per_length = voigt(a, *v) / (PI.sqrt() * doppler_cm);
            if hydrogen && v.abs() > STARK_CORE_LIMIT {
                let offset_angstrom = v * grid.doppler_width_nm * 10.0;
                // Å^-1 to cm^-1
                per_length += stark_wing(grid.center_nm, offset_angstrom, depth.electron_density) * 1.0e8;
            }
            per_length * to_frequency
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{absorption_profile, damping_parameter, damping_rate, griem_constant, stark_wing, ProfileDepth};
    use crate::common::constants::C_LIGHT;
    use crate::lines::grid::LineGrid;
    use crate::numerics::trapezoid;

    fn photosphere() -> ProfileDepth {
        ProfileDepth {
            temperature: 6_400.0,
            gas_pressure: 1.22e5,
            electron_density: 1.0e14,
        }
    }

    fn sodium_grid() -> LineGrid {
        let half: Vec<f64> = (0..40).map(|index| index as f64 * 0.25).collect();
        let v: Vec<f64> = half
            .iter()
            .rev()
            .map(|v| -v)
            .chain(half.iter().skip(1).copied())
            .collect();
        LineGrid {
            center_nm: 589.0,
            doppler_width_nm: 2.5e-3,
            v,
        }
    }

    #[test]
    fn damping_scales_at_reference_conditions() {
        let gamma = damping_rate(&photosphere(), 0.0, 0.0);
        assert!((gamma - 1.0e9).abs() < 1.0);
        let doubled = damping_rate(
            &ProfileDepth {
                gas_pressure: 2.44e5,
                ..photosphere()
            },
            0.0,
            5.0,
        );
        assert!((doubled - 2.0e9 - 5.0).abs() < 1.0);
        let a = damping_parameter(589.0, 2.5e-3, 1.0e9);
        assert!(a > 1.0e-3 && a < 0.1, "a = {a}");
    }

    #[test]
    fn profile_is_normalised_in_frequency() {
        let grid = sodium_grid();
        let phi = absorption_profile(&grid, &photosphere(), 0.0, 0.0, false);
        let center_cm = grid.center_nm * 1.0e-7;
        let frequencies: Vec<f64> = grid
            .v
            .iter()
            .map(|v| C_LIGHT * v * grid.doppler_width_nm * 1.0e-7 / (center_cm * center_cm))
            .collect();
        let area = trapezoid(&frequencies, &phi);
        assert!((area - 1.0).abs() < 0.05, "area {area}");
        assert_eq!(phi[0], phi[phi.len() - 1]);
    }

    #[test]
    fn balmer_wings_carry_stark_broadening() {
        let depth = ProfileDepth {
            electron_density: 1.0e15,
            ..photosphere()
        };
        let mut grid = sodium_grid();
        grid.center_nm = 656.28;
        grid.doppler_width_nm = 0.03;
        let plain = absorption_profile(&grid, &depth, 0.0, 0.0, false);
        let stark = absorption_profile(&grid, &depth, 0.0, 0.0, true);
        let wing = grid.v.len() - 1;
        assert!(stark[wing] > plain[wing]);
        assert_eq!(stark[grid.v.len() / 2], plain[grid.v.len() / 2]);
        assert_eq!(stark_wing(656.28, 1.0, 0.0), 0.0);
    }

    #[test]
    fn griem_constant_uses_the_nearest_balmer_line() {
        assert_eq!(griem_constant(434.05), 1.19e-2 * 3.162_3e7);
        assert_eq!(griem_constant(700.0), 2.56e-3 * 3.162_3e7);
        assert_eq!(griem_constant(380.0), 2.95e-2 * 3.162_3e7);
    }
}

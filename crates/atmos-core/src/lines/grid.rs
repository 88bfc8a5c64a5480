//! Symmetric wavelength sampling around a line center, in Doppler-width units.

use super::catalogue::ResolvedLine;
use crate::common::constants::{AMU, BOLTZMANN, C_LIGHT};

pub const CORE_POINTS: usize = 5;
pub const WING_POINTS: usize = 10;
/// Points in the full, mirrored grid.
pub const LINE_POINTS: usize = 2 * (CORE_POINTS + WING_POINTS) - 1;

const CORE_HALF_WIDTH: f64 = 3.5;
const WING_LOG_SPAN: f64 = 9.0;
/// Hot-star Balmer wings reach further out.
const HOT_HYDROGEN_LOG_SPAN: f64 = 12.0;
const HOT_HYDROGEN_TEFF: f64 = 7_000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct LineGrid {
    pub center_nm: f64,
    pub doppler_width_nm: f64,
    /// Offsets in Doppler widths, ascending and symmetric about 0.
    pub v: Vec<f64>,
}

/// Doppler width (nm) from thermal motion at `temperature` plus microturbulence.
pub fn doppler_width_nm(center_nm: f64, mass_amu: f64, temperature: f64, xi_km_s: f64) -> f64 {
    let xi = xi_km_s * 1.0e5;
    let speed = (2.0 * BOLTZMANN * temperature / (mass_amu * AMU) + xi * xi).sqrt();
    center_nm * speed / C_LIGHT
}

impl LineGrid {
    /// Grid for `line` with the Doppler width evaluated at `teff`.
    pub fn new(line: &ResolvedLine, teff: f64) -> Self {
        let center_nm = line.line.wavelength_nm;
        let doppler = doppler_width_nm(center_nm, line.mass, teff, line.line.microturbulence_km_s);
        let span = if line.line.is_hydrogen() && teff >= HOT_HYDROGEN_TEFF {
            HOT_HYDROGEN_LOG_SPAN
        } else {
            WING_LOG_SPAN
        };
        Self {
            center_nm,
            doppler_width_nm: doppler,
            v: mirrored(&half_grid(span)),
        }
    }

    pub fn offsets_nm(&self) -> Vec<f64> {
        self.v.iter().map(|v| v * self.doppler_width_nm).collect()
    }

    pub fn wavelengths_nm(&self) -> Vec<f64> {
        self.v
            .iter()
            .map(|v| self.center_nm + v * self.doppler_width_nm)
            .collect()
    }
}

/// Line center outward: linear core then logarithmic wing.
fn half_grid(log_span: f64) -> Vec<f64> {
    let half = CORE_POINTS + WING_POINTS;
    let wing_start = (CORE_HALF_WIDTH + 1.5_f64).ln();
    let wing_step = log_span / (half - 1) as f64;
    (0..half)
        .map(|index| {
            if index < CORE_POINTS {
                index as f64 * CORE_HALF_WIDTH / (CORE_POINTS - 1) as f64
            } else {
                (wing_start + (index - CORE_POINTS) as f64 * wing_step).exp()
            }
        })
        .collect()
}

fn mirrored(half: &[f64]) -> Vec<f64> {
    half.iter()
        .rev()
        .map(|v| -v)
        .chain(half.iter().skip(1).copied())
        .collect()
}

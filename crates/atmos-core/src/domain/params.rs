use serde::{Deserialize, Serialize};

use super::errors::{AtmosError, AtmosResult};
use crate::common::constants::{GRAVITATION, SOLAR_MASS};
use crate::registry::AbundanceOffsets;

pub const TEFF_RANGE: (f64, f64) = (500.0, 50_000.0);
pub const LOG_G_MAX: f64 = 7.0;
pub const LOG_Z_RANGE: (f64, f64) = (-3.0, 1.0);
pub const MASS_RANGE: (f64, f64) = (0.1, 20.0);

/// Raw stellar parameters as supplied by a caller; see [`StellarInput::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StellarInput {
    pub teff: f64,
    pub log_g: f64,
    pub log_z: f64,
    /// Solar masses.
    pub mass: f64,
    pub log_he_fe: f64,
    pub log_c_o: f64,
    pub log_alpha_fe: f64,
}

impl Default for StellarInput {
    fn default() -> Self {
        Self {
            teff: 5_780.0,
            log_g: 4.44,
            log_z: 0.0,
            mass: 1.0,
            log_he_fe: 0.0,
            log_c_o: 0.0,
            log_alpha_fe: 0.0,
        }
    }
}

/// Stellar parameters after validation and clamping; threaded through every kernel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StellarParameters {
    pub teff: f64,
    pub log_g: f64,
    pub log_z: f64,
    pub mass: f64,
    pub log_he_fe: f64,
    pub log_c_o: f64,
    pub log_alpha_fe: f64,
}

impl StellarParameters {
    /// Surface gravity (cm/s^2).
    pub fn gravity(&self) -> f64 {
        10.0_f64.powf(self.log_g)
    }

    /// Radius (cm) implied by mass and surface gravity.
    pub fn radius(&self) -> f64 {
        (GRAVITATION * self.mass * SOLAR_MASS / self.gravity()).sqrt()
    }

    pub fn abundance_offsets(&self) -> AbundanceOffsets {
        AbundanceOffsets {
            log_z: self.log_z,
            log_he_fe: self.log_he_fe,
            log_c_o: self.log_c_o,
            log_alpha_fe: self.log_alpha_fe,
        }
    }
}

/// An input that was moved into its allowed range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClampedParameter {
    pub name: String,
    pub requested: f64,
    pub applied: f64,
}

/// Clamp `value` into `[lower, upper]`, recording and logging any change.
pub fn clamp_recorded(
    name: &str,
    value: f64,
    lower: f64,
    upper: f64,
    clamps: &mut Vec<ClampedParameter>,
) -> f64 {
    let applied = value.clamp(lower, upper);
    if applied != value {
        tracing::warn!(parameter = name, requested = value, applied, "input clamped");
        clamps.push(ClampedParameter {
            name: name.to_string(),
            requested: value,
            applied,
        });
    }
    applied
}

/// Lower bound on log g for a given effective temperature.
pub fn min_log_g(teff: f64) -> f64 {
    if teff <= 4_000.0 {
        0.0
    } else if teff <= 5_000.0 {
        1.0
    } else if teff <= 6_000.0 {
        1.5
    } else if teff <= 7_000.0 {
        2.0
    } else if teff < 9_000.0 {
        2.5
    } else {
        3.0
    }
}

impl StellarInput {
    /// Reject non-finite values, clamp the rest into range.
    pub fn validate(&self) -> AtmosResult<(StellarParameters, Vec<ClampedParameter>)> {
        let fields = [
            ("teff", self.teff),
            ("logG", self.log_g),
            ("logZ", self.log_z),
            ("mass", self.mass),
            ("logHeFe", self.log_he_fe),
            ("logCO", self.log_c_o),
            ("logAlphaFe", self.log_alpha_fe),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(AtmosError::input_validation(
                    "INPUT.STELLAR",
                    format!("{name} must be finite, got {value}"),
                ));
            }
        }

        let mut clamps = Vec::new();
        let teff = clamp_recorded("teff", self.teff, TEFF_RANGE.0, TEFF_RANGE.1, &mut clamps);
        let log_g = clamp_recorded("logG", self.log_g, min_log_g(teff), LOG_G_MAX, &mut clamps);
        let log_z = clamp_recorded("logZ", self.log_z, LOG_Z_RANGE.0, LOG_Z_RANGE.1, &mut clamps);
        let mass = clamp_recorded("mass", self.mass, MASS_RANGE.0, MASS_RANGE.1, &mut clamps);

        Ok((
            StellarParameters {
                teff,
                log_g,
                log_z,
                mass,
                log_he_fe: self.log_he_fe,
                log_c_o: self.log_c_o,
                log_alpha_fe: self.log_alpha_fe,
            },
            clamps,
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StellarPreset {
    pub name: &'static str,
    pub teff: f64,
    pub log_g: f64,
    pub log_z: f64,
    pub mass: f64,
}

impl StellarPreset {
    pub fn to_input(&self) -> StellarInput {
        StellarInput {
            teff: self.teff,
            log_g: self.log_g,
            log_z: self.log_z,
            mass: self.mass,
            ..StellarInput::default()
        }
    }
}

pub const PRESETS: [StellarPreset; 7] = [
    StellarPreset { name: "sun", teff: 5_780.0, log_g: 4.4, log_z: 0.0, mass: 1.0 },
    StellarPreset { name: "arcturus", teff: 4_250.0, log_g: 2.0, log_z: -0.5, mass: 1.1 },
    StellarPreset { name: "vega", teff: 9_550.0, log_g: 3.95, log_z: -0.5, mass: 2.1 },
    StellarPreset { name: "regulus", teff: 12_460.0, log_g: 3.5, log_z: 0.0, mass: 3.8 },
    StellarPreset { name: "procyon", teff: 6_530.0, log_g: 4.0, log_z: 0.0, mass: 1.4 },
    StellarPreset { name: "61-cyg-a", teff: 4_525.0, log_g: 4.2, log_z: 0.0, mass: 0.6 },
    StellarPreset { name: "51-peg", teff: 5_570.0, log_g: 4.3, log_z: 0.0, mass: 1.1 },
];

/// Case-insensitive preset lookup.
pub fn find_preset(name: &str) -> AtmosResult<StellarPreset> {
    PRESETS
        .iter()
        .find(|preset| preset.name.eq_ignore_ascii_case(name))
        .copied()
        .ok_or_else(|| {
            AtmosError::lookup("INPUT.PRESET", format!("unknown stellar preset '{name}'"))
        })
}

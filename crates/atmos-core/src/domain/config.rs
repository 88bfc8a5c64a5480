//! Engine configuration: serde (camelCase JSON) with defaults for every field.

use serde::{Deserialize, Serialize};

use super::ExecutionMode;
use super::errors::{AtmosError, AtmosResult};
use super::params::{clamp_recorded, ClampedParameter, StellarInput, StellarParameters};
use crate::lines::catalogue::LineSelection;

pub const ITERATION_RANGE: (usize, usize) = (5, 12);
pub const LOG_KAP_FUDGE_RANGE: (f64, f64) = (-2.0, 2.0);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub stellar: StellarInput,
    pub depth: DepthGridConfig,
    pub continuum: ContinuumGridConfig,
    pub iteration: IterationConfig,
    pub opacity: OpacityConfig,
    pub temperature_law: TemperatureLaw,
    pub transfer: TransferConfig,
    pub lines: Vec<LineSelection>,
    pub execution_mode: ExecutionMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DepthGridConfig {
    pub count: usize,
    pub log10_min: f64,
    pub log10_max: f64,
}

impl Default for DepthGridConfig {
    fn default() -> Self {
        Self {
            count: 48,
            log10_min: -6.0,
            log10_max: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContinuumGridConfig {
    pub lambda_min_nm: f64,
    pub lambda_max_nm: f64,
    pub count: usize,
}

impl Default for ContinuumGridConfig {
    fn default() -> Self {
        Self {
            lambda_min_nm: 150.0,
            lambda_max_nm: 5_000.0,
            count: 250,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IterationConfig {
    pub outer: usize,
    pub inner: usize,
    /// Early exit once max |d ln P_gas| between outer passes drops below this.
    pub outer_tolerance: Option<f64>,
    /// Early exit once the relative N_e change between inner passes drops below this.
    pub inner_tolerance: Option<f64>,
    pub gas_tolerance: f64,
    pub gas_max_iterations: usize,
    /// Chemistry is solved by GAS below this temperature (K), by Saha alone above.
    pub gas_temperature: f64,
}

impl Default for IterationConfig {
    fn default() -> Self {
        Self {
            outer: 6,
            inner: 6,
            outer_tolerance: None,
            inner_tolerance: None,
            gas_tolerance: 1.0e-2,
            gas_max_iterations: 10,
            gas_temperature: 6_000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PressureOpacity {
    #[default]
    Rosseland,
    Reference500,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OscillatorStrengthSource {
    #[default]
    Jorgensen,
    Allen,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JolaConfig {
    pub enabled: bool,
    pub f_source: OscillatorStrengthSource,
    pub quantum_s: f64,
    /// Bands are computed only for Teff at or below this (K).
    pub teff_threshold: f64,
}

impl Default for JolaConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            f_source: OscillatorStrengthSource::Jorgensen,
            quantum_s: 1.0,
            teff_threshold: 5_000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct OpacityConfig {
    pub log_kap_fudge: f64,
    pub pressure_opacity: PressureOpacity,
    pub jola: JolaConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TemperatureLaw {
    #[default]
    GrayHopf,
    ReferenceScaled,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RotationConfig {
    pub equatorial_velocity_km_s: f64,
    pub inclination_deg: f64,
    pub phi_count: usize,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            equatorial_velocity_km_s: 0.0,
            inclination_deg: 90.0,
            phi_count: 12,
        }
    }
}

/// A tunable filter with a Gaussian transmission profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GaussianFilter {
    pub center_nm: f64,
    pub sigma_nm: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransferConfig {
    pub theta_count: usize,
    pub line_scattering: bool,
    /// Thermal coupling epsilon used when `line_scattering` is on.
    pub scattering_epsilon: f64,
    pub rotation: RotationConfig,
    pub macroturbulence_km_s: f64,
    /// Per-angle intensity through this filter, when set.
    pub tunable_filter: Option<GaussianFilter>,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            theta_count: 9,
            line_scattering: false,
            scattering_epsilon: 0.1,
            rotation: RotationConfig::default(),
            macroturbulence_km_s: 0.0,
            tunable_filter: None,
        }
    }
}

/// A configuration whose ranges have been checked and whose soft limits were clamped.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub config: EngineConfig,
    pub stellar: StellarParameters,
    pub clamps: Vec<ClampedParameter>,
}

impl EngineConfig {
    pub fn from_json_str(text: &str) -> AtmosResult<Self> {
        serde_json::from_str(text).map_err(|error| {
            AtmosError::input_validation("INPUT.CONFIG", format!("invalid engine config: {error}"))
        })
    }

    /// Validate hard limits, clamp soft ones, and record each clamp.
    pub fn resolve(&self) -> AtmosResult<ResolvedConfig> {
        let (stellar, mut clamps) = self.stellar.validate()?;
        validate_depth_grid(&self.depth)?;
        validate_continuum_grid(&self.continuum)?;

        let mut config = self.clone();
        config.iteration.outer = clamp_count("outerIter", self.iteration.outer, &mut clamps);
        config.iteration.inner = clamp_count("innerIter", self.iteration.inner, &mut clamps);
        config.opacity.log_kap_fudge = clamp_recorded(
            "logKapFudge",
            finite("logKapFudge", self.opacity.log_kap_fudge)?,
            LOG_KAP_FUDGE_RANGE.0,
            LOG_KAP_FUDGE_RANGE.1,
            &mut clamps,
        );

        if !(self.iteration.gas_tolerance.is_finite() && self.iteration.gas_tolerance > 0.0) {
            return Err(AtmosError::input_validation(
                "INPUT.ITERATION",
                format!("gasTolerance must be positive, got {}", self.iteration.gas_tolerance),
            ));
        }
        if self.iteration.gas_max_iterations == 0 {
            return Err(AtmosError::input_validation(
                "INPUT.ITERATION",
                "gasMaxIterations must be at least 1",
            ));
        }
        for (name, tolerance) in [
            ("outerTolerance", self.iteration.outer_tolerance),
            ("innerTolerance", self.iteration.inner_tolerance),
        ] {
            if let Some(value) = tolerance
                && !(value.is_finite() && value > 0.0)
            {
                return Err(AtmosError::input_validation(
                    "INPUT.ITERATION",
                    format!("{name} must be positive when set, got {value}"),
                ));
            }
        }

        let transfer = &mut config.transfer;
        if transfer.theta_count == 0 || transfer.rotation.phi_count == 0 {
            return Err(AtmosError::input_validation(
                "INPUT.TRANSFER",
                "thetaCount and phiCount must be at least 1",
            ));
        }
        transfer.scattering_epsilon = clamp_recorded(
            "scatteringEpsilon",
            finite("scatteringEpsilon", transfer.scattering_epsilon)?,
            1.0e-4,
            1.0,
            &mut clamps,
        );
        transfer.rotation.equatorial_velocity_km_s = clamp_recorded(
            "equatorialVelocity",
            finite("equatorialVelocity", transfer.rotation.equatorial_velocity_km_s)?,
            0.0,
            500.0,
            &mut clamps,
        );
        transfer.rotation.inclination_deg = clamp_recorded(
            "inclination",
            finite("inclination", transfer.rotation.inclination_deg)?,
            0.0,
            90.0,
            &mut clamps,
        );
        transfer.macroturbulence_km_s = clamp_recorded(
            "macroturbulence",
            finite("macroturbulence", transfer.macroturbulence_km_s)?,
            0.0,
            50.0,
            &mut clamps,
        );
        if let Some(filter) = transfer.tunable_filter
            && !(filter.center_nm.is_finite()
                && filter.center_nm > 0.0
                && filter.sigma_nm.is_finite()
                && filter.sigma_nm > 0.0)
        {
            return Err(AtmosError::input_validation(
                "INPUT.TRANSFER",
                format!(
                    "tunable filter needs a positive center and width, got {} nm and {} nm",
                    filter.center_nm, filter.sigma_nm
                ),
            ));
        }
        config.opacity.jola.quantum_s =
            finite("quantumS", config.opacity.jola.quantum_s)?.max(0.0);

        Ok(ResolvedConfig {
            config,
            stellar,
            clamps,
        })
    }
}

fn finite(name: &str, value: f64) -> AtmosResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(AtmosError::input_validation(
            "INPUT.CONFIG",
            format!("{name} must be finite, got {value}"),
        ))
    }
}

fn clamp_count(name: &str, value: usize, clamps: &mut Vec<ClampedParameter>) -> usize {
    clamp_recorded(
        name,
        value as f64,
        ITERATION_RANGE.0 as f64,
        ITERATION_RANGE.1 as f64,
        clamps,
    ) as usize
}

fn validate_depth_grid(depth: &DepthGridConfig) -> AtmosResult<()> {
    if depth.count < 8 {
        return Err(AtmosError::input_validation(
            "INPUT.DEPTH",
            format!("depth grid needs at least 8 points, got {}", depth.count),
        ));
    }
    if !(depth.log10_min.is_finite() && depth.log10_max.is_finite())
        || depth.log10_max <= depth.log10_min
    {
        return Err(AtmosError::input_validation(
            "INPUT.DEPTH",
            format!(
                "depth range [{}, {}] must be finite and increasing",
                depth.log10_min, depth.log10_max
            ),
        ));
    }
    Ok(())
}

fn validate_continuum_grid(continuum: &ContinuumGridConfig) -> AtmosResult<()> {
    if continuum.count < 10 {
        return Err(AtmosError::input_validation(
            "INPUT.CONTINUUM",
            format!("continuum grid needs at least 10 points, got {}", continuum.count),
        ));
    }
    if !(continuum.lambda_min_nm.is_finite() && continuum.lambda_max_nm.is_finite())
        || continuum.lambda_min_nm <= 0.0
        || continuum.lambda_max_nm <= continuum.lambda_min_nm
    {
        return Err(AtmosError::input_validation(
            "INPUT.CONTINUUM",
            format!(
                "continuum range [{}, {}] nm must be positive and increasing",
                continuum.lambda_min_nm, continuum.lambda_max_nm
            ),
        ));
    }
    Ok(())
}

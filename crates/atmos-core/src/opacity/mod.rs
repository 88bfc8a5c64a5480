//! Continuum, band and line extinction on a wavelength x depth grid.

pub mod absorbers;
pub mod continuum;
pub mod jola;
pub mod master;
pub mod metals;
pub mod rayleigh;
pub mod rosseland;

use serde::Serialize;

use crate::common::constants::LN10;
use crate::domain::errors::AtmosError;
use crate::domain::ExecutionMode;
use crate::numerics::{validate_grid, InterpolationError};
use crate::registry::RegistryError;

pub use absorbers::{AbsorberInput, AbsorberSpecies, DepthAbsorbers};
pub use master::{MasterOpacity, MergeReport};
pub use rosseland::{reference_opacity, rosseland_mean, REFERENCE_WAVELENGTH_NM};

/// ln kappa assigned where every contribution vanishes.
pub const LN_KAPPA_FLOOR: f64 = -690.0;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OpacityError {
    #[error("opacity input has {actual} depths, expected {expected}")]
    DepthMismatch { expected: usize, actual: usize },
    #[error("{name} must be positive at depth {depth}, got {value}")]
    NonPositive {
        name: &'static str,
        depth: usize,
        value: f64,
    },
    #[error("invalid wavelength grid: {0}")]
    Grid(#[from] InterpolationError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Merge(#[from] MergeError),
}

impl From<OpacityError> for AtmosError {
    fn from(error: OpacityError) -> Self {
        match error {
            OpacityError::Registry(source) => source.into(),
            other => AtmosError::computation("OPACITY.BUILD", other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MergeError {
    #[error("feature '{id}' has no wavelength points")]
    EmptyWindow { id: String },
    #[error("feature '{id}' wavelengths must be finite and strictly increasing (index {index})")]
    UnorderedWindow { id: String, index: usize },
    #[error("feature '{id}' carries {actual} depths, table has {expected}")]
    DepthMismatch {
        id: String,
        expected: usize,
        actual: usize,
    },
    #[error("feature '{id}' has {actual} opacity rows for {expected} wavelengths")]
    RowMismatch {
        id: String,
        expected: usize,
        actual: usize,
    },
}

impl From<MergeError> for AtmosError {
    fn from(error: MergeError) -> Self {
        AtmosError::computation("OPACITY.MERGE", error.to_string())
    }
}

/// ln kappa (cm^2/g) indexed `[wavelength][depth]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpacityTable {
    pub wavelengths_nm: Vec<f64>,
    pub ln_kappa: Vec<Vec<f64>>,
}

impl OpacityTable {
    pub fn wavelength_count(&self) -> usize {
        self.wavelengths_nm.len()
    }

    pub fn depth_count(&self) -> usize {
        self.ln_kappa.first().map_or(0, Vec::len)
    }

    /// kappa at every depth for one wavelength index.
    pub fn column(&self, wavelength: usize) -> &[f64] {
        &self.ln_kappa[wavelength]
    }
}

/// Extinction confined to a wavelength window: one spectral line or molecular band.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpacityFeature {
    pub id: String,
    /// Strictly increasing.
    pub wavelengths_nm: Vec<f64>,
    /// ln kappa (cm^2/g) indexed `[point][depth]`.
    pub ln_kappa: Vec<Vec<f64>>,
}

impl OpacityFeature {
    pub fn span(&self) -> (f64, f64) {
        (
            self.wavelengths_nm.first().copied().unwrap_or(0.0),
            self.wavelengths_nm.last().copied().unwrap_or(0.0),
        )
    }
}

/// Continuum ln kappa per unit mass, fudge applied, at one depth and wavelength.
pub fn continuum_ln_kappa(absorbers: &DepthAbsorbers, wavelength_nm: f64, log_kap_fudge: f64) -> f64 {
    let linear = continuum::hydrogen_helium(absorbers, wavelength_nm).total()
        + metals::metal_bound_free(absorbers, wavelength_nm)
        + rayleigh::rayleigh_scattering(absorbers, wavelength_nm);
    ln_per_mass(linear, absorbers.density) + log_kap_fudge * LN10
}

pub(crate) fn ln_per_mass(linear: f64, density: f64) -> f64 {
    if linear > 0.0 && density > 0.0 {
        (linear / density).ln().max(LN_KAPPA_FLOOR)
    } else {
        LN_KAPPA_FLOOR
    }
}

/// Continuum opacity of every depth on `wavelengths_nm`.
pub fn continuum_table(
    wavelengths_nm: &[f64],
    absorbers: &[DepthAbsorbers],
    log_kap_fudge: f64,
    mode: ExecutionMode,
) -> Result<OpacityTable, OpacityError> {
    validate_grid(wavelengths_nm, wavelengths_nm)?;
    check_densities(absorbers)?;
    let ln_kappa = mode.map_range(wavelengths_nm.len(), |index| {
        absorbers
            .iter()
            .map(|depth| continuum_ln_kappa(depth, wavelengths_nm[index], log_kap_fudge))
            .collect()
    });
    Ok(OpacityTable {
        wavelengths_nm: wavelengths_nm.to_vec(),
        ln_kappa,
    })
}

pub(crate) fn check_densities(absorbers: &[DepthAbsorbers]) -> Result<(), OpacityError> {
    for (depth, state) in absorbers.iter().enumerate() {
        for (name, value) in [("temperature", state.temperature), ("density", state.density)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(OpacityError::NonPositive { name, depth, value });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::DepthAbsorbers;
    use crate::common::constants::BOLTZMANN;

    /// A rough photospheric depth at `temperature`, scaled by total particle density.
    pub(crate) fn photosphere(temperature: f64, particles: f64) -> DepthAbsorbers {
        let electrons = particles * if temperature > 7_000.0 { 1.0e-2 } else { 1.0e-4 };
        DepthAbsorbers {
            temperature,
            density: particles * 1.3 * 1.660_538_92e-24,
            electron_density: electrons,
            electron_pressure: electrons * BOLTZMANN * temperature,
            hydrogen_neutral: 0.9 * particles,
            hydrogen_ion: electrons,
            helium_neutral: 0.08 * particles,
            molecular_hydrogen: if temperature < 4_500.0 { 0.05 * particles } else { 0.0 },
            titanium_oxide: if temperature < 4_500.0 { 5.0e-8 * particles } else { 0.0 },
            hydrogen_ground: 0.45 * particles,
            helium_ground: 0.08 * particles,
            carbon_i_ground: 2.0e-4 * particles,
            magnesium_ii_ground: 1.0e-5 * particles,
            aluminium_i_ground: 1.0e-7 * particles,
            iron_i_ground: 1.0e-6 * particles,
        }
    }
}

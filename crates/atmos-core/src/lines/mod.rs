//! Spectral line catalogue and the per-line opacity that feeds the master table.

pub mod catalogue;
pub mod grid;
pub mod hjerting;
pub mod levels;
pub mod profile;

use serde::Serialize;

use crate::common::constants::PI_E2_OVER_MC;
use crate::common::planck::stimulated_emission;
use crate::domain::errors::AtmosError;
use crate::domain::ExecutionMode;
use crate::ionization::StagePopulationTable;
use crate::opacity::{OpacityFeature, LN_KAPPA_FLOOR};
use crate::registry::SpeciesRegistry;

pub use catalogue::{catalogue_keys, catalogue_line, LineSelection, ResolvedLine, SpectralLine};
pub use grid::LineGrid;
use profile::{absorption_profile, ProfileDepth};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LineError {
    #[error("line '{id}' needs at least one depth")]
    EmptyAtmosphere { id: String },
    #[error("line '{id}': stage table has {actual} depths, atmosphere has {expected}")]
    DepthMismatch {
        id: String,
        expected: usize,
        actual: usize,
    },
    #[error("line '{id}': {name} must be positive at depth {depth}, got {value}")]
    NonPositive {
        id: String,
        name: &'static str,
        depth: usize,
        value: f64,
    },
}

impl From<LineError> for AtmosError {
    fn from(error: LineError) -> Self {
        AtmosError::computation("LINE.OPACITY", error.to_string())
    }
}

/// Depth-resolved state a line's opacity depends on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineDepth {
    pub temperature: f64,
    pub gas_pressure: f64,
    pub electron_density: f64,
    pub density: f64,
}

pub struct LineOpacityInput<'a> {
    pub line: &'a ResolvedLine,
    pub registry: &'a SpeciesRegistry,
    pub stages: &'a StagePopulationTable,
    pub depths: &'a [LineDepth],
    pub teff: f64,
    pub mode: ExecutionMode,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineOpacity {
    pub feature: OpacityFeature,
    pub doppler_width_nm: f64,
    /// ln N of the absorbing level per depth (cm^-3).
    pub ln_lower_level: Vec<f64>,
}

/// Line extinction per unit mass on the line's own wavelength grid.
pub fn line_opacity(input: LineOpacityInput<'_>) -> Result<LineOpacity, LineError> {
    let resolved = input.line;
    let id = resolved.id();
    check_depths(&id, input.depths, input.stages)?;

    let line = &resolved.line;
    let grid = LineGrid::new(resolved, input.teff);
    let wavelengths_nm = grid.wavelengths_nm();
    let species = input.registry.entry(resolved.species);
    let ln_strength = PI_E2_OVER_MC.ln() + line.log_f * std::f64::consts::LN_10;
    let natural_rate = line.natural_decay_rate();

    let ln_lower_level: Vec<f64> = input
        .depths
        .iter()
        .enumerate()
        .map(|(index, depth)| {
            levels::ln_level_density(
                input.stages.ln_density(resolved.element.0, line.stage, index),
                line.lower_weight,
                line.excitation_ev,
                species.ln_partition_at(depth.temperature),
                depth.temperature,
            ) + resolved.ln_abundance_scale
        })
        .collect();

    // [depth][point]
    let by_depth = input.mode.map_range(input.depths.len(), |index| {
        let depth = &input.depths[index];
        let profile = absorption_profile(
            &grid,
            &ProfileDepth {
                temperature: depth.temperature,
                gas_pressure: depth.gas_pressure,
                electron_density: depth.electron_density,
            },
            line.log_gamma_col,
            natural_rate,
            line.is_hydrogen(),
        );
        profile
            .iter()
            .zip(&wavelengths_nm)
            .map(|(phi, lambda)| {
                let stimulated = stimulated_emission(*lambda, depth.temperature);
                if *phi > 0.0 && stimulated > 0.0 {
                    (ln_strength + ln_lower_level[index] + stimulated.ln() + phi.ln() - depth.density.ln())
                        .max(LN_KAPPA_FLOOR)
                } else {
                    LN_KAPPA_FLOOR
                }
            })
            .collect::<Vec<f64>>()
    });

    let ln_kappa = (0..wavelengths_nm.len())
        .map(|point| by_depth.iter().map(|row| row[point]).collect())
        .collect();
    Ok(LineOpacity {
        feature: OpacityFeature {
            id,
            wavelengths_nm,
            ln_kappa,
        },
        doppler_width_nm: grid.doppler_width_nm,
        ln_lower_level,
    })
}

fn check_depths(id: &str, depths: &[LineDepth], stages: &StagePopulationTable) -> Result<(), LineError> {
    if depths.is_empty() {
        return Err(LineError::EmptyAtmosphere { id: id.to_string() });
    }
    if stages.depth_count() != depths.len() {
        return Err(LineError::DepthMismatch {
            id: id.to_string(),
            expected: depths.len(),
            actual: stages.depth_count(),
        });
    }
    for (index, depth) in depths.iter().enumerate() {
        for (name, value) in [("temperature", depth.temperature), ("density", depth.density)] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(LineError::NonPositive {
                    id: id.to_string(),
                    name,
                    depth: index,
                    value,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{line_opacity, LineDepth, LineError, LineOpacityInput, LineSelection};
    use crate::domain::ExecutionMode;
    use crate::ionization::{StagePopulationTable, MAX_TRACKED_STAGES};
    use crate::registry::{AbundanceOffsets, SpeciesRegistry};

    fn atmosphere() -> Vec<LineDepth> {
        vec![
            LineDepth {
                temperature: 4_800.0,
                gas_pressure: 1.0e4,
                electron_density: 1.0e12,
                density: 1.0e-8,
            },
            LineDepth {
                temperature: 6_000.0,
                gas_pressure: 1.0e5,
                electron_density: 1.0e14,
                density: 1.0e-7,
            },
        ]
    }

    fn stages(registry: &SpeciesRegistry, ln_neutral: f64) -> StagePopulationTable {
        let row = vec![[ln_neutral, ln_neutral, -690.0, -690.0]; registry.elements().len()];
        assert_eq!(row[0].len(), MAX_TRACKED_STAGES);
        StagePopulationTable::from_depth_rows(vec![row.clone(), row])
    }

    fn resolve(registry: &SpeciesRegistry, key: &str) -> super::ResolvedLine {
        let abundances = registry.abundances(AbundanceOffsets::default());
        LineSelection::Catalogue(key.to_string())
            .resolve(registry, &abundances, &mut Vec::new())
            .expect("resolve")
    }

    #[test]
    fn opacity_peaks_at_the_line_center() {
        let registry = SpeciesRegistry::standard().expect("registry");
        let line = resolve(&registry, "na-d1");
        let table = stages(&registry, 20.0);
        let opacity = line_opacity(LineOpacityInput {
            line: &line,
            registry: &registry,
            stages: &table,
            depths: &atmosphere(),
            teff: 5_780.0,
            mode: ExecutionMode::Serial,
        })
        .expect("opacity");
        let rows = &opacity.feature.ln_kappa;
        let center = rows.len() / 2;
        assert_eq!(rows[center].len(), 2);
        assert!(rows[center][0] > rows[0][0]);
        assert!(rows[center][0] > rows[center + 3][0]);
        assert!(opacity.feature.wavelengths_nm.windows(2).all(|pair| pair[0] < pair[1]));
        assert!((opacity.feature.wavelengths_nm[center] - line.line.wavelength_nm).abs() < 1.0e-12);
    }

    #[test]
    fn opacity_scales_with_the_absorber_population() {
        let registry = SpeciesRegistry::standard().expect("registry");
        let line = resolve(&registry, "fe-i-5270");
        let depths = atmosphere();
        let weak = stages(&registry, 20.0);
        let strong = stages(&registry, 21.0);
        let build = |table| {
            line_opacity(LineOpacityInput {
                line: &line,
                registry: &registry,
                stages: table,
                depths: &depths,
                teff: 5_780.0,
                mode: ExecutionMode::Parallel,
            })
            .expect("opacity")
        };
        let low = build(&weak);
        let high = build(&strong);
        for (low_row, high_row) in low.feature.ln_kappa.iter().zip(&high.feature.ln_kappa) {
            for (low, high) in low_row.iter().zip(high_row) {
                assert!((high - low - 1.0).abs() < 1.0e-9);
            }
        }
    }

    #[test]
    fn mismatched_depths_are_rejected() {
        let registry = SpeciesRegistry::standard().expect("registry");
        let line = resolve(&registry, "ca-i-4227");
        let table = stages(&registry, 20.0);
        let error = line_opacity(LineOpacityInput {
            line: &line,
            registry: &registry,
            stages: &table,
            depths: &atmosphere()[..1],
            teff: 5_780.0,
            mode: ExecutionMode::Serial,
        })
        .expect_err("depth mismatch");
        assert!(matches!(error, LineError::DepthMismatch { expected: 1, actual: 2, .. }));
    }
}

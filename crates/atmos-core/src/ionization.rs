//! Saha ionization equilibrium: stage fractions by the recursive ratio technique and
//! the electron-density iteration used above the GAS temperature.

use serde::Serialize;

use crate::common::constants::{BOLTZMANN, BOLTZMANN_EV, ELECTRON_MASS, PI, PLANCK};
use crate::domain::errors::AtmosError;
use crate::registry::{SpeciesKind, SpeciesRegistry};

pub const MAX_TRACKED_STAGES: usize = 4;
/// ln N used for stages an element does not have.
pub const LN_DENSITY_FLOOR: f64 = -690.0;
const ELECTRON_DENSITY_FLOOR: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SahaError {
    #[error("stage populations need between 1 and {MAX_TRACKED_STAGES} stages, got {count}")]
    StageCount { count: usize },
    #[error("missing ionization energy for stage {stage}")]
    MissingIonizationEnergy { stage: usize },
    #[error("{name} must be positive and finite, got {value}")]
    NonPositive { name: &'static str, value: f64 },
    #[error("abundance table has {actual} entries for {expected} elements")]
    AbundanceLengthMismatch { expected: usize, actual: usize },
}

impl From<SahaError> for AtmosError {
    fn from(error: SahaError) -> Self {
        AtmosError::computation("CHEM.SAHA", error.to_string())
    }
}

/// ln of the Saha factor N_{r+1} N_e / N_r (cm^-3).
pub fn ln_saha_factor(temperature: f64, ionization_ev: f64, ln_u_lower: f64, ln_u_upper: f64) -> f64 {
    let kt = BOLTZMANN * temperature;
    1.5 * (2.0 * PI * ELECTRON_MASS * kt / (PLANCK * PLANCK)).ln()
        + std::f64::consts::LN_2
        + ln_u_upper
        - ln_u_lower
        - ionization_ev / (BOLTZMANN_EV * temperature)
}

/// ln of the Saha factor in pressure form, P_{r+1} P_e / P_r (dyn/cm^2).
pub fn ln_saha_pressure_factor(
    temperature: f64,
    ionization_ev: f64,
    ln_u_lower: f64,
    ln_u_upper: f64,
) -> f64 {
    ln_saha_factor(temperature, ionization_ev, ln_u_lower, ln_u_upper)
        + (BOLTZMANN * temperature).ln()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StagePopulationInput<'a> {
    /// Total number density of the element over all stages (cm^-3).
    pub total_number_density: f64,
    pub electron_density: f64,
    /// Ionization energies (eV); at least one fewer than `ln_partition`.
    pub ionization_ev: &'a [f64],
    /// ln U per stage at `temperature`.
    pub ln_partition: &'a [f64],
    pub temperature: f64,
}

/// ln number density of each stage.
pub fn stage_populations(input: StagePopulationInput<'_>) -> Result<Vec<f64>, SahaError> {
    let stages = input.ln_partition.len();
    if stages == 0 || stages > MAX_TRACKED_STAGES {
        return Err(SahaError::StageCount { count: stages });
    }
    if input.ionization_ev.len() + 1 < stages {
        return Err(SahaError::MissingIonizationEnergy {
            stage: input.ionization_ev.len() + 1,
        });
    }
    positive("temperature", input.temperature)?;
    positive("electron density", input.electron_density)?;
    positive("total number density", input.total_number_density)?;

    let ln_electrons = input.electron_density.ln();
    let mut cumulative = vec![0.0; stages];
    for stage in 1..stages {
        let ln_ratio = ln_saha_factor(
            input.temperature,
            input.ionization_ev[stage - 1],
            input.ln_partition[stage - 1],
            input.ln_partition[stage],
        ) - ln_electrons;
        cumulative[stage] = cumulative[stage - 1] + ln_ratio;
    }

    let peak = cumulative.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let ln_sum = peak + cumulative.iter().map(|value| (value - peak).exp()).sum::<f64>().ln();
    let ln_ground = input.total_number_density.ln() - ln_sum;

    Ok(cumulative.iter().map(|value| ln_ground + value).collect())
}

fn positive(name: &'static str, value: f64) -> Result<(), SahaError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SahaError::NonPositive { name, value })
    }
}

/// Result of the inner electron-density iteration at one depth.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SahaDepth {
    pub electron_density: f64,
    /// Per element, ln N for stages I..IV.
    pub ln_density: Vec<[f64; MAX_TRACKED_STAGES]>,
    /// Relative N_e change per pass.
    pub residuals: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElectronIterationInput<'a> {
    pub registry: &'a SpeciesRegistry,
    pub abundances: &'a [f64],
    pub temperature: f64,
    pub gas_pressure: f64,
    pub electron_density_seed: f64,
    pub passes: usize,
    pub tolerance: Option<f64>,
}

/// Re-derive N_e from every element's ionization for up to `passes` passes.
pub fn converge_electron_density(input: ElectronIterationInput<'_>) -> Result<SahaDepth, SahaError> {
    let registry = input.registry;
    let elements = registry.elements();
    if input.abundances.len() != elements.len() {
        return Err(SahaError::AbundanceLengthMismatch {
            expected: elements.len(),
            actual: input.abundances.len(),
        });
    }
    positive("temperature", input.temperature)?;
    positive("gas pressure", input.gas_pressure)?;

    let kt = BOLTZMANN * input.temperature;
    let total_particles = input.gas_pressure / kt;
    let abundance_sum: f64 = input.abundances.iter().sum();
    let ln_partitions: Vec<Vec<f64>> = elements
        .iter()
        .map(|element| {
            element
                .stages
                .iter()
                .take(MAX_TRACKED_STAGES)
                .map(|stage| registry.entry(*stage).ln_partition_at(input.temperature))
                .collect()
        })
        .collect();

    // Stage rows and the free-electron count they imply at a trial N_e.
    let ionize_at = |electron_density: f64| -> Result<(Vec<[f64; MAX_TRACKED_STAGES]>, f64), SahaError> {
        let nuclei = (total_particles - electron_density).max(ELECTRON_DENSITY_FLOOR);
        let mut electrons = 0.0;
        let mut rows = Vec::with_capacity(elements.len());
        for (index, element) in elements.iter().enumerate() {
            let populations = stage_populations(StagePopulationInput {
                total_number_density: nuclei * input.abundances[index] / abundance_sum,
                electron_density,
                ionization_ev: element.ionization_ev,
                ln_partition: &ln_partitions[index],
                temperature: input.temperature,
            })?;
            let mut row = [LN_DENSITY_FLOOR; MAX_TRACKED_STAGES];
            for (stage, value) in populations.iter().enumerate() {
                row[stage] = value.max(LN_DENSITY_FLOOR);
                electrons += stage as f64 * value.exp();
            }
            rows.push(row);
        }
        Ok((rows, electrons.max(ELECTRON_DENSITY_FLOOR)))
    };

    let mut electron_density = input
        .electron_density_seed
        .clamp(ELECTRON_DENSITY_FLOOR, 0.5 * total_particles);
    let mut residuals = Vec::with_capacity(input.passes);

    for _ in 0..input.passes.max(1) {
        let (_, computed) = ionize_at(electron_density)?;
        let residual = (computed - electron_density).abs() / electron_density;
        residuals.push(residual);
        electron_density = (electron_density * computed).sqrt();
        if input.tolerance.is_some_and(|tolerance| residual < tolerance) {
            break;
        }
    }

    // Rows are returned at the N_e reported alongside them.
    let (ln_density, _) = ionize_at(electron_density)?;
    Ok(SahaDepth {
        electron_density,
        ln_density,
        residuals,
    })
}

/// Per element, per depth, ln N for stages I..IV.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StagePopulationTable {
    ln_density: Vec<Vec<[f64; MAX_TRACKED_STAGES]>>,
}

impl StagePopulationTable {
    /// Assemble from per-depth rows (`rows[depth][element]`).
    pub fn from_depth_rows(rows: Vec<Vec<[f64; MAX_TRACKED_STAGES]>>) -> Self {
        let element_count = rows.first().map_or(0, Vec::len);
        let ln_density = (0..element_count)
            .map(|element| rows.iter().map(|row| row[element]).collect())
            .collect();
        Self { ln_density }
    }

    pub fn depth_count(&self) -> usize {
        self.ln_density.first().map_or(0, Vec::len)
    }

    /// ln N (cm^-3) of `stage` (1 = neutral).
    pub fn ln_density(&self, element: usize, stage: u8, depth: usize) -> f64 {
        usize::from(stage)
            .checked_sub(1)
            .and_then(|index| self.ln_density.get(element)?.get(depth)?.get(index))
            .copied()
            .unwrap_or(LN_DENSITY_FLOOR)
    }

    /// Per-depth ln N of one stage.
    pub fn stage_slice(&self, element: usize, stage: u8) -> Vec<f64> {
        (0..self.depth_count())
            .map(|depth| self.ln_density(element, stage, depth))
            .collect()
    }
}

/// Stage populations read directly off a set of GAS partial pressures.
pub fn stages_from_partial_pressures(
    registry: &SpeciesRegistry,
    partial_pressures: &[f64],
    temperature: f64,
) -> Vec<[f64; MAX_TRACKED_STAGES]> {
    let kt = BOLTZMANN * temperature;
    let mut rows = vec![[LN_DENSITY_FLOOR; MAX_TRACKED_STAGES]; registry.elements().len()];
    for (species, pressure) in registry.species().iter().zip(partial_pressures) {
        if let SpeciesKind::Atomic { element, stage } = species.kind {
            let index = usize::from(stage) - 1;
            if index < MAX_TRACKED_STAGES && *pressure > 0.0 {
                rows[element.0][index] = (pressure / kt).ln().max(LN_DENSITY_FLOOR);
            }
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::{
        converge_electron_density, ln_saha_factor, stage_populations, ElectronIterationInput,
        SahaError, StagePopulationInput,
    };
    use crate::common::constants::BOLTZMANN;
    use crate::registry::{AbundanceOffsets, SpeciesRegistry};

    fn assert_scalar_close(label: &str, expected: f64, actual: f64, abs_tol: f64, rel_tol: f64) {
        let diff = (expected - actual).abs();
        let tolerance = abs_tol.max(rel_tol * expected.abs());
        assert!(
            diff <= tolerance,
            "{label}: expected {expected}, got {actual}, diff {diff} > {tolerance}"
        );
    }

    #[test]
    fn hydrogen_ratio_matches_textbook_saha_form() {
        let temperature = 10_000.0;
        let electron_pressure = 100.0;
        let electron_density = electron_pressure / (BOLTZMANN * temperature);
        let ratio =
            (ln_saha_factor(temperature, 13.598434, 2.0_f64.ln(), 0.0) - electron_density.ln()).exp();

        // log(N_II Pe / N_I) = log(U_II / U_I) - 0.1762 + 2.5 log T - 5040 chi / T
        let log_ratio = (0.5_f64).log10() - 0.1762 + 2.5 * temperature.log10()
            - 5040.0 * 13.598434 / temperature
            - electron_pressure.log10();
        assert_scalar_close("N_II/N_I", 10.0_f64.powf(log_ratio), ratio, 0.0, 0.01);
    }

    #[test]
    fn stage_populations_conserve_the_element() {
        let populations = stage_populations(StagePopulationInput {
            total_number_density: 1.0e12,
            electron_density: 1.0e13,
            ionization_ev: &[7.9024678, 16.1992, 30.651],
            ln_partition: &[1.43 * std::f64::consts::LN_10, 1.63 * std::f64::consts::LN_10, 0.0, 0.0],
            temperature: 6_000.0,
        })
        .expect("populations");
        let total: f64 = populations.iter().map(|value| value.exp()).sum();
        assert_scalar_close("sum over stages", 1.0e12, total, 0.0, 1.0e-12);
        assert!(populations[1] > populations[0], "Fe is mostly ionized at 6000 K");
        assert!(populations[3] < populations[2]);
    }

    #[test]
    fn invalid_stage_requests_are_rejected() {
        let error = stage_populations(StagePopulationInput {
            total_number_density: 1.0,
            electron_density: 1.0,
            ionization_ev: &[],
            ln_partition: &[0.0, 0.0],
            temperature: 5_000.0,
        })
        .expect_err("missing energy");
        assert_eq!(error, SahaError::MissingIonizationEnergy { stage: 1 });
    }

    #[test]
    fn electron_iteration_settles_with_tolerance() {
        let registry = SpeciesRegistry::standard().expect("registry");
        let abundances = registry.abundances(AbundanceOffsets::default());
        let depth = converge_electron_density(ElectronIterationInput {
            registry: &registry,
            abundances: &abundances,
            temperature: 9_000.0,
            gas_pressure: 1.0e4,
            electron_density_seed: 1.0e12,
            passes: 12,
            tolerance: Some(1.0e-3),
        })
        .expect("iteration");
        let last = *depth.residuals.last().expect("at least one pass");
        assert!(depth.residuals.len() <= 12);
        assert!(last < 0.05, "residual history {:?}", depth.residuals);
        let total = 1.0e4 / (BOLTZMANN * 9_000.0);
        assert!(depth.electron_density > 0.0 && depth.electron_density < 0.5 * total);
    }

    #[test]
    fn returned_stages_are_solved_at_the_returned_electron_density() {
        let registry = SpeciesRegistry::standard().expect("registry");
        let abundances = registry.abundances(AbundanceOffsets::default());
        let temperature = 12_000.0;
        let gas_pressure = 1.0e3;
        let depth = converge_electron_density(ElectronIterationInput {
            registry: &registry,
            abundances: &abundances,
            temperature,
            gas_pressure,
            electron_density_seed: 1.0e13,
            passes: 3,
            tolerance: None,
        })
        .expect("iteration");
        assert_eq!(depth.residuals.len(), 3);

        let nuclei = gas_pressure / (BOLTZMANN * temperature) - depth.electron_density;
        let total: f64 = depth
            .ln_density
            .iter()
            .flat_map(|row| row.iter())
            .map(|value| value.exp())
            .sum();
        assert_scalar_close("nuclei at returned N_e", nuclei, total, 0.0, 1.0e-9);

        let hydrogen = registry.element_by_symbol("H").expect("hydrogen").0;
        let stages = &registry.elements()[hydrogen].stages;
        let ln_u_neutral = registry.entry(stages[0]).ln_partition_at(temperature);
        let ln_u_ion = registry.entry(stages[1]).ln_partition_at(temperature);
        let row = depth.ln_density[hydrogen];
        let ratio = (row[1] - row[0]).exp();
        let expected = (ln_saha_factor(temperature, 13.598434, ln_u_neutral, ln_u_ion)
            - depth.electron_density.ln())
        .exp();
        assert_scalar_close("H II / H I at returned N_e", expected, ratio, 0.0, 1.0e-6);
    }
}

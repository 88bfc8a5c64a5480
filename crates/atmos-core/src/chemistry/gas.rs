//! Coupled ionization and dissociation equilibrium ("GAS").
//!
//! Unknowns are the log partial pressures of every element's neutral atom, the
//! log electron pressure and the log pressure of hydrogen nuclei. Every species'
//! pressure is then `ln P_s = sum_A n_A x_A - q_s ln P_e + c_s(T)`, where `c_s`
//! collects the Saha factors of its ionization ladder and, for molecules, the
//! dissociation constant. The residuals are one nuclei-conservation equation per
//! element, the total-pressure equation and charge conservation; they are driven
//! to zero by a damped Newton iteration.

use serde::Serialize;

use super::gasest::estimate;
use crate::common::constants::{AMU, BOLTZMANN};
use crate::domain::errors::AtmosError;
use crate::ionization::ln_saha_pressure_factor;
use crate::numerics::{lu_solve, DenseMatrix};
use crate::registry::{ln_k_from_fit, SpeciesId, SpeciesKind, SpeciesRegistry};

pub const DEFAULT_TOLERANCE: f64 = 1.0e-2;
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

const MAX_LOG_STEP: f64 = 2.0;
const CONSERVATION_SWEEPS: usize = 5;
const LN_PRESSURE_CEILING: f64 = 700.0;
const PRESSURE_FLOOR: f64 = 1.0e-300;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GasError {
    #[error("GAS requires positive finite temperature and pressure, got T={temperature}, P={gas_pressure}")]
    InvalidState { temperature: f64, gas_pressure: f64 },
    #[error("abundance table has {actual} entries for {expected} elements")]
    AbundanceLengthMismatch { expected: usize, actual: usize },
}

impl From<GasError> for AtmosError {
    fn from(error: GasError) -> Self {
        AtmosError::computation("CHEM.GAS", error.to_string())
    }
}

/// Everything GAS needs besides the thermodynamic state.
#[derive(Debug, Clone, Copy)]
pub struct ChemicalEquilibriumContext<'a> {
    pub registry: &'a SpeciesRegistry,
    /// Number abundance per element relative to hydrogen.
    pub abundances: &'a [f64],
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl<'a> ChemicalEquilibriumContext<'a> {
    pub fn new(registry: &'a SpeciesRegistry, abundances: &'a [f64]) -> Self {
        Self {
            registry,
            abundances,
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn with_limits(mut self, tolerance: f64, max_iterations: usize) -> Self {
        self.tolerance = tolerance;
        self.max_iterations = max_iterations;
        self
    }
}

/// Warm start taken from a previous solution.
#[derive(Debug, Clone, PartialEq)]
pub struct GasSeed {
    pub gas_pressure: f64,
    pub electron_pressure: f64,
    /// Partial pressure per species, indexed by [`SpeciesId`].
    pub partial_pressures: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChemicalState {
    pub temperature: f64,
    pub gas_pressure: f64,
    pub electron_pressure: f64,
    /// Mass density (g/cm^3).
    pub density: f64,
    /// Mean molecular weight per particle, electrons included (amu).
    pub mean_molecular_weight: f64,
    /// Partial pressure per species (dyn/cm^2), indexed by [`SpeciesId`].
    pub partial_pressures: Vec<f64>,
    pub converged: bool,
    /// Largest scaled residual at the returned iterate.
    pub residual: f64,
    pub iterations: usize,
}

impl ChemicalState {
    pub fn partial_pressure(&self, species: SpeciesId) -> f64 {
        self.partial_pressures.get(species.0).copied().unwrap_or(0.0)
    }

    /// Number density (cm^-3) of `species`.
    pub fn number_density(&self, species: SpeciesId) -> f64 {
        self.partial_pressure(species) / (BOLTZMANN * self.temperature)
    }

    pub fn electron_density(&self) -> f64 {
        self.electron_pressure / (BOLTZMANN * self.temperature)
    }

    /// |sum_s q_s P_s - P_e| / P_e.
    pub fn charge_residual(&self, registry: &SpeciesRegistry) -> f64 {
        let charge: f64 = registry
            .species()
            .iter()
            .zip(&self.partial_pressures)
            .map(|(species, pressure)| f64::from(species.charge()) * pressure)
            .sum();
        (charge - self.electron_pressure).abs() / self.electron_pressure
    }

    pub fn seed(&self) -> GasSeed {
        GasSeed {
            gas_pressure: self.gas_pressure,
            electron_pressure: self.electron_pressure,
            partial_pressures: self.partial_pressures.clone(),
        }
    }
}

/// Per-species coefficients of `ln P_s` at a fixed temperature.
struct SpeciesTerm {
    constituents: Vec<(usize, f64)>,
    charge: f64,
    constant: f64,
    mass: f64,
}

fn species_terms(registry: &SpeciesRegistry, temperature: f64) -> Vec<SpeciesTerm> {
    let element_ladder = |element: usize, up_to_stage: usize| -> f64 {
        let record = &registry.elements()[element];
        (1..up_to_stage)
            .map(|stage| {
                ln_saha_pressure_factor(
                    temperature,
                    record.ionization_ev[stage - 1],
                    registry.entry(record.stages[stage - 1]).ln_partition_at(temperature),
                    registry.entry(record.stages[stage]).ln_partition_at(temperature),
                )
            })
            .sum()
    };

    registry
        .species()
        .iter()
        .map(|species| {
            let constituents: Vec<(usize, f64)> = species
                .signature
                .constituents
                .iter()
                .map(|(element, count)| (element.0, f64::from(*count)))
                .collect();
            let constant = match &species.kind {
                SpeciesKind::Atomic { element, stage } => {
                    element_ladder(element.0, usize::from(*stage))
                }
                SpeciesKind::NegativeIon {
                    element,
                    binding_ev,
                } => {
                    let neutral = registry.elements()[element.0].stages[0];
                    -ln_saha_pressure_factor(
                        temperature,
                        *binding_ev,
                        species.ln_partition_at(temperature),
                        registry.entry(neutral).ln_partition_at(temperature),
                    )
                }
                SpeciesKind::Molecule { log10_k, .. } => {
                    let ionized = usize::try_from(species.charge()).unwrap_or(0);
                    let ladder = constituents
                        .first()
                        .map_or(0.0, |(element, _)| element_ladder(*element, ionized + 1));
                    ladder - ln_k_from_fit(log10_k, temperature)
                }
            };
            SpeciesTerm {
                constituents,
                charge: f64::from(species.charge()),
                constant,
                mass: species.mass,
            }
        })
        .collect()
}

/// Solve the equilibrium at one (`temperature`, `gas_pressure`) point.
///
/// Without a `seed` the fast estimator provides the starting point. If the
/// iteration does not reach the context tolerance the last iterate is returned
/// with `converged = false`.
pub fn solve(
    context: &ChemicalEquilibriumContext<'_>,
    temperature: f64,
    gas_pressure: f64,
    seed: Option<&GasSeed>,
) -> Result<ChemicalState, GasError> {
    if !(temperature.is_finite() && temperature > 0.0 && gas_pressure.is_finite() && gas_pressure > 0.0)
    {
        return Err(GasError::InvalidState {
            temperature,
            gas_pressure,
        });
    }
    let registry = context.registry;
    let element_count = registry.elements().len();
    if context.abundances.len() != element_count {
        return Err(GasError::AbundanceLengthMismatch {
            expected: element_count,
            actual: context.abundances.len(),
        });
    }

    let terms = species_terms(registry, temperature);
    let electron_index = element_count;
    let nuclei_index = element_count + 1;
    let unknowns = element_count + 2;

    let mut state = initial_state(context, &terms, temperature, gas_pressure, seed);
    conservation_sweeps(context.abundances, &terms, &mut state, nuclei_index, electron_index);

    let mut iterations = 0;
    let mut pressures;
    let mut residual;
    loop {
        pressures = species_pressures(&terms, &state, electron_index);
        let (scaled_residuals, jacobian) = assemble_system(
            context.abundances,
            &terms,
            &pressures,
            &state,
            gas_pressure,
        );
        residual = scaled_residuals
            .iter()
            .map(|value| value.abs())
            .fold(0.0, f64::max);
        if residual < context.tolerance || iterations >= context.max_iterations {
            break;
        }

        let rhs: Vec<f64> = scaled_residuals.iter().map(|value| -value).collect();
        let step = match lu_solve(&jacobian, &rhs) {
            Ok(step) => step,
            Err(error) => {
                tracing::warn!(temperature, gas_pressure, %error, "GAS Newton step failed");
                break;
            }
        };
        let largest = step.iter().map(|value| value.abs()).fold(0.0, f64::max);
        let damping = if largest > MAX_LOG_STEP {
            MAX_LOG_STEP / largest
        } else {
            1.0
        };
        for index in 0..unknowns {
            state[index] += damping * step[index];
        }
        iterations += 1;
    }

    let converged = residual < context.tolerance;
    if !converged {
        tracing::debug!(
            temperature,
            gas_pressure,
            residual,
            iterations,
            "GAS did not reach tolerance"
        );
    }

    let kt = BOLTZMANN * temperature;
    let density = terms
        .iter()
        .zip(&pressures)
        .map(|(term, pressure)| pressure * term.mass)
        .sum::<f64>()
        * AMU
        / kt;
    let mean_molecular_weight = density / (gas_pressure / kt * AMU);

    Ok(ChemicalState {
        temperature,
        gas_pressure,
        electron_pressure: state[electron_index].exp(),
        density,
        mean_molecular_weight,
        partial_pressures: pressures,
        converged,
        residual,
        iterations,
    })
}

fn initial_state(
    context: &ChemicalEquilibriumContext<'_>,
    terms: &[SpeciesTerm],
    temperature: f64,
    gas_pressure: f64,
    seed: Option<&GasSeed>,
) -> Vec<f64> {
    let registry = context.registry;
    let element_count = registry.elements().len();

    if let Some(seed) = seed.filter(|seed| {
        seed.partial_pressures.len() == terms.len()
            && seed.gas_pressure > 0.0
            && seed.electron_pressure > 0.0
    }) {
        let shift = (gas_pressure / seed.gas_pressure).ln();
        let hydrogen = registry.element_by_symbol("H").map_or(0, |id| id.0);
        let hydrogen_nuclei: f64 = terms
            .iter()
            .zip(&seed.partial_pressures)
            .flat_map(|(term, pressure)| {
                term.constituents
                    .iter()
                    .filter(|(element, _)| *element == hydrogen)
                    .map(move |(_, count)| count * pressure)
            })
            .sum();
        let mut state: Vec<f64> = registry
            .elements()
            .iter()
            .map(|element| {
                let neutral = element.stages[0].0;
                seed.partial_pressures[neutral].max(PRESSURE_FLOOR).ln() + shift
            })
            .collect();
        state.push(seed.electron_pressure.ln() + shift);
        state.push(hydrogen_nuclei.max(PRESSURE_FLOOR).ln() + shift);
        return state;
    }

    let guess = estimate(registry, context.abundances, temperature, gas_pressure);
    let mut state: Vec<f64> = guess.atom_pressures.iter().map(|value| value.ln()).collect();
    debug_assert_eq!(state.len(), element_count);
    state.push(guess.electron_pressure.ln());
    state.push(guess.hydrogen_nuclei_pressure.max(PRESSURE_FLOOR).ln());
    state
}

fn species_pressures(terms: &[SpeciesTerm], state: &[f64], electron_index: usize) -> Vec<f64> {
    let ln_electrons = state[electron_index];
    terms
        .iter()
        .map(|term| {
            let ln_pressure = term
                .constituents
                .iter()
                .map(|(element, count)| count * state[*element])
                .sum::<f64>()
                - term.charge * ln_electrons
                + term.constant;
            ln_pressure.min(LN_PRESSURE_CEILING).exp()
        })
        .collect()
}

/// Rescale each element's neutral pressure so its nuclei total matches the
/// abundance target, holding the other unknowns fixed.
fn conservation_sweeps(
    abundances: &[f64],
    terms: &[SpeciesTerm],
    state: &mut [f64],
    nuclei_index: usize,
    electron_index: usize,
) {
    let element_count = abundances.len();
    for _ in 0..CONSERVATION_SWEEPS {
        let pressures = species_pressures(terms, state, electron_index);
        let mut totals = vec![0.0; element_count];
        let mut weighted = vec![0.0; element_count];
        for (term, pressure) in terms.iter().zip(&pressures) {
            for (element, count) in &term.constituents {
                totals[*element] += count * pressure;
                weighted[*element] += count * count * pressure;
            }
        }
        let nuclei = state[nuclei_index].exp();
        for element in 0..element_count {
            if totals[element] > 0.0 && weighted[element] > 0.0 {
                let stoichiometry = weighted[element] / totals[element];
                state[element] +=
                    (abundances[element] * nuclei / totals[element]).ln() / stoichiometry;
            }
        }
    }
}

/// Row-scaled residuals and Jacobian with respect to the log unknowns.
fn assemble_system(
    abundances: &[f64],
    terms: &[SpeciesTerm],
    pressures: &[f64],
    state: &[f64],
    gas_pressure: f64,
) -> (Vec<f64>, DenseMatrix) {
    let element_count = abundances.len();
    let electron_row = element_count;
    let charge_row = element_count + 1;
    let electron_col = element_count;
    let nuclei_col = element_count + 1;
    let size = element_count + 2;

    let electron_pressure = state[electron_col].exp();
    let nuclei = state[nuclei_col].exp();
    let mut residuals = vec![0.0; size];
    let mut jacobian = DenseMatrix::zeros(size, size);

    for (term, pressure) in terms.iter().zip(pressures) {
        let charge = term.charge;
        for (element, count) in &term.constituents {
            residuals[*element] += count * pressure;
            for (other, other_count) in &term.constituents {
                jacobian[(*element, *other)] += count * other_count * pressure;
            }
            jacobian[(*element, electron_col)] -= charge * count * pressure;
            jacobian[(electron_row, *element)] += count * pressure;
            jacobian[(charge_row, *element)] += charge * count * pressure;
        }
        residuals[electron_row] += pressure;
        residuals[charge_row] += charge * pressure;
        jacobian[(electron_row, electron_col)] -= charge * pressure;
        jacobian[(charge_row, electron_col)] -= charge * charge * pressure;
    }

    for element in 0..element_count {
        residuals[element] -= abundances[element] * nuclei;
        jacobian[(element, nuclei_col)] = -abundances[element] * nuclei;
    }
    residuals[electron_row] += electron_pressure - gas_pressure;
    jacobian[(electron_row, electron_col)] += electron_pressure;
    residuals[charge_row] -= electron_pressure;
    jacobian[(charge_row, electron_col)] -= electron_pressure;

    let scales: Vec<f64> = abundances
        .iter()
        .map(|abundance| abundance * nuclei)
        .chain([gas_pressure, electron_pressure])
        .collect();
    for row in 0..size {
        let scale = scales[row].max(PRESSURE_FLOOR);
        residuals[row] /= scale;
        for col in 0..size {
            jacobian[(row, col)] /= scale;
        }
    }

    (residuals, jacobian)
}

#[cfg(test)]
mod tests {
    use super::{solve, ChemicalEquilibriumContext, GasError};
    use crate::common::constants::{AMU, BOLTZMANN};
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
    fn converged_state_conserves_charge_and_pressure() {
        let registry = SpeciesRegistry::standard().expect("registry");
        let abundances = registry.abundances(AbundanceOffsets::default());
        let context = ChemicalEquilibriumContext::new(&registry, &abundances);

        for (temperature, gas_pressure) in [(3_000.0, 1.0e5), (4_000.0, 1.0e4), (5_500.0, 1.0e5)] {
            let state = solve(&context, temperature, gas_pressure, None).expect("solve");
            assert!(state.converged, "T={temperature} residual={}", state.residual);
            assert!(state.charge_residual(&registry) < 1.0e-2);
            let total: f64 = state.partial_pressures.iter().sum::<f64>() + state.electron_pressure;
            assert_scalar_close("P_gas", gas_pressure, total, 0.0, 1.0e-2);
            assert!(state.partial_pressures.iter().all(|pressure| *pressure >= 0.0));
        }
    }

    #[test]
    fn cool_gas_forms_molecular_hydrogen_and_monoxide() {
        let registry = SpeciesRegistry::standard().expect("registry");
        let abundances = registry.abundances(AbundanceOffsets::default());
        let context = ChemicalEquilibriumContext::new(&registry, &abundances);
        let state = solve(&context, 3_000.0, 1.0e5, None).expect("solve");

        let h2 = state.partial_pressure(registry.by_name("H2").expect("H2"));
        let co = state.partial_pressure(registry.by_name("CO").expect("CO"));
        let c_i = state.partial_pressure(registry.by_name("C I").expect("C I"));
        assert!(h2 > 1.0e-2 * state.gas_pressure, "H2={h2}");
        assert!(co > 100.0 * c_i, "CO={co} C I={c_i}");

        let mu = state.mean_molecular_weight;
        assert!(mu > 1.2 && mu < 2.5, "mu={mu}");
        let expected_density = mu * AMU * state.gas_pressure / (BOLTZMANN * 3_000.0);
        assert_scalar_close("rho", expected_density, state.density, 0.0, 1.0e-12);
    }

    #[test]
    fn warm_start_reproduces_cold_start() {
        let registry = SpeciesRegistry::standard().expect("registry");
        let abundances = registry.abundances(AbundanceOffsets::default());
        let context = ChemicalEquilibriumContext::new(&registry, &abundances);
        let cold = solve(&context, 4_500.0, 2.0e4, None).expect("cold");
        let warm = solve(&context, 4_500.0, 2.2e4, Some(&cold.seed())).expect("warm");
        assert!(warm.converged);
        assert!(warm.iterations <= cold.iterations.max(3));
        assert!(warm.electron_pressure > cold.electron_pressure);
    }

    #[test]
    fn iteration_cap_returns_best_effort_state() {
        let registry = SpeciesRegistry::standard().expect("registry");
        let abundances = registry.abundances(AbundanceOffsets::default());
        let context =
            ChemicalEquilibriumContext::new(&registry, &abundances).with_limits(1.0e-14, 0);
        let state = solve(&context, 4_000.0, 1.0e4, None).expect("solve");
        assert!(!state.converged);
        assert_eq!(state.iterations, 0);
        assert!(state.residual.is_finite());
    }

    #[test]
    fn invalid_state_is_rejected() {
        let registry = SpeciesRegistry::standard().expect("registry");
        let abundances = registry.abundances(AbundanceOffsets::default());
        let context = ChemicalEquilibriumContext::new(&registry, &abundances);
        let error = solve(&context, -1.0, 1.0e4, None).expect_err("negative T");
        assert_eq!(
            error,
            GasError::InvalidState {
                temperature: -1.0,
                gas_pressure: 1.0e4
            }
        );
    }
}

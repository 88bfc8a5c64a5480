//! The outer iteration: chemistry -> opacity -> hydrostatics, repeated a fixed
//! number of passes (or until the gas pressure settles), then one closing
//! evaluation that yields the structure and its depth scale.

use serde::Serialize;
use tracing::{debug, info, warn};

use super::hydrostatic::{
    depth_scale, integrate_pressure, radiation_pressure, HydrostaticInput, MAX_RADIATION_FRACTION,
};
use super::reference::{select_model, ReferenceScaling, REFERENCE_HELIUM};
use super::temperature::temperature_structure;
use super::{AtmosphereStructure, DepthGrid};
use crate::chemistry::{solve, ChemicalEquilibriumContext, GasSeed};
use crate::common::constants::{AMU, BOLTZMANN};
use crate::domain::config::{PressureOpacity, ResolvedConfig};
use crate::domain::errors::AtmosResult;
use crate::domain::{CancellationToken, ClampedParameter, EngineStage, StellarParameters};
use crate::ionization::{
    converge_electron_density, stages_from_partial_pressures, ElectronIterationInput, StagePopulationTable,
    LN_DENSITY_FLOOR, MAX_TRACKED_STAGES,
};
use crate::numerics::log_spaced;
use crate::opacity::{
    continuum_table, reference_opacity, rosseland_mean, AbsorberInput, AbsorberSpecies, DepthAbsorbers,
    OpacityTable, LN_KAPPA_FLOOR,
};
use crate::registry::{SpeciesId, SpeciesRegistry};

/// Outer residual below which a run without an explicit tolerance counts as converged.
pub const DEFAULT_OUTER_TOLERANCE: f64 = 1.0e-2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChemistryPath {
    Gas,
    Saha,
}

/// How the chemistry at one depth was solved in the closing evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChemistryStatus {
    pub path: ChemistryPath,
    pub converged: bool,
    pub residual: f64,
    pub iterations: usize,
    /// Relative N_e change per inner pass; empty on GAS depths.
    pub electron_residuals: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvergenceResult {
    pub converged: bool,
    /// max |d ln P_gas| of the last outer pass.
    pub residual: f64,
    pub passes: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BuildDiagnostics {
    pub clamps: Vec<ClampedParameter>,
    pub reference_model: String,
    pub chemistry: Vec<ChemistryStatus>,
    pub outer_residuals: Vec<f64>,
    /// Failed post-conditions on the final structure.
    pub violations: Vec<String>,
    /// Depths where radiation pressure was held at its cap.
    pub radiation_capped_depths: Vec<usize>,
    pub cancelled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AtmosphereModel {
    pub stellar: StellarParameters,
    pub structure: AtmosphereStructure,
    pub convergence: ConvergenceResult,
    pub diagnostics: BuildDiagnostics,
    #[serde(skip)]
    pub stages: StagePopulationTable,
    #[serde(skip)]
    pub absorbers: Vec<DepthAbsorbers>,
    #[serde(skip)]
    pub continuum: OpacityTable,
    #[serde(skip)]
    pub abundances: Vec<f64>,
}

struct DepthChemistry {
    row: Vec<[f64; MAX_TRACKED_STAGES]>,
    electron_density: f64,
    density: f64,
    mean_molecular_weight: f64,
    ln_molecular_hydrogen: f64,
    ln_titanium_oxide: f64,
    seed: Option<GasSeed>,
    status: ChemistryStatus,
}

/// Chemistry, populations and opacity for one set of pressures.
struct PassState {
    chemistry: Vec<DepthChemistry>,
    stages: StagePopulationTable,
    absorbers: Vec<DepthAbsorbers>,
    continuum: OpacityTable,
    ln_kappa_rosseland: Vec<f64>,
    ln_kappa_500: Vec<f64>,
}

/// Read-only inputs shared by every pass.
struct BuildContext {
    grid: DepthGrid,
    temperature: Vec<f64>,
    wavelengths_nm: Vec<f64>,
    abundances: Vec<f64>,
    species: AbsorberSpecies,
}

pub struct AtmosphereBuilder<'a> {
    registry: &'a SpeciesRegistry,
    resolved: &'a ResolvedConfig,
    cancellation: Option<CancellationToken>,
}

impl<'a> AtmosphereBuilder<'a> {
    pub fn new(registry: &'a SpeciesRegistry, resolved: &'a ResolvedConfig) -> Self {
        Self {
            registry,
            resolved,
            cancellation: None,
        }
    }

    /// Poll `token` between outer passes.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    fn cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }

    pub fn build(&self) -> AtmosResult<AtmosphereModel> {
        let config = &self.resolved.config;
        let stellar = self.resolved.stellar;
        let grid = DepthGrid::new(&config.depth);
        let ln_tau = grid.ln_tau().to_vec();
        let abundances = self.registry.abundances(stellar.abundance_offsets());
        let helium = self
            .registry
            .element_by_symbol("He")
            .map_or(REFERENCE_HELIUM, |id| abundances[id.0]);
        let reference = select_model(stellar.teff, stellar.log_g);
        let scaling = ReferenceScaling {
            teff: stellar.teff,
            log_g: stellar.log_g,
            log_z: stellar.log_z,
            helium,
        };
        let context = BuildContext {
            temperature: temperature_structure(config.temperature_law, &stellar, &ln_tau),
            wavelengths_nm: log_spaced(
                config.continuum.lambda_min_nm,
                config.continuum.lambda_max_nm,
                config.continuum.count,
            ),
            species: AbsorberSpecies::resolve(self.registry)?,
            abundances,
            grid,
        };
        info!(
            teff = stellar.teff,
            log_g = stellar.log_g,
            reference = reference.name,
            depths = ln_tau.len(),
            "building atmosphere"
        );

        debug!(stage = %EngineStage::SeedGuess, "seeding pressures from reference model");
        let mut gas_pressure = reference.gas_pressure(&scaling, &ln_tau);
        let mut electron_seed: Vec<f64> = reference
            .electron_pressure(&scaling, &ln_tau)
            .iter()
            .zip(&context.temperature)
            .map(|(pressure, temperature)| pressure / (BOLTZMANN * temperature))
            .collect();
        let mut radiation: Vec<f64> = context.temperature.iter().map(|t| radiation_pressure(*t)).collect();
        let mut radiation_capped_depths = Vec::new();
        let mut total_pressure: Vec<f64> = gas_pressure
            .iter()
            .zip(&radiation)
            .map(|(gas, radiation)| gas + radiation)
            .collect();
        let mut seeds: Vec<Option<GasSeed>> = vec![None; ln_tau.len()];
        let mut outer_residuals = Vec::with_capacity(config.iteration.outer);
        let mut cancelled = false;

        for pass in 0..config.iteration.outer {
            if pass > 0 && self.cancelled() {
                warn!(pass, "atmosphere build cancelled");
                cancelled = true;
                break;
            }
            let state = self.evaluate(&context, &gas_pressure, &electron_seed, &seeds)?;

            debug!(pass, stage = %EngineStage::PressureIntegrate, "integrating hydrostatic equilibrium");
            let pressures = integrate_pressure(HydrostaticInput {
                gravity: stellar.gravity(),
                ln_tau: &ln_tau,
                ln_kappa: self.pressure_opacity(&state),
                temperature: &context.temperature,
                total_guess: &total_pressure,
            })?;
            let residual = max_ln_change(&gas_pressure, &pressures.gas);
            outer_residuals.push(residual);
            debug!(pass, residual, "outer pass complete");

            electron_seed = state.chemistry.iter().map(|depth| depth.electron_density).collect();
            seeds = state.chemistry.into_iter().map(|depth| depth.seed).collect();
            gas_pressure = pressures.gas;
            total_pressure = pressures.total;
            radiation = pressures.radiation;
            radiation_capped_depths = pressures.capped;
            if config
                .iteration
                .outer_tolerance
                .is_some_and(|tolerance| residual < tolerance)
            {
                break;
            }
        }

        debug!(stage = %EngineStage::DepthScaleBuild, "closing evaluation");
        let state = self.evaluate(&context, &gas_pressure, &electron_seed, &seeds)?;
        let density: Vec<f64> = state.chemistry.iter().map(|depth| depth.density).collect();
        let depth_cm = depth_scale(&ln_tau, self.pressure_opacity(&state), &density)?;
        let structure = AtmosphereStructure {
            radiation_pressure: radiation,
            electron_density: state.chemistry.iter().map(|depth| depth.electron_density).collect(),
            mean_molecular_weight: state
                .chemistry
                .iter()
                .map(|depth| depth.mean_molecular_weight)
                .collect(),
            ln_kappa_rosseland: state.ln_kappa_rosseland,
            ln_kappa_500: state.ln_kappa_500,
            ln_tau,
            temperature: context.temperature,
            total_pressure,
            gas_pressure,
            density,
            depth_cm,
        };

        let mut clamps = self.resolved.clamps.clone();
        if let Some(fraction) = radiation_capped_depths
            .iter()
            .map(|depth| radiation_pressure(structure.temperature[*depth]) / structure.total_pressure[*depth])
            .reduce(f64::max)
        {
            warn!(
                depths = radiation_capped_depths.len(),
                fraction,
                "radiation pressure capped"
            );
            clamps.push(ClampedParameter {
                name: "radiationPressureFraction".to_string(),
                requested: fraction,
                applied: MAX_RADIATION_FRACTION,
            });
        }

        let violations = post_condition_violations(&structure);
        for violation in &violations {
            warn!(%violation, "structure post-condition failed");
        }
        let residual = outer_residuals.last().copied().unwrap_or(f64::INFINITY);
        let tolerance = config.iteration.outer_tolerance.unwrap_or(DEFAULT_OUTER_TOLERANCE);
        let convergence = ConvergenceResult {
            converged: !cancelled && violations.is_empty() && residual <= tolerance,
            residual,
            passes: outer_residuals.len(),
        };
        let chemistry: Vec<ChemistryStatus> = state.chemistry.into_iter().map(|depth| depth.status).collect();
        let unconverged = chemistry.iter().filter(|status| !status.converged).count();
        if unconverged > 0 {
            warn!(depths = unconverged, "chemistry did not reach tolerance at some depths");
        }
        if !convergence.converged {
            warn!(residual, passes = convergence.passes, "atmosphere did not converge");
        }
        info!(stage = %EngineStage::Converged, residual, passes = convergence.passes, "atmosphere built");

        Ok(AtmosphereModel {
            stellar,
            structure,
            convergence,
            diagnostics: BuildDiagnostics {
                clamps,
                reference_model: reference.name.to_string(),
                chemistry,
                outer_residuals,
                violations,
                radiation_capped_depths,
                cancelled,
            },
            stages: state.stages,
            absorbers: state.absorbers,
            continuum: state.continuum,
            abundances: context.abundances,
        })
    }

    fn pressure_opacity<'s>(&self, state: &'s PassState) -> &'s [f64] {
        match self.resolved.config.opacity.pressure_opacity {
            PressureOpacity::Rosseland => &state.ln_kappa_rosseland,
            PressureOpacity::Reference500 => &state.ln_kappa_500,
        }
    }

    fn evaluate(
        &self,
        context: &BuildContext,
        gas_pressure: &[f64],
        electron_seed: &[f64],
        seeds: &[Option<GasSeed>],
    ) -> AtmosResult<PassState> {
        let config = &self.resolved.config;
        let mode = config.execution_mode;
        debug!(stage = %EngineStage::ChemistrySolve, "solving chemistry");
        let chemistry = mode
            .map_range(context.grid.len(), |depth| {
                self.depth_chemistry(
                    context,
                    context.temperature[depth],
                    gas_pressure[depth],
                    electron_seed[depth],
                    seeds[depth].as_ref(),
                )
            })
            .into_iter()
            .collect::<AtmosResult<Vec<_>>>()?;

        debug!(stage = %EngineStage::OpacityBuild, "building continuum opacity");
        let stages = StagePopulationTable::from_depth_rows(chemistry.iter().map(|depth| depth.row.clone()).collect());
        let absorbers: Vec<DepthAbsorbers> = chemistry
            .iter()
            .enumerate()
            .map(|(depth, state)| {
                context.species.depth_absorbers(
                    self.registry,
                    AbsorberInput {
                        stages: &stages,
                        depth,
                        temperature: context.temperature[depth],
                        density: state.density,
                        electron_density: state.electron_density,
                        ln_molecular_hydrogen: state.ln_molecular_hydrogen,
                        ln_titanium_oxide: state.ln_titanium_oxide,
                    },
                )
            })
            .collect();
        let fudge = config.opacity.log_kap_fudge;
        let continuum = continuum_table(&context.wavelengths_nm, &absorbers, fudge, mode)?;
        let ln_kappa_rosseland = rosseland_mean(&continuum, &context.temperature)?;
        let ln_kappa_500 = reference_opacity(&absorbers, fudge);
        Ok(PassState {
            chemistry,
            stages,
            absorbers,
            continuum,
            ln_kappa_rosseland,
            ln_kappa_500,
        })
    }

    fn depth_chemistry(
        &self,
        context: &BuildContext,
        temperature: f64,
        gas_pressure: f64,
        electron_seed: f64,
        seed: Option<&GasSeed>,
    ) -> AtmosResult<DepthChemistry> {
        let iteration = &self.resolved.config.iteration;
        if temperature < iteration.gas_temperature {
            let equilibrium = ChemicalEquilibriumContext::new(self.registry, &context.abundances)
                .with_limits(iteration.gas_tolerance, iteration.gas_max_iterations);
            let state = solve(&equilibrium, temperature, gas_pressure, seed)?;
            let ln_number = |species: SpeciesId| {
                let density = state.number_density(species);
                if density > 0.0 {
                    density.ln().max(LN_DENSITY_FLOOR)
                } else {
                    LN_DENSITY_FLOOR
                }
            };
            return Ok(DepthChemistry {
                row: stages_from_partial_pressures(self.registry, &state.partial_pressures, temperature),
                electron_density: state.electron_density(),
                density: state.density,
                mean_molecular_weight: state.mean_molecular_weight,
                ln_molecular_hydrogen: ln_number(context.species.molecular_hydrogen()),
                ln_titanium_oxide: ln_number(context.species.titanium_oxide()),
                status: ChemistryStatus {
                    path: ChemistryPath::Gas,
                    converged: state.converged,
                    residual: state.residual,
                    iterations: state.iterations,
                    electron_residuals: Vec::new(),
                },
                seed: Some(state.seed()),
            });
        }

        debug!(stage = %EngineStage::InnerElectronConverge, temperature, "Saha electron iteration");
        let saha = converge_electron_density(ElectronIterationInput {
            registry: self.registry,
            abundances: &context.abundances,
            temperature,
            gas_pressure,
            electron_density_seed: electron_seed,
            passes: iteration.inner,
            tolerance: iteration.inner_tolerance,
        })?;
        let particles = gas_pressure / (BOLTZMANN * temperature);
        let nuclei = (particles - saha.electron_density).max(0.0);
        let abundance_sum: f64 = context.abundances.iter().sum();
        let density: f64 = self
            .registry
            .elements()
            .iter()
            .zip(&context.abundances)
            .map(|(element, abundance)| nuclei * abundance / abundance_sum * element.mass * AMU)
            .sum();
        let residual = saha.residuals.last().copied().unwrap_or(0.0);
        Ok(DepthChemistry {
            row: saha.ln_density,
            electron_density: saha.electron_density,
            density,
            mean_molecular_weight: density / (AMU * particles),
            ln_molecular_hydrogen: LN_DENSITY_FLOOR,
            ln_titanium_oxide: LN_DENSITY_FLOOR,
            seed: None,
            status: ChemistryStatus {
                path: ChemistryPath::Saha,
                converged: iteration.inner_tolerance.is_none_or(|tolerance| residual < tolerance),
                residual,
                iterations: saha.residuals.len(),
                electron_residuals: saha.residuals,
            },
        })
    }
}

fn max_ln_change(previous: &[f64], next: &[f64]) -> f64 {
    previous
        .iter()
        .zip(next)
        .map(|(old, new)| (new.ln() - old.ln()).abs())
        .fold(0.0, f64::max)
}

/// Positivity of pressures and density, finite opacities above the floor, and
/// non-decreasing pressures with depth.
fn post_condition_violations(structure: &AtmosphereStructure) -> Vec<String> {
    let mut violations = Vec::new();
    for (name, values) in [
        ("gas pressure", &structure.gas_pressure),
        ("total pressure", &structure.total_pressure),
        ("density", &structure.density),
    ] {
        if let Some((depth, value)) = values
            .iter()
            .enumerate()
            .find(|(_, value)| !(value.is_finite() && **value > 0.0))
        {
            violations.push(format!("{name} is {value} at depth {depth}"));
        }
    }
    for (name, values) in [
        ("Rosseland opacity", &structure.ln_kappa_rosseland),
        ("500 nm opacity", &structure.ln_kappa_500),
    ] {
        if let Some((depth, value)) = values
            .iter()
            .enumerate()
            .find(|(_, value)| !(value.is_finite() && **value > LN_KAPPA_FLOOR))
        {
            violations.push(format!("{name} (ln) is {value} at depth {depth}"));
        }
    }
    if let Some(depth) = (0..structure.depth_count()).find(|depth| {
        let total = structure.total_pressure[*depth];
        let sum = structure.gas_pressure[*depth] + structure.radiation_pressure[*depth];
        (sum - total).abs() > 1.0e-9 * total.abs()
    }) {
        violations.push(format!("gas and radiation pressure do not sum to the total at depth {depth}"));
    }
    for (name, values) in [
        ("gas pressure", &structure.gas_pressure),
        ("total pressure", &structure.total_pressure),
    ] {
        if let Some(depth) = values.windows(2).position(|pair| pair[1] < pair[0]) {
            violations.push(format!("{name} decreases below depth {depth}"));
        }
    }
    violations
}

#[cfg(test)]
mod tests {
    use super::{max_ln_change, post_condition_violations, AtmosphereBuilder, ChemistryPath};
    use crate::atmosphere::AtmosphereStructure;
    use crate::domain::{CancellationToken, EngineConfig, StellarInput};
    use crate::registry::SpeciesRegistry;

    fn structure() -> AtmosphereStructure {
        AtmosphereStructure {
            ln_tau: vec![-1.0, 0.0, 1.0],
            temperature: vec![5_000.0, 6_000.0, 7_000.0],
            total_pressure: vec![1.0, 2.0, 3.0],
            gas_pressure: vec![1.0, 2.0, 3.0],
            radiation_pressure: vec![0.0; 3],
            density: vec![1.0e-8; 3],
            electron_density: vec![1.0e12; 3],
            mean_molecular_weight: vec![1.3; 3],
            ln_kappa_rosseland: vec![0.0; 3],
            ln_kappa_500: vec![0.0; 3],
            depth_cm: vec![0.0, 1.0, 2.0],
        }
    }

    #[test]
    fn post_conditions_flag_decreasing_pressure_and_bad_density() {
        assert!(post_condition_violations(&structure()).is_empty());
        let mut broken = structure();
        broken.gas_pressure[2] = 0.5;
        broken.density[1] = f64::NAN;
        let violations = post_condition_violations(&broken);
        assert_eq!(violations.len(), 3, "{violations:?}");
        assert!(violations.iter().any(|line| line.contains("gas pressure decreases")));
        assert!(violations.iter().any(|line| line.contains("do not sum to the total at depth 2")));
    }

    #[test]
    fn residual_is_the_largest_log_change() {
        let change = max_ln_change(&[1.0, 10.0], &[2.0, 10.0]);
        assert!((change - 2.0_f64.ln()).abs() < 1.0e-12);
    }

    fn small_config(teff: f64, log_g: f64) -> EngineConfig {
        let mut config = EngineConfig {
            stellar: StellarInput {
                teff,
                log_g,
                ..StellarInput::default()
            },
            ..EngineConfig::default()
        };
        config.depth.count = 24;
        config.continuum.count = 80;
        config.iteration.outer = 5;
        config
    }

    #[test]
    fn hot_star_uses_saha_everywhere_and_reports_inner_residuals() {
        let registry = SpeciesRegistry::standard().expect("registry");
        let resolved = small_config(9_600.0, 4.0).resolve().expect("config");
        let model = AtmosphereBuilder::new(&registry, &resolved).build().expect("model");
        assert!(model
            .diagnostics
            .chemistry
            .iter()
            .all(|status| status.path == ChemistryPath::Saha && !status.electron_residuals.is_empty()));
        assert_eq!(model.diagnostics.outer_residuals.len(), 5);
        assert_eq!(model.diagnostics.reference_model, "phoenix-10000-4.0");
        assert!(model.structure.gas_pressure.iter().all(|p| *p > 0.0));
    }

    #[test]
    fn cancellation_stops_after_the_first_pass() {
        let registry = SpeciesRegistry::standard().expect("registry");
        let resolved = small_config(9_600.0, 4.0).resolve().expect("config");
        let token = CancellationToken::new();
        token.cancel();
        let model = AtmosphereBuilder::new(&registry, &resolved)
            .with_cancellation(token)
            .build()
            .expect("best effort model");
        assert!(model.diagnostics.cancelled);
        assert!(!model.convergence.converged);
        assert_eq!(model.convergence.passes, 1);
        assert_eq!(model.structure.depth_count(), 24);
    }
}

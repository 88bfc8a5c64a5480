use super::CliError;
use super::helpers::{load_engine_config, write_json};
use anyhow::Context;
use atmos_core::atmosphere::AtmosphereModel;
use atmos_core::domain::params::PRESETS;
use atmos_core::lines::{catalogue_keys, catalogue_line};
use atmos_core::Engine;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

#[derive(clap::Args, Debug, Default)]
pub(super) struct RunArgs {
    /// Engine config JSON; flags below override its fields
    #[arg(long)]
    pub(super) config: Option<PathBuf>,
    /// Built-in star to start from (see `presets`)
    #[arg(long)]
    pub(super) preset: Option<String>,
    /// Effective temperature in K
    #[arg(long)]
    pub(super) teff: Option<f64>,
    /// Surface gravity, log10 of cm/s^2
    #[arg(long = "logg")]
    pub(super) log_g: Option<f64>,
    /// Metallicity [Fe/H] in dex
    #[arg(long = "log-z", allow_hyphen_values = true)]
    pub(super) log_z: Option<f64>,
    /// Stellar mass in solar masses
    #[arg(long)]
    pub(super) mass: Option<f64>,
    /// Catalogue line key to synthesize; repeatable
    #[arg(long = "line")]
    pub(super) lines: Vec<String>,
    /// Outer hydrostatic passes
    #[arg(long)]
    pub(super) outer_iter: Option<usize>,
    /// Inner electron-density passes per depth
    #[arg(long)]
    pub(super) inner_iter: Option<usize>,
    /// Number of depth points
    #[arg(long)]
    pub(super) depths: Option<usize>,
    /// Skip the TiO band opacity
    #[arg(long)]
    pub(super) no_tio: bool,
    /// Evaluate depths and wavelengths on the rayon pool
    #[arg(long)]
    pub(super) parallel: bool,
    /// Write JSON here instead of stdout
    #[arg(long)]
    pub(super) output: Option<PathBuf>,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct ModelOutput<'a> {
    stellar: &'a atmos_core::domain::StellarParameters,
    structure: &'a atmos_core::atmosphere::AtmosphereStructure,
    convergence: &'a atmos_core::atmosphere::ConvergenceResult,
    diagnostics: &'a atmos_core::atmosphere::BuildDiagnostics,
}

impl<'a> From<&'a AtmosphereModel> for ModelOutput<'a> {
    fn from(model: &'a AtmosphereModel) -> Self {
        Self {
            stellar: &model.stellar,
            structure: &model.structure,
            convergence: &model.convergence,
            diagnostics: &model.diagnostics,
        }
    }
}

pub(super) fn run_model_command(args: RunArgs) -> Result<i32, CliError> {
    let config = load_engine_config(&args)?;
    let engine = Engine::new(&config)?;
    let model = engine.build_model()?;
    info!(
        converged = model.convergence.converged,
        passes = model.convergence.passes,
        "model atmosphere built"
    );
    write_json(&ModelOutput::from(&model), args.output.as_deref())?;
    Ok(0)
}

pub(super) fn run_spectrum_command(args: RunArgs) -> Result<i32, CliError> {
    let config = load_engine_config(&args)?;
    let report = Engine::new(&config)?.run()?;
    info!(
        lines = report.lines.len(),
        recovered_teff = report.recovered_teff,
        "spectrum synthesized"
    );
    write_json(&report, args.output.as_deref())?;
    Ok(0)
}

pub(super) fn run_presets_command() -> Result<i32, CliError> {
    let mut stdout = std::io::stdout().lock();
    for preset in PRESETS {
        writeln!(
            stdout,
            "{:<10} teff={:>8.0} logG={:>5.2} logZ={:>5.2} mass={:>4.1}",
            preset.name, preset.teff, preset.log_g, preset.log_z, preset.mass
        )
        .context("failed to write preset list")?;
    }
    Ok(0)
}

pub(super) fn run_lines_command() -> Result<i32, CliError> {
    let mut stdout = std::io::stdout().lock();
    for key in catalogue_keys() {
        let line = catalogue_line(key)?;
        writeln!(
            stdout,
            "{:<10} {:>10.3} nm  {} {}",
            key, line.wavelength_nm, line.element, line.stage
        )
        .context("failed to write line list")?;
    }
    Ok(0)
}

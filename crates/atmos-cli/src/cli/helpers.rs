use super::CliError;
use super::commands::RunArgs;
use anyhow::Context;
use atmos_core::domain::params::find_preset;
use atmos_core::lines::LineSelection;
use atmos_core::{AtmosError, EngineConfig, ExecutionMode};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Start from `--config` or `--preset` (or the solar default), then apply flag overrides.
pub(super) fn load_engine_config(args: &RunArgs) -> Result<EngineConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path).map_err(|error| {
                CliError::Compute(AtmosError::input_validation(
                    "INPUT.CONFIG",
                    format!("failed to read config '{}': {}", path.display(), error),
                ))
            })?;
            EngineConfig::from_json_str(&text)?
        }
        None => EngineConfig::default(),
    };

    if let Some(name) = &args.preset {
        let preset = find_preset(name)?;
        config.stellar = preset.to_input();
    }
    apply_overrides(&mut config, args);
    Ok(config)
}

fn apply_overrides(config: &mut EngineConfig, args: &RunArgs) {
    if let Some(teff) = args.teff {
        config.stellar.teff = teff;
    }
    if let Some(log_g) = args.log_g {
        config.stellar.log_g = log_g;
    }
    if let Some(log_z) = args.log_z {
        config.stellar.log_z = log_z;
    }
    if let Some(mass) = args.mass {
        config.stellar.mass = mass;
    }
    if let Some(outer) = args.outer_iter {
        config.iteration.outer = outer;
    }
    if let Some(inner) = args.inner_iter {
        config.iteration.inner = inner;
    }
    if let Some(count) = args.depths {
        config.depth.count = count;
    }
    if args.no_tio {
        config.opacity.jola.enabled = false;
    }
    if args.parallel {
        config.execution_mode = ExecutionMode::Parallel;
    }
    config
        .lines
        .extend(args.lines.iter().cloned().map(LineSelection::Catalogue));
}

/// Pretty JSON to `output`, or to stdout when no path is given.
pub(super) fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<(), CliError> {
    let rendered =
        serde_json::to_string_pretty(value).context("failed to serialize JSON output")?;
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
                fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create output directory '{}'", parent.display())
                })?;
            }
            fs::write(path, format!("{rendered}\n"))
                .with_context(|| format!("failed to write '{}'", path.display()))?;
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{rendered}").context("failed to write to stdout")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{apply_overrides, load_engine_config};
    use crate::cli::commands::RunArgs;
    use atmos_core::{EngineConfig, ExecutionMode};

    #[test]
    fn preset_then_flags_override_the_default_star() {
        let args = RunArgs {
            preset: Some("Arcturus".to_string()),
            teff: Some(4_300.0),
            lines: vec!["na-d1".to_string()],
            parallel: true,
            ..RunArgs::default()
        };
        let config = load_engine_config(&args).expect("config");
        assert_eq!(config.stellar.teff, 4_300.0);
        assert_eq!(config.stellar.log_g, 2.0);
        assert_eq!(config.execution_mode, ExecutionMode::Parallel);
        assert_eq!(config.lines.len(), 1);
    }

    #[test]
    fn unknown_preset_is_a_lookup_failure() {
        let args = RunArgs {
            preset: Some("betelgeuse".to_string()),
            ..RunArgs::default()
        };
        let error = load_engine_config(&args).expect_err("unknown preset");
        assert_eq!(error.as_atmos_error().exit_code(), 3);
    }

    #[test]
    fn tio_switch_disables_bands() {
        let mut config = EngineConfig::default();
        let args = RunArgs {
            no_tio: true,
            depths: Some(30),
            ..RunArgs::default()
        };
        apply_overrides(&mut config, &args);
        assert!(!config.opacity.jola.enabled);
        assert_eq!(config.depth.count, 30);
    }
}

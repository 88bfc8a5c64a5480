mod commands;
mod helpers;

use atmos_core::AtmosError;
use clap::Parser;
use tracing_subscriber::EnvFilter;

pub fn run_from_env() -> i32 {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(args) {
        Ok(code) => code,
        Err(error) => {
            let atmos_error = error.as_atmos_error();
            eprintln!("{}", atmos_error.diagnostic_line());
            if let Some(summary_line) = atmos_error.fatal_exit_line() {
                eprintln!("{}", summary_line);
            }
            atmos_error.exit_code()
        }
    }
}

pub fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let full_args = std::iter::once("lte-atmos".to_string())
        .chain(args.into_iter().map(Into::into))
        .collect::<Vec<_>>();
    parse_and_dispatch(full_args)
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => {
            init_logging(cli.verbose);
            dispatch_parsed(cli.command)
        }
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{}", err);
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

/// `RUST_LOG` wins; otherwise warnings only, or debug with `--verbose`.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Parser)]
#[command(name = "lte-atmos", about = "LTE model atmospheres and spectrum synthesis")]
struct Cli {
    /// Log every outer pass and stage at debug level
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Build a model atmosphere and write its structure as JSON
    Model(commands::RunArgs),
    /// Build a model atmosphere and synthesize its spectrum
    Spectrum(commands::RunArgs),
    /// List the built-in stellar presets
    Presets,
    /// List the built-in line catalogue
    Lines,
}

fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Model(args) => commands::run_model_command(args),
        CliCommand::Spectrum(args) => commands::run_spectrum_command(args),
        CliCommand::Presets => commands::run_presets_command(),
        CliCommand::Lines => commands::run_lines_command(),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Compute(AtmosError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<AtmosError> for CliError {
    fn from(error: AtmosError) -> Self {
        Self::Compute(error)
    }
}

impl CliError {
    fn as_atmos_error(&self) -> AtmosError {
        match self {
            Self::Usage(message) => AtmosError::input_validation("INPUT.CLI_USAGE", message.clone()),
            Self::Compute(error) => error.clone(),
            Self::Internal(error) => AtmosError::internal("IO.CLI", format!("{error:#}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{run, CliError};

    #[test]
    fn unknown_subcommand_is_a_usage_error() {
        let error = run(["orbit"]).expect_err("unknown command");
        assert!(matches!(error, CliError::Usage(_)));
        assert_eq!(error.as_atmos_error().exit_code(), 2);
    }

    #[test]
    fn help_exits_cleanly() {
        assert_eq!(run(["--help"]).expect("help"), 0);
    }
}

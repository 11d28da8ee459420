mod commands;

use clap::Parser;
use jetraa_core::domain::RaaError;
use std::sync::Once;
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

pub fn run_from_env() -> i32 {
    init_tracing();
    match run(std::env::args().skip(1)) {
        Ok(code) => code,
        Err(error) => {
            let raa_error = error.as_raa_error();
            println!("{}", raa_error.diagnostic_line());
            println!("{}", raa_error.fatal_exit_line());
            raa_error.exit_code()
        }
    }
}

pub fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let full_args = std::iter::once("jetraa".to_string())
        .chain(args.into_iter().map(Into::into))
        .collect::<Vec<_>>();
    match Cli::try_parse_from(&full_args) {
        Ok(cli) => commands::run_analyze_command(cli.analyze),
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{}", err);
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

/// Log level comes from `RUST_LOG`, defaulting to warnings; stdout stays
/// reserved for progress and diagnostics.
fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}

#[derive(Parser)]
#[command(
    name = "jetraa",
    version,
    about = "Jet nuclear modification factors (RAA, RRAA) from generator jet trees"
)]
struct Cli {
    #[command(flatten)]
    analyze: commands::AnalyzeArgs,
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Compute(RaaError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<RaaError> for CliError {
    fn from(error: RaaError) -> Self {
        Self::Compute(error)
    }
}

impl CliError {
    fn as_raa_error(&self) -> RaaError {
        match self {
            Self::Usage(message) => RaaError::configuration("INPUT.CLI_USAGE", message.trim_end()),
            Self::Compute(error) => error.clone(),
            Self::Internal(error) => RaaError::io_system("IO.CLI", format!("{error:#}")),
        }
    }
}

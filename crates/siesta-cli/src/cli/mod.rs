mod commands;

use clap::Parser;
use siesta_core::domain::SiestaError;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const PROGRAM_NAME: &str = "siesta-parse";

pub fn run_from_env() -> i32 {
    match run(std::env::args().skip(1)) {
        Ok(code) => code,
        Err(error) => {
            let compatibility_error = error.as_siesta_error();
            eprintln!("{}", compatibility_error.diagnostic_line());
            if let Some(summary_line) = compatibility_error.fatal_exit_line() {
                eprintln!("{}", summary_line);
            }
            compatibility_error.exit_code()
        }
    }
}

pub fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let full_args = std::iter::once(PROGRAM_NAME.to_string())
        .chain(args.into_iter().map(Into::into))
        .collect::<Vec<_>>();
    parse_and_dispatch(full_args)
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => {
            init_tracing(cli.verbose);
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

/// `RUST_LOG` decides the filter unless `--verbose` asks for debug output.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    // Only the first installed subscriber takes effect.
    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[derive(Parser)]
#[command(name = "siesta-parse", version, about = "Parse SIESTA run logs into JSON archives")]
struct Cli {
    /// Log debug diagnostics to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Parse a SIESTA output log
    Parse(commands::ParseArgs),
    /// Dump the parameters, blocks and geometry of an FDF input deck
    Fdf(commands::FdfArgs),
}

fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Parse(args) => commands::run_parse_command(args),
        CliCommand::Fdf(args) => commands::run_fdf_command(args),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Parse(SiestaError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CliError {
    fn as_siesta_error(&self) -> SiestaError {
        match self {
            Self::Usage(message) => SiestaError::input_validation("INPUT.CLI_USAGE", message.clone()),
            Self::Parse(error) => error.clone(),
            Self::Internal(error) => SiestaError::io_system("IO.CLI", format!("{error:#}")),
        }
    }
}

//! polybind CLI - Multi-target binding generator
//!
//! Commands:
//! - `polybind generate` - Generate and write bindings for a service definition
//! - `polybind check` - Verify previously generated files against a definition
//! - `polybind targets` - List the supported targets and their conventions
//!
//! The process exit status is the error code of the failing
//! [`GenerationError`], or 1 for I/O and parse failures.

use clap::{Parser, Subcommand};
use polybind_core::GenerationError;
use std::path::PathBuf;
use std::process::ExitCode;

mod check;
mod generate;
mod loader;
mod logging;
mod writer;

#[derive(Parser)]
#[command(name = "polybind")]
#[command(author, version, about = "Schema-driven binding generator", long_about = None)]
struct Cli {
    /// Path to polybind.toml (default: ./polybind.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level regardless of configuration
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate bindings for a service definition (.json or .toml)
    Generate {
        /// Service definition file
        input: PathBuf,

        /// Restrict to these targets (java, javascript, cpp); repeatable
        #[arg(short, long = "target")]
        targets: Vec<String>,

        /// Base directory the output roots are resolved against
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Emit targets one after another instead of in parallel
        #[arg(long)]
        sequential: bool,

        /// Verify and list the files without writing them
        #[arg(long)]
        dry_run: bool,
    },

    /// Verify generated files on disk against a service definition
    Check {
        /// Service definition file
        input: PathBuf,

        /// Restrict to these targets; repeatable
        #[arg(short, long = "target")]
        targets: Vec<String>,

        /// Base directory the output roots are resolved against
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// List supported targets
    Targets,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = loader::load_config(cli.config.as_deref())?;
    logging::init(&config.log_level, cli.verbose);

    match cli.command {
        Commands::Generate {
            input,
            targets,
            output,
            sequential,
            dry_run,
        } => {
            let config = generate::apply_overrides(config, &targets, sequential)?;
            generate::run(&input, config, &output, dry_run)?;
        }
        Commands::Check {
            input,
            targets,
            output,
        } => {
            let config = generate::apply_overrides(config, &targets, false)?;
            check::run(&input, config, &output)?;
        }
        Commands::Targets => {
            generate::list_targets();
        }
    }

    Ok(())
}

/// Exit status for an error: the generation error code when there is one.
fn exit_code(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<GenerationError>())
        .map_or(1, GenerationError::error_code)
}

//! Binary entry point for the propdoc CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Does App\Post have a `title` property?
//! propdoc --manifest classes.json has --class 'App\Post' --property title
//!
//! # Resolve it
//! propdoc --manifest classes.json get --class 'App\Post' --property title
//!
//! # Every annotation property, in merge order
//! propdoc --manifest classes.json list --class 'App\Post'
//! ```

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use propdoc::cli::{run_get, run_has, run_list, Project};
use propdoc_core::error::{OutputErrorCode, PropdocError};
use propdoc_core::output::{emit_response, ErrorResponse};

// ============================================================================
// CLI Structure
// ============================================================================

/// Resolve documented virtual properties across class hierarchies.
///
/// All output is JSON on stdout.
#[derive(Parser, Debug)]
#[command(
    name = "propdoc",
    version,
    about = "Resolve @property annotations across class hierarchies"
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Class manifest (JSON).
    #[arg(long, global = true)]
    manifest: Option<PathBuf>,

    /// Base directory for source files (default: the manifest's directory).
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Log level for tracing output.
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// CLI subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Check whether a class has a property.
    Has {
        /// Class name (leading `\` optional, case-insensitive).
        #[arg(long)]
        class: String,
        /// Property name, without `$`.
        #[arg(long)]
        property: String,
    },
    /// Resolve one property of a class.
    Get {
        /// Class name (leading `\` optional, case-insensitive).
        #[arg(long)]
        class: String,
        /// Property name, without `$`.
        #[arg(long)]
        property: String,
    },
    /// List the annotation properties of a class.
    List {
        /// Class name (leading `\` optional, case-insensitive).
        #[arg(long)]
        class: String,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.global.log_level);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let error_code = OutputErrorCode::from(&err);
            let response = ErrorResponse::from_error(&err);

            // Errors go to stdout as JSON, like every other response
            let _ = emit_response(&response, &mut io::stdout());
            let _ = io::stdout().flush();

            ExitCode::from(error_code.code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Execute the CLI command.
fn execute(cli: Cli) -> Result<(), PropdocError> {
    let manifest = cli
        .global
        .manifest
        .as_deref()
        .ok_or_else(|| PropdocError::invalid_args("--manifest is required"))?;
    let project = Project::open(manifest, cli.global.root.as_deref())?;

    let mut stdout = io::stdout();
    let written = match cli.command {
        Command::Has { class, property } => {
            emit_response(&run_has(&project, &class, &property)?, &mut stdout)
        }
        Command::Get { class, property } => {
            emit_response(&run_get(&project, &class, &property)?, &mut stdout)
        }
        Command::List { class } => emit_response(&run_list(&project, &class)?, &mut stdout),
    };
    written.map_err(|e| PropdocError::internal(format!("failed to write output: {}", e)))
}

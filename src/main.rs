mod commands;
mod config;
mod diagnostics;
mod error;
mod grammar;
mod hover;
mod loader;
mod locator;
mod lookup;
mod metadata;
mod navigator;
mod pointer;
mod position;
mod resolver;
mod scanner;
mod syntax;
mod types;
mod watch;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

/// Command-line interface.
#[derive(Parser)]
#[command(
    name = "schemaref",
    about = "Resolve and validate JSON Schema $ref pointers",
    version
)]
struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(action = ArgAction::Count, global = true, long, short)]
    verbose: u8,
}

/// Subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Report every `$ref` that does not resolve
    Check {
        /// Output format
        #[arg(default_value = "text", long, value_enum)]
        format: OutputFormat,
        /// Files or directories to scan
        #[arg(default_value = ".")]
        paths: Vec<PathBuf>,
    },
    /// Show what the `$ref` at a position points to
    Lookup {
        /// JSON document containing the reference
        file: PathBuf,
        /// Output format
        #[arg(default_value = "text", long, value_enum)]
        format: OutputFormat,
        /// Byte offset, or 1-based `line:column`
        position: String,
    },
    /// Re-check references whenever a document changes
    Watch {
        /// Output format
        #[arg(default_value = "text", long, value_enum)]
        format: OutputFormat,
        /// Files or directories to watch
        #[arg(default_value = ".")]
        paths: Vec<PathBuf>,
    },
}

/// Output format for findings and lookups.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON on stdout.
    Json,
    /// Human-readable lines on stdout.
    Text,
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| return EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Check { format, paths } => commands::check(&paths, format),
        Commands::Lookup {
            file,
            format,
            position,
        } => commands::lookup(&file, &position, format),
        Commands::Watch { format, paths } => watch::run(&paths, format),
    };

    return match result {
        Ok(code) => code,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::from(3_u8)
        },
    };
}

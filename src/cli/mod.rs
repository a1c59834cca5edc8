//! CLI layer: argument parsing, logging setup and command dispatch.

pub mod args;
mod scan;

pub use args::*;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

// ─── CLI ─────────────────────────────────────────────────────────────

/// Classifies Moq Setup/Verify/Callback/Returns calls in C# sources
#[derive(Parser, Debug)]
#[command(name = "moq-complete", version, about, after_help = "\
Run 'moq-complete <COMMAND> --help' for detailed options.\n\
Example: moq-complete scan tests/ --format json")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Build one model from all matched files and report Moq fluent calls
    Scan(ScanArgs),
}

// ─── Main entry point ───────────────────────────────────────────────

pub fn run() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Scan(args) => {
            init_logging(&args.log_level, args.log_json);
            scan::cmd_scan(args)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Logs go to stderr; `RUST_LOG` wins over `--log-level`.
fn init_logging(level: &str, json: bool) {
    let level = match level {
        "error" | "warn" | "info" | "debug" | "trace" => level,
        _ => "warn",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

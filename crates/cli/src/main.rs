//! Swiftcheck CLI - Main Entry Point
//!
//! Runs conformance suites against a Singlish-to-Sinhala translator page
//! and reports per-case results.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{check, init, run, ui};

/// Swiftcheck - conformance harness for transliteration UIs
#[derive(Parser)]
#[command(name = "swiftcheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Harness config file
    #[arg(short, long, default_value = "swiftcheck.toml", env = "SWIFTCHECK_CONFIG", global = true)]
    config: PathBuf,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run fixture suites in a browser
    Run(run::RunArgs),

    /// Run UI behaviour scenarios
    Ui(ui::UiArgs),

    /// Validate config and fixtures, list cases
    Check(check::CheckArgs),

    /// Write a default config file
    Init(init::InitArgs),
}

async fn dispatch(cli: Cli) -> anyhow::Result<bool> {
    let load = || commands::load_config(&cli.config);
    match cli.command {
        Commands::Run(args) => run::execute(args, load()?, cli.format).await,
        Commands::Ui(args) => ui::execute(args, load()?, cli.format).await,
        Commands::Check(args) => check::execute(args, load()?, cli.format),
        Commands::Init(args) => init::execute(args, &cli.config),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .init();

    match dispatch(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            ExitCode::from(2)
        }
    }
}

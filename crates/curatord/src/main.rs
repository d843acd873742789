//! Command line front end for the `curator` paper pipeline.
//!
//! It wires the library's stages to a local store and a TOML configuration:
//! - Ingesting raw paper records from a JSONL file
//! - Exporting per-day Markdown digests, CSV sheets and JSONL files
//! - Enriching a day's papers with LLM-generated commentary
//! - Filling in missing title and abstract translations
//!
//! # Usage
//!
//! ```bash
//! # Store a crawl
//! curator ingest crawl/2025-01-06.jsonl
//!
//! # Export a week in every format
//! curator export --from 2025-01-06 --until 2025-01-10
//!
//! # Enrich one day against a local server
//! PROVIDER=local OPENAI_BASE_URL=http://127.0.0.1:1234/v1 curator enrich --date 2025-01-06
//!
//! # Show the store
//! curator status
//! ```
//!
//! Logging goes to standard error and is raised with `-v` (repeatable) or `RUST_LOG`.

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{builder::ArgAction, Args, Parser, Subcommand};
use curator::{config::Config, database::Database, prelude::*};
use tracing::debug;
use tracing_subscriber::EnvFilter;

pub mod commands;
pub mod error;
pub mod interaction;

use crate::{commands::*, error::*, interaction::*};

/// Command line interface configuration and argument parsing
#[derive(Parser)]
#[command(author, version, about = "Ingest, export and enrich arXiv paper metadata")]
pub struct Cli {
  /// Verbose mode (-v, -vv, -vvv) for different levels of logging detail
  #[arg(
        short,
        long,
        action = ArgAction::Count,
        global = true,
        help = "Increase logging verbosity"
    )]
  verbose: u8,

  /// Path to the configuration file. Defaults to the platform-specific config directory.
  #[arg(long, short, global = true)]
  config: Option<PathBuf>,

  /// Path to the paper store, overriding the configuration.
  #[arg(long, short, global = true)]
  database: Option<PathBuf>,

  /// The subcommand to execute
  #[command(subcommand)]
  command: Commands,
}

/// Configures the logging system based on the verbosity level
///
/// The verbosity levels are:
/// - 0: error (default)
/// - 1: warn
/// - 2: info
/// - 3: debug
/// - 4+: trace
fn setup_logging(verbosity: u8) {
  let filter = match verbosity {
    0 => "error",
    1 => "warn",
    2 => "info",
    3 => "debug",
    _ => "trace",
  };

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_file(true)
    .with_line_number(true)
    .with_thread_ids(true)
    .with_target(true)
    .init();
}

/// Reads the configuration file, then applies environment and flag overrides.
fn load_config(cli: &Cli) -> Result<Config> {
  let path = cli.config.clone().unwrap_or_else(Config::default_path);
  debug!("Loading configuration from {}", path.display());
  let config = Config::load(&path)?.with_env()?;
  Ok(match &cli.database {
    Some(database) => config.with_database_path(database),
    None => config,
  })
}

/// Entry point for the curator CLI application
///
/// # Errors
///
/// Any failure is printed to standard error and ends the process with exit code 1.
#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();
  setup_logging(cli.verbose);

  let terminal = Terminal;
  let outcome = match load_config(&cli) {
    Ok(config) => run(&terminal, config, cli.command).await,
    Err(e) => Err(e),
  };
  if let Err(e) = outcome {
    terminal.reply(ResponseContent::Error(&e))?;
    std::process::exit(1);
  }
  Ok(())
}

/// Dispatches a subcommand.
async fn run<I: UserInteraction>(interaction: &I, config: Config, command: Commands) -> Result<()> {
  match command {
    Commands::Ingest(options) => ingest(interaction, config, options).await,
    Commands::Export(options) => export(interaction, config, options).await,
    Commands::Enrich(options) => enrich(interaction, config, options).await,
    Commands::Translate(options) => translate(interaction, config, options).await,
    Commands::Status => status(interaction, config).await,
  }
}

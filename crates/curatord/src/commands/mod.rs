use super::*;

pub mod enrich;
pub mod export;
pub mod ingest;
pub mod status;
pub mod translate;

pub use enrich::{enrich, EnrichOptions};
pub use export::{export, ExportOptions};
pub use ingest::{ingest, IngestOptions};
pub use status::status;
pub use translate::{translate, TranslateOptions};

/// Available commands for the CLI
#[derive(Subcommand, Clone)]
pub enum Commands {
  /// Store raw paper records from a JSONL file
  Ingest(IngestOptions),

  /// Write per-day Markdown, CSV and JSONL exports for a date range
  Export(ExportOptions),

  /// Attach LLM commentary to one day's papers
  Enrich(EnrichOptions),

  /// Translate stored titles and abstracts that have no translation yet
  Translate(TranslateOptions),

  /// Show what the paper store holds
  Status,
}

/// Opens the configured paper store.
async fn open_database(config: &Config) -> Result<Database> {
  Ok(Database::open(&config.database_path).await?)
}

//! Module for storing raw paper records

use curator::ingest::{self, JsonlSource};

use super::*;

#[derive(Args, Clone)]
pub struct IngestOptions {
  /// Newline-delimited JSON file of raw records, newest first
  pub file: PathBuf,
}

/// Function for the [`Commands::Ingest`] in the CLI.
pub async fn ingest<I: UserInteraction>(
  interaction: &I,
  config: Config,
  options: IngestOptions,
) -> Result<()> {
  let mut db = open_database(&config).await?;
  let mut source = JsonlSource::new(&options.file);
  let report = ingest::ingest(&mut db, &mut source).await?;

  if report.new == 0 {
    interaction.reply(ResponseContent::Info(&format!(
      "No new papers in {}, refreshed {} stored rows",
      options.file.display(),
      report.stored
    )))?;
  }
  interaction.reply(ResponseContent::Success(&format!(
    "Stored {} papers ({} new) in {}",
    report.stored,
    report.new,
    config.database_path.display()
  )))
}

//! Module for enriching a day's papers

use curator::export::{DateRange, Exporter};

use super::*;

#[derive(Args, Clone)]
pub struct EnrichOptions {
  /// Day whose papers are enriched (YYYY-MM-DD)
  #[arg(long)]
  pub date: NaiveDate,

  /// Language the commentary is written in
  #[arg(long)]
  pub language: Option<String>,

  /// Number of papers processed at once
  #[arg(long)]
  pub workers: Option<usize>,
}

/// Function for the [`Commands::Enrich`] in the CLI.
pub async fn enrich<I: UserInteraction>(
  interaction: &I,
  config: Config,
  options: EnrichOptions,
) -> Result<()> {
  let config = match options.language {
    Some(language) => config.with_language(language),
    None => config,
  };
  let config = match options.workers {
    Some(workers) => config.with_workers(workers),
    None => config,
  };

  let enricher = config.enricher()?;
  interaction.reply(ResponseContent::Info(&format!(
    "Enriching {} with {} ({}) in {}",
    options.date,
    config.enrichment.model,
    enricher.provider(),
    enricher.language()
  )))?;

  let db = open_database(&config).await?;
  let exporter = Exporter::new(db, DateRange::day(options.date), config.filter.clone())
    .with_filename_format(&config.output.filename_format);
  let reports = exporter.to_enriched_jsonl(&config.output.jsonl_dir, &enricher).await?;

  for report in &reports {
    if report.degraded > 0 {
      interaction.reply(ResponseContent::Warning(&format!(
        "{} of {} papers carry placeholder commentary",
        report.degraded,
        report.records.len()
      )))?;
    }
  }
  let enriched: usize = reports.iter().map(|report| report.enriched).sum();
  interaction.reply(ResponseContent::Success(&format!(
    "Enriched {enriched} papers into {}",
    config.output.jsonl_dir.display()
  )))
}

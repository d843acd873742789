//! Module for describing the paper store

use super::*;

/// Function for the [`Commands::Status`] in the CLI.
pub async fn status<I: UserInteraction>(interaction: &I, config: Config) -> Result<()> {
  let db = open_database(&config).await?;
  let count = db.len().await?;
  let pending = db.pending_translations().await?.len();

  let mut items = vec![
    ("Store".to_owned(), config.database_path.display().to_string()),
    ("Papers".to_owned(), count.to_string()),
    ("Awaiting translation".to_owned(), pending.to_string()),
  ];
  if count > 0 {
    let newest = db.newest_ingest_time().await?;
    items.push(("Last ingest".to_owned(), newest.format("%Y-%m-%d %H:%M:%S UTC").to_string()));
  }
  items.push(("Provider".to_owned(), config.enrichment.provider.to_string()));
  items.push(("Model".to_owned(), config.enrichment.model.clone()));
  interaction.reply(ResponseContent::Listing("Paper store", &items))
}

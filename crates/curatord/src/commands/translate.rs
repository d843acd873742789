//! Module for filling in missing translations

use curator::translate::translate_missing;

use super::*;

#[derive(Args, Clone)]
pub struct TranslateOptions {
  /// Target language code, e.g. `zh-CN`
  #[arg(long)]
  pub to: Option<String>,
}

/// Function for the [`Commands::Translate`] in the CLI.
pub async fn translate<I: UserInteraction>(
  interaction: &I,
  config: Config,
  options: TranslateOptions,
) -> Result<()> {
  let target = options.to.unwrap_or_else(|| config.translation.target.clone());
  let client = config.chat_client()?;
  let db = open_database(&config).await?;

  let summary = translate_missing(&db, &client, &target).await?;
  if summary.pending == 0 {
    return interaction.reply(ResponseContent::Info("Every stored paper is already translated"));
  }
  if summary.failed > 0 {
    interaction.reply(ResponseContent::Warning(&format!(
      "{} papers could not be translated, run again to retry them",
      summary.failed
    )))?;
  }
  interaction.reply(ResponseContent::Success(&format!(
    "Translated {} of {} papers into {target}",
    summary.translated, summary.pending
  )))
}

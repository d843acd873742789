//! Module for writing per-day exports

use curator::export::{DateRange, Exporter};

use super::*;

#[derive(Args, Clone)]
pub struct ExportOptions {
  /// First day to export (YYYY-MM-DD)
  #[arg(long)]
  pub from: NaiveDate,

  /// Last day to export, inclusive (YYYY-MM-DD). Defaults to `--from`.
  #[arg(long)]
  pub until: Option<NaiveDate>,

  /// Write Markdown digests
  #[arg(long, action = ArgAction::SetTrue)]
  pub markdown: bool,

  /// Write CSV sheets
  #[arg(long, action = ArgAction::SetTrue)]
  pub csv: bool,

  /// Write JSONL files
  #[arg(long, action = ArgAction::SetTrue)]
  pub jsonl: bool,
}

impl ExportOptions {
  /// With no format flag, every format is written.
  fn all_formats(&self) -> bool { !(self.markdown || self.csv || self.jsonl) }
}

/// Function for the [`Commands::Export`] in the CLI.
pub async fn export<I: UserInteraction>(
  interaction: &I,
  config: Config,
  options: ExportOptions,
) -> Result<()> {
  let range = DateRange::new(options.from, options.until.unwrap_or(options.from))?;
  let db = open_database(&config).await?;
  let exporter = Exporter::new(db, range, config.filter.clone())
    .with_filename_format(&config.output.filename_format);

  let all = options.all_formats();
  let mut written = Vec::new();
  if all || options.markdown {
    written.extend(exporter.to_markdown(&config.output.markdown_dir).await?);
  }
  if all || options.csv {
    written.extend(exporter.to_csv(&config.output.csv_dir, &config.csv).await?);
  }
  if all || options.jsonl {
    written.extend(exporter.to_jsonl(&config.output.jsonl_dir).await?);
  }

  let files: Vec<(String, String)> = written
    .iter()
    .map(|path| {
      let name = path.file_name().map(|name| name.to_string_lossy().into_owned());
      (name.unwrap_or_default(), path.display().to_string())
    })
    .collect();
  interaction.reply(ResponseContent::Listing("Written files", &files))?;
  interaction.reply(ResponseContent::Success(&format!(
    "Exported {} days from {} to {}",
    range.days().count(),
    range.from(),
    range.until()
  )))
}

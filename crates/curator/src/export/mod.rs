//! Per-day exports of the paper store.
//!
//! An [`Exporter`] walks an inclusive [`DateRange`] one calendar day at a time. For each
//! day it fetches the papers announced that day, runs them through the
//! [`CategoryFilter`], and writes one output file per format:
//!
//! - `{day}.md`: a human-readable digest grouped by primary category
//! - `{day}.csv`: accepted rows followed by rejected rows, with the rejection reason
//! - `{day}.jsonl`: one [`JsonlRecord`] per accepted paper
//! - `{day}_AI_enhanced_{language}.jsonl`: the same records after enrichment
//!
//! Every file is rendered in memory and then written in one go, replacing whatever was
//! there. The same store state always produces byte-identical files.
//!
//! ```no_run
//! use curator::{
//!   database::Database,
//!   export::{CsvOptions, DateRange, Exporter},
//!   filter::CategoryFilter,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::open("papers.db").await?;
//! let exporter =
//!   Exporter::new(db, DateRange::parse("2025-01-06", "2025-01-07")?, CategoryFilter::default());
//! exporter.to_markdown("./output_md").await?;
//! exporter.to_csv("./output_csv", &CsvOptions::default()).await?;
//! exporter.to_jsonl("./data").await?;
//! # Ok(())
//! # }
//! ```

use crate::{
  database::Query,
  enrich::{EnrichmentReport, Enricher},
  filter::{CategoryFilter, ExportRecord},
};

use super::*;

mod jsonl;
mod markdown;
mod sheet;

pub use self::{
  jsonl::JsonlRecord,
  markdown::render_markdown,
  sheet::{CsvOptions, LineTerminator, CSV_HEADERS},
};

/// Default `strftime` layout of output file names.
pub const DEFAULT_FILENAME_FORMAT: &str = "%Y-%m-%d";

/// An inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
  /// First day, inclusive
  from:  NaiveDate,
  /// Last day, inclusive
  until: NaiveDate,
}

impl DateRange {
  /// Creates a range, failing when `from` lies after `until`.
  pub fn new(from: NaiveDate, until: NaiveDate) -> Result<Self> {
    if from > until {
      return Err(CuratorError::InvalidDateRange { from, until });
    }
    Ok(Self { from, until })
  }

  /// A range covering exactly one day.
  pub fn day(day: NaiveDate) -> Self { Self { from: day, until: day } }

  /// Parses a range from two `YYYY-MM-DD` strings.
  pub fn parse(from: &str, until: &str) -> Result<Self> {
    Self::new(parse_day(from)?, parse_day(until)?)
  }

  /// First day of the range.
  pub fn from(&self) -> NaiveDate { self.from }

  /// Last day of the range.
  pub fn until(&self) -> NaiveDate { self.until }

  /// Every day of the range, in order.
  pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
    let until = self.until;
    self.from.iter_days().take_while(move |day| *day <= until)
  }
}

/// Parses a `YYYY-MM-DD` date.
pub fn parse_day(day: &str) -> Result<NaiveDate> {
  Ok(NaiveDate::parse_from_str(day.trim(), "%Y-%m-%d")?)
}

/// Renders the store into per-day output files.
#[derive(Clone)]
pub struct Exporter {
  /// Store the papers are read from
  db:              Database,
  /// Days to export
  range:           DateRange,
  /// Filter deciding which papers are of interest
  filter:          CategoryFilter,
  /// `strftime` layout of output file names
  filename_format: String,
}

impl Exporter {
  /// Creates an exporter over `range` using the default file name layout.
  pub fn new(db: Database, range: DateRange, filter: CategoryFilter) -> Self {
    Self { db, range, filter, filename_format: DEFAULT_FILENAME_FORMAT.to_owned() }
  }

  /// Sets the `strftime` layout used to name output files.
  pub fn with_filename_format(mut self, format: impl Into<String>) -> Self {
    self.filename_format = format.into();
    self
  }

  /// The exported date range.
  pub fn range(&self) -> DateRange { self.range }

  /// File stem for `day`.
  fn file_stem(&self, day: NaiveDate) -> String { day.format(&self.filename_format).to_string() }

  /// Fetches one day's papers and splits them into `(accepted, rejected)`.
  async fn records_on(&self, day: NaiveDate) -> Result<(Vec<ExportRecord>, Vec<ExportRecord>)> {
    let papers = Query::on_date(day).execute(&mut self.db.clone()).await?;
    Ok(self.filter.partition(papers))
  }

  /// Writes one Markdown digest per day into `dir`.
  pub async fn to_markdown(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = prepare_dir(dir.as_ref()).await?;
    let mut written = Vec::new();
    for day in self.range.days() {
      let stem = self.file_stem(day);
      let (accepted, rejected) = self.records_on(day).await?;
      let path = dir.join(format!("{stem}.md"));
      tokio::fs::write(&path, render_markdown(&stem, &accepted, rejected.len())).await?;
      info!(
        "Output {stem}.md completed. {} papers chosen, {} papers filtered",
        accepted.len(),
        rejected.len()
      );
      written.push(path);
    }
    Ok(written)
  }

  /// Writes one CSV sheet per day into `dir`, accepted rows first.
  pub async fn to_csv(&self, dir: impl AsRef<Path>, options: &CsvOptions) -> Result<Vec<PathBuf>> {
    let dir = prepare_dir(dir.as_ref()).await?;
    let mut written = Vec::new();
    for day in self.range.days() {
      let stem = self.file_stem(day);
      let (accepted, rejected) = self.records_on(day).await?;
      let path = dir.join(format!("{stem}.csv"));
      let sheet = sheet::render_csv(accepted.iter().chain(rejected.iter()), options)?;
      tokio::fs::write(&path, sheet).await?;
      info!(
        "Output {stem}.csv completed. {} papers chosen, {} papers filtered",
        accepted.len(),
        rejected.len()
      );
      written.push(path);
    }
    Ok(written)
  }

  /// Writes one JSONL file per day into `dir`, holding accepted papers only.
  pub async fn to_jsonl(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = prepare_dir(dir.as_ref()).await?;
    let mut written = Vec::new();
    for day in self.range.days() {
      let stem = self.file_stem(day);
      let (accepted, _) = self.records_on(day).await?;
      let records: Vec<JsonlRecord> =
        accepted.iter().map(|record| JsonlRecord::from(&record.paper)).collect();
      let path = dir.join(format!("{stem}.jsonl"));
      tokio::fs::write(&path, jsonl::render_jsonl(&records)?).await?;
      info!("Output {stem}.jsonl completed. {} papers exported", records.len());
      written.push(path);
    }
    Ok(written)
  }

  /// Enriches each day's accepted papers and writes `{day}_AI_enhanced_{language}.jsonl`.
  ///
  /// A day's file is written only once every record of that day has been processed. The
  /// enricher also stores each paper's new AI content back into the store.
  pub async fn to_enriched_jsonl(
    &self,
    dir: impl AsRef<Path>,
    enricher: &Enricher,
  ) -> Result<Vec<EnrichmentReport>> {
    let dir = prepare_dir(dir.as_ref()).await?;
    let mut reports = Vec::new();
    for day in self.range.days() {
      let stem = self.file_stem(day);
      let (accepted, _) = self.records_on(day).await?;
      let records: Vec<JsonlRecord> =
        accepted.iter().map(|record| JsonlRecord::from(&record.paper)).collect();

      let report = enricher.run(records, &mut self.db.clone()).await;
      let name = format!("{stem}_AI_enhanced_{}.jsonl", enricher.language());
      tokio::fs::write(dir.join(&name), jsonl::render_jsonl(&report.records)?).await?;
      info!(
        "Output {name} completed. {} papers enhanced, {} degraded",
        report.records.len(),
        report.degraded
      );
      reports.push(report);
    }
    Ok(reports)
  }
}

/// Creates the output directory if needed.
async fn prepare_dir(dir: &Path) -> Result<PathBuf> {
  tokio::fs::create_dir_all(dir).await?;
  Ok(dir.to_path_buf())
}

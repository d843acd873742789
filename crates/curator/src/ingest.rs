//! Raw record producers and the ingestion pipeline.
//!
//! Scraping is out of this crate's hands: a [`PaperSource`] hands over candidate papers
//! and [`ingest`] stores them. Producers are expected to emit candidates newest first,
//! since [`Database::count_new_since`] stops counting at the first paper it already knows.
//!
//! ```no_run
//! use curator::{
//!   database::Database,
//!   ingest::{ingest, JsonlSource},
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut db = Database::open("papers.db").await?;
//! let mut source = JsonlSource::new("crawl/2025-01-06.jsonl");
//! let report = ingest(&mut db, &mut source).await?;
//! println!("{} new of {} fetched", report.new, report.fetched);
//! # Ok(())
//! # }
//! ```

use crate::database::Upsert;

use super::*;

/// A producer of candidate papers.
#[async_trait]
pub trait PaperSource: Send {
  /// Short label used in logs.
  fn name(&self) -> String;

  /// Fetches the next batch of candidates, newest first.
  ///
  /// `since` is the store's newest ingest time. Producers may use it to skip work
  /// they know is already stored.
  async fn fetch(&mut self, since: DateTime<Utc>) -> Result<Vec<Paper>>;
}

/// Reads raw paper records from a newline-delimited JSON file.
///
/// Each line carries at least `url`, `title`, `abstract`, `categories`,
/// `first_submitted_date` and `first_announced_date`. `authors` may be an array or a
/// comma-separated string.
#[derive(Debug, Clone)]
pub struct JsonlSource {
  /// File to read
  path: PathBuf,
}

impl JsonlSource {
  /// Creates a source reading `path`.
  pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }
}

#[async_trait]
impl PaperSource for JsonlSource {
  fn name(&self) -> String { self.path.display().to_string() }

  async fn fetch(&mut self, since: DateTime<Utc>) -> Result<Vec<Paper>> {
    trace!("Reading {} in full, ignoring since={since}", self.path.display());
    let text = tokio::fs::read_to_string(&self.path).await?;
    let mut papers = Vec::new();
    for (number, line) in text.lines().enumerate().filter(|(_, line)| !line.trim().is_empty()) {
      let paper: Paper = serde_json::from_str(line).map_err(|e| {
        warn!("Unreadable record on line {} of {}", number + 1, self.path.display());
        e
      })?;
      papers.push(paper);
    }
    Ok(papers)
  }
}

/// Outcome of one ingestion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
  /// Candidates handed over by the source
  pub fetched: usize,
  /// Candidates ahead of the first already-known URL
  pub new:     usize,
  /// Rows written, new and replaced
  pub stored:  usize,
}

/// Fetches one batch from `source` and stores it.
///
/// The batch is all-or-nothing: a single candidate without an announced date rejects the
/// whole batch with [`CuratorError::MissingAnnouncedDate`] and nothing is written.
pub async fn ingest(db: &mut Database, source: &mut dyn PaperSource) -> Result<IngestReport> {
  let since = db.newest_ingest_time().await?;
  let papers = source.fetch(since).await?;
  let fetched = papers.len();
  let new = db.count_new_since(&papers).await?;
  debug!("{} yielded {fetched} candidates, {new} new", source.name());

  let stored = Upsert::papers(papers).execute(db).await?;
  info!("Ingested {stored} papers from {} ({new} new)", source.name());
  Ok(IngestReport { fetched, new, stored })
}

#[cfg(test)]
mod tests {
  use super::*;

  const RAW: &str = r#"
{"url": "https://arxiv.org/abs/2501.00002", "title": "Second", "authors": ["Ada Lovelace"], "abstract": "B", "comments": "No comments", "categories": ["cs.CV"], "first_submitted_date": "2025-01-05", "first_announced_date": "2025-01-06"}

{"url": "https://arxiv.org/abs/2501.00001", "title": "First", "authors": "Ada Lovelace, Alan Turing", "abstract": "A", "categories": ["cs.AI", "cs.LG"], "first_submitted_date": "2025-01-04", "first_announced_date": "2025-01-06"}
"#;

  #[traced_test]
  #[tokio::test]
  async fn test_ingest_jsonl_twice() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("crawl.jsonl");
    std::fs::write(&path, RAW).unwrap();
    let mut db = Database::open(dir.path().join("papers.db")).await.unwrap();

    let mut source = JsonlSource::new(&path);
    let first = ingest(&mut db, &mut source).await.unwrap();
    assert_eq!(first, IngestReport { fetched: 2, new: 2, stored: 2 });

    let again = ingest(&mut db, &mut source).await.unwrap();
    assert_eq!(again, IngestReport { fetched: 2, new: 0, stored: 2 });
    assert_eq!(db.len().await.unwrap(), 2);
    assert!(logs_contain("Ingested 2 papers"));
  }

  #[traced_test]
  #[tokio::test]
  async fn test_missing_announced_date_rejects_batch() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("crawl.jsonl");
    let undated = r#"{"url": "https://arxiv.org/abs/2501.00003", "title": "T", "abstract": "C", "categories": ["cs.CV"], "first_submitted_date": "2025-01-05"}"#;
    std::fs::write(&path, format!("{RAW}{undated}\n")).unwrap();
    let mut db = Database::open_in_memory().await.unwrap();

    let err = ingest(&mut db, &mut JsonlSource::new(&path)).await.unwrap_err();
    assert!(matches!(err, CuratorError::MissingAnnouncedDate(_)));
    assert!(db.is_empty().await.unwrap());
  }
}

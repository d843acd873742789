//! Local SQLite entity store for paper records.
//!
//! The store is a single `papers` table keyed by the abstract URL. It is opened through
//! [`Database::open`], which also brings older table layouts up to date (see [`schema`]).
//!
//! All access goes through one `tokio-rusqlite` connection. Every call runs on the
//! connection's own thread, so reads and writes from concurrent tasks are serialized and
//! each call is atomic on its own. Nothing spans two calls: a read followed by a write is
//! two independent steps.
//!
//! Writes and lookups are expressed as instructions implementing
//! [`DatabaseInstruction`]:
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use curator::{
//!   database::{Database, Query, Upsert},
//!   prelude::*,
//! };
//!
//! # async fn example(papers: Vec<curator::paper::Paper>) -> Result<(), Box<dyn std::error::Error>> {
//! let mut db = Database::open("papers.db").await?;
//! Upsert::papers(papers).execute(&mut db).await?;
//!
//! let day = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
//! for paper in Query::on_date(day).execute(&mut db).await? {
//!   println!("{}: {}", paper.id(), paper.title);
//! }
//! # Ok(())
//! # }
//! ```

use rusqlite::Row;
use tokio_rusqlite::Connection;

use super::*;

pub mod instruction;
pub mod schema;
#[cfg(test)] mod tests;

pub use self::{instruction::*, schema::ColumnInfo};

/// Days to look back when the store is empty and has no ingestion history.
pub const COLD_START_LOOKBACK_DAYS: i64 = 30;

/// Columns selected whenever a full [`Paper`] is read back.
pub(crate) const PAPER_COLUMNS: &str = "url, title, authors, abstract, comments, categories, \
                                        first_submitted_date, first_announced_date, \
                                        title_translated, abstract_translated, ai_content";

/// Handle for interacting with the paper store.
///
/// Cloning a handle is cheap and every clone talks to the same underlying connection.
#[derive(Clone)]
pub struct Database {
  /// Async SQLite connection handle
  pub(crate) conn: Connection,
}

/// A stored paper that still lacks its title or abstract translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTranslation {
  /// Primary key of the row
  pub url:           String,
  /// Original title, `None` when it is already translated
  pub title:         Option<String>,
  /// Original abstract, `None` when it is already translated
  pub abstract_text: Option<String>,
}

impl Database {
  /// Opens an existing store or creates a new one at the specified path.
  ///
  /// Opening always runs the schema evolution step, which is idempotent: missing columns
  /// are added and backfilled from existing data, columns already present are left alone.
  ///
  /// # Examples
  ///
  /// ```no_run
  /// # use curator::database::Database;
  /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
  /// let db = Database::open("papers.db").await?;
  /// let db = Database::open(Database::default_path()).await?;
  /// # Ok(())
  /// # }
  /// ```
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
      std::fs::create_dir_all(parent)?;
    }
    debug!("Opening paper store at {}", path.display());
    let conn = Connection::open(path).await?;
    Self::initialize(conn).await
  }

  /// Opens a throwaway in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory().await?;
    Self::initialize(conn).await
  }

  /// Creates the table if needed and applies additive migrations.
  async fn initialize(conn: Connection) -> Result<Self> {
    let added = conn.call(|conn| Ok(schema::migrate(conn)?)).await?;
    for column in &added {
      info!("Added missing column: {column}");
    }
    Ok(Self { conn })
  }

  /// Returns the default path for the database file.
  ///
  /// - On Unix: `~/.local/share/curator/papers.db`
  /// - On macOS: `~/Library/Application Support/curator/papers.db`
  /// - On Windows: `%APPDATA%\curator\papers.db`
  /// - Fallback: `./curator/papers.db`
  pub fn default_path() -> PathBuf {
    dirs::data_dir().unwrap_or_else(|| PathBuf::from(".")).join("curator").join("papers.db")
  }

  /// Latest ingestion timestamp across all rows.
  ///
  /// An empty store reports [`COLD_START_LOOKBACK_DAYS`] days ago, so the first crawl
  /// catches up on a wide window instead of an empty one.
  pub async fn newest_ingest_time(&self) -> Result<DateTime<Utc>> {
    let newest = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("SELECT MAX(update_time) FROM papers", [], |row| {
          row.get::<_, Option<DateTime<Utc>>>(0)
        })?)
      })
      .await?;

    Ok(newest.unwrap_or_else(|| {
      debug!("Paper store is empty, looking back {COLD_START_LOOKBACK_DAYS} days");
      Utc::now() - Duration::days(COLD_START_LOOKBACK_DAYS)
    }))
  }

  /// Counts how many candidates are not stored yet.
  ///
  /// Candidates must arrive newest first: counting stops at the first URL that is already
  /// present, since everything after it is assumed to be known as well. A candidate list
  /// `[new1, new2, known1, new3]` therefore yields 2.
  pub async fn count_new_since(&self, candidates: &[Paper]) -> Result<usize> {
    let urls: Vec<String> = candidates.iter().map(|paper| paper.url.clone()).collect();
    Ok(
      self
        .conn
        .call(move |conn| {
          let mut stmt = conn.prepare_cached("SELECT 1 FROM papers WHERE url = ?1")?;
          let mut count = 0;
          for url in &urls {
            if stmt.exists([url])? {
              break;
            }
            count += 1;
          }
          Ok(count)
        })
        .await?,
    )
  }

  /// Physical column layout of the `papers` table.
  pub async fn columns(&self) -> Result<Vec<ColumnInfo>> {
    Ok(self.conn.call(|conn| Ok(schema::columns(conn)?)).await?)
  }

  /// Number of stored papers.
  pub async fn len(&self) -> Result<usize> {
    Ok(
      self
        .conn
        .call(|conn| {
          Ok(conn.query_row("SELECT COUNT(*) FROM papers", [], |row| row.get::<_, i64>(0))?)
        })
        .await?
        .try_into()
        .unwrap_or_default(),
    )
  }

  /// Whether the store holds no papers at all.
  pub async fn is_empty(&self) -> Result<bool> { Ok(self.len().await? == 0) }

  /// Rows missing either their title or abstract translation.
  pub async fn pending_translations(&self) -> Result<Vec<PendingTranslation>> {
    Ok(
      self
        .conn
        .call(|conn| {
          let mut stmt = conn.prepare_cached(
            "SELECT url,
                    CASE WHEN title_translated IS NULL THEN title END,
                    CASE WHEN abstract_translated IS NULL THEN abstract END
             FROM papers
             WHERE title_translated IS NULL OR abstract_translated IS NULL
             ORDER BY url DESC",
          )?;
          let pending = stmt
            .query_map([], |row| {
              Ok(PendingTranslation {
                url:           row.get(0)?,
                title:         row.get(1)?,
                abstract_text: row.get(2)?,
              })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(pending)
        })
        .await?,
    )
  }
}

/// Builds a [`Paper`] from a row selected with [`PAPER_COLUMNS`].
pub(crate) fn paper_from_row(row: &Row) -> rusqlite::Result<Paper> {
  let url: String = row.get(0)?;
  let ai_content = match row.get::<_, Option<String>>(10)? {
    Some(raw) => serde_json::from_str::<AiContent>(&raw)
      .map_err(|e| warn!("Ignoring unreadable AI content stored for {url}: {e}"))
      .ok(),
    None => None,
  };
  let categories: String = row.get(5)?;

  Ok(Paper {
    title: row.get(1)?,
    authors: paper::parse_authors(&row.get::<_, String>(2)?),
    abstract_text: row.get(3)?,
    comments: row.get(4)?,
    categories: categories.split(',').map(str::trim).map(str::to_owned).collect(),
    first_submitted_date: row.get(6)?,
    first_announced_date: row.get(7)?,
    title_translated: row.get(8)?,
    abstract_translated: row.get(9)?,
    ai_content,
    url,
  })
}

/// Parameters bound by [`Upsert`], in column order.
pub(crate) fn paper_params(
  paper: &Paper,
  announced: NaiveDate,
  now: DateTime<Utc>,
) -> rusqlite::Result<[Box<dyn rusqlite::ToSql>; 14]> {
  let to_sql_err = |e: serde_json::Error| rusqlite::Error::ToSqlConversionFailure(Box::new(e));
  let authors = serde_json::to_string(&paper.authors).map_err(to_sql_err)?;
  let ai_content =
    paper.ai_content.as_ref().map(serde_json::to_string).transpose().map_err(to_sql_err)?;

  let params: [Box<dyn rusqlite::ToSql>; 14] = [
    Box::new(paper.url.clone()),
    Box::new(paper.id().to_owned()),
    Box::new(paper.pdf_url()),
    Box::new(authors),
    Box::new(paper.title.clone()),
    Box::new(paper.title_translated.clone()),
    Box::new(paper.abstract_text.clone()),
    Box::new(paper.abstract_translated.clone()),
    Box::new(paper.comments.clone()),
    Box::new(paper.categories.join(",")),
    Box::new(paper.first_submitted_date),
    Box::new(announced),
    Box::new(now),
    Box::new(ai_content),
  ];
  Ok(params)
}

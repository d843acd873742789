//! Error types for the curator library.
//!
//! Every fallible operation in the crate returns [`CuratorError`]. Store, network and
//! filesystem failures are propagated to the immediate caller; the enrichment engine is
//! the only component that swallows errors, turning them into degraded records.
//!
//! # Examples
//!
//! ```no_run
//! use curator::{
//!   database::{Database, Upsert},
//!   error::CuratorError,
//!   prelude::*,
//! };
//!
//! # async fn example(papers: Vec<curator::paper::Paper>) -> Result<(), CuratorError> {
//! let mut db = Database::open("papers.db").await?;
//! match Upsert::papers(papers).execute(&mut db).await {
//!   Err(CuratorError::MissingAnnouncedDate(url)) => println!("rejected batch because of {url}"),
//!   Err(e) => return Err(e),
//!   Ok(count) => println!("stored {count} papers"),
//! }
//! # Ok(())
//! # }
//! ```

use thiserror::Error;

/// Error type alias used for the [`curator`](crate) crate.
pub type Result<T> = core::result::Result<T, CuratorError>;

/// Errors that can occur while ingesting, exporting or enriching papers.
#[derive(Error, Debug)]
pub enum CuratorError {
  /// A paper in an ingestion batch has no first-announced date.
  ///
  /// The whole batch is rejected before anything is written. The string is the URL of
  /// the first offending paper.
  #[error("Paper {0} has no first announced date, refusing to store the batch")]
  MissingAnnouncedDate(String),

  /// A date string did not match the expected `YYYY-MM-DD` layout.
  #[error(transparent)]
  InvalidDate(#[from] chrono::ParseError),

  /// A date range whose start lies after its end.
  #[error("Invalid date range: {from} is after {until}")]
  InvalidDateRange {
    /// First day of the requested range
    from:  chrono::NaiveDate,
    /// Last day of the requested range
    until: chrono::NaiveDate,
  },

  /// A network request failed.
  #[error(transparent)]
  Network(#[from] reqwest::Error),

  /// A provider answered with a non-success status.
  ///
  /// The message holds the response body verbatim so that callers can inspect it, for
  /// example to detect a local server that has no model loaded.
  #[error("API error: {0}")]
  ApiError(String),

  /// The model answered, but its output could not be used as the structured payload.
  ///
  /// `raw` carries the offending output so partial JSON can still be salvaged.
  #[error("Malformed model output: {message}")]
  MalformedOutput {
    /// Short description of what went wrong
    message: String,
    /// The raw payload returned by the model
    raw:     String,
  },

  /// A model was not specified for the LLM request.
  #[error("No model was chosen for the LLM.")]
  LLMMissingModel,

  /// No messages were provided in the LLM request.
  #[error("No messages were supplied to send to the LLM.")]
  LLMMissingMessage,

  /// A SQLite operation failed.
  #[error(transparent)]
  Sqlite(#[from] rusqlite::Error),

  /// An async SQLite operation failed.
  #[error(transparent)]
  AsyncSqlite(#[from] tokio_rusqlite::Error),

  /// A file system operation failed.
  #[error(transparent)]
  Path(#[from] std::io::Error),

  /// JSON (de)serialization failed.
  #[error(transparent)]
  Json(#[from] serde_json::Error),

  /// Writing a CSV export failed.
  #[error(transparent)]
  Csv(#[from] csv::Error),

  /// The configuration file could not be parsed.
  #[error(transparent)]
  TomlDe(#[from] toml::de::Error),

  /// Invalid configuration value.
  #[error("{0}")]
  Config(String),
}

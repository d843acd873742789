//! Academic paper ingestion, filtering, export and enrichment.
//!
//! `curator` keeps a local store of arXiv paper metadata and turns it into daily digests:
//!
//! - Idempotent ingestion of raw paper records keyed by their abstract URL
//! - Whitelist/blacklist filtering on arXiv category tags
//! - Per-day exports as a Markdown digest, CSV sheet or JSONL interchange file
//! - LLM enrichment that attaches a five-field structured commentary to each paper
//! - Translation fill-in for titles and abstracts
//!
//! # Getting Started
//!
//! ```no_run
//! use curator::{
//!   database::{Database, Query},
//!   export::{DateRange, Exporter},
//!   filter::CategoryFilter,
//!   prelude::*,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!   let mut db = Database::open(Database::default_path()).await?;
//!
//!   let papers = Query::all().execute(&mut db).await?;
//!   println!("{} papers stored", papers.len());
//!
//!   let range = DateRange::parse("2025-01-06", "2025-01-10")?;
//!   let exporter = Exporter::new(db, range, CategoryFilter::default());
//!   exporter.to_jsonl("./data").await?;
//!   Ok(())
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`paper`]: Paper records and the enrichment payload
//! - [`database`]: SQLite-backed entity store and its instructions
//! - [`filter`]: Category filter producing accepted/rejected partitions
//! - [`export`]: Markdown, CSV and JSONL exporters over a date range
//! - [`enrich`]: Concurrent LLM enrichment with output recovery
//! - [`llm`]: OpenAI-compatible chat client
//! - [`translate`]: Translation capability and missing-translation fill-in
//! - [`ingest`]: Raw record producers and the ingestion pipeline
//! - [`config`]: On-disk configuration

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

use std::{
  collections::{BTreeMap, BTreeSet},
  fmt::Display,
  path::{Path, PathBuf},
  str::FromStr,
  sync::Arc,
};

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};
#[cfg(test)]
use {tempfile::tempdir, tracing_test::traced_test};

pub mod categories;
pub mod config;
pub mod database;
pub mod enrich;
pub mod error;
pub mod export;
pub mod filter;
pub mod ingest;
pub mod llm;
pub mod paper;
pub mod translate;

use crate::{
  database::{Database, DatabaseInstruction},
  error::*,
  paper::{AiContent, Paper},
};

/// Common traits and types for ergonomic imports.
///
/// ```no_run
/// use curator::{database::Database, prelude::*};
///
/// async fn example() -> Result<(), CuratorError> {
///   let mut db = Database::open("papers.db").await?;
///   let papers = curator::database::Query::all().execute(&mut db).await?;
///   Ok(())
/// }
/// ```
pub mod prelude {
  pub use crate::{
    database::DatabaseInstruction, enrich::LanguageModel, error::CuratorError,
    ingest::PaperSource, translate::Translator,
  };
}

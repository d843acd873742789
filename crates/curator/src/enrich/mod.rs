//! Concurrent LLM enrichment of exported records.
//!
//! The [`Enricher`] attaches an [`AiContent`] payload to every [`JsonlRecord`] it is given.
//! Each record moves from pending to in flight and ends either enriched or degraded:
//!
//! - Records are de-duplicated by `id`, the first occurrence wins.
//! - A bounded pool of workers invokes the [`LanguageModel`] with a prompt built from the
//!   title and abstract. Results land in slots indexed by input position, so output order
//!   equals input order whatever the completion order.
//! - Text answers go through [`extract_json`]. Whatever could be parsed is merged over
//!   [`AiContent::defaults`], so all five fields are always populated.
//! - [`Provider::Local`] retries "model not loaded" failures up to three attempts, waiting
//!   `attempt * 2` seconds in between. Every other failure degrades the record at once.
//! - After the batch, every record with an abstract link has its AI content written back
//!   to the store.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use curator::{
//!   database::Database,
//!   enrich::{Enricher, Provider},
//!   llm::ChatClient,
//! };
//!
//! # async fn example(records: Vec<curator::export::JsonlRecord>) -> Result<(), Box<dyn std::error::Error>> {
//! let mut db = Database::open("papers.db").await?;
//! let client = ChatClient::new("http://127.0.0.1:1234/v1")?;
//! let enricher = Enricher::new(Arc::new(client), Provider::Local, "qwen2.5-7b-instruct")
//!   .with_language("English")
//!   .with_workers(4);
//! let report = enricher.run(records, &mut db).await;
//! println!("{} enriched, {} degraded", report.enriched, report.degraded);
//! # Ok(())
//! # }
//! ```

use std::time::Duration as StdDuration;

use tokio::{sync::Semaphore, task::JoinSet};

use crate::{database::UpdateAiContent, export::JsonlRecord, llm::Message};

use super::*;

mod extract;
mod prompt;

pub use self::{
  extract::{extract_json, salvage_payload, FUNCTION_ARGS_PREFIX, FUNCTION_ARGS_SUFFIX},
  prompt::{structure_schema, STRUCTURE_FUNCTION},
};

/// Attempts made against a local provider before a record is degraded.
pub const LOCAL_MAX_ATTEMPTS: u32 = 3;

/// Error fragments by which a local server reports that no model is loaded.
pub const MODEL_NOT_LOADED_MARKERS: [&str; 4] =
  ["no models loaded", "please load a model", "lms load", "model is not loaded"];

/// Default generation language.
pub const DEFAULT_LANGUAGE: &str = "Chinese";

/// Kind of model deployment the enricher talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
  /// A hosted API that supports function calling. One attempt per record.
  #[default]
  Official,
  /// A self-hosted server. Format instructions go into the system prompt, the model
  /// list is consulted before a run, and unloaded-model failures are retried.
  Local,
}

impl Provider {
  /// How answers are requested from this provider.
  pub fn response_format(self) -> ResponseFormat {
    match self {
      Self::Official => ResponseFormat::Structured,
      Self::Local => ResponseFormat::Text,
    }
  }

  /// Maximum invocations per record.
  pub fn max_attempts(self) -> u32 {
    match self {
      Self::Official => 1,
      Self::Local => LOCAL_MAX_ATTEMPTS,
    }
  }
}

impl FromStr for Provider {
  type Err = CuratorError;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "official" => Ok(Self::Official),
      "local" => Ok(Self::Local),
      other => Err(CuratorError::Config(format!("Unknown provider: {other}"))),
    }
  }
}

impl Display for Provider {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Official => write!(f, "official"),
      Self::Local => write!(f, "local"),
    }
  }
}

/// How the model is asked to shape its answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
  /// Call the [`STRUCTURE_FUNCTION`] function with the payload as arguments
  Structured,
  /// Reply with text that contains the payload as JSON
  Text,
}

/// What a model invocation returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelOutput {
  /// A payload already matching the five-field schema
  Structured(AiContent),
  /// Free text that still has to go through [`extract_json`]
  Text(String),
}

/// A generative model the enricher can call.
#[async_trait]
pub trait LanguageModel: Send + Sync {
  /// Sends one conversation to `model`.
  async fn invoke(
    &self,
    model: &str,
    messages: &[Message],
    format: ResponseFormat,
  ) -> Result<ModelOutput>;

  /// Identifiers of the models the server can serve.
  async fn list_models(&self) -> Result<Vec<String>>;
}

/// Final state of one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
  /// The model delivered all five fields
  Enriched,
  /// At least one field holds a placeholder
  Degraded,
}

/// Result of one enrichment batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentReport {
  /// De-duplicated records in input order, each carrying its AI content
  pub records:  Vec<JsonlRecord>,
  /// Records the model fully enriched
  pub enriched: usize,
  /// Records that fell back to placeholder values
  pub degraded: usize,
}

/// Runs enrichment batches against one model.
#[derive(Clone)]
pub struct Enricher {
  /// The model capability
  model:    Arc<dyn LanguageModel>,
  /// Deployment kind
  provider: Provider,
  /// Configured model name
  name:     String,
  /// Generation language
  language: String,
  /// Worker pool size
  workers:  usize,
}

impl Enricher {
  /// Creates an enricher with one worker, generating in [`DEFAULT_LANGUAGE`].
  pub fn new(model: Arc<dyn LanguageModel>, provider: Provider, name: impl Into<String>) -> Self {
    Self { model, provider, name: name.into(), language: DEFAULT_LANGUAGE.to_owned(), workers: 1 }
  }

  /// Sets the generation language.
  pub fn with_language(mut self, language: impl Into<String>) -> Self {
    self.language = language.into();
    self
  }

  /// Sets the worker pool size. Zero is treated as one.
  pub fn with_workers(mut self, workers: usize) -> Self {
    self.workers = workers.max(1);
    self
  }

  /// The generation language.
  pub fn language(&self) -> &str { &self.language }

  /// The deployment kind.
  pub fn provider(&self) -> Provider { self.provider }

  /// Enriches `records` and writes each payload back to the store.
  ///
  /// Nothing fails the batch: model failures become degraded records and write-back
  /// failures are logged per record.
  pub async fn run(&self, records: Vec<JsonlRecord>, db: &mut Database) -> EnrichmentReport {
    let mut records = dedupe(records);
    let worker = Arc::new(Self { name: self.resolve_model().await, ..self.clone() });
    info!(
      "Enriching {} records with {} ({}), {} workers",
      records.len(),
      worker.name,
      worker.provider,
      worker.workers
    );

    let semaphore = Arc::new(Semaphore::new(worker.workers));
    let mut set = JoinSet::new();
    for (idx, record) in records.iter().enumerate() {
      let worker = Arc::clone(&worker);
      let semaphore = Arc::clone(&semaphore);
      let record = record.clone();
      set.spawn(async move {
        let Ok(_permit) = semaphore.acquire_owned().await else {
          return (idx, None);
        };
        (idx, Some(worker.enrich_one(&record).await))
      });
    }

    let mut slots: Vec<Option<(AiContent, Outcome)>> = vec![None; records.len()];
    while let Some(joined) = set.join_next().await {
      match joined {
        Ok((idx, result)) => slots[idx] = result,
        Err(e) => warn!("Enrichment task failed: {e}"),
      }
    }

    let mut degraded = 0;
    for (record, slot) in records.iter_mut().zip(slots) {
      let (content, outcome) = slot.unwrap_or_else(|| {
        warn!("No result for {}, marking it as failed", record.id);
        (AiContent::processing_failed(), Outcome::Degraded)
      });
      if outcome == Outcome::Degraded {
        degraded += 1;
      }
      record.ai = Some(content);
    }

    for record in records.iter().filter(|record| !record.abs.is_empty()) {
      let Some(content) = record.ai.clone() else { continue };
      match UpdateAiContent::new(&record.abs, content).execute(db).await {
        Ok(true) => trace!("Stored AI content for {}", record.id),
        Ok(false) => debug!("{} is not in the store, skipping write-back", record.id),
        Err(e) => warn!("Failed to store AI content for {}: {e}", record.id),
      }
    }

    let enriched = records.len() - degraded;
    info!("Processed {} records: {enriched} enriched, {degraded} degraded", records.len());
    EnrichmentReport { records, enriched, degraded }
  }

  /// The model name to use, falling back to the first served model for local providers.
  async fn resolve_model(&self) -> String {
    if self.provider != Provider::Local {
      return self.name.clone();
    }
    match self.model.list_models().await {
      Ok(available) => match available.first() {
        Some(first) if !available.contains(&self.name) => {
          warn!("Configured model '{}' not found on local server, falling back to '{first}'", self.name);
          first.clone()
        },
        _ => self.name.clone(),
      },
      Err(e) => {
        warn!("Failed to query local model list: {e}");
        self.name.clone()
      },
    }
  }

  /// Processes one record into its payload, never failing.
  async fn enrich_one(&self, record: &JsonlRecord) -> (AiContent, Outcome) {
    let format = self.provider.response_format();
    let messages = prompt::messages(record, &self.language, format);

    match self.invoke_with_retry(&record.id, &messages, format).await {
      Ok(ModelOutput::Structured(content)) => (content, Outcome::Enriched),
      Ok(ModelOutput::Text(text)) => match extract_json(&text) {
        Some(partial) => {
          let outcome =
            if AiContent::is_complete(&partial) { Outcome::Enriched } else { Outcome::Degraded };
          (AiContent::from_partial(&partial), outcome)
        },
        None => {
          warn!("No JSON found in the answer for {}", record.id);
          (AiContent::defaults(), Outcome::Degraded)
        },
      },
      Err(CuratorError::MalformedOutput { message, raw }) => {
        let partial = salvage_payload(&raw).unwrap_or_default();
        warn!(
          "Using partial AI data for {}: {:?} ({message})",
          record.id,
          partial.keys().collect::<Vec<_>>()
        );
        (AiContent::from_partial(&partial), Outcome::Degraded)
      },
      Err(e) => {
        warn!("Unexpected error for {}: {e}", record.id);
        (AiContent::defaults(), Outcome::Degraded)
      },
    }
  }

  /// Invokes the model, retrying unloaded-model failures for local providers.
  async fn invoke_with_retry(
    &self,
    id: &str,
    messages: &[Message],
    format: ResponseFormat,
  ) -> Result<ModelOutput> {
    let max_attempts = self.provider.max_attempts();
    let mut attempt = 1;
    loop {
      match self.model.invoke(&self.name, messages, format).await {
        Err(e) if attempt < max_attempts && is_model_not_loaded(&e) => {
          let delay = backoff_delay(attempt);
          warn!(
            "Local model not loaded for {id}, retrying in {}s ({attempt}/{max_attempts})",
            delay.as_secs()
          );
          tokio::time::sleep(delay).await;
          attempt += 1;
        },
        result => return result,
      }
    }
  }
}

/// Wait before retry number `attempt`, counting from 1.
pub fn backoff_delay(attempt: u32) -> StdDuration { StdDuration::from_secs(u64::from(attempt) * 2) }

/// Whether an error reports that the local server has no model loaded.
pub fn is_model_not_loaded(error: &CuratorError) -> bool {
  let message = error.to_string().to_lowercase();
  MODEL_NOT_LOADED_MARKERS.iter().any(|marker| message.contains(marker))
}

/// Drops records whose `id` was already seen.
fn dedupe(records: Vec<JsonlRecord>) -> Vec<JsonlRecord> {
  let mut seen = BTreeSet::new();
  records.into_iter().filter(|record| seen.insert(record.id.clone())).collect()
}

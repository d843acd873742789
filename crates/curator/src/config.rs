//! On-disk configuration.
//!
//! Configuration lives in a TOML file, by default at [`Config::default_path`]. Every key
//! is optional; a missing file yields [`Config::default`]. A few settings can also be
//! overridden from the environment (see [`Config::with_env`]), and the API key is only
//! ever read from `OPENAI_API_KEY`, never from the file.
//!
//! ```toml
//! database_path = "/srv/curator/papers.db"
//!
//! [output]
//! markdown_dir = "./output_md"
//! filename_format = "%Y-%m-%d"
//!
//! [filter]
//! whitelist = ["cs.CV", "cs.AI"]
//! blacklist = ["cs.CR"]
//!
//! [csv]
//! delimiter = ";"
//! terminator = "crlf"
//!
//! [enrichment]
//! provider = "local"
//! base_url = "http://127.0.0.1:1234/v1"
//! model = "qwen2.5-7b-instruct"
//! workers = 4
//! ```

use std::time::Duration as StdDuration;

use crate::{
  enrich::{Enricher, Provider, DEFAULT_LANGUAGE},
  export::{CsvOptions, DEFAULT_FILENAME_FORMAT},
  filter::CategoryFilter,
  llm::{ChatClient, DEFAULT_TIMEOUT_SECS},
  translate::DEFAULT_TARGET,
};

use super::*;

/// Environment variable holding the provider API key.
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Placeholder key sent to local servers, which usually do not check it.
const LOCAL_PLACEHOLDER_KEY: &str = "lm-studio";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Paper store location
  pub database_path: PathBuf,
  /// Export destinations
  pub output:        OutputConfig,
  /// Category whitelist and blacklist
  pub filter:        CategoryFilter,
  /// CSV dialect
  pub csv:           CsvOptions,
  /// Enrichment provider settings
  pub enrichment:    EnrichmentConfig,
  /// Translation fill-in settings
  pub translation:   TranslationConfig,
}

/// Where exports are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
  /// Markdown digests
  pub markdown_dir:    PathBuf,
  /// CSV sheets
  pub csv_dir:         PathBuf,
  /// JSONL exports, plain and enriched
  pub jsonl_dir:       PathBuf,
  /// `strftime` layout of file names
  pub filename_format: String,
}

/// Enrichment provider settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
  /// Deployment kind
  pub provider:     Provider,
  /// Server base URL; the provider's default when unset
  pub base_url:     Option<String>,
  /// Model name
  pub model:        String,
  /// Generation language
  pub language:     String,
  /// Worker pool size
  pub workers:      usize,
  /// Per-call HTTP timeout in seconds
  pub timeout_secs: u64,
}

/// Translation fill-in settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
  /// Target language code
  pub target: String,
  /// Model used for translation; the enrichment model when unset
  pub model:  Option<String>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      database_path: Database::default_path(),
      output:        OutputConfig::default(),
      filter:        CategoryFilter::default(),
      csv:           CsvOptions::default(),
      enrichment:    EnrichmentConfig::default(),
      translation:   TranslationConfig::default(),
    }
  }
}

impl Default for OutputConfig {
  fn default() -> Self {
    Self {
      markdown_dir:    PathBuf::from("./output_md"),
      csv_dir:         PathBuf::from("./output_csv"),
      jsonl_dir:       PathBuf::from("./data"),
      filename_format: DEFAULT_FILENAME_FORMAT.to_owned(),
    }
  }
}

impl Default for EnrichmentConfig {
  fn default() -> Self {
    Self {
      provider:     Provider::Official,
      base_url:     None,
      model:        "deepseek-chat".to_owned(),
      language:     DEFAULT_LANGUAGE.to_owned(),
      workers:      4,
      timeout_secs: DEFAULT_TIMEOUT_SECS,
    }
  }
}

impl Default for TranslationConfig {
  fn default() -> Self { Self { target: DEFAULT_TARGET.to_owned(), model: None } }
}

impl EnrichmentConfig {
  /// The configured base URL, or the provider's usual one.
  pub fn base_url(&self) -> &str {
    match (&self.base_url, self.provider) {
      (Some(url), _) => url.as_str(),
      (None, Provider::Official) => "https://api.deepseek.com",
      (None, Provider::Local) => "http://127.0.0.1:1234/v1",
    }
  }
}

impl Config {
  /// Default location of the configuration file.
  ///
  /// - On Unix: `~/.config/curator/config.toml`
  /// - On macOS: `~/Library/Application Support/curator/config.toml`
  /// - On Windows: `%APPDATA%\curator\config.toml`
  pub fn default_path() -> PathBuf {
    dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join("curator").join("config.toml")
  }

  /// Reads the configuration at `path`, falling back to defaults when it does not exist.
  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    if !path.exists() {
      debug!("No configuration at {}, using defaults", path.display());
      return Ok(Self::default());
    }
    let content = std::fs::read_to_string(path)?;
    Self::from_toml(&content)
  }

  /// Parses a configuration document.
  pub fn from_toml(content: &str) -> Result<Self> { Ok(toml::from_str(content)?) }

  /// Applies overrides from the process environment.
  ///
  /// Recognized variables: `OPENAI_BASE_URL`, `MODEL_NAME`, `LANGUAGE`, `MAX_WORKERS`,
  /// `PROVIDER`.
  pub fn with_env(self) -> Result<Self> { self.with_overrides(|key| std::env::var(key).ok()) }

  /// Applies overrides looked up through `lookup`.
  pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
    if let Some(provider) = lookup("PROVIDER") {
      self.enrichment.provider = provider.parse()?;
    }
    if let Some(base_url) = lookup("OPENAI_BASE_URL") {
      self.enrichment.base_url = Some(base_url);
    }
    if let Some(model) = lookup("MODEL_NAME") {
      self.enrichment.model = model;
    }
    if let Some(language) = lookup("LANGUAGE") {
      self.enrichment.language = language;
    }
    if let Some(workers) = lookup("MAX_WORKERS") {
      match workers.trim().parse() {
        Ok(workers) => self.enrichment.workers = workers,
        Err(_) => warn!("Ignoring MAX_WORKERS={workers}, keeping {}", self.enrichment.workers),
      }
    }
    Ok(self)
  }

  /// Sets the paper store location.
  pub fn with_database_path(mut self, path: impl Into<PathBuf>) -> Self {
    self.database_path = path.into();
    self
  }

  /// Sets the generation language.
  pub fn with_language(mut self, language: impl Into<String>) -> Self {
    self.enrichment.language = language.into();
    self
  }

  /// Sets the worker pool size.
  pub fn with_workers(mut self, workers: usize) -> Self {
    self.enrichment.workers = workers;
    self
  }

  /// The provider API key from `OPENAI_API_KEY`.
  pub fn api_key() -> Option<String> {
    std::env::var(API_KEY_VAR).ok().filter(|key| !key.is_empty())
  }

  /// Builds the chat client for the configured provider.
  pub fn chat_client(&self) -> Result<ChatClient> {
    let enrichment = &self.enrichment;
    let client = ChatClient::with_timeout(
      enrichment.base_url(),
      StdDuration::from_secs(enrichment.timeout_secs),
    )?
    .with_model(self.translation.model.clone().unwrap_or_else(|| enrichment.model.clone()));

    match (Self::api_key(), enrichment.provider) {
      (Some(key), _) => Ok(client.with_api_key(key)),
      (None, Provider::Local) => Ok(client.with_api_key(LOCAL_PLACEHOLDER_KEY)),
      (None, Provider::Official) => {
        warn!("{API_KEY_VAR} is not set, requests to {} will likely be rejected", client.base_url());
        Ok(client)
      },
    }
  }

  /// Builds the enricher for the configured provider.
  pub fn enricher(&self) -> Result<Enricher> {
    let enrichment = &self.enrichment;
    Ok(
      Enricher::new(Arc::new(self.chat_client()?), enrichment.provider, &enrichment.model)
        .with_language(&enrichment.language)
        .with_workers(enrichment.workers),
    )
  }
}

//! Translation capability and the missing-translation fill-in pass.
//!
//! [`translate_missing`] finds every stored paper lacking a translated title or abstract
//! and translates it. Each row is an independent task touching only its own columns, so
//! the tasks run concurrently with no ordering between them.

use futures::future::join_all;

use crate::database::{PendingTranslation, UpdateTranslation};

use super::*;

/// Default target language of the fill-in pass.
pub const DEFAULT_TARGET: &str = "zh-CN";

/// Something that can translate text.
#[async_trait]
pub trait Translator: Send + Sync {
  /// Translates `text` into `target`.
  async fn translate(&self, text: &str, target: &str) -> Result<String>;
}

/// Outcome of one fill-in pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranslationSummary {
  /// Rows that lacked a translation
  pub pending:    usize,
  /// Rows updated with at least one new translation
  pub translated: usize,
  /// Rows left untouched because translating or storing failed
  pub failed:     usize,
}

/// Translates every stored title and abstract that has no translation yet.
///
/// A failure on one row is logged and counted; it never stops the other rows. Only the
/// initial lookup of pending rows can fail the pass.
pub async fn translate_missing(
  db: &Database,
  translator: &dyn Translator,
  target: &str,
) -> Result<TranslationSummary> {
  let pending = db.pending_translations().await?;
  info!("Translating {} papers into {target}", pending.len());

  let tasks = pending.iter().map(|row| {
    let mut db = db.clone();
    async move {
      let result = translate_row(&mut db, translator, row, target).await;
      if let Err(e) = &result {
        warn!("Failed to translate {}: {e}", row.url);
      }
      result
    }
  });

  let mut summary = TranslationSummary { pending: pending.len(), ..Default::default() };
  for result in join_all(tasks).await {
    match result {
      Ok(true) => summary.translated += 1,
      Ok(false) => {},
      Err(_) => summary.failed += 1,
    }
  }
  info!("Translated {} of {} papers, {} failed", summary.translated, summary.pending, summary.failed);
  Ok(summary)
}

/// Translates the missing sides of one row and stores the result.
async fn translate_row(
  db: &mut Database,
  translator: &dyn Translator,
  row: &PendingTranslation,
  target: &str,
) -> Result<bool> {
  let title = match row.title.as_deref().map(str::trim) {
    None | Some("") => None,
    Some(title) => Some(translator.translate(title, target).await?),
  };
  let abstract_text = match row.abstract_text.as_deref().map(str::trim) {
    None | Some("") => None,
    Some(abstract_text) => Some(translator.translate(abstract_text, target).await?),
  };
  if title.is_none() && abstract_text.is_none() {
    return Ok(false);
  }
  UpdateTranslation::new(&row.url, title, abstract_text).execute(db).await
}

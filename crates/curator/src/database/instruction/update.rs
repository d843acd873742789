//! Narrow single-column updates used by the enrichment and translation passes.

use super::*;

/// Sets the AI content of one paper without touching any other column.
#[derive(Debug, Clone)]
pub struct UpdateAiContent {
  /// Primary key of the row to update
  url:     String,
  /// New enrichment payload
  content: AiContent,
}

impl UpdateAiContent {
  /// Creates the update for the paper stored under `url`.
  pub fn new(url: impl Into<String>, content: AiContent) -> Self {
    Self { url: url.into(), content }
  }
}

#[async_trait]
impl DatabaseInstruction for UpdateAiContent {
  /// Whether a row with that URL existed.
  type Output = bool;

  async fn execute(&self, db: &mut Database) -> Result<Self::Output> {
    let url = self.url.clone();
    let content = serde_json::to_string(&self.content)?;
    let updated = db
      .conn
      .call(move |conn| {
        Ok(conn.execute("UPDATE papers SET ai_content = ?1 WHERE url = ?2", params![
          content, url
        ])?)
      })
      .await?;
    Ok(updated > 0)
  }
}

/// Sets the translated title and abstract of one paper.
///
/// A `None` leaves the corresponding stored translation untouched.
#[derive(Debug, Clone)]
pub struct UpdateTranslation {
  /// Primary key of the row to update
  url:                 String,
  /// Translated title
  title_translated:    Option<String>,
  /// Translated abstract
  abstract_translated: Option<String>,
}

impl UpdateTranslation {
  /// Creates the update for the paper stored under `url`.
  pub fn new(
    url: impl Into<String>,
    title_translated: Option<String>,
    abstract_translated: Option<String>,
  ) -> Self {
    Self { url: url.into(), title_translated, abstract_translated }
  }
}

#[async_trait]
impl DatabaseInstruction for UpdateTranslation {
  /// Whether a row with that URL existed.
  type Output = bool;

  async fn execute(&self, db: &mut Database) -> Result<Self::Output> {
    let Self { url, title_translated, abstract_translated } = self.clone();
    let updated = db
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE papers
           SET title_translated = COALESCE(?1, title_translated),
               abstract_translated = COALESCE(?2, abstract_translated)
           WHERE url = ?3",
          params![title_translated, abstract_translated, url],
        )?)
      })
      .await?;
    Ok(updated > 0)
  }
}

//! The newline-delimited JSON interchange format.
//!
//! Key names and nullability are consumed by downstream tooling and must not change:
//!
//! ```json
//! {"id":"2501.00001","pdf":"https://arxiv.org/pdf/2501.00001","abs":"https://arxiv.org/abs/2501.00001",
//!  "authors":["Ada Lovelace"],"title":"...","categories":["cs.CV"],"comment":null,"summary":"...",
//!  "AI":{"tldr":"...","motivation":"...","method":"...","result":"...","conclusion":"..."}}
//! ```

use super::*;

/// One line of a JSONL export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonlRecord {
  /// Short arXiv identifier
  pub id:         String,
  /// PDF link
  pub pdf:        String,
  /// Abstract page link
  pub abs:        String,
  /// Ordered author names
  pub authors:    Vec<String>,
  /// Paper title
  pub title:      String,
  /// Category tags
  pub categories: Vec<String>,
  /// Submission comment, `null` when absent
  pub comment:    Option<String>,
  /// Abstract text
  pub summary:    String,
  /// Enrichment payload, omitted until enriched
  #[serde(rename = "AI", default, skip_serializing_if = "Option::is_none")]
  pub ai:         Option<AiContent>,
}

impl From<&Paper> for JsonlRecord {
  fn from(paper: &Paper) -> Self {
    Self {
      id:         paper.id().to_owned(),
      pdf:        paper.pdf_url(),
      abs:        paper.url.clone(),
      authors:    paper.authors.clone(),
      title:      paper.title.clone(),
      categories: paper.categories.clone(),
      comment:    paper.comment().map(str::to_owned),
      summary:    paper.abstract_text.clone(),
      ai:         paper.ai_content.clone(),
    }
  }
}

impl JsonlRecord {
  /// Parses every non-blank line of a JSONL document.
  pub fn parse_lines(text: &str) -> Result<Vec<Self>> {
    text
      .lines()
      .filter(|line| !line.trim().is_empty())
      .map(|line| Ok(serde_json::from_str(line)?))
      .collect()
  }
}

/// Serializes records one per line, each line terminated by `\n`.
pub(super) fn render_jsonl(records: &[JsonlRecord]) -> Result<String> {
  let mut out = String::new();
  for record in records {
    out.push_str(&serde_json::to_string(record)?);
    out.push('\n');
  }
  Ok(out)
}

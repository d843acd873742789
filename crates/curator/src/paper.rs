//! Paper records and the structured enrichment payload.
//!
//! A [`Paper`] is keyed by its arXiv abstract URL. The short identifier and the PDF link
//! are never stored independently of the URL; they are always derived from it:
//!
//! ```
//! use curator::paper::{arxiv_id, pdf_link};
//!
//! let url = "https://arxiv.org/abs/2501.01234";
//! assert_eq!(arxiv_id(url), "2501.01234");
//! assert_eq!(pdf_link(url), "https://arxiv.org/pdf/2501.01234");
//! ```

use super::*;

/// Placeholder some producers emit instead of an empty comment field.
pub const NO_COMMENTS: &str = "No comments";

/// Placeholder some producers emit instead of an empty author list.
pub const NO_AUTHORS: &str = "No authors";

/// One academic submission as stored in the entity store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paper {
  /// Abstract page URL, the natural primary key
  pub url:                  String,
  /// The paper's full title
  pub title:                String,
  /// Ordered author names, possibly empty
  #[serde(default, deserialize_with = "deserialize_authors")]
  pub authors:              Vec<String>,
  /// Full abstract text
  #[serde(rename = "abstract")]
  pub abstract_text:        String,
  /// Free-text submission comment
  #[serde(default)]
  pub comments:             Option<String>,
  /// Category tags, the first one being the primary category
  pub categories:           Vec<String>,
  /// Date the first version was submitted
  pub first_submitted_date: NaiveDate,
  /// Date the paper was first announced; required before the paper can be stored
  #[serde(default)]
  pub first_announced_date: Option<NaiveDate>,
  /// Translated title, filled in by a later pass
  #[serde(default)]
  pub title_translated:     Option<String>,
  /// Translated abstract, filled in by a later pass
  #[serde(default)]
  pub abstract_translated:  Option<String>,
  /// Structured commentary, filled in by the enrichment engine
  #[serde(default, rename = "AI")]
  pub ai_content:           Option<AiContent>,
}

impl Paper {
  /// Short arXiv identifier, i.e. the trailing path segment of the URL.
  pub fn id(&self) -> &str { arxiv_id(&self.url) }

  /// Link to the PDF rendition of the paper.
  pub fn pdf_url(&self) -> String { pdf_link(&self.url) }

  /// Link to the papers.cool mirror of the abstract page.
  pub fn papers_cool_url(&self) -> String { self.url.replace("arxiv.org/abs/", "papers.cool/arxiv/") }

  /// The first category tag, used to group papers in digests.
  pub fn primary_category(&self) -> &str {
    self.categories.first().map(String::as_str).unwrap_or("unknown")
  }

  /// The submission comment with the `No comments` placeholder mapped to `None`.
  pub fn comment(&self) -> Option<&str> {
    self.comments.as_deref().filter(|comment| *comment != NO_COMMENTS && !comment.is_empty())
  }

  /// Authors joined the way they are shown to readers.
  pub fn authors_display(&self) -> String { self.authors.join(", ") }
}

/// Returns the trailing path segment of an abstract URL.
pub fn arxiv_id(url: &str) -> &str { url.trim_end_matches('/').rsplit('/').next().unwrap_or(url) }

/// Derives the PDF link from an abstract URL by swapping the `abs` path segment.
pub fn pdf_link(url: &str) -> String { url.replacen("/abs/", "/pdf/", 1) }

/// Parses an author list stored either as a JSON array or as a legacy comma-separated
/// string.
pub fn parse_authors(raw: &str) -> Vec<String> {
  if let Ok(authors) = serde_json::from_str::<Vec<String>>(raw) {
    return authors;
  }
  split_authors(raw)
}

/// Splits a comma-separated author string, honouring the `No authors` placeholder.
fn split_authors(raw: &str) -> Vec<String> {
  let raw = raw.trim();
  if raw.is_empty() || raw == NO_AUTHORS {
    return Vec::new();
  }
  raw.split(',').map(str::trim).filter(|name| !name.is_empty()).map(str::to_owned).collect()
}

/// Accepts either an array of names or one comma-separated string.
fn deserialize_authors<'de, D>(deserializer: D) -> core::result::Result<Vec<String>, D::Error>
where D: serde::Deserializer<'de> {
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Authors {
    List(Vec<String>),
    Joined(String),
  }

  Ok(match Authors::deserialize(deserializer)? {
    Authors::List(list) => list,
    Authors::Joined(joined) => split_authors(&joined),
  })
}

/// The five-field commentary the enrichment engine attaches to a paper.
///
/// Serialized payloads always carry exactly these five keys. Extra keys in stored or
/// model-produced payloads are ignored when reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiContent {
  /// One-line description of the paper's main task
  pub tldr:       String,
  /// Why the work was done
  pub motivation: String,
  /// How it was done
  pub method:     String,
  /// What was found
  pub result:     String,
  /// What the authors conclude
  pub conclusion: String,
}

impl AiContent {
  /// Names of the five fields, in serialization order.
  pub const FIELDS: [&'static str; 5] = ["tldr", "motivation", "method", "result", "conclusion"];

  /// Placeholder values used for any field the model failed to provide.
  pub fn defaults() -> Self {
    Self {
      tldr:       "Task description failed".to_owned(),
      motivation: "Motivation analysis unavailable".to_owned(),
      method:     "Method extraction failed".to_owned(),
      result:     "Result analysis unavailable".to_owned(),
      conclusion: "Conclusion extraction failed".to_owned(),
    }
  }

  /// Placeholder used when a worker could not produce any result at all.
  pub fn processing_failed() -> Self {
    let failed = || "Processing failed".to_owned();
    Self {
      tldr:       failed(),
      motivation: failed(),
      method:     failed(),
      result:     failed(),
      conclusion: failed(),
    }
  }

  /// Merges a partially parsed object over [`AiContent::defaults`].
  ///
  /// Only string values for the five known keys are taken; anything else keeps its
  /// default.
  pub fn from_partial(partial: &serde_json::Map<String, serde_json::Value>) -> Self {
    let mut content = Self::defaults();
    for field in Self::FIELDS {
      if let Some(serde_json::Value::String(value)) = partial.get(field) {
        *content.field_mut(field) = value.clone();
      }
    }
    content
  }

  /// Whether `partial` carries a string for each of the five fields.
  pub fn is_complete(partial: &serde_json::Map<String, serde_json::Value>) -> bool {
    Self::FIELDS.iter().all(|field| partial.get(*field).is_some_and(serde_json::Value::is_string))
  }

  /// Mutable access to a field by its serialized name.
  fn field_mut(&mut self, field: &str) -> &mut String {
    match field {
      "tldr" => &mut self.tldr,
      "motivation" => &mut self.motivation,
      "method" => &mut self.method,
      "result" => &mut self.result,
      _ => &mut self.conclusion,
    }
  }
}

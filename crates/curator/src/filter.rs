//! Whitelist/blacklist filtering on arXiv category tags.
//!
//! A paper is accepted when at least one of its tags is whitelisted and none is
//! blacklisted. A whitelist miss is reported before a blacklist hit when both apply.
//!
//! ```
//! use curator::filter::{CategoryFilter, Verdict};
//! # use curator::paper::Paper;
//! # fn paper(categories: &[&str]) -> Paper {
//! #   Paper {
//! #     url: "https://arxiv.org/abs/2501.00001".into(),
//! #     title: String::new(),
//! #     authors: Vec::new(),
//! #     abstract_text: String::new(),
//! #     comments: None,
//! #     categories: categories.iter().map(|c| c.to_string()).collect(),
//! #     first_submitted_date: chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
//! #     first_announced_date: None,
//! #     title_translated: None,
//! #     abstract_translated: None,
//! #     ai_content: None,
//! #   }
//! # }
//!
//! let filter = CategoryFilter::new(["cs.CV"], ["restricted"]);
//! let verdict = filter.verdict(&paper(&["cs.CV", "restricted"]));
//! assert_eq!(verdict, Verdict::Rejected("cat:restricted in blacklist".into()));
//! ```

use super::*;

/// Categories accepted when no whitelist is configured.
pub const DEFAULT_WHITELIST: [&str; 6] = ["cs.CV", "cs.AI", "cs.LG", "cs.CL", "cs.IR", "cs.MA"];

/// The outcome of filtering one paper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
  /// The paper is of interest
  Accepted,
  /// The paper was filtered out, with a human-readable reason
  Rejected(String),
}

impl Verdict {
  /// Whether the paper was accepted.
  pub fn is_accepted(&self) -> bool { matches!(self, Self::Accepted) }

  /// The note shown next to the paper in exports: the rejection reason, or `-`.
  pub fn note(&self) -> &str {
    match self {
      Self::Accepted => "-",
      Self::Rejected(reason) => reason,
    }
  }
}

/// A paper paired with its filter verdict for one export run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRecord {
  /// The filtered paper
  pub paper:   Paper,
  /// Why it was kept or dropped
  pub verdict: Verdict,
}

/// Whitelist and blacklist of category tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryFilter {
  /// At least one of these tags must be present
  pub whitelist: BTreeSet<String>,
  /// None of these tags may be present
  pub blacklist: BTreeSet<String>,
}

impl Default for CategoryFilter {
  fn default() -> Self { Self::new(DEFAULT_WHITELIST, [] as [&str; 0]) }
}

impl CategoryFilter {
  /// Creates a filter from whitelist and blacklist tags.
  pub fn new<W, B>(whitelist: W, blacklist: B) -> Self
  where
    W: IntoIterator,
    W::Item: Into<String>,
    B: IntoIterator,
    B::Item: Into<String>, {
    Self {
      whitelist: whitelist.into_iter().map(Into::into).collect(),
      blacklist: blacklist.into_iter().map(Into::into).collect(),
    }
  }

  /// Judges a single paper.
  pub fn verdict(&self, paper: &Paper) -> Verdict {
    if !paper.categories.iter().any(|category| self.whitelist.contains(category)) {
      return Verdict::Rejected(format!("none of {} in whitelist", paper.categories.join(",")));
    }

    let blacklisted: Vec<&str> = paper
      .categories
      .iter()
      .filter(|category| self.blacklist.contains(*category))
      .map(String::as_str)
      .collect();
    if blacklisted.is_empty() {
      Verdict::Accepted
    } else {
      Verdict::Rejected(format!("cat:{} in blacklist", blacklisted.join(",")))
    }
  }

  /// Splits papers into `(accepted, rejected)`, keeping input order within each side.
  pub fn partition(
    &self,
    papers: impl IntoIterator<Item = Paper>,
  ) -> (Vec<ExportRecord>, Vec<ExportRecord>) {
    papers
      .into_iter()
      .map(|paper| {
        let verdict = self.verdict(&paper);
        ExportRecord { paper, verdict }
      })
      .partition(|record| record.verdict.is_accepted())
  }
}

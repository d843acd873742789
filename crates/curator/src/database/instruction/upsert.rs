//! Bulk insert-or-update keyed by URL.

use super::*;

/// Statement used for every paper in an [`Upsert`] batch.
///
/// Conflicting rows are overwritten column by column. Translation and AI columns keep
/// their stored value when the incoming paper does not carry one, so a re-crawl of an
/// enriched paper never erases its enrichment. `summary` mirrors the abstract, which is
/// how stores written by the crawler lay it out.
const UPSERT_PAPER: &str = "
  INSERT INTO papers (
    url, id, pdf, authors, title, title_translated, abstract, abstract_translated,
    comments, categories, first_submitted_date, first_announced_date, update_time, ai_content,
    summary
  ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?7)
  ON CONFLICT (url) DO UPDATE SET
    id                   = excluded.id,
    pdf                  = excluded.pdf,
    authors              = excluded.authors,
    title                = excluded.title,
    title_translated     = COALESCE(excluded.title_translated, papers.title_translated),
    abstract             = excluded.abstract,
    abstract_translated  = COALESCE(excluded.abstract_translated, papers.abstract_translated),
    summary              = excluded.summary,
    comments             = excluded.comments,
    categories           = excluded.categories,
    first_submitted_date = excluded.first_submitted_date,
    first_announced_date = excluded.first_announced_date,
    update_time          = excluded.update_time,
    ai_content           = COALESCE(excluded.ai_content, papers.ai_content)
";

/// Stores a batch of papers, inserting new URLs and updating known ones.
///
/// Every paper must carry a first-announced date. If one does not, the batch fails with
/// [`CuratorError::MissingAnnouncedDate`] and nothing is written.
#[derive(Debug, Clone)]
pub struct Upsert {
  /// Papers to store
  papers: Vec<Paper>,
}

impl Upsert {
  /// Upserts a single paper.
  pub fn paper(paper: &Paper) -> Self { Self { papers: vec![paper.clone()] } }

  /// Upserts a batch of papers in one transaction.
  pub fn papers(papers: impl IntoIterator<Item = Paper>) -> Self {
    Self { papers: papers.into_iter().collect() }
  }
}

#[async_trait]
impl DatabaseInstruction for Upsert {
  type Output = usize;

  async fn execute(&self, db: &mut Database) -> Result<Self::Output> {
    let mut batch = Vec::with_capacity(self.papers.len());
    for paper in &self.papers {
      let Some(announced) = paper.first_announced_date else {
        return Err(CuratorError::MissingAnnouncedDate(paper.url.clone()));
      };
      batch.push((paper.clone(), announced));
    }

    let now = Utc::now();
    let written = db
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare_cached(UPSERT_PAPER)?;
          for (paper, announced) in &batch {
            let params = paper_params(paper, *announced, now)?;
            stmt.execute(rusqlite::params_from_iter(params.iter()))?;
          }
        }
        tx.commit()?;
        Ok(batch.len())
      })
      .await?;

    debug!("Upserted {written} papers");
    Ok(written)
  }
}

//! Typed read queries returning full [`Paper`] records.

use super::*;

/// Which papers a [`Query`] selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryCriteria {
  /// Papers first announced on the given day, in ingestion order
  AnnouncedOn(NaiveDate),
  /// Every stored paper, newest URL first
  All,
}

/// A query for retrieving papers from the store.
#[derive(Debug, Clone, Copy)]
pub struct Query {
  /// Selection criteria
  criteria: QueryCriteria,
}

impl Query {
  /// Creates a new query with the given criteria.
  pub fn new(criteria: QueryCriteria) -> Self { Self { criteria } }

  /// Papers whose first-announced date equals `date`.
  pub fn on_date(date: NaiveDate) -> Self { Self::new(QueryCriteria::AnnouncedOn(date)) }

  /// Every stored paper.
  pub fn all() -> Self { Self::new(QueryCriteria::All) }
}

#[async_trait]
impl DatabaseInstruction for Query {
  type Output = Vec<Paper>;

  async fn execute(&self, db: &mut Database) -> Result<Self::Output> {
    let criteria = self.criteria;
    Ok(
      db.conn
        .call(move |conn| {
          let papers: Vec<Paper> = match criteria {
            QueryCriteria::AnnouncedOn(date) => {
              let mut stmt = conn.prepare_cached(&format!(
                "SELECT {PAPER_COLUMNS} FROM papers WHERE first_announced_date = ?1 ORDER BY \
                 rowid"
              ))?;
              let papers =
                stmt.query_map(params![date], paper_from_row)?.collect::<rusqlite::Result<_>>()?;
              papers
            },
            QueryCriteria::All => {
              let mut stmt = conn
                .prepare_cached(&format!("SELECT {PAPER_COLUMNS} FROM papers ORDER BY url DESC"))?;
              let papers = stmt.query_map([], paper_from_row)?.collect::<rusqlite::Result<_>>()?;
              papers
            },
          };
          Ok(papers)
        })
        .await?,
    )
  }
}

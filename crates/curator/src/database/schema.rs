//! Table layout and additive schema evolution.
//!
//! Older stores predate some columns. On every open the physical column set is read back
//! with `PRAGMA table_info` and each missing column is added as nullable, then backfilled
//! from data already in the row where it can be derived. Running this twice is a no-op.

use rusqlite::{functions::FunctionFlags, Connection};

use super::*;

/// Layout used when the table does not exist yet.
const CREATE_PAPERS: &str = "
  CREATE TABLE IF NOT EXISTS papers (
    url                  TEXT PRIMARY KEY,
    id                   TEXT NOT NULL,
    pdf                  TEXT NOT NULL,
    authors              TEXT NOT NULL,
    title                TEXT NOT NULL,
    title_translated     TEXT,
    abstract             TEXT NOT NULL,
    abstract_translated  TEXT,
    summary              TEXT NOT NULL,
    comments             TEXT,
    categories           TEXT NOT NULL,
    first_submitted_date DATE NOT NULL,
    first_announced_date DATE NOT NULL,
    update_time          DATETIME NOT NULL,
    ai_content           TEXT
  );
  CREATE INDEX IF NOT EXISTS papers_announced_idx ON papers (first_announced_date);
";

/// A column introduced after the first table layout.
struct ColumnMigration {
  /// Column name
  name:     &'static str,
  /// Declared SQL type
  sql_type: &'static str,
  /// Statement filling the new column from existing data, if it can be derived
  backfill: Option<&'static str>,
}

/// Columns added over time, in the order they are applied.
const MIGRATIONS: &[ColumnMigration] = &[
  ColumnMigration {
    name:     "id",
    sql_type: "TEXT",
    backfill: Some("UPDATE papers SET id = url_tail(url) WHERE id IS NULL"),
  },
  ColumnMigration {
    name:     "pdf",
    sql_type: "TEXT",
    backfill: Some("UPDATE papers SET pdf = REPLACE(url, '/abs/', '/pdf/') WHERE pdf IS NULL"),
  },
  ColumnMigration { name: "title_translated", sql_type: "TEXT", backfill: None },
  ColumnMigration { name: "abstract_translated", sql_type: "TEXT", backfill: None },
  ColumnMigration { name: "ai_content", sql_type: "TEXT", backfill: None },
  ColumnMigration {
    name:     "summary",
    sql_type: "TEXT",
    backfill: Some("UPDATE papers SET summary = abstract WHERE summary IS NULL"),
  },
];

/// One physical column of the `papers` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
  /// Column name
  pub name:     String,
  /// Declared type, empty when none was declared
  pub sql_type: String,
  /// Whether the column carries a `NOT NULL` constraint
  pub not_null: bool,
}

/// Reads the physical column set of the `papers` table.
pub(crate) fn columns(conn: &Connection) -> rusqlite::Result<Vec<ColumnInfo>> {
  let mut stmt = conn.prepare("PRAGMA table_info(papers)")?;
  let columns = stmt
    .query_map([], |row| {
      Ok(ColumnInfo {
        name:     row.get("name")?,
        sql_type: row.get("type")?,
        not_null: row.get::<_, i64>("notnull")? != 0,
      })
    })?
    .collect();
  columns
}

/// Registers `url_tail(url)`, the SQL twin of [`paper::arxiv_id`].
fn register_functions(conn: &Connection) -> rusqlite::Result<()> {
  conn.create_scalar_function(
    "url_tail",
    1,
    FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
    |ctx| {
      let url = ctx.get::<String>(0)?;
      Ok(paper::arxiv_id(&url).to_owned())
    },
  )
}

/// Creates the table if needed and applies every missing column migration.
///
/// Returns the names of the columns that were added.
pub(crate) fn migrate(conn: &mut Connection) -> rusqlite::Result<Vec<String>> {
  register_functions(conn)?;

  let tx = conn.transaction()?;
  tx.execute_batch(CREATE_PAPERS)?;

  let existing: BTreeSet<String> = columns(&tx)?.into_iter().map(|column| column.name).collect();
  let mut added = Vec::new();
  for migration in MIGRATIONS.iter().filter(|migration| !existing.contains(migration.name)) {
    tx.execute_batch(&format!(
      "ALTER TABLE papers ADD COLUMN {} {}",
      migration.name, migration.sql_type
    ))?;
    if let Some(backfill) = migration.backfill {
      let rows = tx.execute(backfill, [])?;
      trace!("Backfilled {rows} rows of column {}", migration.name);
    }
    added.push(migration.name.to_owned());
  }

  tx.commit()?;
  Ok(added)
}

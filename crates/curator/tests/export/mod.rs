use curator::export::{CsvOptions, LineTerminator};

use super::*;

fn week() -> Vec<Paper> {
  vec![
    paper("2501.00003", &["cs.CV", "cs.AI"], day(6)),
    paper("2501.00002", &["cs.CR"], day(6)),
    paper("2501.00001", &["cs.LG", "cs.CR"], day(6)),
    paper("2501.00010", &["cs.CL"], day(7)),
  ]
}

#[traced_test]
#[tokio::test]
async fn test_jsonl_export_is_deterministic() -> TestResult<()> {
  let (db, _db_dir) = seeded_db(week()).await;
  let exporter = Exporter::new(db, DateRange::new(day(6), day(7))?, CategoryFilter::default());

  let first = tempdir()?;
  let second = tempdir()?;
  let a = exporter.to_jsonl(first.path()).await?;
  let b = exporter.to_jsonl(second.path()).await?;

  assert_eq!(a.len(), 2);
  for (a, b) in a.iter().zip(&b) {
    assert_eq!(std::fs::read(a)?, std::fs::read(b)?);
  }
  let monday = std::fs::read_to_string(first.path().join("2025-01-06.jsonl"))?;
  let records = JsonlRecord::parse_lines(&monday)?;
  let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
  assert_eq!(ids, vec!["2501.00003", "2501.00001"]);
  Ok(())
}

#[tokio::test]
async fn test_blacklist_moves_papers_to_the_tail() -> TestResult<()> {
  let (db, _db_dir) = seeded_db(week()).await;
  let filter = CategoryFilter::new(["cs.CV", "cs.LG", "cs.CR"], ["cs.CR"]);
  let options = CsvOptions { delimiter: ';', terminator: LineTerminator::Crlf, header: true };
  let out = tempdir()?;

  Exporter::new(db, DateRange::day(day(6)), filter).to_csv(out.path(), &options).await?;

  let sheet = std::fs::read_to_string(out.path().join("2025-01-06.csv"))?;
  let lines: Vec<&str> = sheet.split("\r\n").filter(|line| !line.is_empty()).collect();
  assert_eq!(lines.len(), 4);
  assert!(lines[0].starts_with("Title;Interest;"));
  assert!(lines[1].starts_with("Paper 2501.00003;chosen;"));
  assert!(lines[2].contains(";filtered;"));
  assert!(lines[2].contains("cat:cs.CR in blacklist"));
  assert!(lines[3].contains(";filtered;"));
  Ok(())
}

#[tokio::test]
async fn test_markdown_groups_by_primary_category() -> TestResult<()> {
  let (db, _db_dir) = seeded_db(week()).await;
  let out = tempdir()?;
  let exporter = Exporter::new(db, DateRange::day(day(6)), CategoryFilter::default())
    .with_filename_format("arxiv_%Y%m%d");

  let written = exporter.to_markdown(out.path()).await?;

  assert_eq!(written, vec![out.path().join("arxiv_20250106.md")]);
  let digest = std::fs::read_to_string(&written[0])?;
  assert!(digest.starts_with("# 论文全览：arxiv_20250106\n\n共有2篇相关领域论文, 另有1篇其他\n\n"));
  let vision = digest.find("(cs.CV:").unwrap();
  let learning = digest.find("(cs.LG:").unwrap();
  assert!(vision < learning);
  assert!(!digest.contains("2501.00002"));
  Ok(())
}

#[tokio::test]
async fn test_empty_days_still_get_files() -> TestResult<()> {
  let db = Database::open_in_memory().await?;
  let out = tempdir()?;
  let exporter = Exporter::new(db, DateRange::parse("2025-01-11", "2025-01-12")?, CategoryFilter::default());

  let written = exporter.to_jsonl(out.path()).await?;

  assert_eq!(written.len(), 2);
  assert!(std::fs::read_to_string(&written[0])?.is_empty());
  Ok(())
}

#[test]
fn test_reversed_range_is_rejected() {
  assert!(matches!(DateRange::new(day(7), day(6)), Err(CuratorError::InvalidDateRange { .. })));
  assert_eq!(DateRange::day(day(6)).days().count(), 1);
}

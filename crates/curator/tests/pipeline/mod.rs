//! Ingest, enrich and export against one store.

use curator::{
  ingest::{ingest, JsonlSource},
  translate::{translate_missing, Translator},
};

use super::*;

struct Shouting;

#[async_trait]
impl Translator for Shouting {
  async fn translate(&self, text: &str, _target: &str) -> Result<String, CuratorError> {
    Ok(text.to_uppercase())
  }
}

#[traced_test]
#[tokio::test]
async fn test_enrichment_is_written_back() -> TestResult<()> {
  let (db, _db_dir) = seeded_db(vec![
    paper("2501.00002", &["cs.CV"], day(6)),
    paper("2501.00001", &["cs.CR"], day(6)),
  ])
  .await;
  let model = ScriptedModel::new(|title| Ok(ModelOutput::Text(complete_json(title))));
  let enricher = Enricher::new(Arc::new(model), Provider::Local, "qwen").with_language("English");
  let out = tempdir()?;

  let exporter = Exporter::new(db.clone(), DateRange::day(day(6)), CategoryFilter::default());
  let reports = exporter.to_enriched_jsonl(out.path(), &enricher).await?;

  assert_eq!(reports.len(), 1);
  assert_eq!(reports[0].enriched, 1);
  let text = std::fs::read_to_string(out.path().join("2025-01-06_AI_enhanced_English.jsonl"))?;
  let records = JsonlRecord::parse_lines(&text)?;
  assert_eq!(records.len(), 1);
  assert_eq!(records[0].ai.as_ref().unwrap().tldr, "Paper 2501.00002");

  let stored = Query::on_date(day(6)).execute(&mut db.clone()).await?;
  let enriched = stored.iter().find(|p| p.url.ends_with("2501.00002")).unwrap();
  assert_eq!(enriched.ai_content.as_ref().unwrap().tldr, "Paper 2501.00002");
  let filtered = stored.iter().find(|p| p.url.ends_with("2501.00001")).unwrap();
  assert!(filtered.ai_content.is_none());
  Ok(())
}

#[traced_test]
#[tokio::test]
async fn test_reingest_keeps_enrichment_and_translations() -> TestResult<()> {
  let dir = tempdir()?;
  let crawl = dir.path().join("crawl.jsonl");
  let raw = serde_json::to_string(&paper("2501.00001", &["cs.CV"], day(6)))?;
  std::fs::write(&crawl, format!("{raw}\n"))?;
  let mut db = Database::open(dir.path().join("papers.db")).await?;

  ingest(&mut db, &mut JsonlSource::new(&crawl)).await?;
  let summary = translate_missing(&db, &Shouting, "zh-CN").await?;
  assert_eq!(summary.translated, 1);

  let model = ScriptedModel::new(|_| Ok(ModelOutput::Text(complete_json("kept"))));
  Enricher::new(Arc::new(model), Provider::Local, "qwen")
    .run(vec![record("2501.00001")], &mut db)
    .await;

  // A fresh crawl of the same paper carries no derived columns
  let report = ingest(&mut db, &mut JsonlSource::new(&crawl)).await?;
  assert_eq!(report.new, 0);

  let stored = Query::all().execute(&mut db).await?;
  assert_eq!(stored.len(), 1);
  assert_eq!(stored[0].title_translated.as_deref(), Some("PAPER 2501.00001"));
  assert_eq!(stored[0].ai_content.as_ref().unwrap().tldr, "kept");
  assert!(db.pending_translations().await?.is_empty());
  Ok(())
}

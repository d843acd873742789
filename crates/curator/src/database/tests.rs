use super::*;

/// Helper function to set up a test database
async fn setup_test_db() -> (Database, PathBuf, tempfile::TempDir) {
  let dir = tempdir().unwrap();
  let path = dir.path().join("test.db");
  let db = Database::open(&path).await.unwrap();
  (db, path, dir)
}

fn day(d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(2025, 1, d).unwrap() }

fn test_paper(id: &str, announced: u32) -> Paper {
  Paper {
    url:                  format!("https://arxiv.org/abs/{id}"),
    title:                format!("Paper {id}"),
    authors:              vec!["Ada Lovelace".into(), "Alan Turing".into()],
    abstract_text:        "An abstract".into(),
    comments:             Some("10 pages".into()),
    categories:           vec!["cs.CV".into(), "cs.AI".into()],
    first_submitted_date: day(announced - 1),
    first_announced_date: Some(day(announced)),
    title_translated:     None,
    abstract_translated:  None,
    ai_content:           None,
  }
}

#[traced_test]
#[tokio::test]
async fn test_database_creation() {
  let (db, path, _dir) = setup_test_db().await;
  assert!(path.exists());
  assert!(db.is_empty().await.unwrap());
}

#[traced_test]
#[test]
fn test_default_path() {
  let path = Database::default_path();
  assert!(path.ends_with("curator/papers.db") || path.ends_with("curator\\papers.db"));
}

#[traced_test]
#[tokio::test]
async fn test_upsert_is_idempotent() {
  let (mut db, _path, _dir) = setup_test_db().await;
  let paper = test_paper("2501.00001", 6);

  Upsert::paper(&paper).execute(&mut db).await.unwrap();
  Upsert::paper(&paper).execute(&mut db).await.unwrap();

  assert_eq!(db.len().await.unwrap(), 1);
  let (id, pdf): (String, String) = db
    .conn
    .call(|conn| Ok(conn.query_row("SELECT id, pdf FROM papers", [], |r| Ok((r.get(0)?, r.get(1)?)))?))
    .await
    .unwrap();
  assert_eq!(id, "2501.00001");
  assert_eq!(pdf, "https://arxiv.org/pdf/2501.00001");

  let stored = Query::all().execute(&mut db).await.unwrap();
  assert_eq!(stored, vec![paper]);
}

#[traced_test]
#[tokio::test]
async fn test_upsert_rejects_whole_batch_without_announced_date() {
  let (mut db, _path, _dir) = setup_test_db().await;
  let good = test_paper("2501.00001", 6);
  let mut bad = test_paper("2501.00002", 6);
  bad.first_announced_date = None;

  let err = Upsert::papers([good, bad]).execute(&mut db).await.unwrap_err();
  assert!(matches!(err, CuratorError::MissingAnnouncedDate(url) if url.ends_with("2501.00002")));
  assert!(db.is_empty().await.unwrap());
}

#[traced_test]
#[tokio::test]
async fn test_reingestion_keeps_enrichment() {
  let (mut db, _path, _dir) = setup_test_db().await;
  let paper = test_paper("2501.00001", 6);
  Upsert::paper(&paper).execute(&mut db).await.unwrap();

  let content = AiContent { tldr: "x".into(), ..AiContent::defaults() };
  assert!(UpdateAiContent::new(&paper.url, content.clone()).execute(&mut db).await.unwrap());
  assert!(UpdateTranslation::new(&paper.url, Some("标题".into()), Some("摘要".into()))
    .execute(&mut db)
    .await
    .unwrap());

  let mut recrawled = paper.clone();
  recrawled.title = "Paper 2501.00001 (v2)".into();
  Upsert::paper(&recrawled).execute(&mut db).await.unwrap();

  let stored = Query::on_date(day(6)).execute(&mut db).await.unwrap();
  assert_eq!(stored.len(), 1);
  assert_eq!(stored[0].title, "Paper 2501.00001 (v2)");
  assert_eq!(stored[0].ai_content, Some(content));
  assert_eq!(stored[0].title_translated.as_deref(), Some("标题"));
  assert_eq!(stored[0].abstract_translated.as_deref(), Some("摘要"));
}

#[traced_test]
#[tokio::test]
async fn test_update_unknown_url() {
  let (mut db, _path, _dir) = setup_test_db().await;
  let updated = UpdateAiContent::new("https://arxiv.org/abs/missing", AiContent::defaults())
    .execute(&mut db)
    .await
    .unwrap();
  assert!(!updated);
}

#[traced_test]
#[tokio::test]
async fn test_count_new_since_stops_at_first_known() {
  let (mut db, _path, _dir) = setup_test_db().await;
  let known = test_paper("2501.00003", 6);
  Upsert::paper(&known).execute(&mut db).await.unwrap();

  let candidates =
    [test_paper("2501.00005", 7), test_paper("2501.00004", 7), known, test_paper("2501.00001", 7)];
  assert_eq!(db.count_new_since(&candidates).await.unwrap(), 2);
  assert_eq!(db.count_new_since(&candidates[..2]).await.unwrap(), 2);
  assert_eq!(db.count_new_since(&[]).await.unwrap(), 0);
}

#[traced_test]
#[tokio::test]
async fn test_newest_ingest_time() {
  let (mut db, _path, _dir) = setup_test_db().await;

  let cold = db.newest_ingest_time().await.unwrap();
  let expected = Utc::now() - Duration::days(COLD_START_LOOKBACK_DAYS);
  assert!((cold - expected).num_seconds().abs() < 5);

  Upsert::paper(&test_paper("2501.00001", 6)).execute(&mut db).await.unwrap();
  let warm = db.newest_ingest_time().await.unwrap();
  assert!((Utc::now() - warm).num_seconds().abs() < 5);
}

#[traced_test]
#[tokio::test]
async fn test_query_ordering() {
  let (mut db, _path, _dir) = setup_test_db().await;
  let papers = vec![
    test_paper("2501.00002", 6),
    test_paper("2501.00009", 7),
    test_paper("2501.00001", 6),
  ];
  Upsert::papers(papers).execute(&mut db).await.unwrap();

  let on_day = Query::on_date(day(6)).execute(&mut db).await.unwrap();
  let ids: Vec<_> = on_day.iter().map(|p| p.id().to_owned()).collect();
  assert_eq!(ids, vec!["2501.00002", "2501.00001"]);

  let all = Query::all().execute(&mut db).await.unwrap();
  let ids: Vec<_> = all.iter().map(|p| p.id().to_owned()).collect();
  assert_eq!(ids, vec!["2501.00009", "2501.00002", "2501.00001"]);

  assert!(Query::on_date(day(8)).execute(&mut db).await.unwrap().is_empty());
}

#[traced_test]
#[tokio::test]
async fn test_schema_evolution_backfills_legacy_rows() {
  let dir = tempdir().unwrap();
  let path = dir.path().join("legacy.db");
  {
    let conn = rusqlite::Connection::open(&path).unwrap();
    conn
      .execute_batch(
        "CREATE TABLE papers (
           url TEXT PRIMARY KEY,
           authors TEXT NOT NULL,
           first_submitted_date DATE NOT NULL,
           first_announced_date DATE NOT NULL,
           update_time DATETIME NOT NULL,
           categories TEXT NOT NULL,
           title TEXT NOT NULL,
           comments TEXT,
           abstract TEXT NOT NULL
         );
         INSERT INTO papers VALUES (
           'https://arxiv.org/abs/2401.01234', 'Ada Lovelace, Alan Turing', '2024-01-01',
           '2024-01-02', '2024-01-02 08:00:00.123456', 'cs.CL,cs.AI', 'Legacy', 'No comments',
           'Old abstract'
         );",
      )
      .unwrap();
  }

  let mut db = Database::open(&path).await.unwrap();
  let names: Vec<String> = db.columns().await.unwrap().into_iter().map(|c| c.name).collect();
  for column in ["id", "pdf", "title_translated", "abstract_translated", "ai_content", "summary"] {
    assert!(names.contains(&column.to_string()), "missing column {column}");
  }
  assert!(logs_contain("Added missing column: id"));

  let (id, pdf): (String, String) = db
    .conn
    .call(|conn| Ok(conn.query_row("SELECT id, pdf FROM papers", [], |r| Ok((r.get(0)?, r.get(1)?)))?))
    .await
    .unwrap();
  assert_eq!(id, "2401.01234");
  assert_eq!(pdf, "https://arxiv.org/pdf/2401.01234");

  let legacy = Query::all().execute(&mut db).await.unwrap();
  assert_eq!(legacy[0].authors, vec!["Ada Lovelace", "Alan Turing"]);
  assert_eq!(legacy[0].comment(), None);
  let newest = db.newest_ingest_time().await.unwrap();
  assert_eq!(newest.format("%Y-%m-%d %H:%M:%S").to_string(), "2024-01-02 08:00:00");

  drop(db);
  let db = Database::open(&path).await.unwrap();
  assert_eq!(db.columns().await.unwrap().len(), names.len());
}

#[traced_test]
#[tokio::test]
async fn test_crawler_store_accepts_upserts() {
  let dir = tempdir().unwrap();
  let path = dir.path().join("crawler.db");
  {
    let conn = rusqlite::Connection::open(&path).unwrap();
    conn
      .execute_batch(
        "CREATE TABLE IF NOT EXISTS papers (
           url TEXT PRIMARY KEY,
           id TEXT NOT NULL,
           pdf TEXT NOT NULL,
           authors TEXT NOT NULL,
           title_translated TEXT,
           first_submitted_date DATE NOT NULL,
           first_announced_date DATE NOT NULL,
           update_time DATETIME NOT NULL,
           categories TEXT NOT NULL,
           title TEXT NOT NULL,
           comments TEXT,
           abstract TEXT NOT NULL,
           summary TEXT NOT NULL,
           abstract_translated TEXT,
           ai_content TEXT
         );",
      )
      .unwrap();
  }

  let mut db = Database::open(&path).await.unwrap();
  assert!(db.columns().await.unwrap().iter().any(|c| c.name == "summary" && c.not_null));

  let paper = test_paper("2501.00001", 6);
  let written = Upsert::papers([paper.clone()]).execute(&mut db).await.unwrap();
  assert_eq!(written, 1);
  // Second pass goes through the conflict branch
  Upsert::paper(&paper).execute(&mut db).await.unwrap();

  let summary: String = db
    .conn
    .call(|conn| Ok(conn.query_row("SELECT summary FROM papers", [], |r| r.get(0))?))
    .await
    .unwrap();
  assert_eq!(summary, paper.abstract_text);
  assert_eq!(Query::on_date(day(6)).execute(&mut db).await.unwrap(), vec![paper]);
}

#[traced_test]
#[tokio::test]
async fn test_stored_ai_content_with_extra_keys_is_read() {
  let (mut db, _path, _dir) = setup_test_db().await;
  let paper = test_paper("2501.00001", 6);
  Upsert::paper(&paper).execute(&mut db).await.unwrap();
  db.conn
    .call(|conn| {
      Ok(conn.execute(
        "UPDATE papers SET ai_content = ?1",
        [r#"{"tldr": "t", "motivation": "m", "method": "me", "result": "r", "conclusion": "c", "score": 7}"#],
      )?)
    })
    .await
    .unwrap();

  let stored = Query::all().execute(&mut db).await.unwrap();
  assert_eq!(stored[0].ai_content.as_ref().unwrap().tldr, "t");
}

#[traced_test]
#[tokio::test]
async fn test_pending_translations() {
  let (mut db, _path, _dir) = setup_test_db().await;
  let mut translated = test_paper("2501.00001", 6);
  translated.title_translated = Some("标题".into());
  translated.abstract_translated = Some("摘要".into());
  let untranslated = test_paper("2501.00002", 6);
  Upsert::papers([translated, untranslated.clone()]).execute(&mut db).await.unwrap();

  let mut half = test_paper("2501.00003", 6);
  half.abstract_translated = Some("摘要".into());
  Upsert::paper(&half).execute(&mut db).await.unwrap();

  let pending = db.pending_translations().await.unwrap();
  assert_eq!(pending, vec![
    PendingTranslation { url: half.url, title: Some(half.title), abstract_text: None },
    PendingTranslation {
      url:           untranslated.url,
      title:         Some(untranslated.title),
      abstract_text: Some(untranslated.abstract_text),
    },
  ]);
}

use curator::enrich::{FUNCTION_ARGS_PREFIX, FUNCTION_ARGS_SUFFIX};

use super::*;

#[traced_test]
#[tokio::test]
async fn test_failing_model_still_fills_every_field() -> TestResult<()> {
  let model = Arc::new(ScriptedModel::new(|_| Err(CuratorError::ApiError("500: boom".into()))));
  let enricher = Enricher::new(model.clone(), Provider::Official, "deepseek-chat").with_workers(3);
  let mut db = Database::open_in_memory().await?;

  let records: Vec<_> = ["2501.00001", "2501.00002", "2501.00003"].into_iter().map(record).collect();
  let report = enricher.run(records, &mut db).await;

  assert_eq!(report.records.len(), 3);
  assert_eq!(report.degraded, 3);
  assert_eq!(report.enriched, 0);
  for record in &report.records {
    assert_eq!(record.ai.as_ref(), Some(&AiContent::defaults()));
  }
  // Official providers never retry
  assert_eq!(model.calls(), 3);
  Ok(())
}

#[traced_test]
#[tokio::test(start_paused = true)]
async fn test_unloaded_local_model_is_retried_three_times() -> TestResult<()> {
  let model = Arc::new(ScriptedModel::new(|_| {
    Err(CuratorError::ApiError(r#"400: {"error": "No models loaded. Please load a model."}"#.into()))
  }));
  let enricher = Enricher::new(model.clone(), Provider::Local, "qwen");
  let mut db = Database::open_in_memory().await?;

  let started = tokio::time::Instant::now();
  let report = enricher.run(vec![record("2501.00001")], &mut db).await;

  assert_eq!(model.calls(), 3);
  let gaps = model.gaps();
  assert_eq!(gaps.len(), 2);
  assert!(gaps[0] >= StdDuration::from_secs(2) && gaps[0] < StdDuration::from_secs(3));
  assert!(gaps[1] >= StdDuration::from_secs(4) && gaps[1] < StdDuration::from_secs(5));
  let elapsed = started.elapsed();
  assert!(elapsed >= StdDuration::from_secs(6) && elapsed < StdDuration::from_secs(7));
  assert_eq!(report.degraded, 1);
  assert_eq!(report.records[0].ai.as_ref(), Some(&AiContent::defaults()));
  Ok(())
}

#[traced_test]
#[tokio::test]
async fn test_escaped_function_arguments_are_salvaged() -> TestResult<()> {
  let model = Arc::new(ScriptedModel::new(|_| {
    Err(CuratorError::MalformedOutput {
      message: "invalid escape".into(),
      raw:     format!(
        r#"{FUNCTION_ARGS_PREFIX} {{"tldr": "x", "method": "match \d+ digits"}} {FUNCTION_ARGS_SUFFIX}"#
      ),
    })
  }));
  let enricher = Enricher::new(model, Provider::Official, "deepseek-chat");
  let mut db = Database::open_in_memory().await?;

  let report = enricher.run(vec![record("2501.00001")], &mut db).await;
  let ai = report.records[0].ai.clone().unwrap();

  assert_eq!(ai.tldr, "x");
  assert_eq!(ai.method, r"match \d+ digits");
  assert_eq!(ai.motivation, AiContent::defaults().motivation);
  assert_eq!(report.degraded, 1);
  Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_output_keeps_input_order() -> TestResult<()> {
  // Earlier records take longer, so completion order is the reverse of input order.
  let model = ScriptedModel::new(|title| Ok(ModelOutput::Text(complete_json(title))))
    .with_delay(|title| {
      let n: u64 = title.rsplit('.').next().and_then(|n| n.parse().ok()).unwrap_or(0);
      StdDuration::from_millis(1000 - n * 100)
    });
  let enricher = Enricher::new(Arc::new(model), Provider::Local, "qwen").with_workers(4);
  let mut db = Database::open_in_memory().await?;

  let ids: Vec<String> = (1..=8).map(|n| format!("2501.0000{n}")).collect();
  let report = enricher.run(ids.iter().map(|id| record(id)).collect(), &mut db).await;

  let out: Vec<&str> = report.records.iter().map(|r| r.id.as_str()).collect();
  assert_eq!(out, ids.iter().map(String::as_str).collect::<Vec<_>>());
  for record in &report.records {
    assert_eq!(record.ai.as_ref().unwrap().tldr, record.title);
  }
  assert_eq!(report.enriched, 8);
  Ok(())
}

#[traced_test]
#[tokio::test]
async fn test_local_model_falls_back_to_first_served() -> TestResult<()> {
  let model = Arc::new(
    ScriptedModel::new(|_| Ok(ModelOutput::Text(format!("Sure!\n```json\n{}\n```", complete_json("t")))))
      .with_models(&["qwen2.5-7b-instruct", "llama-3"]),
  );
  let enricher = Enricher::new(model.clone(), Provider::Local, "not-installed");
  let mut db = Database::open_in_memory().await?;

  let report = enricher.run(vec![record("2501.00001"), record("2501.00002")], &mut db).await;

  assert_eq!(report.enriched, 2);
  assert!(model.seen_models.lock().unwrap().iter().all(|m| m == "qwen2.5-7b-instruct"));
  Ok(())
}

#[tokio::test]
async fn test_partial_text_answer_is_degraded() -> TestResult<()> {
  let model = ScriptedModel::new(|_| {
    Ok(ModelOutput::Text(r#"{"tldr": "short", "motivation": "why", "method": 3}"#.into()))
  });
  let enricher = Enricher::new(Arc::new(model), Provider::Local, "qwen");
  let mut db = Database::open_in_memory().await?;

  let report = enricher.run(vec![record("2501.00001")], &mut db).await;
  let ai = report.records[0].ai.clone().unwrap();

  assert_eq!(ai.tldr, "short");
  assert_eq!(ai.motivation, "why");
  assert_eq!(ai.method, AiContent::defaults().method);
  assert_eq!(report.degraded, 1);
  Ok(())
}

#[tokio::test]
async fn test_duplicate_ids_are_enriched_once() -> TestResult<()> {
  let model = Arc::new(ScriptedModel::new(|_| {
    Ok(ModelOutput::Structured(AiContent {
      tldr:       "t".into(),
      motivation: "m".into(),
      method:     "me".into(),
      result:     "r".into(),
      conclusion: "c".into(),
    }))
  }));
  let enricher = Enricher::new(model.clone(), Provider::Official, "deepseek-chat").with_workers(2);
  let mut db = Database::open_in_memory().await?;

  let records = vec![record("2501.00001"), record("2501.00002"), record("2501.00001")];
  let report = enricher.run(records, &mut db).await;

  assert_eq!(report.records.len(), 2);
  assert_eq!(model.calls(), 2);
  assert_eq!(report.enriched, 2);
  Ok(())
}

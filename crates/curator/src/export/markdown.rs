//! Daily Markdown digest.

use crate::categories::{category_name, Lang};

use super::*;

/// Renders the digest for one day.
///
/// Accepted papers are grouped by primary category, groups are sorted by category code,
/// and papers are numbered from 1 within each group in their stored order.
pub fn render_markdown(label: &str, accepted: &[ExportRecord], rejected: usize) -> String {
  let mut groups: BTreeMap<&str, Vec<&Paper>> = BTreeMap::new();
  for record in accepted {
    groups.entry(record.paper.primary_category()).or_default().push(&record.paper);
  }

  let mut out = format!(
    "# 论文全览：{label}\n\n共有{}篇相关领域论文, 另有{rejected}篇其他\n\n",
    accepted.len()
  );
  for (code, papers) in groups {
    out.push_str(&format!(
      "## {}({code}:{})\n\n",
      category_name(code, Lang::Zh),
      category_name(code, Lang::En)
    ));
    for (idx, paper) in papers.into_iter().enumerate() {
      out.push_str(&render_entry(idx + 1, paper));
    }
  }
  out
}

/// One numbered entry. Missing translations fall back to the original text.
fn render_entry(idx: usize, paper: &Paper) -> String {
  format!(
    "【{idx}】{title}\n- **标题**: {title_shown}\n- **链接**: {url}\n> **作者**: {authors}\n> \
     **摘要**: {abstract_shown}\n> **Abstract**: {abstract_text}\n\n",
    title = paper.title,
    title_shown = paper.title_translated.as_deref().unwrap_or(&paper.title),
    url = paper.url,
    authors = paper.authors_display(),
    abstract_shown = paper.abstract_translated.as_deref().unwrap_or(&paper.abstract_text),
    abstract_text = paper.abstract_text,
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::filter::Verdict;

  fn record(id: &str, categories: &[&str], translated: Option<&str>) -> ExportRecord {
    ExportRecord {
      paper:   Paper {
        url:                  format!("https://arxiv.org/abs/{id}"),
        title:                format!("Title {id}"),
        authors:              vec!["Ada Lovelace".into(), "Alan Turing".into()],
        abstract_text:        format!("Abstract {id}"),
        comments:             None,
        categories:           categories.iter().map(|c| c.to_string()).collect(),
        first_submitted_date: NaiveDate::from_ymd_opt(2025, 1, 5).unwrap(),
        first_announced_date: NaiveDate::from_ymd_opt(2025, 1, 6),
        title_translated:     translated.map(str::to_owned),
        abstract_translated:  None,
        ai_content:           None,
      },
      verdict: Verdict::Accepted,
    }
  }

  #[test]
  fn test_groups_sorted_and_numbered() {
    let accepted = vec![
      record("2501.00003", &["cs.LG"], None),
      record("2501.00001", &["cs.CV", "cs.AI"], Some("视觉标题")),
      record("2501.00002", &["cs.LG", "cs.CV"], None),
    ];
    let md = render_markdown("2025-01-06", &accepted, 4);

    assert!(md.starts_with("# 论文全览：2025-01-06\n\n共有3篇相关领域论文, 另有4篇其他\n\n"));
    let cv = md.find("## 计算机视觉和模式识别(cs.CV:Computer Vision and Pattern Recognition)").unwrap();
    let lg = md.find("## 机器学习(cs.LG:Machine Learning)").unwrap();
    assert!(cv < lg);

    assert!(md.contains("【1】Title 2501.00001\n- **标题**: 视觉标题\n"));
    assert!(md.contains("【1】Title 2501.00003\n- **标题**: Title 2501.00003\n"));
    assert!(md.contains("【2】Title 2501.00002\n"));
    assert!(md.contains("> **作者**: Ada Lovelace, Alan Turing\n"));
    assert!(md.contains("> **摘要**: Abstract 2501.00002\n> **Abstract**: Abstract 2501.00002\n\n"));
  }

  #[test]
  fn test_empty_day() {
    assert_eq!(render_markdown("2025-01-06", &[], 0), "# 论文全览：2025-01-06\n\n共有0篇相关领域论文, 另有0篇其他\n\n");
  }
}

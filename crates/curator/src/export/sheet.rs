//! Daily CSV sheet.

use csv::{Terminator, WriterBuilder};

use super::*;

/// Header row, in column order.
pub const CSV_HEADERS: [&str; 13] = [
  "Title",
  "Interest",
  "Title Translated",
  "Categories",
  "Authors",
  "URL",
  "PapersCool",
  "First Submitted Date",
  "First Announced Date",
  "Abstract",
  "Abstract Translated",
  "Comments",
  "Note",
];

/// Line ending written after each CSV row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineTerminator {
  /// `\n`
  #[default]
  Lf,
  /// `\r\n`
  Crlf,
}

/// Dialect of the CSV sheets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvOptions {
  /// Field delimiter
  pub delimiter:  char,
  /// Row terminator
  pub terminator: LineTerminator,
  /// Whether to write the header row
  pub header:     bool,
}

impl Default for CsvOptions {
  fn default() -> Self { Self { delimiter: ',', terminator: LineTerminator::Lf, header: true } }
}

impl CsvOptions {
  /// The delimiter as a single byte, as required by the CSV writer.
  fn delimiter_byte(&self) -> Result<u8> {
    u8::try_from(self.delimiter)
      .ok()
      .filter(u8::is_ascii)
      .ok_or_else(|| CuratorError::Config(format!("CSV delimiter {:?} is not ASCII", self.delimiter)))
  }
}

/// Renders records to CSV bytes, one row per record in the given order.
pub(super) fn render_csv<'a>(
  records: impl Iterator<Item = &'a ExportRecord>,
  options: &CsvOptions,
) -> Result<Vec<u8>> {
  let terminator = match options.terminator {
    LineTerminator::Lf => Terminator::Any(b'\n'),
    LineTerminator::Crlf => Terminator::CRLF,
  };
  let mut writer =
    WriterBuilder::new().delimiter(options.delimiter_byte()?).terminator(terminator).from_writer(vec![]);

  if options.header {
    writer.write_record(CSV_HEADERS)?;
  }
  for record in records {
    writer.write_record(row(record))?;
  }
  writer.into_inner().map_err(|e| CuratorError::Path(e.into_error()))
}

/// Cells of one row, matching [`CSV_HEADERS`].
fn row(record: &ExportRecord) -> [String; 13] {
  let paper = &record.paper;
  let or_dash = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_owned());
  [
    paper.title.clone(),
    if record.verdict.is_accepted() { "chosen" } else { "filtered" }.to_owned(),
    or_dash(&paper.title_translated),
    paper.categories.join(","),
    paper.authors_display(),
    paper.url.clone(),
    paper.papers_cool_url(),
    paper.first_submitted_date.format("%Y-%m-%d").to_string(),
    paper.first_announced_date.map(|date| date.format("%Y-%m-%d").to_string()).unwrap_or_default(),
    paper.abstract_text.clone(),
    or_dash(&paper.abstract_translated),
    paper.comments.clone().unwrap_or_default(),
    record.verdict.note().to_owned(),
  ]
}

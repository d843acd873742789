//! Prompt text and the output schema sent to the model.

use serde_json::{json, Value};

use super::*;

/// Name of the function the model is asked to call in structured mode.
pub const STRUCTURE_FUNCTION: &str = "Structure";

/// Builds the system prompt for `language`.
fn system(language: &str) -> String {
  format!(
    "You are a professional paper analyst. You read the title and abstract of a newly \
     announced paper and summarize it for researchers skimming the day's submissions. Be \
     concise and factual, never invent results the abstract does not state, and answer in \
     {language}."
  )
}

/// Builds the user prompt for one paper.
fn user(title: &str, abstract_text: &str, language: &str) -> String {
  format!(
    "Title: {title}\n\nAbstract: {abstract_text}\n\nFill in the fields tldr, motivation, \
     method, result and conclusion for this paper. Write every field in {language}."
  )
}

/// JSON schema of the five-field payload.
pub fn structure_schema() -> Value {
  let field = |description: &str| json!({ "type": "string", "description": description });
  json!({
    "type": "object",
    "properties": {
      "tldr": field("describe the main task of this paper"),
      "motivation": field("describe the motivation in this paper"),
      "method": field("method of this paper"),
      "result": field("result of this paper"),
      "conclusion": field("conclusion of this paper"),
    },
    "required": AiContent::FIELDS,
  })
}

/// Instructions appended to the system prompt when the provider cannot call functions.
fn format_instructions() -> String {
  format!(
    "The output should be formatted as a JSON instance that conforms to the JSON schema \
     below. Reply with the JSON object only.\n\nHere is the output schema:\n```\n{}\n```",
    structure_schema()
  )
}

/// The conversation sent for one record.
pub fn messages(record: &JsonlRecord, language: &str, format: ResponseFormat) -> Vec<Message> {
  let system = match format {
    ResponseFormat::Structured => system(language),
    ResponseFormat::Text => format!("{}\n\n{}", system(language), format_instructions()),
  };
  vec![Message::system(system), Message::user(user(&record.title, &record.summary, language))]
}

//! Recovery of a JSON object from free-form model output.
//!
//! Models asked for JSON do not reliably return bare JSON. [`extract_json`] peels the
//! wrappings seen in practice, in this order, and stops at the first stage that yields
//! a parseable object:
//!
//! 1. the text is already a JSON object
//! 2. the whole text is a JSON string literal holding the object
//! 3. the text is a chat-completion envelope; the assistant content is used instead
//! 4. the object sits in a fenced code block
//! 5. the object is embedded in prose and located by bracket matching
//!
//! ```
//! use curator::enrich::extract_json;
//!
//! let object = extract_json(r#""{\"tldr\": \"x\"}""#).unwrap();
//! assert_eq!(object["tldr"], "x");
//! ```

use serde_json::{Map, Value};

use super::*;

/// Prefix of the error payload produced when function-call arguments are not valid JSON.
pub const FUNCTION_ARGS_PREFIX: &str = "Function Structure arguments:";

/// Suffix of the same payload.
pub const FUNCTION_ARGS_SUFFIX: &str = "are not valid JSON";

lazy_static! {
  /// A fenced code block, optionally tagged `json`, holding an object.
  static ref FENCED: Regex = Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").unwrap();
}

/// Recovers a JSON object from model output, or `None` when every stage fails.
pub fn extract_json(text: &str) -> Option<Map<String, Value>> {
  let text = unquote(text.trim());
  let text = envelope_content(&text).unwrap_or(text);
  let text = text.trim();

  parse_object(text)
    .or_else(|| FENCED.captures(text).and_then(|caps| caps.get(1)).and_then(|m| parse_object(m.as_str())))
    .or_else(|| balanced_object(text).and_then(parse_object))
    .or_else(|| greedy_object(text).and_then(parse_object))
}

/// Salvages a partial object from an error payload.
///
/// For payloads of the form `Function Structure arguments: <json> are not valid JSON` the
/// JSON segment is parsed as is first. If that fails, the usual culprit is unescaped LaTeX
/// backslashes, so it is parsed again with every backslash doubled. Any other payload goes
/// through [`extract_json`].
pub fn salvage_payload(payload: &str) -> Option<Map<String, Value>> {
  match payload.split_once(FUNCTION_ARGS_PREFIX) {
    Some((_, rest)) => {
      let segment = rest.split(FUNCTION_ARGS_SUFFIX).next().unwrap_or(rest).trim();
      parse_object(segment).or_else(|| parse_object(&segment.replace('\\', "\\\\")))
    },
    None => extract_json(payload),
  }
}

/// Parses `text` as a JSON object.
fn parse_object(text: &str) -> Option<Map<String, Value>> {
  match serde_json::from_str(text) {
    Ok(Value::Object(object)) => Some(object),
    _ => None,
  }
}

/// Unwraps a text that is one JSON string literal; anything else is returned as is.
fn unquote(text: &str) -> String {
  if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
    if let Ok(inner) = serde_json::from_str::<String>(text) {
      return inner.trim().to_owned();
    }
  }
  text.to_owned()
}

/// The assistant message of a chat-completion envelope, if `text` is one.
fn envelope_content(text: &str) -> Option<String> {
  if !text.starts_with('{') || !text.contains("\"choices\"") {
    return None;
  }
  let envelope: Value = serde_json::from_str(text).ok()?;
  envelope
    .pointer("/choices/0/message/content")
    .and_then(Value::as_str)
    .filter(|content| !content.is_empty())
    .map(str::to_owned)
}

/// The first `{...}` span whose braces balance, skipping braces inside strings.
fn balanced_object(text: &str) -> Option<&str> {
  let start = text.find('{')?;
  let mut depth = 0usize;
  let mut in_string = false;
  let mut escaped = false;
  for (offset, c) in text[start..].char_indices() {
    if in_string {
      match c {
        _ if escaped => escaped = false,
        '\\' => escaped = true,
        '"' => in_string = false,
        _ => {},
      }
      continue;
    }
    match c {
      '"' => in_string = true,
      '{' => depth += 1,
      '}' => {
        depth -= 1;
        if depth == 0 {
          return Some(&text[start..=start + offset]);
        }
      },
      _ => {},
    }
  }
  None
}

/// Everything from the first `{` to the last `}`.
fn greedy_object(text: &str) -> Option<&str> {
  let start = text.find('{')?;
  let end = text.rfind('}')?;
  (end > start).then(|| &text[start..=end])
}

//! Client for OpenAI-compatible chat-completion servers.
//!
//! The same wire format is spoken by hosted APIs and by local servers such as LM Studio,
//! so one [`ChatClient`] covers both enrichment providers and the translation pass. A
//! request is assembled with the [`ChatRequest`] builder and sent through the client:
//!
//! ```no_run
//! use curator::llm::{ChatClient, ChatRequest};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ChatClient::new("https://api.deepseek.com")?.with_api_key("sk-...");
//! let request = ChatRequest::new()
//!   .with_model("deepseek-chat")
//!   .with_system("You are a helpful assistant.")
//!   .with_message("What is quantum computing?");
//!
//! let completion = client.send(&request).await?;
//! println!("{}", completion.content().unwrap_or_default());
//! # Ok(())
//! # }
//! ```

use std::time::Duration as StdDuration;

use serde_json::{json, Value};

use crate::{
  enrich::{
    structure_schema, LanguageModel, ModelOutput, ResponseFormat, FUNCTION_ARGS_PREFIX,
    FUNCTION_ARGS_SUFFIX, STRUCTURE_FUNCTION,
  },
  translate::Translator,
};

use super::*;

/// Timeout applied to every HTTP call unless configured otherwise.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  /// Instructions framing the conversation
  System,
  /// The caller's input
  User,
  /// The model's answer
  Assistant,
}

/// One message of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
  /// The role of the message sender
  pub role:    Role,
  /// The text of the message
  pub content: String,
}

impl Message {
  /// A system message.
  pub fn system(content: impl Into<String>) -> Self {
    Self { role: Role::System, content: content.into() }
  }

  /// A user message.
  pub fn user(content: impl Into<String>) -> Self {
    Self { role: Role::User, content: content.into() }
  }
}

/// Request builder for chat completions.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChatRequest {
  /// The model to run. Sending fails when unset.
  pub model: Option<String>,

  /// Conversation messages, in order. Sending fails when empty.
  pub messages: Vec<Message>,

  /// Function definitions offered to the model.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub tools: Option<Vec<Value>>,

  /// Forces a specific function call.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub tool_choice: Option<Value>,

  /// Sampling temperature.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub temperature: Option<f64>,
}

impl ChatRequest {
  /// Creates an empty request.
  pub fn new() -> Self { Self::default() }

  /// Sets the model to run.
  pub fn with_model(mut self, model: impl Into<String>) -> Self {
    self.model.replace(model.into());
    self
  }

  /// Appends a system message.
  pub fn with_system(mut self, content: impl Into<String>) -> Self {
    self.messages.push(Message::system(content));
    self
  }

  /// Appends a user message.
  pub fn with_message(mut self, content: impl Into<String>) -> Self {
    self.messages.push(Message::user(content));
    self
  }

  /// Appends existing messages.
  pub fn with_messages(mut self, messages: &[Message]) -> Self {
    self.messages.extend_from_slice(messages);
    self
  }

  /// Sets the sampling temperature.
  pub fn with_temperature(mut self, temperature: f64) -> Self {
    self.temperature = Some(temperature);
    self
  }

  /// Offers one function with the given JSON schema and forces the model to call it.
  pub fn with_function(mut self, name: &str, description: &str, parameters: Value) -> Self {
    self.tools = Some(vec![json!({
      "type": "function",
      "function": { "name": name, "description": description, "parameters": parameters },
    })]);
    self.tool_choice = Some(json!({ "type": "function", "function": { "name": name } }));
    self
  }
}

/// A chat-completion response body.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletion {
  /// Generated alternatives, usually exactly one
  #[serde(default)]
  pub choices: Vec<Choice>,
}

/// One generated alternative.
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
  /// The assistant's message
  pub message: AssistantMessage,
}

/// The assistant's side of a completion.
#[derive(Debug, Clone, Deserialize)]
pub struct AssistantMessage {
  /// Text content, absent when the model only called a function
  #[serde(default)]
  pub content:    Option<String>,
  /// Function calls requested by the model
  #[serde(default)]
  pub tool_calls: Option<Vec<ToolCall>>,
}

/// A function call requested by the model.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCall {
  /// The called function
  pub function: FunctionCall,
}

/// Name and raw arguments of a function call.
#[derive(Debug, Clone, Deserialize)]
pub struct FunctionCall {
  /// Function name
  pub name:      String,
  /// Arguments as a JSON document in a string, not guaranteed to be valid
  pub arguments: String,
}

impl ChatCompletion {
  /// Text content of the first choice.
  pub fn content(&self) -> Option<&str> {
    self.choices.first().and_then(|choice| choice.message.content.as_deref())
  }

  /// Arguments of the first call to `name` in the first choice.
  pub fn function_arguments(&self, name: &str) -> Option<&str> {
    self.choices.first().and_then(|choice| {
      choice
        .message
        .tool_calls
        .iter()
        .flatten()
        .find(|call| call.function.name == name)
        .map(|call| call.function.arguments.as_str())
    })
  }
}

/// `GET /models` response body.
#[derive(Debug, Deserialize)]
struct ModelList {
  /// Served models
  #[serde(default)]
  data: Vec<ModelEntry>,
}

/// One served model.
#[derive(Debug, Deserialize)]
struct ModelEntry {
  /// Model identifier
  id: Option<String>,
}

/// HTTP client for one OpenAI-compatible server.
#[derive(Debug, Clone)]
pub struct ChatClient {
  /// Reused connection pool
  http:     reqwest::Client,
  /// Base URL without trailing slash, e.g. `http://127.0.0.1:1234/v1`
  base_url: String,
  /// Bearer token, if the server wants one
  api_key:  Option<String>,
  /// Model used for translation requests
  model:    Option<String>,
}

impl ChatClient {
  /// Creates a client for the server at `base_url` with the default timeout.
  pub fn new(base_url: &str) -> Result<Self> {
    Self::with_timeout(base_url, StdDuration::from_secs(DEFAULT_TIMEOUT_SECS))
  }

  /// Creates a client whose HTTP calls each time out after `timeout`.
  pub fn with_timeout(base_url: &str, timeout: StdDuration) -> Result<Self> {
    let base_url = base_url.trim().trim_end_matches('/').to_owned();
    Url::parse(&base_url)
      .map_err(|e| CuratorError::Config(format!("Invalid base URL {base_url}: {e}")))?;
    let http = reqwest::Client::builder().timeout(timeout).build()?;
    Ok(Self { http, base_url, api_key: None, model: None })
  }

  /// Sets the bearer token.
  pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
    self.api_key = Some(api_key.into()).filter(|key| !key.is_empty());
    self
  }

  /// Sets the model used by [`Translator::translate`].
  pub fn with_model(mut self, model: impl Into<String>) -> Self {
    self.model = Some(model.into());
    self
  }

  /// The base URL requests are sent to.
  pub fn base_url(&self) -> &str { &self.base_url }

  /// Where the model list lives: `{base}/models` for `/v1` bases, else `{base}/v1/models`.
  pub fn models_url(&self) -> String {
    if self.base_url.ends_with("/v1") {
      format!("{}/models", self.base_url)
    } else {
      format!("{}/v1/models", self.base_url)
    }
  }

  /// Attaches the bearer token, if any.
  fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    match &self.api_key {
      Some(key) => request.bearer_auth(key),
      None => request,
    }
  }

  /// Sends a chat request.
  ///
  /// # Errors
  ///
  /// - [`CuratorError::LLMMissingModel`] / [`CuratorError::LLMMissingMessage`] for an
  ///   incomplete request
  /// - [`CuratorError::ApiError`] with the response body for a non-success status
  /// - [`CuratorError::Network`] when the call itself fails or times out
  pub async fn send(&self, request: &ChatRequest) -> Result<ChatCompletion> {
    if request.model.is_none() {
      return Err(CuratorError::LLMMissingModel);
    }
    if request.messages.is_empty() {
      return Err(CuratorError::LLMMissingMessage);
    }

    let url = format!("{}/chat/completions", self.base_url);
    trace!("POST {url}");
    let response = self.authorize(self.http.post(&url)).json(request).send().await?;
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
      return Err(CuratorError::ApiError(format!("{status}: {body}")));
    }
    serde_json::from_str(&body).map_err(|e| CuratorError::MalformedOutput {
      message: format!("Unreadable completion: {e}"),
      raw:     body,
    })
  }
}

#[async_trait]
impl LanguageModel for ChatClient {
  async fn invoke(
    &self,
    model: &str,
    messages: &[Message],
    format: ResponseFormat,
  ) -> Result<ModelOutput> {
    let request = ChatRequest::new().with_model(model).with_messages(messages);
    match format {
      ResponseFormat::Text => {
        let completion = self.send(&request).await?;
        completion.content().map(|text| ModelOutput::Text(text.to_owned())).ok_or_else(|| {
          CuratorError::MalformedOutput { message: "Completion has no content".into(), raw: String::new() }
        })
      },
      ResponseFormat::Structured => {
        let request = request.with_function(
          STRUCTURE_FUNCTION,
          "Structured summary of a paper",
          structure_schema(),
        );
        let completion = self.send(&request).await?;
        if let Some(arguments) = completion.function_arguments(STRUCTURE_FUNCTION) {
          return structured_output(arguments);
        }
        completion.content().map(|text| ModelOutput::Text(text.to_owned())).ok_or_else(|| {
          CuratorError::MalformedOutput {
            message: format!("Completion called no {STRUCTURE_FUNCTION} function"),
            raw:     String::new(),
          }
        })
      },
    }
  }

  async fn list_models(&self) -> Result<Vec<String>> {
    let url = self.models_url();
    let response = self.authorize(self.http.get(&url)).send().await?.error_for_status()?;
    let models: ModelList = response.json().await?;
    Ok(models.data.into_iter().filter_map(|entry| entry.id).filter(|id| !id.is_empty()).collect())
  }
}

#[async_trait]
impl Translator for ChatClient {
  async fn translate(&self, text: &str, target: &str) -> Result<String> {
    let model = self.model.clone().ok_or(CuratorError::LLMMissingModel)?;
    let request = ChatRequest::new()
      .with_model(model)
      .with_temperature(0.0)
      .with_system(format!(
        "Translate the user's text into {target}. Reply with the translation only, keeping \
         formulas, names and acronyms unchanged."
      ))
      .with_message(text);
    let completion = self.send(&request).await?;
    completion.content().map(|text| text.trim().to_owned()).ok_or_else(|| {
      CuratorError::MalformedOutput { message: "Translation has no content".into(), raw: String::new() }
    })
  }
}

/// Interprets the arguments of a [`STRUCTURE_FUNCTION`] call.
///
/// A complete object becomes [`ModelOutput::Structured`], ignoring extra keys. An object
/// missing fields is handed on as text so it is merged over the defaults. Arguments that
/// are not a JSON object are a [`CuratorError::MalformedOutput`] carrying the salvage
/// payload.
fn structured_output(arguments: &str) -> Result<ModelOutput> {
  match serde_json::from_str::<Value>(arguments) {
    Ok(Value::Object(object)) if AiContent::is_complete(&object) => {
      Ok(ModelOutput::Structured(AiContent::from_partial(&object)))
    },
    Ok(Value::Object(_)) => Ok(ModelOutput::Text(arguments.to_owned())),
    Ok(other) => Err(CuratorError::MalformedOutput {
      message: format!("Function arguments are not an object: {other}"),
      raw:     format!("{FUNCTION_ARGS_PREFIX} {arguments} {FUNCTION_ARGS_SUFFIX}"),
    }),
    Err(e) => Err(CuratorError::MalformedOutput {
      message: e.to_string(),
      raw:     format!("{FUNCTION_ARGS_PREFIX} {arguments} {FUNCTION_ARGS_SUFFIX}"),
    }),
  }
}

//! Chat-completions client used by the agents.
//!
//! The [`LlmClient`] trait is the seam tests mock; [`OpenAiCompatClient`]
//! speaks the OpenAI wire format, which OpenRouter and most hosted models
//! accept.

use std::time::Duration;

use async_trait::async_trait;
use forex_agent_models::LlmConfig;
use forex_agent_tools::credentials::read_env;
use forex_agent_tools::ToolDefinition;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::CrewError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: Option<String>,
    /// Set on assistant messages that request tools.
    pub tool_calls: Vec<ToolCall>,
    /// Set on tool result messages.
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    fn text(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::text(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::text(Role::User, content)
    }

    pub fn assistant(content: Option<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: Role::Assistant,
            content,
            tool_calls,
            tool_call_id: None,
        }
    }

    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: Some(tool_call_id.into()),
        }
    }

    fn to_wire(&self) -> Value {
        let mut msg = json!({
            "role": self.role.as_str(),
            "content": self.content,
        });
        if !self.tool_calls.is_empty() {
            msg["tool_calls"] = self
                .tool_calls
                .iter()
                .map(|call| {
                    json!({
                        "id": call.id,
                        "type": "function",
                        "function": {
                            "name": call.name,
                            "arguments": call.arguments.to_string(),
                        }
                    })
                })
                .collect();
        }
        if let Some(id) = &self.tool_call_id {
            msg["tool_call_id"] = json!(id);
        }
        msg
    }
}

/// One LLM call.
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    /// Overrides the client's default model.
    pub model: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub tools: Vec<ToolDefinition>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatResponse {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCall>,
    pub finish_reason: Option<String>,
    pub usage: TokenUsage,
}

impl ChatResponse {
    /// A plain text answer with no tool calls.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            tool_calls: Vec::new(),
            finish_reason: Some("stop".to_string()),
            usage: TokenUsage::default(),
        }
    }

    pub fn with_tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            content: None,
            tool_calls,
            finish_reason: Some("tool_calls".to_string()),
            usage: TokenUsage::default(),
        }
    }
}

/// Stateless LLM client. Each call carries the full conversation.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, CrewError>;
}

/// Client for any OpenAI-compatible `chat/completions` endpoint.
pub struct OpenAiCompatClient {
    client: Client,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    api_key: String,
}

impl OpenAiCompatClient {
    /// Build from config, reading the key from `config.api_key_env`.
    pub fn from_config(config: &LlmConfig) -> Result<Self, CrewError> {
        let api_key = read_env(&config.api_key_env).ok_or_else(|| CrewError::MissingApiKey {
            env_var: config.api_key_env.clone(),
        })?;
        Self::with_api_key(config, api_key)
    }

    pub fn with_api_key(config: &LlmConfig, api_key: String) -> Result<Self, CrewError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            api_key,
        })
    }

    pub fn build_body(&self, request: &ChatRequest) -> Value {
        let mut body = json!({
            "model": request.model.as_deref().unwrap_or(&self.model),
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
            "messages": request.messages.iter().map(ChatMessage::to_wire).collect::<Vec<_>>(),
        });
        if !request.tools.is_empty() {
            body["tools"] = request
                .tools
                .iter()
                .map(ToolDefinition::to_openai_schema)
                .collect();
        }
        body
    }
}

#[async_trait]
impl LlmClient for OpenAiCompatClient {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, CrewError> {
        let body = self.build_body(&request);
        debug!(
            model = %body["model"],
            messages = request.messages.len(),
            tools = request.tools.len(),
            "LLM request"
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CrewError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: Value = response.json().await?;
        parse_response(&body)
    }
}

/// Parse a chat-completions response body.
pub fn parse_response(body: &Value) -> Result<ChatResponse, CrewError> {
    // Some gateways report upstream failures in a 200 body.
    if let Some(error) = body.get("error") {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        let status = error.get("code").and_then(Value::as_u64).unwrap_or(0) as u16;
        return Err(CrewError::Api { status, message });
    }

    let choice = body
        .pointer("/choices/0")
        .ok_or_else(|| CrewError::InvalidResponse("no choices in response".to_string()))?;
    let message = choice
        .get("message")
        .ok_or_else(|| CrewError::InvalidResponse("choice has no message".to_string()))?;

    let content = message
        .get("content")
        .and_then(Value::as_str)
        .map(str::to_string);

    let mut tool_calls = Vec::new();
    if let Some(calls) = message.get("tool_calls").and_then(Value::as_array) {
        for (i, call) in calls.iter().enumerate() {
            let name = call
                .pointer("/function/name")
                .and_then(Value::as_str)
                .ok_or_else(|| CrewError::InvalidResponse("tool call without a name".to_string()))?;
            let id = call
                .get("id")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("call_{i}"));
            tool_calls.push(ToolCall {
                id,
                name: name.to_string(),
                arguments: parse_arguments(call.pointer("/function/arguments")),
            });
        }
    }

    let usage = TokenUsage {
        prompt_tokens: body
            .pointer("/usage/prompt_tokens")
            .and_then(Value::as_u64)
            .unwrap_or(0),
        completion_tokens: body
            .pointer("/usage/completion_tokens")
            .and_then(Value::as_u64)
            .unwrap_or(0),
    };

    Ok(ChatResponse {
        content,
        tool_calls,
        finish_reason: choice
            .get("finish_reason")
            .and_then(Value::as_str)
            .map(str::to_string),
        usage,
    })
}

/// Arguments arrive as a JSON-encoded string. Malformed text is passed on
/// as a string so the tool reports it as invalid input.
fn parse_arguments(raw: Option<&Value>) -> Value {
    match raw {
        Some(Value::String(s)) if s.trim().is_empty() => json!({}),
        Some(Value::String(s)) => serde_json::from_str(s).unwrap_or_else(|_| Value::String(s.clone())),
        Some(Value::Object(map)) => Value::Object(map.clone()),
        _ => json!({}),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OpenAiCompatClient {
        OpenAiCompatClient::with_api_key(&LlmConfig::default(), "test-key".to_string()).unwrap()
    }

    #[test]
    fn body_carries_model_tools_and_tool_messages() {
        let request = ChatRequest {
            model: None,
            messages: vec![
                ChatMessage::system("You are a forex analyst."),
                ChatMessage::user("Quote EUR/USD"),
                ChatMessage::assistant(
                    None,
                    vec![ToolCall {
                        id: "call_1".to_string(),
                        name: "forex_data_fetcher".to_string(),
                        arguments: json!({"from_currency": "EUR", "to_currency": "USD"}),
                    }],
                ),
                ChatMessage::tool_result("call_1", r#"{"success":true}"#),
            ],
            tools: vec![ToolDefinition {
                name: "forex_data_fetcher".to_string(),
                description: "quotes".to_string(),
                input_schema: json!({"type": "object"}),
            }],
        };

        let body = client().build_body(&request);
        assert_eq!(body["model"], "google/gemini-2.5-flash-preview-05-20");
        assert_eq!(body["max_tokens"], 2000);
        assert_eq!(body["tools"][0]["function"]["name"], "forex_data_fetcher");

        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages[2]["role"], "assistant");
        assert!(messages[2]["content"].is_null());
        let args: Value = serde_json::from_str(
            messages[2]["tool_calls"][0]["function"]["arguments"].as_str().unwrap(),
        )
        .unwrap();
        assert_eq!(args["from_currency"], "EUR");
        assert_eq!(messages[3]["role"], "tool");
        assert_eq!(messages[3]["tool_call_id"], "call_1");
    }

    #[test]
    fn body_omits_empty_tools_and_honours_model_override() {
        let request = ChatRequest {
            model: Some("openai/gpt-4o-mini".to_string()),
            messages: vec![ChatMessage::user("hi")],
            tools: vec![],
        };
        let body = client().build_body(&request);
        assert_eq!(body["model"], "openai/gpt-4o-mini");
        assert!(body.get("tools").is_none());
    }

    #[test]
    fn parse_text_response() {
        let body = json!({
            "choices": [{"message": {"role": "assistant", "content": "Final answer"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3}
        });
        let response = parse_response(&body).unwrap();
        assert_eq!(response.content.as_deref(), Some("Final answer"));
        assert!(response.tool_calls.is_empty());
        assert_eq!(response.usage.prompt_tokens, 12);
    }

    #[test]
    fn parse_tool_call_response() {
        let body = json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_abc",
                        "type": "function",
                        "function": {"name": "crypto_api_connector", "arguments": "{\"symbol\":\"BTC\"}"}
                    }, {
                        "type": "function",
                        "function": {"name": "risk_calculator", "arguments": "not json"}
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        });
        let response = parse_response(&body).unwrap();
        assert!(response.content.is_none());
        assert_eq!(response.tool_calls.len(), 2);
        assert_eq!(response.tool_calls[0].arguments["symbol"], "BTC");
        assert_eq!(response.tool_calls[1].id, "call_1");
        assert_eq!(response.tool_calls[1].arguments, json!("not json"));
    }

    #[test]
    fn parse_in_band_error() {
        let body = json!({"error": {"message": "Rate limit exceeded", "code": 429}});
        match parse_response(&body) {
            Err(CrewError::Api { status, message }) => {
                assert_eq!(status, 429);
                assert_eq!(message, "Rate limit exceeded");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn missing_key_env_is_reported() {
        let config = LlmConfig {
            api_key_env: "FOREX_AGENT_TEST_UNSET_KEY".to_string(),
            ..LlmConfig::default()
        };
        match OpenAiCompatClient::from_config(&config) {
            Err(CrewError::MissingApiKey { env_var }) => {
                assert_eq!(env_var, "FOREX_AGENT_TEST_UNSET_KEY")
            }
            Err(other) => panic!("expected MissingApiKey, got {other:?}"),
            Ok(_) => panic!("expected MissingApiKey"),
        }
    }
}

use std::time::Duration;

use forex_agent_models::VisionConfig;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use super::frames::EncodedFrame;
use crate::error::ToolError;

/// Client for an OpenAI-compatible chat-completions endpoint with image input.
pub struct VisionClient {
    client: Client,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    detail: String,
    api_key: String,
}

impl VisionClient {
    pub fn new(config: &VisionConfig, api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            detail: config.image_detail.clone(),
            api_key,
        }
    }

    pub fn request_body(&self, system: &str, instruction: &str, frames: &[EncodedFrame]) -> Value {
        let mut content = vec![json!({"type": "text", "text": instruction})];
        content.extend(frames.iter().map(|frame| {
            json!({
                "type": "image_url",
                "image_url": {"url": frame.data_url, "detail": self.detail}
            })
        }));

        json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": content}
            ]
        })
    }

    /// Send the frames and return the model's text reply.
    pub async fn analyze(
        &self,
        system: &str,
        instruction: &str,
        frames: &[EncodedFrame],
    ) -> Result<String, ToolError> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!(model = %self.model, frames = frames.len(), "Vision request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(system, instruction, frames))
            .send()
            .await
            .map_err(|e| ToolError::Vision(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ToolError::Vision(format!("HTTP {status}: {text}")));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ToolError::Vision(e.to_string()))?;
        reply_text(&body)
    }
}

/// `choices[0].message.content` of a chat-completions response.
pub fn reply_text(body: &Value) -> Result<String, ToolError> {
    body.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ToolError::Vision("response contained no message content".to_string()))
}

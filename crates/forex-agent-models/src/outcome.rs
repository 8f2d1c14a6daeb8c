use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Payload every tool returns instead of an error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolFailure {
    /// Always `false`; present so callers can branch on one field.
    pub success: bool,
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_path: Option<String>,
}

impl ToolFailure {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            message: None,
            raw_response: None,
            video_path: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_raw_response(mut self, raw: Value) -> Self {
        self.raw_response = Some(raw);
        self
    }

    pub fn with_video_path(mut self, path: impl Into<String>) -> Self {
        self.video_path = Some(path.into());
        self
    }

    pub fn to_value(&self) -> Value {
        // A struct of strings and JSON values always serializes.
        serde_json::to_value(self).unwrap_or_else(|_| {
            serde_json::json!({ "success": false, "error": self.error })
        })
    }
}

/// Serialize a payload and mark it `"success": true`.
pub fn success_value<T: Serialize>(payload: &T) -> Result<Value, serde_json::Error> {
    let mut value = serde_json::to_value(payload)?;
    if let Value::Object(map) = &mut value {
        map.insert("success".to_string(), Value::Bool(true));
    }
    Ok(value)
}

/// Whether a tool payload reports success.
pub fn is_success(payload: &Value) -> bool {
    payload
        .get("success")
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

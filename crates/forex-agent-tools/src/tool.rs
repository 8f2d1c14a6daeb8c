use std::sync::Arc;

use async_trait::async_trait;
use forex_agent_models::{success_value, ToolFailure};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ToolError;

/// A tool an agent can call.
///
/// `run` never fails: every problem is reported as a `"success": false`
/// payload so that the calling agent can read it like any other result.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (matches the function name the LLM calls).
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// JSON Schema for the input object.
    fn input_schema(&self) -> Value;

    async fn run(&self, input: Value) -> Value;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}

/// Tool definition for the LLM API.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

impl ToolDefinition {
    /// Convert to the OpenAI chat-completions `tools[]` entry format.
    pub fn to_openai_schema(&self) -> Value {
        serde_json::json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.input_schema,
            }
        })
    }
}

/// Deserialize a tool's input object, reporting bad input as a tool error.
pub(crate) fn parse_input<T: DeserializeOwned>(input: Value) -> Result<T, ToolError> {
    serde_json::from_value(input).map_err(|e| ToolError::InvalidInput(e.to_string()))
}

/// Turn a tool result into its JSON payload.
pub(crate) fn into_payload<T: Serialize>(tool: &str, result: Result<T, ToolError>) -> Value {
    match result {
        Ok(payload) => match success_value(&payload) {
            Ok(value) => value,
            Err(e) => ToolFailure::new(format!("Failed to serialize result: {e}")).to_value(),
        },
        Err(e) => {
            warn!(tool, error = %e, "Tool call failed");
            e.into_failure().to_value()
        }
    }
}

/// A name-indexed set of tools handed to one agent.
#[derive(Clone, Default)]
pub struct Toolbox {
    tools: Vec<Arc<dyn Tool>>,
}

impl Toolbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, tool: Arc<dyn Tool>) -> Self {
        self.register(tool);
        self
    }

    /// Add a tool, replacing any tool registered under the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.retain(|t| t.name() != tool.name());
        self.tools.push(tool);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Build a toolbox holding only the named tools.
    /// Returns the first unknown name as the error.
    pub fn subset(&self, names: &[String]) -> Result<Toolbox, String> {
        let mut selected = Toolbox::new();
        for name in names {
            let tool = self.get(name).ok_or_else(|| name.clone())?;
            selected.register(Arc::clone(tool));
        }
        Ok(selected)
    }

    /// Dispatch a call by tool name.
    pub async fn call(&self, name: &str, input: Value) -> Value {
        match self.get(name) {
            Some(tool) => {
                debug!(tool = name, "Calling tool");
                tool.run(input).await
            }
            None => ToolFailure::new(format!("Unknown tool: {name}"))
                .with_message(format!("Available tools: {}", self.names().join(", ")))
                .to_value(),
        }
    }
}

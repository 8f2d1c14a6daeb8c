use forex_agent_models::{is_success, ToolCallRecord};
use forex_agent_tools::Toolbox;
use tracing::{debug, info, warn};

use crate::error::CrewError;
use crate::llm::{ChatMessage, ChatRequest, LlmClient};
use crate::prompts::AgentProfile;

/// Sent once the tool budget is spent.
const FINAL_ANSWER_NUDGE: &str = "You have reached the maximum number of tool-using turns. \
     Do not call any more tools. Give your best complete final answer now, using the \
     information you already have.";

/// An LLM persona with its own tools.
pub struct Agent {
    pub name: String,
    pub profile: AgentProfile,
    pub tools: Toolbox,
    /// LLM turns allowed before a final answer is forced.
    pub max_iter: u32,
    /// Overrides the client's default model.
    pub model: Option<String>,
}

/// What an agent produced for one task.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentRun {
    pub output: String,
    pub tool_calls: Vec<ToolCallRecord>,
    pub turns: u32,
}

impl Agent {
    pub fn new(name: &str, profile: AgentProfile, tools: Toolbox) -> Self {
        Self {
            name: name.to_string(),
            profile,
            tools,
            max_iter: 3,
            model: None,
        }
    }

    pub fn with_max_iter(mut self, max_iter: u32) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }

    /// Work on one prompt until the model answers without tool calls.
    pub async fn execute(&self, llm: &dyn LlmClient, prompt: String) -> Result<AgentRun, CrewError> {
        let mut messages = vec![
            ChatMessage::system(self.profile.system_prompt()),
            ChatMessage::user(prompt),
        ];
        let definitions = self.tools.definitions();
        let mut records = Vec::new();

        for turn in 1..=self.max_iter {
            let response = llm
                .complete(ChatRequest {
                    model: self.model.clone(),
                    messages: messages.clone(),
                    tools: definitions.clone(),
                })
                .await?;

            if response.tool_calls.is_empty() {
                return finish(&self.name, response.content, records, turn);
            }

            messages.push(ChatMessage::assistant(
                response.content.clone(),
                response.tool_calls.clone(),
            ));
            for call in response.tool_calls {
                debug!(agent = %self.name, tool = %call.name, turn, "Dispatching tool call");
                let result = self.tools.call(&call.name, call.arguments.clone()).await;
                let success = is_success(&result);
                if !success {
                    warn!(agent = %self.name, tool = %call.name, error = %result["error"], "Tool reported failure");
                }
                records.push(ToolCallRecord {
                    tool: call.name,
                    arguments: call.arguments,
                    success,
                });
                messages.push(ChatMessage::tool_result(call.id, result.to_string()));
            }
        }

        info!(agent = %self.name, max_iter = self.max_iter, "Iteration budget spent, forcing final answer");
        messages.push(ChatMessage::user(FINAL_ANSWER_NUDGE));
        let response = llm
            .complete(ChatRequest {
                model: self.model.clone(),
                messages,
                tools: Vec::new(),
            })
            .await?;
        finish(&self.name, response.content, records, self.max_iter + 1)
    }
}

fn finish(
    agent: &str,
    content: Option<String>,
    tool_calls: Vec<ToolCallRecord>,
    turns: u32,
) -> Result<AgentRun, CrewError> {
    match content {
        Some(output) if !output.trim().is_empty() => Ok(AgentRun {
            output,
            tool_calls,
            turns,
        }),
        _ => Err(CrewError::InvalidResponse(format!(
            "agent {agent} returned an empty final answer"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ChatResponse, ToolCall};
    use crate::prompts::agent_profile;
    use crate::test_support::ScriptedLlm;
    use forex_agent_tools::{RiskCalculatorTool, StrategyValidatorTool};
    use serde_json::json;
    use std::sync::Arc;

    fn strategy_agent() -> Agent {
        let tools = Toolbox::new()
            .with(Arc::new(RiskCalculatorTool))
            .with(Arc::new(StrategyValidatorTool));
        Agent::new("strategy_agent", agent_profile("strategy_agent").unwrap(), tools)
    }

    fn risk_call(id: &str) -> ToolCall {
        ToolCall {
            id: id.to_string(),
            name: "risk_calculator".to_string(),
            arguments: json!({"entry_price": 1.10, "stop_loss": 1.09, "account_balance": 10000}),
        }
    }

    #[tokio::test]
    async fn answers_directly_without_tools() {
        let llm = ScriptedLlm::new(vec![ChatResponse::text("Go long EUR/USD")]);
        let run = strategy_agent().execute(&llm, "plan".to_string()).await.unwrap();

        assert_eq!(run.output, "Go long EUR/USD");
        assert_eq!(run.turns, 1);
        assert!(run.tool_calls.is_empty());

        let requests = llm.requests();
        assert_eq!(requests[0].tools.len(), 2);
        assert_eq!(requests[0].messages.len(), 2);
    }

    #[tokio::test]
    async fn tool_results_are_fed_back() {
        let llm = ScriptedLlm::new(vec![
            ChatResponse::with_tool_calls(vec![risk_call("call_1")]),
            ChatResponse::text("Size: 2000 units"),
        ]);
        let run = strategy_agent().execute(&llm, "plan".to_string()).await.unwrap();

        assert_eq!(run.output, "Size: 2000 units");
        assert_eq!(run.tool_calls.len(), 1);
        assert!(run.tool_calls[0].success);

        let second = &llm.requests()[1];
        let tool_msg = second.messages.last().unwrap();
        assert_eq!(tool_msg.tool_call_id.as_deref(), Some("call_1"));
        let payload: serde_json::Value =
            serde_json::from_str(tool_msg.content.as_deref().unwrap()).unwrap();
        assert_eq!(payload["position_size"], 20000.0);
    }

    #[tokio::test]
    async fn forces_final_answer_after_max_iter() {
        let llm = ScriptedLlm::new(vec![
            ChatResponse::with_tool_calls(vec![risk_call("call_1")]),
            ChatResponse::with_tool_calls(vec![risk_call("call_2")]),
            ChatResponse::text("Final plan"),
        ]);
        let agent = strategy_agent().with_max_iter(2);
        let run = agent.execute(&llm, "plan".to_string()).await.unwrap();

        assert_eq!(run.output, "Final plan");
        assert_eq!(run.turns, 3);
        assert_eq!(run.tool_calls.len(), 2);

        let requests = llm.requests();
        assert_eq!(requests.len(), 3);
        assert!(requests[2].tools.is_empty());
        assert_eq!(
            requests[2].messages.last().unwrap().content.as_deref(),
            Some(FINAL_ANSWER_NUDGE)
        );
    }

    #[tokio::test]
    async fn unknown_tool_becomes_failed_record() {
        let llm = ScriptedLlm::new(vec![
            ChatResponse::with_tool_calls(vec![ToolCall {
                id: "call_1".to_string(),
                name: "forex_data_fetcher".to_string(),
                arguments: json!({}),
            }]),
            ChatResponse::text("No data available"),
        ]);
        let run = strategy_agent().execute(&llm, "plan".to_string()).await.unwrap();
        assert!(!run.tool_calls[0].success);
    }

    #[tokio::test]
    async fn empty_answer_is_error() {
        let llm = ScriptedLlm::new(vec![ChatResponse::text("   ")]);
        let result = strategy_agent().execute(&llm, "plan".to_string()).await;
        assert!(matches!(result, Err(CrewError::InvalidResponse(_))));
    }
}

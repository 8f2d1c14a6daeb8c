use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One tool invocation made by an agent while working on a task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCallRecord {
    pub tool: String,
    pub arguments: serde_json::Value,
    /// Mirrors the `success` flag of the tool payload.
    pub success: bool,
}

/// The final answer an agent produced for one task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskOutput {
    pub task: String,
    pub agent: String,
    pub output: String,
    pub tool_calls: Vec<ToolCallRecord>,
    pub elapsed_ms: u64,
}

/// Everything a crew run produced, in task order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CrewOutput {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub tasks: Vec<TaskOutput>,
    /// Output of the last task.
    pub final_output: String,
    /// Where the last task's output was written, if it declared a file.
    pub output_file: Option<String>,
}

impl CrewOutput {
    pub fn task(&self, name: &str) -> Option<&TaskOutput> {
        self.tasks.iter().find(|t| t.task == name)
    }
}

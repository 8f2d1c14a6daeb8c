pub mod agent;
pub mod crew;
pub mod error;
pub mod llm;
pub mod prompts;
pub mod task;

pub mod test_support;

pub use agent::{Agent, AgentRun};
pub use crew::Crew;
pub use error::CrewError;
pub use llm::{ChatMessage, ChatRequest, ChatResponse, LlmClient, OpenAiCompatClient, ToolCall};
pub use prompts::{AgentProfile, TaskBrief};
pub use task::TaskSpec;

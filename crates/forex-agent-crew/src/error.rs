use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrewError {
    #[error("Missing API key: environment variable {env_var} not set")]
    MissingApiKey { env_var: String },

    #[error("LLM API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid LLM response: {0}")]
    InvalidResponse(String),

    #[error("Crew configuration error: {0}")]
    Config(String),

    #[error("Task {task} references unknown agent {agent}")]
    UnknownAgent { task: String, agent: String },

    #[error("Agent {agent} references unknown tool {tool}")]
    UnknownTool { agent: String, tool: String },

    #[error("Task {task} takes context from {context}, which does not run before it")]
    ContextOrder { task: String, context: String },

    #[error("Missing input {{{0}}} for task template")]
    MissingInput(String),

    #[error("Task {task} failed: {source}")]
    Task {
        task: String,
        #[source]
        source: Box<CrewError>,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CrewError {
    /// Wrap an error with the name of the task it happened in.
    pub fn in_task(self, task: &str) -> Self {
        match self {
            wrapped @ Self::Task { .. } => wrapped,
            other => Self::Task {
                task: task.to_string(),
                source: Box::new(other),
            },
        }
    }
}

use serde::{Deserialize, Serialize};

/// Top-level configuration. Every section has defaults, so an empty file is valid.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub tools: ToolsConfig,
    pub crew: CrewConfig,
}

/// The chat model that drives the agents (OpenAI-compatible endpoint).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_seconds: u64,
    /// Environment variable holding the API key.
    pub api_key_env: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://openrouter.ai/api/v1".to_string(),
            model: "google/gemini-2.5-flash-preview-05-20".to_string(),
            max_tokens: 2000,
            temperature: 0.1,
            timeout_seconds: 120,
            api_key_env: "OPENROUTER_API_KEY".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ToolsConfig {
    pub alpha_vantage: AlphaVantageConfig,
    pub vision: VisionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AlphaVantageConfig {
    /// Full query endpoint.
    pub base_url: String,
    pub quote_timeout_seconds: u64,
    pub news_timeout_seconds: u64,
}

impl Default for AlphaVantageConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.alphavantage.co/query".to_string(),
            quote_timeout_seconds: 10,
            news_timeout_seconds: 15,
        }
    }
}

/// Vision model and frame decoder used by the chart video tool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VisionConfig {
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// `low`, `high` or `auto`.
    pub image_detail: String,
    pub default_max_frames: u32,
    pub timeout_seconds: u64,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
            max_tokens: 2000,
            temperature: 0.1,
            image_detail: "high".to_string(),
            default_max_frames: 10,
            timeout_seconds: 120,
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
        }
    }
}

/// Agents and the ordered tasks they work on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CrewConfig {
    /// Directory that relative task output files are written under.
    pub output_dir: String,
    pub agents: Vec<AgentConfig>,
    pub tasks: Vec<TaskConfig>,
}

impl Default for CrewConfig {
    fn default() -> Self {
        Self {
            output_dir: ".".to_string(),
            agents: vec![
                AgentConfig::new("chart_analyst", &["video_analysis_tool"]),
                AgentConfig::new(
                    "financial_data_agent",
                    &[
                        "crypto_api_connector",
                        "forex_data_fetcher",
                        "news_sentiment_fetcher",
                    ],
                ),
                AgentConfig::new("strategy_agent", &["risk_calculator", "strategy_validator"]),
            ],
            tasks: vec![
                TaskConfig::new("chart_analysis_task", "chart_analyst", &[]),
                TaskConfig::new(
                    "market_data_task",
                    "financial_data_agent",
                    &["chart_analysis_task"],
                ),
                TaskConfig {
                    output_file: Some("trading_strategy.md".to_string()),
                    ..TaskConfig::new(
                        "strategy_formulation_task",
                        "strategy_agent",
                        &["chart_analysis_task", "market_data_task"],
                    )
                },
            ],
        }
    }
}

/// Configuration for a single agent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentConfig {
    pub name: String,
    /// Names of the tools this agent may call.
    #[serde(default)]
    pub tools: Vec<String>,
    /// Maximum LLM turns per task before a final answer is forced.
    #[serde(default = "default_max_iter")]
    pub max_iter: u32,
    /// Override model for this agent. Falls back to `LlmConfig::model`.
    #[serde(default)]
    pub model: Option<String>,
    /// Profile overrides. Agents without a built-in profile must set all three.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backstory: Option<String>,
}

impl AgentConfig {
    pub fn new(name: &str, tools: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            tools: tools.iter().map(|t| t.to_string()).collect(),
            max_iter: default_max_iter(),
            model: None,
            role: None,
            goal: None,
            backstory: None,
        }
    }
}

/// Configuration for a single task. Tasks run in declaration order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskConfig {
    pub name: String,
    pub agent: String,
    /// Earlier tasks whose outputs are handed to this one.
    #[serde(default)]
    pub context: Vec<String>,
    #[serde(default)]
    pub output_file: Option<String>,
    /// Brief overrides. Tasks without a built-in brief must set both.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_output: Option<String>,
}

impl TaskConfig {
    pub fn new(name: &str, agent: &str, context: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            agent: agent.to_string(),
            context: context.iter().map(|c| c.to_string()).collect(),
            output_file: None,
            description: None,
            expected_output: None,
        }
    }
}

fn default_max_iter() -> u32 {
    3
}

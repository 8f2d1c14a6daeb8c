use forex_agent_models::ToolFailure;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("{0} not found in environment variables")]
    MissingCredential(&'static str),

    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API rate limit exceeded")]
    RateLimited,

    #[error("{0}")]
    Provider(String),

    #[error("Unexpected API response format")]
    UnexpectedFormat(serde_json::Value),

    #[error("Video file not found: {0}")]
    VideoNotFound(String),

    #[error("No frames could be extracted from video")]
    NoFrames,

    #[error("Frame extraction failed: {0}")]
    FrameExtraction(String),

    #[error("LLM analysis failed: {0}")]
    Vision(String),

    #[error("Response parse error: {0}")]
    Parse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ToolError {
    /// Convert into the payload handed back to the caller. Hints that help a
    /// human fix the problem go into `message`.
    pub fn into_failure(self) -> ToolFailure {
        match self {
            Self::MissingCredential(var) => ToolFailure::new(format!(
                "{var} not found in environment variables"
            ))
            .with_message(format!("Set {var} in the environment or a .env file")),
            Self::RateLimited => ToolFailure::new("API rate limit exceeded")
                .with_message("Alpha Vantage free tier: 25 requests/day limit reached"),
            Self::Network(e) => ToolFailure::new(format!("Network error: {e}"))
                .with_message("Check your internet connection"),
            Self::UnexpectedFormat(raw) => {
                ToolFailure::new("Unexpected API response format").with_raw_response(raw)
            }
            other => ToolFailure::new(other.to_string()),
        }
    }
}

//! forex-agent - chart video to trading strategy with a three-agent crew
//!
//! A chart analyst reads sampled video frames through a vision model, a
//! financial data agent pulls live quotes and news sentiment from Alpha
//! Vantage, and a strategy agent sizes and validates a trade plan.
//!
//! # Library Usage
//!
//! ```rust,no_run
//! use forex_agent::models::AppConfig;
//! use forex_agent::tools::{default_toolbox, Credentials};
//! use forex_agent::crew::{Crew, OpenAiCompatClient};
//! ```

pub use forex_agent_crew as crew;
pub use forex_agent_models as models;
pub use forex_agent_tools as tools;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use forex_agent_crew::{Crew, OpenAiCompatClient};
use forex_agent_models::{AppConfig, CrewConfig, CrewOutput};
use forex_agent_tools::{default_toolbox, Credentials, Toolbox};
use tracing::debug;

pub const DEFAULT_CONFIG_PATH: &str = "config/forex-agent.toml";

/// Load configuration. A missing file at the default path means defaults;
/// a missing file anywhere else is an error.
pub fn load_config(path: &Path) -> anyhow::Result<AppConfig> {
    if !path.exists() && path == Path::new(DEFAULT_CONFIG_PATH) {
        debug!(path = %path.display(), "No config file, using defaults");
        return Ok(AppConfig::default());
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("Failed to parse config: {}", path.display()))
}

/// The error from loading a `.env` file, unless the file simply does not exist.
pub fn env_file_problem<T>(result: Result<T, dotenvy::Error>) -> Option<dotenvy::Error> {
    match result {
        Err(e) if !e.not_found() => Some(e),
        _ => None,
    }
}

/// All tools, keyed from the environment.
pub fn build_toolbox(config: &AppConfig) -> Toolbox {
    let credentials = Credentials::from_env();
    debug!(?credentials, "Resolved tool credentials");
    default_toolbox(&config.tools, &credentials)
}

/// Build the crew from configuration, talking to the configured LLM.
pub fn build_crew(config: &AppConfig, toolbox: &Toolbox) -> anyhow::Result<Crew> {
    let llm = OpenAiCompatClient::from_config(&config.llm).context("Failed to build LLM client")?;
    Crew::from_config(&config.crew, toolbox, Arc::new(llm)).context("Invalid crew configuration")
}

/// Redirect the final task's output file.
pub fn override_output(crew: &mut CrewConfig, path: &Path) {
    if let Some(task) = crew.tasks.last_mut() {
        task.output_file = Some(path.display().to_string());
    }
}

/// Kickoff inputs for the default pipeline.
pub fn pipeline_inputs(video_path: &str, trading_pair: &str) -> HashMap<String, String> {
    HashMap::from([
        ("video_path".to_string(), video_path.to_string()),
        ("trading_pair".to_string(), trading_pair.to_string()),
    ])
}

/// Run the full pipeline for one chart video.
pub async fn run_pipeline(
    crew: &Crew,
    video_path: &str,
    trading_pair: &str,
) -> anyhow::Result<CrewOutput> {
    crew.kickoff(&pipeline_inputs(video_path, trading_pair))
        .await
        .context("Crew run failed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use forex_agent_crew::test_support::ScriptedLlm;
    use forex_agent_crew::ChatResponse;
    use std::io::Write;

    #[test]
    fn missing_default_config_uses_defaults() {
        // Tests run from the crate directory, where no config/ exists.
        let config = load_config(Path::new(DEFAULT_CONFIG_PATH)).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn missing_explicit_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(&dir.path().join("nope.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config"));
    }

    #[test]
    fn config_file_is_parsed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[llm]\nmodel = \"openai/gpt-4o-mini\"\n\n[crew]\noutput_dir = \"reports\"").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.llm.model, "openai/gpt-4o-mini");
        assert_eq!(config.crew.output_dir, "reports");
        assert_eq!(config.crew.tasks.len(), 3);
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/forex-agent.toml");
        let config = load_config(&path).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn bad_toml_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[llm\nmodel = ").unwrap();
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }

    #[test]
    fn absent_env_file_is_not_a_problem() {
        let dir = tempfile::tempdir().unwrap();
        let result = dotenvy::from_path(dir.path().join(".env"));
        assert!(env_file_problem(result).is_none());
    }

    #[test]
    fn malformed_env_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "FOREX_AGENT_TEST_BROKEN LINE\n").unwrap();

        let problem = env_file_problem(dotenvy::from_path(&path));
        assert!(matches!(problem, Some(dotenvy::Error::LineParse(..))), "{problem:?}");
    }

    #[test]
    fn output_override_targets_last_task() {
        let mut crew = CrewConfig::default();
        override_output(&mut crew, Path::new("out/eurusd.md"));
        assert_eq!(crew.tasks[2].output_file.as_deref(), Some("out/eurusd.md"));
        assert!(crew.tasks[0].output_file.is_none());
    }

    #[tokio::test]
    async fn pipeline_runs_with_scripted_llm() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.crew.output_dir = dir.path().display().to_string();

        let toolbox = default_toolbox(&config.tools, &Credentials::default());
        let llm = Arc::new(ScriptedLlm::new(vec![
            ChatResponse::text("chart"),
            ChatResponse::text("market"),
            ChatResponse::text("# Strategy"),
        ]));
        let crew = Crew::from_config(&config.crew, &toolbox, llm).unwrap();

        let output = run_pipeline(&crew, "chart.mp4", "BTC/USD").await.unwrap();
        assert_eq!(output.final_output, "# Strategy");
        assert!(dir.path().join("trading_strategy.md").exists());
    }
}

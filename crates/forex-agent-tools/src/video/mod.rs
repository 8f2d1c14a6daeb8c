//! Chart video analysis: sample frames, send them to a vision model, and
//! recover a structured analysis from the reply.

pub mod frames;
pub mod prompts;
pub mod sampler;
pub mod vision;

use std::path::Path;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use forex_agent_models::VisionConfig;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::credentials::OPENAI_KEY_ENV;
use crate::error::ToolError;
use crate::parser::parse_chart_reply;
use crate::tool::{parse_input, Tool};
pub use frames::{EncodedFrame, FrameExtractor};
pub use sampler::{sample_frame_indices, unique_indices};
pub use vision::VisionClient;

#[derive(Debug, Clone, Deserialize)]
struct VideoInput {
    video_path: String,
    #[serde(default)]
    max_frames: Option<u32>,
    #[serde(default = "default_focus")]
    analysis_focus: String,
}

fn default_focus() -> String {
    "comprehensive".to_string()
}

pub struct VideoAnalysisTool {
    config: VisionConfig,
    extractor: FrameExtractor,
    api_key: Option<String>,
}

impl VideoAnalysisTool {
    pub fn new(config: &VisionConfig, api_key: Option<String>) -> Self {
        Self {
            extractor: FrameExtractor::new(
                &config.ffmpeg_path,
                &config.ffprobe_path,
                Duration::from_secs(config.timeout_seconds),
            ),
            config: config.clone(),
            api_key,
        }
    }

    /// Run the analysis. The returned map is the analysis object plus metadata.
    pub async fn analyze(
        &self,
        video_path: &str,
        max_frames: u32,
        analysis_focus: &str,
    ) -> Result<serde_json::Map<String, Value>, ToolError> {
        if max_frames == 0 {
            return Err(ToolError::InvalidInput("max_frames must be at least 1".to_string()));
        }

        self.extractor.check_available().await?;
        let api_key = self
            .api_key
            .clone()
            .ok_or(ToolError::MissingCredential(OPENAI_KEY_ENV))?;

        let path = Path::new(video_path);
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(ToolError::VideoNotFound(video_path.to_string()));
        }

        let started = Instant::now();
        let total = self.extractor.count_frames(path).await?;
        let indices = unique_indices(sample_frame_indices(total, max_frames as usize));
        let frames = self.extractor.extract(path, &indices).await?;
        if frames.is_empty() {
            return Err(ToolError::NoFrames);
        }

        let client = VisionClient::new(&self.config, api_key);
        let reply = client
            .analyze(
                prompts::SYSTEM_PROMPT,
                &prompts::instruction(analysis_focus, frames.len()),
                &frames,
            )
            .await?;

        let analysis = finish_analysis(&reply, frames.len(), video_path);

        info!(
            video = %video_path,
            total_frames = total,
            frames = frames.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Analyzed chart video"
        );
        Ok(analysis)
    }
}

/// Recover the analysis from the reply and stamp it with run metadata.
/// Unstructured replies still count as a successful analysis.
pub fn finish_analysis(
    reply: &str,
    frames_processed: usize,
    video_path: &str,
) -> serde_json::Map<String, Value> {
    let mut analysis = parse_chart_reply(reply).into_map();
    analysis.insert("success".to_string(), Value::Bool(true));
    analysis.insert("frames_processed".to_string(), frames_processed.into());
    analysis.insert("video_path".to_string(), video_path.into());
    analysis.insert(
        "analysis_timestamp".to_string(),
        Utc::now().to_rfc3339().into(),
    );
    analysis
}

#[async_trait]
impl Tool for VideoAnalysisTool {
    fn name(&self) -> &'static str {
        "video_analysis_tool"
    }

    fn description(&self) -> &'static str {
        "Analyze trading chart videos using multimodal LLM vision. Extracts frames from the \
         video and identifies trading pairs, technical indicators, chart patterns, \
         support/resistance levels and trend."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "video_path": {
                    "type": "string",
                    "description": "Path to the video file to analyze"
                },
                "max_frames": {
                    "type": "integer",
                    "description": "Maximum number of frames to extract and analyze. Default: 10"
                },
                "analysis_focus": {
                    "type": "string",
                    "description": "Focus of analysis: 'comprehensive', 'patterns', 'indicators', 'levels'"
                }
            },
            "required": ["video_path"]
        })
    }

    async fn run(&self, input: Value) -> Value {
        let input = match parse_input::<VideoInput>(input) {
            Ok(input) => input,
            Err(e) => return e.into_failure().to_value(),
        };
        let max_frames = input.max_frames.unwrap_or(self.config.default_max_frames);

        match self
            .analyze(&input.video_path, max_frames, &input.analysis_focus)
            .await
        {
            Ok(analysis) => Value::Object(analysis),
            Err(e) => {
                warn!(tool = self.name(), video = %input.video_path, error = %e, "Video analysis failed");
                e.into_failure().with_video_path(input.video_path).to_value()
            }
        }
    }
}

//! Frame decoding through the `ffprobe` and `ffmpeg` executables.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::ToolError;

/// One decoded frame, ready to attach to a vision request.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedFrame {
    pub data_url: String,
}

#[derive(Debug, Clone)]
pub struct FrameExtractor {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
    timeout: Duration,
}

impl FrameExtractor {
    pub fn new(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
            timeout,
        }
    }

    /// Fails with a missing-dependency error naming the first absent executable.
    pub async fn check_available(&self) -> Result<(), ToolError> {
        for program in [&self.ffmpeg, &self.ffprobe] {
            if !program_responds(program).await {
                return Err(ToolError::MissingDependency(format!(
                    "{} is not installed or not on PATH. Install FFmpeg to analyze videos",
                    program.display()
                )));
            }
        }
        Ok(())
    }

    /// Number of frames in the first video stream, counted by packets.
    pub async fn count_frames(&self, video: &Path) -> Result<u64, ToolError> {
        let output = self
            .run(
                &self.ffprobe,
                &[
                    OsStr::new("-v"),
                    OsStr::new("error"),
                    OsStr::new("-select_streams"),
                    OsStr::new("v:0"),
                    OsStr::new("-count_packets"),
                    OsStr::new("-show_entries"),
                    OsStr::new("stream=nb_read_packets"),
                    OsStr::new("-of"),
                    OsStr::new("csv=p=0"),
                    video.as_os_str(),
                ],
            )
            .await?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_packet_count(&stdout)
    }

    /// Decode the given frame indices to JPEG in one `ffmpeg` pass.
    /// Indices must be sorted and unique; frames come back in video order.
    pub async fn extract(&self, video: &Path, indices: &[u64]) -> Result<Vec<EncodedFrame>, ToolError> {
        if indices.is_empty() {
            return Ok(Vec::new());
        }

        let dir = tempfile::tempdir()?;
        let pattern = dir.path().join("frame_%04d.jpg");
        let filter = select_filter(indices);

        self.run(
            &self.ffmpeg,
            &[
                OsStr::new("-v"),
                OsStr::new("error"),
                OsStr::new("-i"),
                video.as_os_str(),
                OsStr::new("-vf"),
                OsStr::new(&filter),
                OsStr::new("-vsync"),
                OsStr::new("vfr"),
                OsStr::new("-q:v"),
                OsStr::new("2"),
                pattern.as_os_str(),
            ],
        )
        .await?;

        let mut files = Vec::new();
        let mut entries = tokio::fs::read_dir(dir.path()).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "jpg") {
                files.push(path);
            }
        }
        files.sort();

        if files.len() != indices.len() {
            warn!(
                requested = indices.len(),
                decoded = files.len(),
                "ffmpeg decoded a different number of frames than requested"
            );
        }

        let mut frames = Vec::with_capacity(files.len());
        for path in &files {
            let bytes = tokio::fs::read(path).await?;
            frames.push(EncodedFrame {
                data_url: jpeg_data_url(&bytes),
            });
        }

        debug!(frames = frames.len(), "Extracted frames");
        Ok(frames)
    }

    async fn run(&self, program: &Path, args: &[&OsStr]) -> Result<Output, ToolError> {
        debug!(program = %program.display(), "Running frame decoder");

        let output = tokio::time::timeout(self.timeout, Command::new(program).args(args).output())
            .await
            .map_err(|_| {
                ToolError::FrameExtraction(format!(
                    "{} timed out after {}s",
                    program.display(),
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| {
                ToolError::FrameExtraction(format!("Failed to spawn {}: {e}", program.display()))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ToolError::FrameExtraction(format!(
                "{} exited {}: {}",
                program.display(),
                output.status,
                stderr.trim()
            )));
        }

        Ok(output)
    }
}

async fn program_responds(program: &Path) -> bool {
    match Command::new(program).arg("-version").output().await {
        Ok(output) => output.status.success(),
        Err(_) => false,
    }
}

/// `select=eq(n\,0)+eq(n\,24)+...`; commas inside the expression are escaped
/// for the filtergraph parser.
pub fn select_filter(indices: &[u64]) -> String {
    let terms: Vec<String> = indices.iter().map(|i| format!("eq(n\\,{i})")).collect();
    format!("select={}", terms.join("+"))
}

fn parse_packet_count(stdout: &str) -> Result<u64, ToolError> {
    let line = stdout.lines().next().unwrap_or_default();
    let trimmed = line.trim().trim_end_matches(',');
    if trimmed.is_empty() || trimmed == "N/A" {
        // No video stream, or a container without packets.
        return Ok(0);
    }
    trimmed.parse().map_err(|_| {
        ToolError::FrameExtraction(format!("Unexpected ffprobe frame count: {trimmed:?}"))
    })
}

pub fn jpeg_data_url(bytes: &[u8]) -> String {
    format!("data:image/jpeg;base64,{}", BASE64.encode(bytes))
}

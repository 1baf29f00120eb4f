//! Speech-to-text adapter.
//!
//! Recognition runs one call per audio chunk. A silent or unintelligible
//! chunk is an outcome, not an error, so a single noisy window never aborts
//! the whole transcription.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{CaptionError, CaptionResult};
use crate::model::WhisperModel;

/// Per-chunk recognition result.
#[derive(Debug, Clone, PartialEq)]
pub enum RecognitionOutcome {
    /// Recognized transcript for the chunk.
    Text(String),
    /// The engine heard nothing usable in this window.
    NoSpeechDetected,
    /// The engine choked on this window; the diagnostic is kept for logs.
    RecognitionFailed(String),
}

/// One speech-to-text call per audio chunk.
///
/// Implementations must only return `Err` for structural problems (missing
/// binary, broken configuration); anything chunk-local maps to a
/// [`RecognitionOutcome`] variant.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe_chunk(&self, chunk_wav: &Path) -> CaptionResult<RecognitionOutcome>;
}

/// Try the common whisper.cpp binary names.
pub fn find_whisper_binary() -> Option<PathBuf> {
    ["whisper-cli", "whisper", "whisper-cpp"]
        .iter()
        .find_map(|name| which::which(name).ok())
}

/// whisper.cpp subprocess adapter.
pub struct WhisperCppTranscriber {
    binary: PathBuf,
    model_path: PathBuf,
    language: String,
}

impl WhisperCppTranscriber {
    /// Locate the binary and make sure the model is cached.
    pub async fn new(model: WhisperModel, language: &str) -> CaptionResult<Self> {
        let binary = find_whisper_binary().ok_or_else(|| {
            CaptionError::EngineUnavailable(
                "whisper.cpp binary not found in PATH".to_string(),
            )
        })?;
        let model_path = model.ensure_downloaded().await?;

        Ok(Self {
            binary,
            model_path,
            language: language.to_string(),
        })
    }
}

#[async_trait]
impl Transcriber for WhisperCppTranscriber {
    async fn transcribe_chunk(&self, chunk_wav: &Path) -> CaptionResult<RecognitionOutcome> {
        // Transcript lands next to the chunk as <base>.txt.
        let output_base = chunk_wav.with_extension("");

        let output = Command::new(&self.binary)
            .arg("-m")
            .arg(&self.model_path)
            .arg("-f")
            .arg(chunk_wav)
            .args(["-l", &self.language])
            .args(["--output-txt", "--no-prints"])
            .arg("-of")
            .arg(&output_base)
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            let diagnostic = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::debug!(chunk = %chunk_wav.display(), %diagnostic, "recognition failed");
            return Ok(RecognitionOutcome::RecognitionFailed(diagnostic));
        }

        let txt_path = output_base.with_extension("txt");
        let raw = match tokio::fs::read_to_string(&txt_path).await {
            Ok(raw) => raw,
            Err(_) => {
                return Ok(RecognitionOutcome::RecognitionFailed(
                    "transcript output missing".to_string(),
                ))
            }
        };
        let _ = tokio::fs::remove_file(&txt_path).await;

        // Drop bracketed event markers like [BLANK_AUDIO] or <|nospeech|>.
        let text = raw
            .split_whitespace()
            .filter(|word| !word.starts_with('[') && !word.starts_with('<'))
            .collect::<Vec<_>>()
            .join(" ");

        if text.is_empty() {
            Ok(RecognitionOutcome::NoSpeechDetected)
        } else {
            Ok(RecognitionOutcome::Text(text))
        }
    }
}

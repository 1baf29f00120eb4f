//! Whisper model selection and provisioning.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tokio::process::Command;

use crate::error::{CaptionError, CaptionResult};

/// Available Whisper model sizes
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum WhisperModel {
    Tiny,
    #[default]
    Base,
    Small,
    Medium,
    Large,
}

impl WhisperModel {
    /// Get approximate model size for display
    pub fn size_display(&self) -> &'static str {
        match self {
            WhisperModel::Tiny => "~75 MB",
            WhisperModel::Base => "~142 MB",
            WhisperModel::Small => "~466 MB",
            WhisperModel::Medium => "~1.5 GB",
            WhisperModel::Large => "~2.9 GB",
        }
    }

    /// Get the ggml model filename for whisper.cpp
    pub fn ggml_filename(&self) -> &'static str {
        match self {
            WhisperModel::Tiny => "ggml-tiny.bin",
            WhisperModel::Base => "ggml-base.bin",
            WhisperModel::Small => "ggml-small.bin",
            WhisperModel::Medium => "ggml-medium.bin",
            WhisperModel::Large => "ggml-large.bin",
        }
    }

    /// Get HuggingFace download URL for the model
    pub fn download_url(&self) -> String {
        format!(
            "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/{}",
            self.ggml_filename()
        )
    }

    /// Parse from user input
    pub fn from_input(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "tiny" => Some(WhisperModel::Tiny),
            "base" => Some(WhisperModel::Base),
            "small" => Some(WhisperModel::Small),
            "medium" => Some(WhisperModel::Medium),
            "large" | "large-v1" | "large-v2" | "large-v3" => Some(WhisperModel::Large),
            _ => None,
        }
    }

    /// Path the cached model file lives at.
    pub fn model_path(&self) -> PathBuf {
        models_dir().join(self.ggml_filename())
    }

    pub fn is_downloaded(&self) -> bool {
        self.model_path().exists()
    }

    /// Fetch the model with curl if it is not cached yet.
    pub async fn ensure_downloaded(&self) -> CaptionResult<PathBuf> {
        let model_path = self.model_path();
        if model_path.exists() {
            return Ok(model_path);
        }

        std::fs::create_dir_all(models_dir())?;
        tracing::info!(model = %self, size = self.size_display(), "downloading whisper model");

        let status = Command::new("curl")
            .args(["-L", "--fail", "--progress-bar", "-o"])
            .arg(&model_path)
            .arg(self.download_url())
            .status()
            .await?;

        if status.success() {
            Ok(model_path)
        } else {
            Err(CaptionError::EngineUnavailable(format!(
                "model download failed; fetch {} manually and save it to {}",
                self.download_url(),
                model_path.display()
            )))
        }
    }
}

/// Get the whisper.cpp model cache directory, creating it if needed.
pub fn models_dir() -> PathBuf {
    if let Some(home) = dirs::home_dir() {
        let whisper_dir = home.join(".cache").join("whisper.cpp");
        let _ = std::fs::create_dir_all(&whisper_dir);
        return whisper_dir;
    }

    // Fallback to current directory
    PathBuf::from("models")
}

//! Burned-in caption pipeline: audio extraction, chunked speech
//! recognition, subtitle synthesis and styled re-encoding.

use anyhow::{anyhow, Result};

pub mod audio;
pub mod chunker;
pub mod error;
pub mod media;
pub mod model;
pub mod pipeline;
pub mod segment;
pub mod session;
pub mod srt;
pub mod stt;
pub mod style;

/// Fixed transcription window length in seconds.
pub const CHUNK_LENGTH_SECS: f64 = 3.0;

/// Verify the external tools the pipeline shells out to.
pub fn check_dependencies() -> Result<()> {
    if which::which("ffmpeg").is_err() {
        return Err(anyhow!(
            "FFmpeg not found. Please install FFmpeg and ensure it is in PATH."
        ));
    }

    if stt::find_whisper_binary().is_none() {
        return Err(anyhow!(
            "whisper.cpp binary not found. Please install it and ensure it is in PATH.\nDownload: https://github.com/ggerganov/whisper.cpp/releases"
        ));
    }

    Ok(())
}

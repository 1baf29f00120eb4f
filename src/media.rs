//! External media toolchain seam.
//!
//! The pipeline's algorithmic logic only sees [`MediaToolchain`]; the
//! ffmpeg implementation below is the single place that knows codec flags
//! and filter syntax.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;

use crate::audio::AudioTrack;
use crate::error::{CaptionError, CaptionResult};
use crate::style::SubtitleStyle;

/// Default patience for one external encode before it is treated as hung.
pub const DEFAULT_PROCESS_TIMEOUT: Duration = Duration::from_secs(600);

/// Narrow seam over the external codec toolchain.
#[async_trait]
pub trait MediaToolchain: Send + Sync {
    /// Decode `video`'s audio into a normalized mono 16 kHz 16-bit PCM
    /// track at `audio_dest`.
    async fn extract_audio(&self, video: &Path, audio_dest: &Path) -> CaptionResult<AudioTrack>;

    /// Re-encode `video` with `subtitles` composited onto the video stream
    /// per `style`, writing the result to `dest`.
    async fn burn_subtitles(
        &self,
        video: &Path,
        subtitles: &Path,
        style: &SubtitleStyle,
        dest: &Path,
    ) -> CaptionResult<()>;
}

/// ffmpeg-backed implementation.
pub struct FfmpegToolchain {
    timeout: Duration,
}

impl FfmpegToolchain {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn run(&self, operation: &'static str, cmd: &mut Command) -> CaptionResult<()> {
        let output = match timeout(self.timeout, cmd.kill_on_drop(true).output()).await {
            Ok(output) => output?,
            Err(_) => {
                return Err(CaptionError::Timeout {
                    operation,
                    timeout: self.timeout,
                })
            }
        };

        if output.status.success() {
            Ok(())
        } else {
            Err(CaptionError::MediaProcessing {
                operation,
                diagnostic: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

impl Default for FfmpegToolchain {
    fn default() -> Self {
        Self::new(DEFAULT_PROCESS_TIMEOUT)
    }
}

#[async_trait]
impl MediaToolchain for FfmpegToolchain {
    async fn extract_audio(&self, video: &Path, audio_dest: &Path) -> CaptionResult<AudioTrack> {
        let mut cmd = Command::new("ffmpeg");
        cmd.args(["-y", "-hide_banner", "-loglevel", "error"])
            .arg("-i")
            .arg(video)
            .args(["-ar", "16000"]) // 16kHz sample rate required by Whisper
            .args(["-ac", "1"]) // Mono
            .args(["-c:a", "pcm_s16le"]) // 16-bit PCM
            .arg(audio_dest);

        if let Err(e) = self.run("extract-audio", &mut cmd).await {
            let _ = std::fs::remove_file(audio_dest);
            return Err(e);
        }

        AudioTrack::open(audio_dest)
    }

    async fn burn_subtitles(
        &self,
        video: &Path,
        subtitles: &Path,
        style: &SubtitleStyle,
        dest: &Path,
    ) -> CaptionResult<()> {
        let filter = subtitle_filter(subtitles, style);

        let mut cmd = Command::new("ffmpeg");
        cmd.args(["-y", "-hide_banner", "-loglevel", "error"])
            .arg("-i")
            .arg(video)
            .args(["-vf", &filter])
            .args(["-c:v", "libx264", "-preset", "ultrafast", "-crf", "26"])
            .args(["-c:a", "copy"])
            .arg(dest);

        if let Err(e) = self.run("burn-subtitles", &mut cmd).await {
            // Never leave a partial encode at the destination.
            let _ = std::fs::remove_file(dest);
            return Err(e);
        }

        Ok(())
    }
}

/// Escape a path for use inside an ffmpeg filter argument.
///
/// The filter grammar treats backslash, colon and quote as structure;
/// leaving them raw corrupts the graph silently on some inputs.
pub fn escape_filter_path(path: &Path) -> String {
    path.to_string_lossy()
        .replace('\\', "\\\\")
        .replace(':', "\\:")
        .replace('\'', "\\'")
}

/// Build the subtitles video filter with the style override applied.
pub fn subtitle_filter(subtitles: &Path, style: &SubtitleStyle) -> String {
    format!(
        "subtitles='{}':force_style='{}'",
        escape_filter_path(subtitles),
        style.force_style()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_escape_filter_path() {
        assert_eq!(escape_filter_path(Path::new("/tmp/subs.srt")), "/tmp/subs.srt");
        assert_eq!(
            escape_filter_path(Path::new("C:\\work\\subs.srt")),
            "C\\:\\\\work\\\\subs.srt"
        );
        assert_eq!(
            escape_filter_path(Path::new("/tmp/it's here.srt")),
            "/tmp/it\\'s here.srt"
        );
    }

    #[test]
    fn test_subtitle_filter_embeds_style_override() {
        let style = SubtitleStyle::default();
        let filter = subtitle_filter(&PathBuf::from("/tmp/subtitles.srt"), &style);

        assert!(filter.starts_with("subtitles='/tmp/subtitles.srt'"));
        assert!(filter.contains(":force_style='FontSize=24,"));
        assert!(filter.contains("PrimaryColour=&H00FFFFFF"));
    }
}

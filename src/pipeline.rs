//! Pipeline entry points: caption generation and styled burn-in.
//!
//! Both operations are single-shot and deterministic: re-running with the
//! same inputs overwrites prior output.

use std::path::{Path, PathBuf};

use crate::chunker::{chunk_track, Chunk};
use crate::error::CaptionResult;
use crate::media::MediaToolchain;
use crate::segment::build_caption_units;
use crate::srt;
use crate::stt::{RecognitionOutcome, Transcriber};
use crate::style::{StyleInput, SubtitleStyle};
use crate::CHUNK_LENGTH_SECS;

const AUDIO_FILENAME: &str = "audio.wav";
const SUBTITLE_FILENAME: &str = "subtitles.srt";

/// Name the burn step writes its deliverable under.
pub const OUTPUT_FILENAME: &str = "final_captioned_video.mp4";

/// Run extract → chunk → recognize → segment → synthesize.
///
/// Returns the subtitle file path inside `workspace`. Chunks that yield no
/// usable speech are skipped without failing the run, so a fully silent
/// video produces an empty (still valid) subtitle file.
pub async fn extract_and_transcribe(
    toolchain: &dyn MediaToolchain,
    transcriber: &dyn Transcriber,
    video_path: &Path,
    workspace: &Path,
) -> CaptionResult<PathBuf> {
    let audio_path = workspace.join(AUDIO_FILENAME);
    let track = toolchain.extract_audio(video_path, &audio_path).await?;
    tracing::info!(duration_secs = track.duration_secs(), "audio extracted");

    let chunks = chunk_track(track.duration_secs(), CHUNK_LENGTH_SECS);

    // Results are collected in chunk order; timestamps derive from chunk
    // position, not from recognition completion order.
    let mut outcomes: Vec<(Chunk, RecognitionOutcome)> = Vec::with_capacity(chunks.len());
    for (i, chunk) in chunks.iter().enumerate() {
        let chunk_wav = workspace.join(format!("chunk_{:04}.wav", i));
        track.materialize_chunk(chunk, &chunk_wav)?;
        let outcome = transcriber.transcribe_chunk(&chunk_wav).await;
        let _ = std::fs::remove_file(&chunk_wav);
        outcomes.push((*chunk, outcome?));
    }

    let units = build_caption_units(&outcomes);
    tracing::info!(chunks = chunks.len(), cues = units.len(), "transcription complete");

    let srt_path = workspace.join(SUBTITLE_FILENAME);
    srt::write_file(&srt_path, &units)?;
    Ok(srt_path)
}

/// Resolve the style and re-encode `video_path` with the subtitles burned in.
pub async fn burn(
    toolchain: &dyn MediaToolchain,
    video_path: &Path,
    subtitle_path: &Path,
    style_input: &StyleInput,
    destination: &Path,
) -> CaptionResult<PathBuf> {
    let style = SubtitleStyle::resolve(style_input);
    tracing::info!(font_size = style.font_size, "burning subtitles");

    toolchain
        .burn_subtitles(video_path, subtitle_path, &style, destination)
        .await?;
    Ok(destination.to_path_buf())
}

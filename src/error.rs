//! Error types for the caption pipeline.

use std::time::Duration;
use thiserror::Error;

pub type CaptionResult<T> = Result<T, CaptionError>;

/// Hard failures surfaced to the pipeline caller. Per-chunk recognition
/// misses are not errors; see [`crate::stt::RecognitionOutcome`].
#[derive(Error, Debug)]
pub enum CaptionError {
    /// An external media toolchain invocation exited abnormally or
    /// produced no usable output.
    #[error("{operation} failed: {diagnostic}")]
    MediaProcessing {
        operation: &'static str,
        diagnostic: String,
    },

    /// An external process exceeded the caller-supplied budget. Kept
    /// separate from `MediaProcessing` so callers can suggest a shorter
    /// input instead of a generic failure.
    #[error("{operation} did not finish within {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },

    /// The speech engine is structurally unavailable (missing binary or
    /// model), as opposed to failing on one chunk.
    #[error("speech engine unavailable: {0}")]
    EngineUnavailable(String),

    /// A session id that sanitizes down to nothing.
    #[error("invalid session id")]
    InvalidSessionId,

    #[error("audio decode error: {0}")]
    AudioDecode(#[from] hound::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

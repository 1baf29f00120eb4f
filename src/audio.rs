//! Decoded audio track handling.

use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::chunker::Chunk;
use crate::error::CaptionResult;

/// Sample rate the recognizer consumes. Speech content sits well below the
/// 8 kHz Nyquist limit this gives.
pub const RECOGNIZER_SAMPLE_RATE: u32 = 16_000;

/// Immutable handle to an extracted audio track.
///
/// Holds the decoded samples in memory; at mono 16 kHz / 16-bit that is
/// under 2 MB per minute of input.
#[derive(Debug, Clone)]
pub struct AudioTrack {
    path: PathBuf,
    sample_rate: u32,
    channels: u16,
    samples: Vec<i16>,
}

impl AudioTrack {
    /// Open an extracted WAV file and pull its samples into memory.
    pub fn open(path: &Path) -> CaptionResult<Self> {
        let mut reader = WavReader::open(path)?;
        let spec = reader.spec();
        let samples = reader.samples::<i16>().collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            path: path.to_path_buf(),
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            samples,
        })
    }

    /// Wrap raw interleaved PCM samples without touching the filesystem.
    pub fn from_samples(path: PathBuf, sample_rate: u32, channels: u16, samples: Vec<i16>) -> Self {
        Self { path, sample_rate, channels, samples }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Total duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / (self.sample_rate as f64 * self.channels as f64)
    }

    /// Write one chunk window as a standalone WAV file at `dest`.
    pub fn materialize_chunk(&self, chunk: &Chunk, dest: &Path) -> CaptionResult<()> {
        let samples_per_sec = self.sample_rate as f64 * self.channels as f64;
        let start = (chunk.start * samples_per_sec).round() as usize;
        let end = ((chunk.end * samples_per_sec).round() as usize).min(self.samples.len());
        let start = start.min(end);

        let spec = WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(dest, spec)?;
        for sample in &self.samples[start..end] {
            writer.write_sample(*sample)?;
        }
        writer.finalize()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunker::chunk_track;

    fn track_of(duration_secs: f64) -> AudioTrack {
        let samples = vec![0i16; (duration_secs * RECOGNIZER_SAMPLE_RATE as f64) as usize];
        AudioTrack::from_samples("audio.wav".into(), RECOGNIZER_SAMPLE_RATE, 1, samples)
    }

    #[test]
    fn test_duration_from_sample_count() {
        assert_eq!(track_of(7.0).duration_secs(), 7.0);
        assert_eq!(track_of(0.0).duration_secs(), 0.0);
    }

    #[test]
    fn test_materialized_chunks_round_trip_through_wav() {
        let dir = tempfile::tempdir().unwrap();
        let track = track_of(7.0);

        for (i, chunk) in chunk_track(track.duration_secs(), 3.0).iter().enumerate() {
            let dest = dir.path().join(format!("chunk_{}.wav", i));
            track.materialize_chunk(chunk, &dest).unwrap();

            let reopened = AudioTrack::open(&dest).unwrap();
            assert_eq!(reopened.sample_rate(), RECOGNIZER_SAMPLE_RATE);
            assert_eq!(reopened.channels(), 1);
            assert_eq!(reopened.duration_secs(), chunk.span());
        }
    }

    #[test]
    fn test_chunk_past_end_is_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let track = track_of(2.0);
        let dest = dir.path().join("tail.wav");

        // End offsets are clamped to the actual sample count.
        track
            .materialize_chunk(&Chunk { start: 1.0, end: 4.0 }, &dest)
            .unwrap();
        assert_eq!(AudioTrack::open(&dest).unwrap().duration_secs(), 1.0);
    }
}

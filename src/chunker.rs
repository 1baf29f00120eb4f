/// A contiguous audio window, the unit of transcription.
///
/// `start` is inclusive, `end` exclusive, both in seconds from the start of
/// the track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Chunk {
    pub start: f64,
    pub end: f64,
}

impl Chunk {
    pub fn span(&self) -> f64 {
        self.end - self.start
    }
}

/// Partition `[0, duration)` into fixed-length windows.
///
/// Windows are contiguous and non-overlapping; the last one may be shorter
/// than `chunk_length`. A zero-duration track yields no windows.
pub fn chunk_track(duration: f64, chunk_length: f64) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    if duration <= 0.0 || chunk_length <= 0.0 {
        return chunks;
    }

    let mut start = 0.0;
    while start < duration {
        let end = (start + chunk_length).min(duration);
        chunks.push(Chunk { start, end });
        start = end;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_count_matches_ceiling() {
        assert_eq!(chunk_track(7.0, 3.0).len(), 3);
        assert_eq!(chunk_track(6.0, 3.0).len(), 2);
        assert_eq!(chunk_track(0.5, 3.0).len(), 1);
        assert_eq!(chunk_track(9.1, 3.0).len(), 4);
    }

    #[test]
    fn test_chunks_cover_track_without_gaps() {
        let chunks = chunk_track(7.0, 3.0);
        assert_eq!(chunks[0], Chunk { start: 0.0, end: 3.0 });
        assert_eq!(chunks[1], Chunk { start: 3.0, end: 6.0 });
        assert_eq!(chunks[2], Chunk { start: 6.0, end: 7.0 });

        for pair in chunks.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        assert_eq!(chunks.last().unwrap().end, 7.0);
    }

    #[test]
    fn test_all_but_last_have_full_span() {
        let chunks = chunk_track(10.0, 3.0);
        for chunk in &chunks[..chunks.len() - 1] {
            assert_eq!(chunk.span(), 3.0);
        }
        assert_eq!(chunks.last().unwrap().span(), 1.0);
    }

    #[test]
    fn test_zero_duration_yields_no_chunks() {
        assert!(chunk_track(0.0, 3.0).is_empty());
        assert!(chunk_track(-1.0, 3.0).is_empty());
    }

    #[test]
    fn test_exact_multiple_has_no_partial_chunk() {
        let chunks = chunk_track(9.0, 3.0);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks.last().unwrap().span(), 3.0);
    }
}

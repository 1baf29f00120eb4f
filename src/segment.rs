use crate::chunker::Chunk;
use crate::stt::RecognitionOutcome;

/// Upper bound on words per displayed caption.
pub const MAX_WORDS_PER_UNIT: usize = 10;

/// One subtitle cue: a 1-based index, a time range and the displayed text.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionUnit {
    pub index: usize,
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// Build the ordered caption sequence from per-chunk recognition outcomes.
///
/// Each recognized chunk transcript is split into groups of at most
/// [`MAX_WORDS_PER_UNIT`] words; the groups partition the chunk's time range
/// into equal-width sub-intervals. Chunks with no usable text contribute
/// nothing, and the running index stays contiguous across them.
pub fn build_caption_units(outcomes: &[(Chunk, RecognitionOutcome)]) -> Vec<CaptionUnit> {
    let mut units = Vec::new();

    for (chunk, outcome) in outcomes {
        let text = match outcome {
            RecognitionOutcome::Text(text) => text.trim(),
            RecognitionOutcome::NoSpeechDetected | RecognitionOutcome::RecognitionFailed(_) => {
                continue;
            }
        };

        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() {
            continue;
        }

        let groups: Vec<&[&str]> = words.chunks(MAX_WORDS_PER_UNIT).collect();
        let unit_span = chunk.span() / groups.len() as f64;

        for (k, group) in groups.iter().enumerate() {
            let start = chunk.start + k as f64 * unit_span;
            units.push(CaptionUnit {
                index: units.len() + 1,
                start,
                end: start + unit_span,
                text: group.join(" "),
            });
        }
    }

    units
}

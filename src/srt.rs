//! SRT (SubRip) subtitle synthesis and parsing.

use std::fs;
use std::path::Path;

use crate::error::CaptionResult;
use crate::segment::CaptionUnit;

/// Format a fractional-seconds value as an SRT timestamp (`HH:MM:SS,mmm`).
///
/// Rounding is half-up on the total millisecond count, so a fractional part
/// that rounds to 1000 carries into the seconds field.
pub fn format_timestamp(seconds: f64) -> String {
    let total_ms = (seconds * 1000.0).round() as u64;
    let ms = total_ms % 1000;
    let secs = (total_ms / 1000) % 60;
    let mins = (total_ms / 60_000) % 60;
    let hours = total_ms / 3_600_000;
    format!("{:02}:{:02}:{:02},{:03}", hours, mins, secs, ms)
}

/// Render an ordered caption sequence as SRT text.
///
/// An empty sequence renders as an empty file, which is a valid outcome for
/// input with no recognizable speech.
pub fn render(units: &[CaptionUnit]) -> String {
    let mut out = String::new();
    for unit in units {
        out.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            unit.index,
            format_timestamp(unit.start),
            format_timestamp(unit.end),
            unit.text.trim()
        ));
    }
    out
}

/// Write the caption sequence to `path` as UTF-8 SRT.
///
/// The file is staged next to the destination and renamed into place so a
/// failed write never leaves a truncated subtitle file behind.
pub fn write_file(path: &Path, units: &[CaptionUnit]) -> CaptionResult<()> {
    let staging = path.with_extension("srt.tmp");
    fs::write(&staging, render(units))?;
    fs::rename(&staging, path)?;
    Ok(())
}

/// Parse SRT text back into caption units.
pub fn parse(content: &str) -> Vec<CaptionUnit> {
    let mut units = Vec::new();
    let mut lines = content.lines().peekable();

    while let Some(line) = lines.next() {
        let Ok(index) = line.trim().parse::<usize>() else {
            continue;
        };
        let Some(timestamp_line) = lines.next() else {
            break;
        };
        let Some((start, end)) = parse_timestamp_line(timestamp_line) else {
            continue;
        };

        let mut text_parts = Vec::new();
        while let Some(text_line) = lines.peek() {
            if text_line.trim().is_empty() {
                lines.next();
                break;
            }
            text_parts.push(lines.next().unwrap().to_string());
        }

        units.push(CaptionUnit {
            index,
            start,
            end,
            text: text_parts.join("\n"),
        });
    }

    units
}

/// Parse a timestamp line of the form `00:00:01,000 --> 00:00:02,500`.
fn parse_timestamp_line(line: &str) -> Option<(f64, f64)> {
    let parts: Vec<&str> = line.split(" --> ").collect();
    if parts.len() != 2 {
        return None;
    }
    Some((parse_time(parts[0])?, parse_time(parts[1])?))
}

fn parse_time(s: &str) -> Option<f64> {
    let s = s.trim().replace(',', ".");
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 3 {
        return None;
    }
    let h: f64 = parts[0].parse().ok()?;
    let m: f64 = parts[1].parse().ok()?;
    let s: f64 = parts[2].parse().ok()?;
    Some(h * 3600.0 + m * 60.0 + s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0), "00:00:00,000");
        assert_eq!(format_timestamp(1.5), "00:00:01,500");
        assert_eq!(format_timestamp(3725.4), "01:02:05,400");
        assert_eq!(format_timestamp(59.999), "00:00:59,999");
    }

    #[test]
    fn test_format_timestamp_carries_rounded_milliseconds() {
        assert_eq!(format_timestamp(59.9996), "00:01:00,000");
        assert_eq!(format_timestamp(3599.9999), "01:00:00,000");
    }

    #[test]
    fn test_render_blocks() {
        let units = vec![
            CaptionUnit { index: 1, start: 0.0, end: 2.5, text: "Hello world".into() },
            CaptionUnit { index: 2, start: 2.5, end: 5.0, text: "Goodbye".into() },
        ];
        let srt = render(&units);
        assert!(srt.contains("1\n00:00:00,000 --> 00:00:02,500\nHello world\n"));
        assert!(srt.contains("2\n00:00:02,500 --> 00:00:05,000\nGoodbye\n"));
        assert!(srt.ends_with("\n\n"));
    }

    #[test]
    fn test_render_empty_sequence_is_empty_file() {
        assert_eq!(render(&[]), "");
        assert!(parse("").is_empty());
    }

    #[test]
    fn test_round_trip_preserves_times_to_the_millisecond() {
        let units = vec![
            CaptionUnit { index: 1, start: 0.0, end: 1.234, text: "one".into() },
            CaptionUnit { index: 2, start: 1.234, end: 3.0, text: "two words".into() },
            CaptionUnit { index: 3, start: 3725.4, end: 3729.001, text: "später été".into() },
        ];
        let parsed = parse(&render(&units));

        assert_eq!(parsed.len(), units.len());
        for (original, recovered) in units.iter().zip(&parsed) {
            assert_eq!(original.index, recovered.index);
            assert_eq!(
                (original.start * 1000.0).round(),
                (recovered.start * 1000.0).round()
            );
            assert_eq!(
                (original.end * 1000.0).round(),
                (recovered.end * 1000.0).round()
            );
            assert_eq!(original.text, recovered.text);
        }
    }

    #[test]
    fn test_write_file_overwrites_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subtitles.srt");

        let first = vec![CaptionUnit { index: 1, start: 0.0, end: 1.0, text: "old".into() }];
        write_file(&path, &first).unwrap();
        let second = vec![CaptionUnit { index: 1, start: 0.0, end: 1.0, text: "new".into() }];
        write_file(&path, &second).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("new"));
        assert!(!content.contains("old"));
    }
}

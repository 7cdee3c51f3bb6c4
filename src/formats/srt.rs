/// SRT (SubRip) transcript parser
use super::TranscriptParser;
use crate::error::Result;
use crate::transcript::TranscriptSegment;
use regex::Regex;
use std::sync::OnceLock;

fn srt_time_regex() -> &'static Regex {
    static SRT_TIME_REGEX: OnceLock<Regex> = OnceLock::new();
    SRT_TIME_REGEX.get_or_init(|| {
        Regex::new(r"(\d{2}):(\d{2}):(\d{2}),(\d{3})").expect("Failed to compile SRT time regex")
    })
}

/// Parses blank-line separated SRT blocks
pub struct SrtParser;

impl TranscriptParser for SrtParser {
    // Each block is: index line, timing line, one or more text lines.
    // Only the start time (first HH:MM:SS,mmm on the timing line) is kept.
    fn parse(&self, content: &str) -> Result<Vec<TranscriptSegment>> {
        let mut segments = Vec::new();

        for block in content.split("\n\n").filter(|block| !block.trim().is_empty()) {
            let lines: Vec<&str> = block.lines().filter(|line| !line.trim().is_empty()).collect();
            if lines.len() < 3 {
                continue;
            }

            let Some(start) = parse_start_seconds(lines[1]) else {
                continue;
            };

            let text = lines[2..].iter().map(|line| line.trim()).collect::<Vec<_>>().join(" ");
            if text.is_empty() {
                continue;
            }

            segments.push(TranscriptSegment::new(start, text));
        }

        Ok(segments)
    }
}

/// Start time of an SRT timing line, in whole seconds
fn parse_start_seconds(timing_line: &str) -> Option<u64> {
    let captures = srt_time_regex().captures(timing_line)?;
    let field = |index: usize| -> Option<u64> { captures.get(index)?.as_str().parse().ok() };

    Some(field(1)? * 3600 + field(2)? * 60 + field(3)?)
}

/// Plain text transcript parser: one `[HH:MM] text` line per segment
use super::TranscriptParser;
use crate::error::Result;
use crate::timecode::parse_transcript_time;
use crate::transcript::TranscriptSegment;
use regex::Regex;
use std::sync::OnceLock;

fn line_regex() -> &'static Regex {
    static LINE_REGEX: OnceLock<Regex> = OnceLock::new();
    LINE_REGEX.get_or_init(|| {
        Regex::new(r"^[\[(]?(\d{1,2}:\d{2}(?::\d{2})?)[\])]?\s*(.+)$")
            .expect("Failed to compile plain transcript line regex")
    })
}

/// Lines look like `[01:15] text`, `(01:15) text` or `1:15:30 text`.
/// Two-part times are hours and minutes.
pub struct PlainTextParser;

impl TranscriptParser for PlainTextParser {
    fn parse(&self, content: &str) -> Result<Vec<TranscriptSegment>> {
        let segments = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .filter_map(|line| {
                let captures = line_regex().captures(line)?;
                let seconds = parse_transcript_time(captures.get(1)?.as_str())?;
                let text = captures.get(2)?.as_str().trim();
                (!text.is_empty()).then(|| TranscriptSegment::new(seconds, text))
            })
            .collect();

        Ok(segments)
    }
}

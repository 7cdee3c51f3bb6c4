/// WebVTT transcript parser
use super::TranscriptParser;
use crate::error::Result;
use crate::timecode::hms_to_seconds;
use crate::transcript::TranscriptSegment;
use regex::Regex;
use std::sync::OnceLock;

fn cue_timing_regex() -> &'static Regex {
    static CUE_TIMING_REGEX: OnceLock<Regex> = OnceLock::new();
    CUE_TIMING_REGEX.get_or_init(|| {
        Regex::new(r"^(?:(\d+):)?(\d{2}):(\d{2})\.(\d{3})\s+-->").expect("Failed to compile VTT cue timing regex")
    })
}

fn html_tag_regex() -> &'static Regex {
    static HTML_TAG_REGEX: OnceLock<Regex> = OnceLock::new();
    HTML_TAG_REGEX.get_or_init(|| Regex::new(r"<[^>]*>").expect("Failed to compile HTML tag regex"))
}

pub struct VttParser;

impl TranscriptParser for VttParser {
    // A cue starts at its timing line; the lines up to the next blank line are
    // its text. Header, NOTE/STYLE/REGION blocks and cue identifiers are skipped.
    fn parse(&self, content: &str) -> Result<Vec<TranscriptSegment>> {
        let mut segments = Vec::new();

        for block in content.split("\n\n") {
            let lines: Vec<&str> = block
                .lines()
                .map(|line| line.trim().trim_start_matches('\u{FEFF}'))
                .filter(|line| !line.is_empty())
                .collect();

            let Some(first) = lines.first() else {
                continue;
            };
            if first.starts_with("WEBVTT")
                || first.starts_with("NOTE")
                || first.starts_with("STYLE")
                || first.starts_with("REGION")
            {
                continue;
            }

            let Some(timing_index) = lines.iter().position(|line| line.contains("-->")) else {
                continue;
            };
            let Some(start) = parse_cue_start(lines[timing_index]) else {
                continue;
            };

            let text = lines[timing_index + 1..]
                .iter()
                .map(|line| html_tag_regex().replace_all(line, ""))
                .map(|line| line.trim().to_string())
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>()
                .join(" ");

            if !text.is_empty() {
                segments.push(TranscriptSegment::new(start, text));
            }
        }

        Ok(segments)
    }
}

/// Start time of a cue timing line, in whole seconds
fn parse_cue_start(timing_line: &str) -> Option<u64> {
    let captures = cue_timing_regex().captures(timing_line)?;
    let hours = match captures.get(1) {
        Some(m) => m.as_str().parse::<u64>().ok()?,
        None => 0,
    };
    let minutes: u64 = captures.get(2)?.as_str().parse().ok()?;
    let seconds: u64 = captures.get(3)?.as_str().parse().ok()?;

    hms_to_seconds(hours, minutes, seconds)
}

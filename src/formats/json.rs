/// JSON transcript parser
use super::TranscriptParser;
use crate::error::Result;
use crate::timecode::parse_transcript_time;
use crate::transcript::TranscriptSegment;
use serde_json::Value;
use tracing::debug;

/// Accepts a bare array of items, or an object with a `segments` or
/// `transcript` array. Items look like `{"seconds": 12, "text": "..."}` or
/// `{"timestamp": "00:00:12", "content": "..."}`.
pub struct JsonParser;

impl TranscriptParser for JsonParser {
    fn parse(&self, content: &str) -> Result<Vec<TranscriptSegment>> {
        let data: Value = serde_json::from_str(content)?;

        let items: &[Value] = match &data {
            Value::Array(items) => items.as_slice(),
            Value::Object(map) => match map.get("segments").or_else(|| map.get("transcript")) {
                Some(Value::Array(items)) => items.as_slice(),
                _ => &[],
            },
            _ => &[],
        };

        Ok(items.iter().filter_map(parse_item).collect())
    }
}

fn parse_item(item: &Value) -> Option<TranscriptSegment> {
    let text = ["text", "content"]
        .iter()
        .filter_map(|key| item.get(key).and_then(Value::as_str))
        .map(str::trim)
        .find(|text| !text.is_empty())?;

    let explicit_seconds = item
        .get("seconds")
        .and_then(Value::as_f64)
        .filter(|seconds| seconds.is_finite() && *seconds > 0.0);

    let seconds = match explicit_seconds {
        Some(seconds) => seconds.floor() as u64,
        None => {
            let label = item
                .get("timestamp")
                .or_else(|| item.get("time"))
                .and_then(Value::as_str)
                .unwrap_or("0:00");
            match parse_transcript_time(label) {
                Some(seconds) => seconds,
                None => {
                    debug!("Skipping JSON transcript item with malformed time '{}'", label);
                    return None;
                }
            }
        }
    };

    Some(TranscriptSegment::new(seconds, text))
}

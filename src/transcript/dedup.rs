/// Text based deduplication of resolved segments
use super::TranscriptSegment;
use std::collections::HashMap;

/// Collapse segments sharing the same text into one representative.
///
/// The first occurrence wins unless a later one has a real timestamp where
/// the kept one has zero, or both are non-zero and the later one is
/// earlier. Output keeps first-encounter order of each text.
pub fn dedup_by_text(segments: impl IntoIterator<Item = TranscriptSegment>) -> Vec<TranscriptSegment> {
    let mut kept: Vec<TranscriptSegment> = Vec::new();
    let mut index_by_text: HashMap<String, usize> = HashMap::new();

    for segment in segments {
        match index_by_text.get(&segment.text) {
            None => {
                index_by_text.insert(segment.text.clone(), kept.len());
                kept.push(segment);
            }
            Some(&index) => {
                if should_replace(&kept[index], &segment) {
                    kept[index] = segment;
                }
            }
        }
    }

    kept
}

fn should_replace(existing: &TranscriptSegment, candidate: &TranscriptSegment) -> bool {
    if existing.seconds == 0 {
        return candidate.seconds > 0;
    }
    candidate.seconds > 0 && candidate.seconds < existing.seconds
}

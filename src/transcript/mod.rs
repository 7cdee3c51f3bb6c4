/// Transcript segment resolution
///
/// This module turns raw candidates scraped from a watch page into clean,
/// deduplicated transcript segments with unambiguous timestamps.

pub mod cleaner;
pub mod dedup;
pub mod resolver;

// Re-export main types
pub use cleaner::TextCleaner;
pub use dedup::dedup_by_text;
pub use resolver::{Disambiguator, DropReason, ResolveStats, SegmentResolver, TimeLookup};

use crate::timecode::format_seconds;
use serde::{Deserialize, Serialize};

/// One resolved moment of a transcript
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TranscriptSegment {
    /// Canonical `HH:MM:SS` label, always derived from `seconds`
    pub timestamp: String,
    /// Cleaned body text
    pub text: String,
    /// Offset from the start of the video
    pub seconds: u64,
}

impl TranscriptSegment {
    /// Create a segment, deriving the timestamp label from `seconds`
    pub fn new(seconds: u64, text: impl Into<String>) -> Self {
        Self {
            timestamp: format_seconds(seconds),
            text: text.into(),
            seconds,
        }
    }
}

/// A scraped item before resolution
///
/// Every field except `raw_text` is optional; the resolver tries them in
/// priority order to find a start time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawCandidate {
    /// Machine readable start time on the element itself
    pub start_attr: Option<String>,
    /// Machine readable start time on the first descendant carrying one
    pub descendant_start_attr: Option<String>,
    /// Text of a dedicated timestamp node, e.g. `12:34`
    pub display_timestamp: Option<String>,
    /// Text of a dedicated body text node
    pub body_text: Option<String>,
    /// Full text content of the element
    pub raw_text: String,
}

impl RawCandidate {
    /// Candidate carrying only free text
    pub fn from_text(raw_text: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
            ..Self::default()
        }
    }

    pub fn with_start_attr(mut self, value: impl Into<String>) -> Self {
        self.start_attr = Some(value.into());
        self
    }

    pub fn with_descendant_start_attr(mut self, value: impl Into<String>) -> Self {
        self.descendant_start_attr = Some(value.into());
        self
    }

    pub fn with_display_timestamp(mut self, value: impl Into<String>) -> Self {
        self.display_timestamp = Some(value.into());
        self
    }

    pub fn with_body_text(mut self, value: impl Into<String>) -> Self {
        self.body_text = Some(value.into());
        self
    }
}

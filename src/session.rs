/// Per-video session state
///
/// A session owns the transcript currently in use for one video. Each new
/// extraction or upload replaces the transcript wholesale; scraped and
/// uploaded transcripts are never merged.
use crate::error::{NotesError, Result};
use crate::storage::{BookmarkRecord, SavedTranscript};
use crate::timecode::format_hhmmss;
use crate::transcript::TranscriptSegment;
use tracing::{debug, info};

pub const NO_TRANSCRIPT_TEXT: &str = "No transcript available for this timestamp";

/// Where the current transcript came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptSource {
    /// Resolved from the watch page
    Scraped,
    /// Parsed from a file in this session
    Uploaded { filename: String },
    /// Restored from the notes store
    Saved { filename: String },
}

#[derive(Debug, Clone)]
pub struct Transcript {
    pub source: TranscriptSource,
    pub segments: Vec<TranscriptSegment>,
}

/// Result of applying a page extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionOutcome {
    Found(usize),
    NoSegments,
}

/// Transcript lines attached to a bookmark
#[derive(Debug, Clone, PartialEq)]
pub struct BookmarkContext {
    pub transcript: String,
    pub segment_count: usize,
}

#[derive(Debug, Clone)]
pub struct TranscriptSession {
    video_id: String,
    video_title: String,
    transcript: Option<Transcript>,
}

impl TranscriptSession {
    pub fn new(video_id: impl Into<String>, video_title: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
            video_title: video_title.into(),
            transcript: None,
        }
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    pub fn video_title(&self) -> &str {
        &self.video_title
    }

    pub fn transcript(&self) -> Option<&Transcript> {
        self.transcript.as_ref()
    }

    pub fn segments(&self) -> &[TranscriptSegment] {
        self.transcript
            .as_ref()
            .map(|t| t.segments.as_slice())
            .unwrap_or(&[])
    }

    /// Replace the transcript with a fresh page extraction
    pub fn apply_extraction(&mut self, segments: Vec<TranscriptSegment>) -> ExtractionOutcome {
        let count = segments.len();
        self.transcript = Some(Transcript {
            source: TranscriptSource::Scraped,
            segments,
        });

        if count == 0 {
            info!("No transcript segments found for {}", self.video_id);
            ExtractionOutcome::NoSegments
        } else {
            info!("📜 Found {} transcript segments for {}", count, self.video_id);
            ExtractionOutcome::Found(count)
        }
    }

    /// Replace the transcript with one parsed from an uploaded file
    pub fn load_upload(&mut self, filename: &str, segments: Vec<TranscriptSegment>) -> Result<usize> {
        if segments.is_empty() {
            return Err(NotesError::EmptyTranscript(filename.to_string()));
        }

        let count = segments.len();
        self.transcript = Some(Transcript {
            source: TranscriptSource::Uploaded {
                filename: filename.to_string(),
            },
            segments,
        });
        info!("📁 Loaded {} transcript segments from {}", count, filename);
        Ok(count)
    }

    /// Replace the transcript with one previously persisted
    pub fn restore_saved(&mut self, saved: SavedTranscript) {
        debug!(
            "Restoring saved transcript with {} segments from {}",
            saved.data.len(),
            saved.filename
        );
        self.transcript = Some(Transcript {
            source: TranscriptSource::Saved {
                filename: saved.filename,
            },
            segments: saved.data,
        });
    }

    /// Transcript lines within `window_secs` of `at_seconds`, oldest first
    pub fn bookmark_context(&self, at_seconds: f64, window_secs: f64) -> BookmarkContext {
        let mut nearby: Vec<&TranscriptSegment> = self
            .segments()
            .iter()
            .filter(|segment| {
                let time = segment.seconds as f64;
                time >= at_seconds - window_secs && time <= at_seconds + window_secs
            })
            .collect();

        if nearby.is_empty() {
            return BookmarkContext {
                transcript: NO_TRANSCRIPT_TEXT.to_string(),
                segment_count: 0,
            };
        }

        nearby.sort_by_key(|segment| segment.seconds);
        let transcript = nearby
            .iter()
            .map(|segment| format!("{}: {}", segment.timestamp, segment.text))
            .collect::<Vec<_>>()
            .join("\n");

        BookmarkContext {
            transcript,
            segment_count: nearby.len(),
        }
    }

    /// Build a bookmark for the given playback position
    pub fn create_bookmark(&self, at_seconds: f64, window_secs: f64) -> (BookmarkRecord, usize) {
        let context = self.bookmark_context(at_seconds, window_secs);
        let record = BookmarkRecord::new(
            format_hhmmss(at_seconds),
            self.video_id.clone(),
            self.video_title.clone(),
            context.transcript,
        );
        (record, context.segment_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with(segments: Vec<TranscriptSegment>) -> TranscriptSession {
        let mut session = TranscriptSession::new("vid", "Title");
        session.apply_extraction(segments);
        session
    }

    #[test]
    fn test_extraction_replaces_previous_transcript() {
        let mut session = TranscriptSession::new("vid", "Title");
        session
            .load_upload("a.srt", vec![TranscriptSegment::new(1, "uploaded")])
            .unwrap();

        let outcome = session.apply_extraction(vec![TranscriptSegment::new(2, "scraped")]);
        assert_eq!(outcome, ExtractionOutcome::Found(1));
        assert_eq!(session.segments(), &[TranscriptSegment::new(2, "scraped")]);
        assert_eq!(session.transcript().unwrap().source, TranscriptSource::Scraped);
    }

    #[test]
    fn test_empty_extraction_is_not_an_error() {
        let mut session = TranscriptSession::new("vid", "Title");
        assert_eq!(session.apply_extraction(Vec::new()), ExtractionOutcome::NoSegments);
        assert!(session.segments().is_empty());
    }

    #[test]
    fn test_empty_upload_rejected() {
        let mut session = TranscriptSession::new("vid", "Title");
        assert!(session.load_upload("empty.txt", Vec::new()).is_err());
        assert!(session.transcript().is_none());
    }

    #[test]
    fn test_bookmark_context_window() {
        let session = session_with(vec![
            TranscriptSegment::new(130, "late"),
            TranscriptSegment::new(80, "too early"),
            TranscriptSegment::new(100, "early"),
            TranscriptSegment::new(131, "too late"),
        ]);

        let context = session.bookmark_context(110.0, 20.0);
        assert_eq!(context.segment_count, 2);
        assert_eq!(context.transcript, "00:01:40: early\n00:02:10: late");
    }

    #[test]
    fn test_bookmark_without_transcript() {
        let session = TranscriptSession::new("vid", "Title");
        let (record, count) = session.create_bookmark(75.4, 20.0);
        assert_eq!(count, 0);
        assert_eq!(record.timestamp, "00:01:15");
        assert_eq!(record.transcript, NO_TRANSCRIPT_TEXT);
        assert_eq!(record.video_id, "vid");
    }
}

/// yt-notes - Rust Implementation
///
/// Transcript extraction and local note keeping for YouTube videos: resolves
/// scraped transcript lines into clean timestamped segments, imports
/// transcript files, and stores bookmarks, screenshots and transcripts.

pub mod config;
pub mod error;
pub mod formats;
pub mod scanner;
pub mod session;
pub mod storage;
pub mod timecode;
pub mod transcript;

// Re-export main types for easy access
pub use crate::config::Config;
pub use crate::error::{NotesError, Result};
pub use crate::formats::{parse_transcript, TranscriptFormat};
pub use crate::scanner::{PageScan, PageScanner, ScanStrategy};
pub use crate::session::{BookmarkContext, ExtractionOutcome, TranscriptSession, TranscriptSource};
pub use crate::storage::{BookmarkRecord, ExportBundle, NotesStore, SavedTranscript, ScreenshotRecord};
pub use crate::timecode::{format_hhmmss, parse_time, parse_transcript_time};
pub use crate::transcript::{RawCandidate, SegmentResolver, TranscriptSegment};

/// Transcript file import
///
/// Uploaded transcript files already carry unambiguous start times, so they
/// bypass the page resolver and map straight to segments.

pub mod json;
pub mod plain;
pub mod srt;
pub mod vtt;

pub use json::JsonParser;
pub use plain::PlainTextParser;
pub use srt::SrtParser;
pub use vtt::VttParser;

use crate::error::{NotesError, Result};
use crate::transcript::TranscriptSegment;
use std::path::Path;
use tracing::{debug, info};

/// Supported transcript file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptFormat {
    Srt,
    Vtt,
    Json,
    PlainText,
}

impl TranscriptFormat {
    /// Pick a format from the file extension; unknown extensions are plain text
    pub fn from_filename(filename: &str) -> Self {
        let extension = Path::new(filename)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase());

        match extension.as_deref() {
            Some("srt") => TranscriptFormat::Srt,
            Some("vtt") => TranscriptFormat::Vtt,
            Some("json") => TranscriptFormat::Json,
            _ => TranscriptFormat::PlainText,
        }
    }

    fn parser(&self) -> &'static dyn TranscriptParser {
        match self {
            TranscriptFormat::Srt => &SrtParser,
            TranscriptFormat::Vtt => &VttParser,
            TranscriptFormat::Json => &JsonParser,
            TranscriptFormat::PlainText => &PlainTextParser,
        }
    }
}

/// A parser for one transcript file format
pub trait TranscriptParser: Sync {
    fn parse(&self, content: &str) -> Result<Vec<TranscriptSegment>>;
}

/// Parse transcript file content, choosing the format by file name.
///
/// A file that yields no segments is reported as [`NotesError::EmptyTranscript`].
pub fn parse_transcript(content: &str, filename: &str) -> Result<Vec<TranscriptSegment>> {
    let format = TranscriptFormat::from_filename(filename);
    debug!("Parsing {} as {:?}", filename, format);

    // Normalize Windows line endings once for every parser
    let normalized = content.replace("\r\n", "\n");
    let segments = format.parser().parse(&normalized)?;

    if segments.is_empty() {
        return Err(NotesError::EmptyTranscript(filename.to_string()));
    }

    info!("📝 Parsed {} transcript segments from {}", segments.len(), filename);
    Ok(segments)
}

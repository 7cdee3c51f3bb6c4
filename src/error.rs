/// Error types shared by the library modules
use std::path::PathBuf;

/// Result type for yt-notes operations
pub type Result<T> = std::result::Result<T, NotesError>;

/// Error types for yt-notes operations
#[derive(thiserror::Error, Debug)]
pub enum NotesError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("No valid transcript data found in {0}")]
    EmptyTranscript(String),

    #[error("Notes file {} is corrupt: {source}", .path.display())]
    CorruptStore {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Store path is not a directory: {}", .0.display())]
    StorePath(PathBuf),
}

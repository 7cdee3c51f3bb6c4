/// Local notes store for bookmarks, screenshots and saved transcripts
///
/// Data lives in a directory of JSON files, one per collection
/// (`bookmarks.json`, `screenshots.json`) plus one `transcript_<videoId>.json`
/// per saved transcript.
use crate::config::StorageConfig;
use crate::error::{NotesError, Result};
use crate::transcript::TranscriptSegment;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

const BOOKMARKS_FILE: &str = "bookmarks.json";
const SCREENSHOTS_FILE: &str = "screenshots.json";
const TRANSCRIPT_PREFIX: &str = "transcript_";

/// A saved playback position with nearby transcript lines
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkRecord {
    pub id: i64,
    pub timestamp: String,
    pub video_id: String,
    pub video_title: String,
    pub transcript: String,
    pub date: DateTime<Utc>,
}

impl BookmarkRecord {
    /// Create an unsaved bookmark; the store assigns the id
    pub fn new(timestamp: String, video_id: String, video_title: String, transcript: String) -> Self {
        Self {
            id: 0,
            timestamp,
            video_id,
            video_title,
            transcript,
            date: Utc::now(),
        }
    }
}

/// A captured frame, stored as an image data URL
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScreenshotRecord {
    pub id: i64,
    pub timestamp: String,
    pub video_id: String,
    pub video_title: String,
    pub screenshot: String,
    pub date: DateTime<Utc>,
}

impl ScreenshotRecord {
    /// Create an unsaved screenshot; the store assigns the id
    pub fn new(timestamp: String, video_id: String, video_title: String, screenshot: String) -> Self {
        Self {
            id: 0,
            timestamp,
            video_id,
            video_title,
            screenshot,
            date: Utc::now(),
        }
    }
}

/// A transcript persisted for one video
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SavedTranscript {
    pub data: Vec<TranscriptSegment>,
    pub filename: String,
    pub date: DateTime<Utc>,
}

/// Snapshot of bookmarks and screenshots for export
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    pub export_date: DateTime<Utc>,
    pub screenshots: Vec<ScreenshotRecord>,
    pub bookmarks: Vec<BookmarkRecord>,
}

/// Records kept in an id-addressed collection file
trait StoredRecord: Serialize + DeserializeOwned + Clone {
    fn id(&self) -> i64;
    fn set_id(&mut self, id: i64);
}

impl StoredRecord for BookmarkRecord {
    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}

impl StoredRecord for ScreenshotRecord {
    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}

/// Manages the notes directory
#[derive(Debug, Clone)]
pub struct NotesStore {
    data_dir: PathBuf,
    pretty_json: bool,
}

impl NotesStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            pretty_json: true,
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self {
            data_dir: config.data_dir.clone(),
            pretty_json: config.pretty_json,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Create the data directory
    pub async fn initialize(&self) -> Result<()> {
        if let Ok(metadata) = fs::metadata(&self.data_dir).await {
            if !metadata.is_dir() {
                return Err(NotesError::StorePath(self.data_dir.clone()));
            }
        }
        fs::create_dir_all(&self.data_dir).await?;
        debug!("📁 Notes directory initialized: {}", self.data_dir.display());
        Ok(())
    }

    pub async fn save_bookmark(&self, record: BookmarkRecord) -> Result<BookmarkRecord> {
        let saved = self.append_record(BOOKMARKS_FILE, record).await?;
        info!("🔖 Bookmark saved at {} for {}", saved.timestamp, saved.video_id);
        Ok(saved)
    }

    pub async fn list_bookmarks(&self) -> Result<Vec<BookmarkRecord>> {
        Ok(self.read_collection(BOOKMARKS_FILE).await)
    }

    pub async fn delete_bookmark(&self, id: i64) -> Result<bool> {
        self.delete_record::<BookmarkRecord>(BOOKMARKS_FILE, id).await
    }

    pub async fn save_screenshot(&self, record: ScreenshotRecord) -> Result<ScreenshotRecord> {
        let saved = self.append_record(SCREENSHOTS_FILE, record).await?;
        info!("📸 Screenshot saved at {} for {}", saved.timestamp, saved.video_id);
        Ok(saved)
    }

    pub async fn list_screenshots(&self) -> Result<Vec<ScreenshotRecord>> {
        Ok(self.read_collection(SCREENSHOTS_FILE).await)
    }

    pub async fn delete_screenshot(&self, id: i64) -> Result<bool> {
        self.delete_record::<ScreenshotRecord>(SCREENSHOTS_FILE, id).await
    }

    /// Persist a transcript for a video, replacing any earlier one
    pub async fn save_transcript(
        &self,
        video_id: &str,
        filename: &str,
        segments: Vec<TranscriptSegment>,
    ) -> Result<SavedTranscript> {
        let saved = SavedTranscript {
            data: segments,
            filename: filename.to_string(),
            date: Utc::now(),
        };

        self.write_json(&self.transcript_path(video_id), &saved).await?;
        info!("💾 Saved {} transcript segments for {}", saved.data.len(), video_id);
        Ok(saved)
    }

    /// Load a saved transcript; unreadable files count as missing
    pub async fn load_transcript(&self, video_id: &str) -> Result<Option<SavedTranscript>> {
        let path = self.transcript_path(video_id);
        if !fs::try_exists(&path).await? {
            debug!("No saved transcript for {}", video_id);
            return Ok(None);
        }
        Ok(self.read_json(&path).await)
    }

    pub async fn delete_transcript(&self, video_id: &str) -> Result<bool> {
        let path = self.transcript_path(video_id);
        if fs::try_exists(&path).await? {
            fs::remove_file(&path).await?;
            info!("🗑️ Deleted saved transcript for {}", video_id);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// All saved transcripts keyed by video id, newest first
    pub async fn list_transcripts(&self) -> Result<Vec<(String, SavedTranscript)>> {
        let mut transcripts = Vec::new();
        if !fs::try_exists(&self.data_dir).await? {
            return Ok(transcripts);
        }

        let mut entries = fs::read_dir(&self.data_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let Some(video_id) = transcript_video_id(&path) else {
                continue;
            };
            if let Some(saved) = self.read_json::<SavedTranscript>(&path).await {
                transcripts.push((video_id, saved));
            }
        }

        transcripts.sort_by(|a, b| b.1.date.cmp(&a.1.date));
        Ok(transcripts)
    }

    /// Remove every notes file; returns the number of files removed
    pub async fn clear_all(&self) -> Result<usize> {
        let mut cleared_count = 0;
        if !fs::try_exists(&self.data_dir).await? {
            return Ok(cleared_count);
        }

        let mut entries = fs::read_dir(&self.data_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") && fs::remove_file(&path).await.is_ok() {
                cleared_count += 1;
                debug!("🗑️ Removed notes file: {}", path.display());
            }
        }

        if cleared_count > 0 {
            info!("🧹 Cleared {} notes files", cleared_count);
        }
        Ok(cleared_count)
    }

    pub async fn export(&self) -> Result<ExportBundle> {
        Ok(ExportBundle {
            export_date: Utc::now(),
            screenshots: self.list_screenshots().await?,
            bookmarks: self.list_bookmarks().await?,
        })
    }

    /// Write an export bundle to `path`
    pub async fn export_to_file(&self, path: &Path) -> Result<ExportBundle> {
        let bundle = self.export().await?;
        let content = serde_json::to_string_pretty(&bundle)?;
        fs::write(path, content).await?;
        info!(
            "📦 Exported {} bookmarks and {} screenshots to {}",
            bundle.bookmarks.len(),
            bundle.screenshots.len(),
            path.display()
        );
        Ok(bundle)
    }

    fn transcript_path(&self, video_id: &str) -> PathBuf {
        self.data_dir
            .join(format!("{}{}.json", TRANSCRIPT_PREFIX, sanitize_key(video_id)))
    }

    async fn append_record<T: StoredRecord>(&self, file: &str, mut record: T) -> Result<T> {
        self.initialize().await?;
        let path = self.data_dir.join(file);
        // Refuse to rewrite a collection that could not be read back
        let mut records: Vec<T> = self.read_json_strict(&path).await?.unwrap_or_default();

        let last_id = records.iter().map(StoredRecord::id).max();
        record.set_id(next_id(last_id));
        records.push(record.clone());

        self.write_json(&path, &records).await?;
        Ok(record)
    }

    async fn delete_record<T: StoredRecord>(&self, file: &str, id: i64) -> Result<bool> {
        let path = self.data_dir.join(file);
        let mut records: Vec<T> = self.read_json_strict(&path).await?.unwrap_or_default();
        let before = records.len();
        records.retain(|record| record.id() != id);

        if records.len() == before {
            debug!("Record {} not found in {}", id, file);
            return Ok(false);
        }

        self.write_json(&path, &records).await?;
        info!("🗑️ Deleted record {} from {}", id, file);
        Ok(true)
    }

    async fn read_collection<T: DeserializeOwned>(&self, file: &str) -> Vec<T> {
        self.read_json(&self.data_dir.join(file)).await.unwrap_or_default()
    }

    async fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Option<T> {
        match fs::read_to_string(path).await {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!("Failed to parse notes file {}: {}", path.display(), e);
                    None
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!("Failed to read notes file {}: {}", path.display(), e);
                None
            }
        }
    }

    async fn read_json_strict<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| NotesError::CorruptStore {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Write through a temporary file so a failed write leaves the old file intact
    async fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let content = if self.pretty_json {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        let mut tmp_name = path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        fs::write(&tmp_path, content).await?;
        fs::rename(&tmp_path, path).await?;
        Ok(())
    }
}

/// Millisecond ids, kept strictly increasing within a collection
fn next_id(last_id: Option<i64>) -> i64 {
    let now = Utc::now().timestamp_millis();
    match last_id {
        Some(last) if last >= now => last + 1,
        _ => now,
    }
}

/// Keep video ids safe for use in file names
fn sanitize_key(video_id: &str) -> String {
    video_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

fn transcript_video_id(path: &Path) -> Option<String> {
    if path.extension()? != "json" {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    stem.strip_prefix(TRANSCRIPT_PREFIX).map(str::to_string)
}

/// Default export file name, e.g. `youtube-notes-2024-05-01.json`
pub fn export_filename(prefix: &str, date: DateTime<Utc>) -> String {
    format!("{}-{}.json", prefix, date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_next_id_strictly_increasing() {
        let far_future = Utc::now().timestamp_millis() + 1_000_000;
        assert_eq!(next_id(Some(far_future)), far_future + 1);
        assert!(next_id(Some(1)) > 1);
        assert!(next_id(None) > 0);
    }

    #[test]
    fn test_sanitize_key() {
        assert_eq!(sanitize_key("dQw4w9WgXcQ"), "dQw4w9WgXcQ");
        assert_eq!(sanitize_key("../etc/passwd"), "___etc_passwd");
    }

    #[test]
    fn test_transcript_video_id() {
        assert_eq!(
            transcript_video_id(Path::new("/data/transcript_abc.json")),
            Some("abc".to_string())
        );
        assert_eq!(transcript_video_id(Path::new("/data/bookmarks.json")), None);
        assert_eq!(transcript_video_id(Path::new("/data/transcript_abc.txt")), None);
    }

    #[test]
    fn test_export_filename() {
        let date = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        assert_eq!(export_filename("youtube-notes", date), "youtube-notes-2024-05-01.json");
    }

    #[test]
    fn test_bookmark_serializes_camel_case() {
        let record = BookmarkRecord::new(
            "00:00:10".to_string(),
            "vid".to_string(),
            "Title".to_string(),
            "text".to_string(),
        );
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("videoId").is_some());
        assert!(json.get("videoTitle").is_some());
    }

    #[tokio::test]
    async fn test_save_into_corrupt_collection_keeps_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let store = NotesStore::new(temp_dir.path().to_path_buf());
        let path = temp_dir.path().join(BOOKMARKS_FILE);
        let truncated = r#"[{"id": 1, "timestamp": "00:00:01", "videoId": "vid""#;
        fs::write(&path, truncated).await.unwrap();

        let record = BookmarkRecord::new(
            "00:00:10".to_string(),
            "vid".to_string(),
            "Title".to_string(),
            "text".to_string(),
        );
        let result = store.save_bookmark(record).await;
        assert!(matches!(result, Err(NotesError::CorruptStore { .. })));
        assert!(store.delete_bookmark(1).await.is_err());

        // The unreadable file is left untouched for the user to recover
        assert_eq!(fs::read_to_string(&path).await.unwrap(), truncated);
        assert!(store.list_bookmarks().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_write_leaves_no_temp_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let store = NotesStore::new(temp_dir.path().to_path_buf());
        store
            .save_transcript("vid", "talk.srt", vec![TranscriptSegment::new(1, "hello")])
            .await
            .unwrap();

        let mut names = Vec::new();
        let mut entries = fs::read_dir(temp_dir.path()).await.unwrap();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        assert_eq!(names, vec!["transcript_vid.json".to_string()]);
    }
}

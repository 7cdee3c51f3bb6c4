use tempfile::TempDir;
use tokio::fs;
use yt_notes_rust::config::TranscriptConfig;
use yt_notes_rust::session::NO_TRANSCRIPT_TEXT;
use yt_notes_rust::{
    parse_transcript, ExtractionOutcome, NotesStore, PageScanner, ScanStrategy, ScreenshotRecord, SegmentResolver,
    TranscriptSegment, TranscriptSession,
};

const WATCH_PAGE: &str = r#"<html><head>
    <link rel="canonical" href="https://www.youtube.com/watch?v=guard101">
    </head><body>
    <h1 class="ytd-video-primary-info-renderer">Guard Fundamentals</h1>
    <div class="ytd-transcript-segment-renderer">
      <div class="ytd-transcript-segment-timestamp">0:05</div>
      <div class="segment-body">Welcome   back</div>
    </div>
    <div class="ytd-transcript-segment-renderer">
      <div class="ytd-transcript-segment-timestamp">1:10</div>
      <div class="segment-body">Guard passing basics</div>
    </div>
    <div class="ytd-transcript-segment-renderer">
      <div class="segment-body">no time here</div>
    </div>
    <div class="ytd-transcript-segment-renderer">
      <div class="ytd-transcript-segment-timestamp">1:30</div>
      <div class="segment-body">Guard passing basics</div>
    </div>
    <div class="ytd-transcript-segment-renderer">
      <div class="ytd-transcript-segment-timestamp">2:00</div>
    </div>
    </body></html>"#;

fn extract_page() -> TranscriptSession {
    let config = TranscriptConfig::default();
    let scan = PageScanner::new(&config).unwrap().scan(WATCH_PAGE, None);
    assert_eq!(scan.strategy, Some(ScanStrategy::SegmentRenderers));
    assert_eq!(scan.candidates.len(), 5);

    let (segments, stats) = SegmentResolver::new(&config)
        .with_duration(scan.duration)
        .resolve_with_stats(scan.candidates);
    assert_eq!(stats.no_timestamp, 1);
    assert_eq!(stats.empty_text, 1);
    assert_eq!(stats.duplicates_collapsed, 1);

    let mut session = TranscriptSession::new(scan.video_id.unwrap(), scan.video_title);
    assert_eq!(session.apply_extraction(segments), ExtractionOutcome::Found(2));
    session
}

#[tokio::test]
async fn test_page_extraction_to_bookmark() {
    let temp_dir = TempDir::new().unwrap();
    let store = NotesStore::new(temp_dir.path().join("notes"));

    let session = extract_page();
    assert_eq!(session.video_id(), "guard101");
    assert_eq!(
        session.segments(),
        &[
            TranscriptSegment::new(5, "Welcome back"),
            TranscriptSegment::new(70, "Guard passing basics"),
        ]
    );

    store
        .save_transcript(session.video_id(), "watch.html", session.segments().to_vec())
        .await
        .unwrap();

    // A later run restores the transcript before bookmarking
    let saved = store.load_transcript("guard101").await.unwrap().unwrap();
    let mut restored = TranscriptSession::new("guard101", "Guard Fundamentals");
    restored.restore_saved(saved);

    let (record, count) = restored.create_bookmark(60.0, 20.0);
    assert_eq!(count, 1);
    let saved_bookmark = store.save_bookmark(record).await.unwrap();
    assert!(saved_bookmark.id > 0);

    let bookmarks = store.list_bookmarks().await.unwrap();
    assert_eq!(bookmarks.len(), 1);
    assert_eq!(bookmarks[0].timestamp, "00:01:00");
    assert_eq!(bookmarks[0].transcript, "00:01:10: Guard passing basics");
    assert_eq!(bookmarks[0].video_title, "Guard Fundamentals");
}

#[tokio::test]
async fn test_bookmark_without_saved_transcript() {
    let temp_dir = TempDir::new().unwrap();
    let store = NotesStore::new(temp_dir.path().to_path_buf());

    assert!(store.load_transcript("missing").await.unwrap().is_none());

    let session = TranscriptSession::new("missing", "Unknown Video");
    let (record, count) = session.create_bookmark(3725.0, 20.0);
    assert_eq!(count, 0);

    let saved = store.save_bookmark(record).await.unwrap();
    assert_eq!(saved.timestamp, "01:02:05");
    assert_eq!(saved.transcript, NO_TRANSCRIPT_TEXT);
}

#[tokio::test]
async fn test_import_transcript_files() {
    let srt = "1\n00:00:01,000 --> 00:00:04,000\nHello\nthere\n\n2\n00:01:05,500 --> 00:01:08,000\nSecond line\n";
    let vtt = "WEBVTT\n\n00:00:02.000 --> 00:00:05.000\nHi <b>there</b>\n";
    let json = r#"{"segments": [{"seconds": 12.7, "text": " spaced "}, {"timestamp": "0:30", "text": "half hour"}]}"#;
    let plain = "[1:02:03] three part\nnot a transcript line\n";

    let srt_segments = parse_transcript(srt, "talk.srt").unwrap();
    assert_eq!(
        srt_segments,
        vec![
            TranscriptSegment::new(1, "Hello there"),
            TranscriptSegment::new(65, "Second line"),
        ]
    );

    let vtt_segments = parse_transcript(&vtt.replace('\n', "\r\n"), "talk.VTT").unwrap();
    assert_eq!(vtt_segments, vec![TranscriptSegment::new(2, "Hi there")]);

    let json_segments = parse_transcript(json, "talk.json").unwrap();
    assert_eq!(
        json_segments,
        vec![
            TranscriptSegment::new(12, "spaced"),
            TranscriptSegment::new(1800, "half hour"),
        ]
    );

    let plain_segments = parse_transcript(plain, "talk.txt").unwrap();
    assert_eq!(plain_segments, vec![TranscriptSegment::new(3723, "three part")]);

    assert!(parse_transcript("nothing useful", "empty.txt").is_err());
}

#[tokio::test]
async fn test_upload_replaces_scraped_transcript() {
    let temp_dir = TempDir::new().unwrap();
    let store = NotesStore::new(temp_dir.path().to_path_buf());

    let mut session = extract_page();
    let uploaded = parse_transcript("1\n00:00:09,000 --> 00:00:10,000\nFrom file\n", "guard.srt").unwrap();
    assert_eq!(session.load_upload("guard.srt", uploaded).unwrap(), 1);
    assert_eq!(session.segments(), &[TranscriptSegment::new(9, "From file")]);

    store
        .save_transcript(session.video_id(), "guard.srt", session.segments().to_vec())
        .await
        .unwrap();
    let transcripts = store.list_transcripts().await.unwrap();
    assert_eq!(transcripts.len(), 1);
    assert_eq!(transcripts[0].0, "guard101");
    assert_eq!(transcripts[0].1.filename, "guard.srt");
}

#[tokio::test]
async fn test_delete_export_and_clear() {
    let temp_dir = TempDir::new().unwrap();
    let store = NotesStore::new(temp_dir.path().join("notes"));

    let session = extract_page();
    let (record, _) = session.create_bookmark(5.0, 20.0);
    let first = store.save_bookmark(record.clone()).await.unwrap();
    let second = store.save_bookmark(record).await.unwrap();
    assert!(second.id > first.id);

    let screenshot = store
        .save_screenshot(ScreenshotRecord::new(
            "00:00:05".to_string(),
            "guard101".to_string(),
            "Guard Fundamentals".to_string(),
            "data:image/png;base64,AAAA".to_string(),
        ))
        .await
        .unwrap();

    assert!(store.delete_bookmark(first.id).await.unwrap());
    assert!(!store.delete_bookmark(first.id).await.unwrap());
    assert_eq!(store.list_bookmarks().await.unwrap().len(), 1);

    let export_path = temp_dir.path().join("export.json");
    let bundle = store.export_to_file(&export_path).await.unwrap();
    assert_eq!(bundle.bookmarks.len(), 1);
    assert_eq!(bundle.screenshots.len(), 1);

    let exported: serde_json::Value = serde_json::from_str(&fs::read_to_string(&export_path).await.unwrap()).unwrap();
    assert!(exported.get("exportDate").is_some());
    assert_eq!(exported["bookmarks"][0]["videoId"], "guard101");
    assert_eq!(exported["screenshots"][0]["id"], screenshot.id);

    store
        .save_transcript("guard101", "watch.html", session.segments().to_vec())
        .await
        .unwrap();
    assert!(store.delete_transcript("guard101").await.unwrap());
    assert!(!store.delete_transcript("guard101").await.unwrap());

    assert_eq!(store.clear_all().await.unwrap(), 2);
    assert!(store.list_bookmarks().await.unwrap().is_empty());
    assert!(store.list_screenshots().await.unwrap().is_empty());
}

use anyhow::{anyhow, Context, Result};
use clap::{Arg, ArgMatches, Command};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use yt_notes_rust::storage::export_filename;
use yt_notes_rust::timecode::parse_time;
use yt_notes_rust::{
    parse_transcript, Config, ExtractionOutcome, NotesStore, PageScanner, SegmentResolver, TranscriptSession,
};

fn cli() -> Command {
    Command::new("yt-notes")
        .version("0.1.0")
        .about("YouTube transcript extraction, bookmarks and notes")
        .subcommand_required(true)
        .arg(
            Arg::new("data-dir")
                .short('d')
                .long("data-dir")
                .value_name("DIR")
                .help("Directory holding the notes files")
                .global(true),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file (TOML)")
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("extract")
                .about("Extract a transcript from a saved watch page")
                .arg(Arg::new("html").long("html").value_name("FILE").required(true))
                .arg(Arg::new("url").long("url").value_name("URL").help("Watch page URL"))
                .arg(Arg::new("video-id").long("video-id").value_name("ID"))
                .arg(
                    Arg::new("duration")
                        .long("duration")
                        .value_name("SECS")
                        .help("Video duration in seconds, overrides the page hint"),
                )
                .arg(
                    Arg::new("save")
                        .long("save")
                        .help("Persist the extracted transcript")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("import")
                .about("Import a transcript file (.srt, .vtt, .json or plain text)")
                .arg(Arg::new("file").value_name("FILE").required(true))
                .arg(Arg::new("video-id").long("video-id").value_name("ID").required(true)),
        )
        .subcommand(
            Command::new("bookmark")
                .about("Bookmark a playback position with nearby transcript lines")
                .arg(Arg::new("video-id").long("video-id").value_name("ID").required(true))
                .arg(
                    Arg::new("at")
                        .long("at")
                        .value_name("TIME")
                        .help("Position as MM:SS, H:MM:SS or seconds")
                        .required(true),
                )
                .arg(Arg::new("title").long("title").value_name("TITLE"))
                .arg(Arg::new("window").long("window").value_name("SECS")),
        )
        .subcommand(
            Command::new("list").about("List stored notes").arg(
                Arg::new("kind")
                    .value_name("KIND")
                    .value_parser(["bookmarks", "screenshots", "transcripts"]),
            ),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete a bookmark, screenshot or saved transcript")
                .arg(
                    Arg::new("kind")
                        .value_name("KIND")
                        .value_parser(["bookmark", "screenshot", "transcript"])
                        .required(true),
                )
                .arg(
                    Arg::new("key")
                        .value_name("ID")
                        .help("Record id, or video id for transcripts")
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Export bookmarks and screenshots as JSON")
                .arg(Arg::new("output").short('o').long("output").value_name("FILE")),
        )
        .subcommand(Command::new("clear").about("Delete all stored notes"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();

    let mut config = match matches.get_one::<String>("config") {
        Some(path) => Config::load_from(path).with_context(|| format!("Failed to load config {}", path))?,
        None => Config::load().context("Failed to load configuration")?,
    };
    if let Some(dir) = matches.get_one::<String>("data-dir") {
        config.storage.data_dir = PathBuf::from(dir);
    }

    let log_level = if matches.get_flag("verbose") {
        "debug".to_string()
    } else {
        config.output.log_level.clone()
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!("yt_notes_rust={},yt_notes={},warn", log_level, log_level)))
        .init();

    config.validate()?;
    let store = NotesStore::from_config(&config.storage);

    match matches.subcommand() {
        Some(("extract", sub)) => run_extract(&config, &store, sub).await,
        Some(("import", sub)) => run_import(&store, sub).await,
        Some(("bookmark", sub)) => run_bookmark(&config, &store, sub).await,
        Some(("list", sub)) => run_list(&store, sub.get_one::<String>("kind").map(String::as_str)).await,
        Some(("delete", sub)) => run_delete(&store, sub).await,
        Some(("export", sub)) => run_export(&config, &store, sub).await,
        Some(("clear", _)) => {
            let cleared = store.clear_all().await?;
            println!("Cleared {} notes files", cleared);
            Ok(())
        }
        _ => Err(anyhow!("Unknown command")),
    }
}

async fn run_extract(config: &Config, store: &NotesStore, matches: &ArgMatches) -> Result<()> {
    let html_path = required(matches, "html")?;
    let html = tokio::fs::read_to_string(html_path)
        .await
        .with_context(|| format!("Failed to read {}", html_path))?;

    let scanner = PageScanner::new(&config.transcript)?;
    let scan = scanner.scan(&html, matches.get_one::<String>("url").map(String::as_str));

    let duration = match matches.get_one::<String>("duration") {
        Some(value) => Some(value.parse::<f64>().with_context(|| format!("Invalid duration '{}'", value))?),
        None => scan.duration,
    };

    let video_id = matches
        .get_one::<String>("video-id")
        .cloned()
        .or(scan.video_id.clone())
        .unwrap_or_else(|| "unknown".to_string());

    info!("🎬 Extracting transcript for {} ({})", scan.video_title, video_id);
    let resolver = SegmentResolver::new(&config.transcript).with_duration(duration);
    let segments = resolver.resolve(scan.candidates);

    let mut session = TranscriptSession::new(video_id.clone(), scan.video_title);
    match session.apply_extraction(segments) {
        ExtractionOutcome::Found(count) => {
            for segment in session.segments() {
                println!("{}  {}", segment.timestamp, segment.text);
            }
            println!("Found {} transcript segments", count);
        }
        ExtractionOutcome::NoSegments => {
            println!("No transcript segments found");
            return Ok(());
        }
    }

    if matches.get_flag("save") {
        store
            .save_transcript(&video_id, html_path, session.segments().to_vec())
            .await?;
    }
    Ok(())
}

async fn run_import(store: &NotesStore, matches: &ArgMatches) -> Result<()> {
    let file = required(matches, "file")?;
    let video_id = required(matches, "video-id")?;

    let content = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file))?;
    let filename = PathBuf::from(file)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.to_string());

    let segments = parse_transcript(&content, &filename).context("Error parsing transcript file")?;
    let mut session = TranscriptSession::new(video_id, "");
    let count = session.load_upload(&filename, segments)?;

    store
        .save_transcript(video_id, &filename, session.segments().to_vec())
        .await?;
    println!("Successfully loaded {} transcript segments from {}", count, filename);
    Ok(())
}

async fn run_bookmark(config: &Config, store: &NotesStore, matches: &ArgMatches) -> Result<()> {
    let video_id = required(matches, "video-id")?;
    let at = parse_position(required(matches, "at")?)?;
    let title = matches
        .get_one::<String>("title")
        .cloned()
        .unwrap_or_else(|| "Unknown Video".to_string());
    let window = match matches.get_one::<String>("window") {
        Some(value) => value.parse::<f64>().with_context(|| format!("Invalid window '{}'", value))?,
        None => config.bookmarks.context_window_secs,
    };

    let mut session = TranscriptSession::new(video_id, title);
    match store.load_transcript(video_id).await? {
        Some(saved) => session.restore_saved(saved),
        None => warn!("No saved transcript for {}, bookmark will have no transcript", video_id),
    }

    let (record, segment_count) = session.create_bookmark(at, window);
    let saved = store.save_bookmark(record).await?;
    if segment_count > 0 {
        println!(
            "Bookmark saved at {} with {} transcript segments (id {})",
            saved.timestamp, segment_count, saved.id
        );
    } else {
        println!("Bookmark saved at {} (no transcript available) (id {})", saved.timestamp, saved.id);
    }
    Ok(())
}

async fn run_list(store: &NotesStore, kind: Option<&str>) -> Result<()> {
    if matches!(kind, None | Some("bookmarks")) {
        let bookmarks = store.list_bookmarks().await?;
        println!("Bookmarks ({})", bookmarks.len());
        for bookmark in bookmarks {
            println!(
                "  [{}] {} {} - {}",
                bookmark.id, bookmark.timestamp, bookmark.video_id, bookmark.video_title
            );
            for line in bookmark.transcript.lines() {
                println!("      {}", line);
            }
        }
    }

    if matches!(kind, None | Some("screenshots")) {
        let screenshots = store.list_screenshots().await?;
        println!("Screenshots ({})", screenshots.len());
        for screenshot in screenshots {
            println!(
                "  [{}] {} {} - {}",
                screenshot.id, screenshot.timestamp, screenshot.video_id, screenshot.video_title
            );
        }
    }

    if matches!(kind, None | Some("transcripts")) {
        let transcripts = store.list_transcripts().await?;
        println!("Transcripts ({})", transcripts.len());
        for (video_id, saved) in transcripts {
            println!(
                "  {} - {} segments from {} ({})",
                video_id,
                saved.data.len(),
                saved.filename,
                saved.date.format("%Y-%m-%d %H:%M")
            );
        }
    }

    Ok(())
}

async fn run_delete(store: &NotesStore, matches: &ArgMatches) -> Result<()> {
    let kind = required(matches, "kind")?;
    let key = required(matches, "key")?;

    let deleted = match kind {
        "transcript" => store.delete_transcript(key).await?,
        "bookmark" | "screenshot" => {
            let id: i64 = key.parse().with_context(|| format!("Invalid id '{}'", key))?;
            if kind == "bookmark" {
                store.delete_bookmark(id).await?
            } else {
                store.delete_screenshot(id).await?
            }
        }
        other => return Err(anyhow!("Unknown kind '{}'", other)),
    };

    if deleted {
        println!("Deleted {} {}", kind, key);
    } else {
        println!("No {} found for {}", kind, key);
    }
    Ok(())
}

async fn run_export(config: &Config, store: &NotesStore, matches: &ArgMatches) -> Result<()> {
    let output = matches
        .get_one::<String>("output")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(export_filename(&config.output.export_prefix, chrono::Utc::now())));

    let bundle = store.export_to_file(&output).await?;
    println!(
        "Exported {} bookmarks and {} screenshots to {}",
        bundle.bookmarks.len(),
        bundle.screenshots.len(),
        output.display()
    );
    Ok(())
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("Missing argument: {}", name))
}

/// Playback position from `MM:SS`, `H:MM:SS` or plain seconds
fn parse_position(value: &str) -> Result<f64> {
    if let Some(seconds) = parse_time(value) {
        return Ok(seconds as f64);
    }
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|seconds| seconds.is_finite() && *seconds >= 0.0)
        .ok_or_else(|| anyhow!("Invalid timestamp format: {}", value))
}

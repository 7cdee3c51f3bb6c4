use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for yt-notes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Transcript resolution settings
    pub transcript: TranscriptConfig,

    /// Bookmark settings
    pub bookmarks: BookmarkConfig,

    /// Notes storage settings
    pub storage: StorageConfig,

    /// Output and logging settings
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptConfig {
    /// Videos at least this long (seconds) may label lines as `HH:MM`
    pub long_video_threshold_secs: f64,

    /// A first segment earlier than this (seconds) is implausible for a long video
    pub implausible_first_segment_secs: u64,

    /// Segments may start this many seconds past the known duration
    pub duration_tolerance_secs: f64,

    /// Heuristic page scan: minimum text length of a candidate (exclusive)
    pub heuristic_min_text_len: usize,

    /// Heuristic page scan: maximum text length of a candidate (exclusive)
    pub heuristic_max_text_len: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookmarkConfig {
    /// Transcript lines within this many seconds of a bookmark are attached to it
    pub context_window_secs: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the JSON notes files
    pub data_dir: PathBuf,

    /// Pretty print stored JSON
    pub pretty_json: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Log level
    pub log_level: String,

    /// Default export file name prefix
    pub export_prefix: String,
}

impl Config {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        Self::load_first(&["yt-notes.toml", "config/yt-notes.toml"])
    }

    /// Load the first config file that exists, falling back to the environment.
    /// A file that exists but does not parse is an error.
    fn load_first(config_paths: &[&str]) -> Result<Self> {
        for path in config_paths {
            if let Ok(config_str) = std::fs::read_to_string(path) {
                let config = toml::from_str(&config_str)
                    .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;
                tracing::info!("📄 Loaded configuration from: {}", path);
                return Ok(config);
            }
        }

        Self::from_env()
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &str) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)?;
        let config = toml::from_str(&config_str)?;
        tracing::info!("📄 Loaded configuration from: {}", path);
        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(data_dir) = std::env::var("YT_NOTES_DATA_DIR") {
            config.storage.data_dir = PathBuf::from(data_dir);
        }

        if let Ok(log_level) = std::env::var("YT_NOTES_LOG_LEVEL") {
            config.output.log_level = log_level;
        }

        if let Ok(window) = std::env::var("YT_NOTES_CONTEXT_WINDOW") {
            config.bookmarks.context_window_secs = window
                .parse()
                .map_err(|e| anyhow!("Invalid YT_NOTES_CONTEXT_WINDOW '{}': {}", window, e))?;
        }

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &str) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path, config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path);
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !(self.transcript.long_video_threshold_secs.is_finite()
            && self.transcript.long_video_threshold_secs > 0.0)
        {
            return Err(anyhow!("long_video_threshold_secs must be a positive number"));
        }

        if !(self.transcript.duration_tolerance_secs.is_finite()
            && self.transcript.duration_tolerance_secs >= 0.0)
        {
            return Err(anyhow!("duration_tolerance_secs must not be negative"));
        }

        if self.transcript.heuristic_min_text_len >= self.transcript.heuristic_max_text_len {
            return Err(anyhow!(
                "heuristic_min_text_len must be less than heuristic_max_text_len"
            ));
        }

        if !(self.bookmarks.context_window_secs.is_finite() && self.bookmarks.context_window_secs >= 0.0) {
            return Err(anyhow!("context_window_secs must not be negative"));
        }

        if self.storage.data_dir.as_os_str().is_empty() {
            return Err(anyhow!("data_dir must not be empty"));
        }

        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "yt-notes Configuration:\n\
            - Data Directory: {}\n\
            - Bookmark Context Window: {}s\n\
            - Long Video Threshold: {}s\n\
            - Log Level: {}",
            self.storage.data_dir.display(),
            self.bookmarks.context_window_secs,
            self.transcript.long_video_threshold_secs,
            self.output.log_level
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            transcript: TranscriptConfig::default(),
            bookmarks: BookmarkConfig {
                context_window_secs: 20.0,
            },
            storage: StorageConfig {
                data_dir: PathBuf::from("./yt-notes-data"),
                pretty_json: true,
            },
            output: OutputConfig {
                log_level: "info".to_string(),
                export_prefix: "youtube-notes".to_string(),
            },
        }
    }
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            long_video_threshold_secs: 3600.0,
            implausible_first_segment_secs: 120,
            duration_tolerance_secs: 1.0,
            heuristic_min_text_len: 10,
            heuristic_max_text_len: 200,
        }
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_data_dir(mut self, dir: PathBuf) -> Self {
        self.config.storage.data_dir = dir;
        self
    }

    pub fn with_context_window(mut self, seconds: f64) -> Self {
        self.config.bookmarks.context_window_secs = seconds;
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.config.output.log_level = level.into();
        self
    }

    pub fn with_long_video_threshold(mut self, seconds: f64) -> Self {
        self.config.transcript.long_video_threshold_secs = seconds;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

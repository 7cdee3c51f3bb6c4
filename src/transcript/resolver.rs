/// Start time resolution for scraped transcript candidates
use super::{dedup_by_text, RawCandidate, TextCleaner, TranscriptSegment};
use crate::config::TranscriptConfig;
use crate::timecode::{hms_to_seconds, split_parts};
use regex::Regex;
use tracing::{debug, info};

/// Where a candidate's start time was found
#[derive(Debug, Clone, PartialEq)]
pub enum TimeLookup {
    /// Machine readable seconds value
    Numeric(f64),
    /// Human readable display string needing disambiguation
    Display(String),
}

/// Start time sources, in the order they are tried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimeSource {
    StartAttribute,
    DescendantStartAttribute,
    DisplayNode,
    EmbeddedText,
}

const LOOKUP_CHAIN: [TimeSource; 4] = [
    TimeSource::StartAttribute,
    TimeSource::DescendantStartAttribute,
    TimeSource::DisplayNode,
    TimeSource::EmbeddedText,
];

/// Why a candidate did not produce a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// No source yielded a usable start time
    NoTimestamp,
    /// The start time was infinite or negative
    InvalidSeconds,
    /// Nothing left after stripping timestamps and whitespace
    EmptyText,
    /// Start time lies past the end of the video
    PastDuration,
}

/// Counters collected over one resolution pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveStats {
    pub candidates: usize,
    pub resolved: usize,
    pub duplicates_collapsed: usize,
    pub no_timestamp: usize,
    pub invalid_seconds: usize,
    pub empty_text: usize,
    pub past_duration: usize,
}

impl ResolveStats {
    fn record_drop(&mut self, reason: DropReason) {
        match reason {
            DropReason::NoTimestamp => self.no_timestamp += 1,
            DropReason::InvalidSeconds => self.invalid_seconds += 1,
            DropReason::EmptyText => self.empty_text += 1,
            DropReason::PastDuration => self.past_duration += 1,
        }
    }

    /// Total number of candidates dropped before deduplication
    pub fn dropped(&self) -> usize {
        self.no_timestamp + self.invalid_seconds + self.empty_text + self.past_duration
    }
}

/// Resolves `MM:SS` versus `HH:MM` readings of two-part display timestamps
#[derive(Debug, Clone)]
pub struct Disambiguator {
    duration: Option<f64>,
    long_video_threshold: f64,
    implausible_first_segment: u64,
}

impl Disambiguator {
    pub fn new(config: &TranscriptConfig, duration: Option<f64>) -> Self {
        Self {
            duration: duration.filter(|d| d.is_finite()),
            long_video_threshold: config.long_video_threshold_secs,
            implausible_first_segment: config.implausible_first_segment_secs,
        }
    }

    /// Resolve a display timestamp against the cursor of the last accepted segment.
    ///
    /// With a cursor, the reading closest to it wins and ties go to `MM:SS`.
    /// Without one, `MM:SS` is the default unless the video is long, the
    /// `HH:MM` reading fits in it, and `MM:SS` would put the first segment
    /// implausibly close to the start.
    pub fn resolve(&self, display: &str, last_seconds: Option<u64>) -> Option<u64> {
        let parts = split_parts(display)?;
        let (first, second) = match parts.as_slice() {
            [hours, minutes, seconds] => return hms_to_seconds(*hours, *minutes, *seconds),
            [first, second] => (*first, *second),
            _ => return None,
        };

        let as_mmss = hms_to_seconds(0, first, second)?;
        // An HH:MM reading past u64::MAX lies beyond any cursor or duration
        let Some(as_hhmm) = hms_to_seconds(first, second, 0) else {
            return Some(as_mmss);
        };

        let chosen = match last_seconds {
            Some(last) => {
                if as_mmss.abs_diff(last) <= as_hhmm.abs_diff(last) {
                    as_mmss
                } else {
                    as_hhmm
                }
            }
            None => match self.duration {
                Some(duration)
                    if duration >= self.long_video_threshold
                        && as_hhmm as f64 <= duration
                        && as_mmss < self.implausible_first_segment =>
                {
                    as_hhmm
                }
                _ => as_mmss,
            },
        };

        Some(chosen)
    }
}

/// Turns raw page candidates into clean, deduplicated transcript segments
#[derive(Debug, Clone)]
pub struct SegmentResolver {
    disambiguator: Disambiguator,
    cleaner: TextCleaner,
    config: TranscriptConfig,
    duration: Option<f64>,
    embedded_hms: Regex,
    embedded_ms: Regex,
}

impl SegmentResolver {
    /// Create a resolver with no known video duration
    pub fn new(config: &TranscriptConfig) -> Self {
        Self {
            disambiguator: Disambiguator::new(config, None),
            cleaner: TextCleaner::new(),
            config: config.clone(),
            duration: None,
            embedded_hms: Regex::new(r"\b(\d{1,2}:\d{2}:\d{2})\b").expect("valid embedded H:MM:SS pattern"),
            embedded_ms: Regex::new(r"\b(\d{1,2}:\d{2})\b").expect("valid embedded M:SS pattern"),
        }
    }

    /// Attach a video duration hint; non-finite values are ignored
    pub fn with_duration(mut self, duration: Option<f64>) -> Self {
        self.duration = duration.filter(|d| d.is_finite());
        self.disambiguator = Disambiguator::new(&self.config, self.duration);
        self
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    /// Find the highest priority start time source on a candidate
    pub fn lookup_time(&self, candidate: &RawCandidate) -> Option<TimeLookup> {
        LOOKUP_CHAIN
            .iter()
            .find_map(|source| self.lookup_from(*source, candidate))
    }

    fn lookup_from(&self, source: TimeSource, candidate: &RawCandidate) -> Option<TimeLookup> {
        match source {
            TimeSource::StartAttribute => parse_numeric_attr(candidate.start_attr.as_deref()),
            TimeSource::DescendantStartAttribute => {
                parse_numeric_attr(candidate.descendant_start_attr.as_deref())
            }
            TimeSource::DisplayNode => candidate
                .display_timestamp
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| TimeLookup::Display(s.to_string())),
            TimeSource::EmbeddedText => self
                .embedded_hms
                .captures(&candidate.raw_text)
                .or_else(|| self.embedded_ms.captures(&candidate.raw_text))
                .and_then(|caps| caps.get(1))
                .map(|m| TimeLookup::Display(m.as_str().to_string())),
        }
    }

    /// Resolve candidates into the final segment list
    pub fn resolve<I>(&self, candidates: I) -> Vec<TranscriptSegment>
    where
        I: IntoIterator<Item = RawCandidate>,
    {
        self.resolve_with_stats(candidates).0
    }

    /// Resolve candidates and report what was dropped along the way
    pub fn resolve_with_stats<I>(&self, candidates: I) -> (Vec<TranscriptSegment>, ResolveStats)
    where
        I: IntoIterator<Item = RawCandidate>,
    {
        let mut stats = ResolveStats::default();
        let mut provisional = Vec::new();
        let mut last_seconds: Option<u64> = None;

        for candidate in candidates {
            stats.candidates += 1;
            match self.resolve_candidate(&candidate, last_seconds) {
                Ok(segment) => {
                    last_seconds = Some(segment.seconds);
                    provisional.push(segment);
                }
                Err(reason) => {
                    debug!("Dropping transcript candidate ({:?}): {:.60}", reason, candidate.raw_text.trim());
                    stats.record_drop(reason);
                }
            }
        }

        let provisional_count = provisional.len();
        let segments = dedup_by_text(provisional);
        stats.duplicates_collapsed = provisional_count - segments.len();
        stats.resolved = segments.len();

        info!(
            "🧩 Resolved {} segments from {} candidates ({} dropped, {} duplicates)",
            stats.resolved,
            stats.candidates,
            stats.dropped(),
            stats.duplicates_collapsed
        );

        (segments, stats)
    }

    fn resolve_candidate(
        &self,
        candidate: &RawCandidate,
        last_seconds: Option<u64>,
    ) -> Result<TranscriptSegment, DropReason> {
        let seconds = match self.lookup_time(candidate) {
            Some(TimeLookup::Numeric(value)) => {
                let floored = value.floor();
                if !floored.is_finite() || floored < 0.0 {
                    return Err(DropReason::InvalidSeconds);
                }
                floored as u64
            }
            Some(TimeLookup::Display(display)) => self
                .disambiguator
                .resolve(&display, last_seconds)
                .ok_or(DropReason::NoTimestamp)?,
            None => return Err(DropReason::NoTimestamp),
        };

        let body = candidate
            .body_text
            .as_deref()
            .filter(|text| !text.is_empty())
            .unwrap_or(&candidate.raw_text);
        let text = self.cleaner.clean(body).ok_or(DropReason::EmptyText)?;

        if let Some(duration) = self.duration {
            if seconds as f64 > duration + self.config.duration_tolerance_secs {
                return Err(DropReason::PastDuration);
            }
        }

        Ok(TranscriptSegment::new(seconds, text))
    }
}

/// Parse a numeric attribute; values that are not numbers yield nothing
fn parse_numeric_attr(raw: Option<&str>) -> Option<TimeLookup> {
    let value = raw?.trim();
    if value.is_empty() {
        return None;
    }
    value
        .parse::<f64>()
        .ok()
        .filter(|v| !v.is_nan())
        .map(TimeLookup::Numeric)
}

/// Timestamp formatting and parsing helpers
///
/// Transcript segments carry both a canonical `HH:MM:SS` string and the
/// equivalent offset in seconds. The helpers here convert between the two
/// and read the looser display forms found on watch pages and in files.
use regex::Regex;
use std::sync::OnceLock;

/// Format a (possibly fractional) offset as `HH:MM:SS`.
///
/// Negative and non-finite values format as `00:00:00`.
pub fn format_hhmmss(total_seconds: f64) -> String {
    let seconds = if total_seconds.is_finite() && total_seconds > 0.0 {
        total_seconds.floor() as u64
    } else {
        0
    };
    format_seconds(seconds)
}

/// Format whole seconds as `HH:MM:SS`
pub fn format_seconds(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

/// Parse a navigation timestamp: `MM:SS` or `H:MM:SS`
pub fn parse_time(time_str: &str) -> Option<u64> {
    match split_parts(time_str)?.as_slice() {
        [minutes, seconds] => hms_to_seconds(0, *minutes, *seconds),
        [hours, minutes, seconds] => hms_to_seconds(*hours, *minutes, *seconds),
        _ => None,
    }
}

/// Parse a transcript display timestamp: `HH:MM` or `H:MM:SS`.
///
/// Two-part values are read as hours and minutes, which is how long videos
/// label their transcript lines past the one hour mark.
pub fn parse_transcript_time(time_str: &str) -> Option<u64> {
    match split_parts(time_str)?.as_slice() {
        [hours, minutes] => hms_to_seconds(*hours, *minutes, 0),
        [hours, minutes, seconds] => hms_to_seconds(*hours, *minutes, *seconds),
        _ => None,
    }
}

/// Combine clock parts into seconds; `None` when the total does not fit in a `u64`
pub(crate) fn hms_to_seconds(hours: u64, minutes: u64, seconds: u64) -> Option<u64> {
    hours
        .checked_mul(3600)?
        .checked_add(minutes.checked_mul(60)?)?
        .checked_add(seconds)
}

/// Split a colon separated timestamp into its numeric parts
pub(crate) fn split_parts(time_str: &str) -> Option<Vec<u64>> {
    let trimmed = time_str.trim();
    if trimmed.is_empty() {
        return None;
    }

    trimmed
        .split(':')
        .map(|part| part.trim().parse::<u64>().ok())
        .collect()
}

fn iso_duration_regex() -> &'static Regex {
    static ISO_DURATION_REGEX: OnceLock<Regex> = OnceLock::new();
    ISO_DURATION_REGEX.get_or_init(|| {
        Regex::new(r"^P(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+(?:\.\d+)?)S)?)?$")
            .expect("Failed to compile ISO 8601 duration regex")
    })
}

/// Parse an ISO 8601 duration such as `PT1H2M3S` or `PT63M21S` into seconds
pub fn parse_iso8601_duration(value: &str) -> Option<f64> {
    let value = value.trim();
    if value == "P" || value == "PT" {
        return None;
    }

    let captures = iso_duration_regex().captures(value)?;
    let component = |index: usize| -> f64 {
        captures
            .get(index)
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .unwrap_or(0.0)
    };

    Some(component(1) * 86400.0 + component(2) * 3600.0 + component(3) * 60.0 + component(4))
}

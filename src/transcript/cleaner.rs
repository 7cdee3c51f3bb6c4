/// Body text cleanup for scraped transcript lines
use regex::Regex;

/// Strips embedded display timestamps and normalizes whitespace
#[derive(Debug, Clone)]
pub struct TextCleaner {
    hms_pattern: Regex,
    ms_pattern: Regex,
}

impl TextCleaner {
    pub fn new() -> Self {
        Self {
            hms_pattern: Regex::new(r"\b\d{1,2}:\d{2}:\d{2}\b").expect("valid H:MM:SS pattern"),
            ms_pattern: Regex::new(r"\b\d{1,2}:\d{2}\b").expect("valid M:SS pattern"),
        }
    }

    /// Clean a line of transcript text.
    ///
    /// The three-part pattern is removed before the two-part one so that
    /// `1:02:03` is not half-stripped into `1:` or `:03`. Returns `None`
    /// when nothing is left.
    pub fn clean(&self, text: &str) -> Option<String> {
        let without_hms = self.hms_pattern.replace(text, "");
        let without_ms = self.ms_pattern.replace(&without_hms, "");

        let collapsed = without_ms.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            None
        } else {
            Some(collapsed)
        }
    }
}

impl Default for TextCleaner {
    fn default() -> Self {
        Self::new()
    }
}

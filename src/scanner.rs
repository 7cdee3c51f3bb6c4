/// Watch page scanner: finds transcript candidates in saved YouTube HTML
use crate::config::TranscriptConfig;
use crate::error::{NotesError, Result};
use crate::timecode::parse_iso8601_duration;
use crate::transcript::RawCandidate;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};
use url::Url;

const START_ATTR: &str = "data-segment-start-time";
const UNKNOWN_TITLE: &str = "Unknown Video";

/// Which lookup found the candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStrategy {
    /// Segment renderers, start time attributes and segment text nodes
    SegmentRenderers,
    /// Start time attributes and segment text/content nodes
    SegmentAttributes,
    /// Segment nodes inside an open transcript panel
    TranscriptPanel,
    /// Any leaf element whose text contains a timestamp
    Heuristic,
}

/// Everything the scanner learned about a page
#[derive(Debug, Clone)]
pub struct PageScan {
    pub video_id: Option<String>,
    pub video_title: String,
    pub duration: Option<f64>,
    pub strategy: Option<ScanStrategy>,
    pub candidates: Vec<RawCandidate>,
}

/// HTML scanner with pre-compiled selectors
pub struct PageScanner {
    min_text_len: usize,
    max_text_len: usize,
    renderers: Selector,
    attributes: Selector,
    panel: Selector,
    panel_segments: Selector,
    any_element: Selector,
    start_attr: Selector,
    timestamp_node: Selector,
    text_node: Selector,
    title: Selector,
    title_meta: Selector,
    duration_meta: Selector,
    canonical_link: Selector,
    video_id_meta: Selector,
    timestamp_pattern: Regex,
}

fn selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| NotesError::Selector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

impl PageScanner {
    pub fn new(config: &TranscriptConfig) -> Result<Self> {
        Ok(Self {
            min_text_len: config.heuristic_min_text_len,
            max_text_len: config.heuristic_max_text_len,
            renderers: selector(
                ".ytd-transcript-segment-renderer, [data-segment-start-time], .ytd-transcript-segment-text",
            )?,
            attributes: selector(
                "[data-segment-start-time], .ytd-transcript-segment-text, .ytd-transcript-segment-content",
            )?,
            panel: selector("ytd-transcript-renderer, .ytd-transcript-renderer")?,
            panel_segments: selector(
                "ytd-transcript-segment-renderer, [data-segment-start-time], .ytd-transcript-segment-text, .ytd-transcript-segment-content",
            )?,
            any_element: selector("body *")?,
            start_attr: selector("[data-segment-start-time]")?,
            timestamp_node: selector(".ytd-transcript-segment-timestamp, .segment-timestamp")?,
            text_node: selector(
                ".ytd-transcript-segment-text, .ytd-transcript-segment-content, .segment-text",
            )?,
            title: selector("h1.ytd-video-primary-info-renderer")?,
            title_meta: selector("meta[name='title']")?,
            duration_meta: selector("meta[itemprop='duration']")?,
            canonical_link: selector("link[rel='canonical']")?,
            video_id_meta: selector("meta[itemprop='videoId']")?,
            timestamp_pattern: Regex::new(r"\b\d{1,2}:\d{2}(?::\d{2})?\b")
                .expect("valid timestamp pattern"),
        })
    }

    /// Scan a page. `page_url`, when given, takes priority for the video id.
    pub fn scan(&self, html: &str, page_url: Option<&str>) -> PageScan {
        let document = Html::parse_document(html);

        let video_id = page_url
            .and_then(video_id_from_url)
            .or_else(|| self.video_id_from_document(&document));
        let video_title = self.video_title(&document);
        let duration = self.duration_hint(&document);

        let (strategy, candidates) = match self.find_segment_elements(&document) {
            Some((strategy, elements)) => {
                info!("🔍 Found {} potential transcript items via {:?}", elements.len(), strategy);
                let candidates = elements.into_iter().map(|el| self.candidate_from(el)).collect();
                (Some(strategy), candidates)
            }
            None => {
                warn!("No transcript segments found on page");
                (None, Vec::new())
            }
        };

        PageScan {
            video_id,
            video_title,
            duration,
            strategy,
            candidates,
        }
    }

    /// Try each lookup in order; the first one yielding elements wins
    fn find_segment_elements<'a>(&self, document: &'a Html) -> Option<(ScanStrategy, Vec<ElementRef<'a>>)> {
        let renderers: Vec<_> = document.select(&self.renderers).collect();
        if !renderers.is_empty() {
            return Some((ScanStrategy::SegmentRenderers, renderers));
        }

        let attributes: Vec<_> = document.select(&self.attributes).collect();
        if !attributes.is_empty() {
            return Some((ScanStrategy::SegmentAttributes, attributes));
        }

        if let Some(panel) = document.select(&self.panel).next() {
            debug!("Found transcript panel, looking for segments");
            let in_panel: Vec<_> = panel.select(&self.panel_segments).collect();
            if !in_panel.is_empty() {
                return Some((ScanStrategy::TranscriptPanel, in_panel));
            }
        }

        let heuristic: Vec<_> = document
            .select(&self.any_element)
            .filter(|el| self.looks_like_transcript_line(el))
            .collect();
        if !heuristic.is_empty() {
            return Some((ScanStrategy::Heuristic, heuristic));
        }

        None
    }

    fn looks_like_transcript_line(&self, element: &ElementRef) -> bool {
        if matches!(element.value().name(), "script" | "style" | "noscript") {
            return false;
        }
        if element.children().any(|child| child.value().is_element()) {
            return false;
        }

        let text: String = element.text().collect();
        let length = text.chars().count();
        length > self.min_text_len && length < self.max_text_len && self.timestamp_pattern.is_match(&text)
    }

    fn candidate_from(&self, element: ElementRef) -> RawCandidate {
        let first_text = |selector: &Selector| -> Option<String> {
            element
                .select(selector)
                .next()
                .map(|node| node.text().collect::<String>())
                .filter(|text| !text.is_empty())
        };

        RawCandidate {
            start_attr: element.value().attr(START_ATTR).map(str::to_string),
            descendant_start_attr: element
                .select(&self.start_attr)
                .next()
                .and_then(|node| node.value().attr(START_ATTR))
                .map(str::to_string),
            display_timestamp: first_text(&self.timestamp_node),
            body_text: first_text(&self.text_node),
            raw_text: element.text().collect(),
        }
    }

    fn video_title(&self, document: &Html) -> String {
        document
            .select(&self.title)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .or_else(|| {
                document
                    .select(&self.title_meta)
                    .next()
                    .and_then(|el| el.value().attr("content"))
                    .map(|content| content.trim().to_string())
            })
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string())
    }

    fn duration_hint(&self, document: &Html) -> Option<f64> {
        let content = document
            .select(&self.duration_meta)
            .next()?
            .value()
            .attr("content")?;
        let duration = parse_iso8601_duration(content);
        if duration.is_none() {
            debug!("Ignoring unparseable duration meta: {}", content);
        }
        duration
    }

    fn video_id_from_document(&self, document: &Html) -> Option<String> {
        document
            .select(&self.canonical_link)
            .next()
            .and_then(|el| el.value().attr("href"))
            .and_then(video_id_from_url)
            .or_else(|| {
                document
                    .select(&self.video_id_meta)
                    .next()
                    .and_then(|el| el.value().attr("content"))
                    .map(str::to_string)
            })
    }
}

/// Extract the `v` query parameter from a watch page URL
pub fn video_id_from_url(page_url: &str) -> Option<String> {
    let parsed = Url::parse(page_url).ok()?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == "v")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanner() -> PageScanner {
        PageScanner::new(&TranscriptConfig::default()).unwrap()
    }

    #[test]
    fn test_video_id_from_url() {
        assert_eq!(
            video_id_from_url("https://www.youtube.com/watch?v=abc123&t=42s"),
            Some("abc123".to_string())
        );
        assert_eq!(video_id_from_url("https://www.youtube.com/feed"), None);
        assert_eq!(video_id_from_url("not a url"), None);
    }

    #[test]
    fn test_scan_segment_renderers() {
        let html = r#"<html><head>
            <link rel="canonical" href="https://www.youtube.com/watch?v=vid42">
            <meta itemprop="duration" content="PT1H5M0S">
            </head><body>
            <h1 class="ytd-video-primary-info-renderer"> My Video </h1>
            <div class="ytd-transcript-segment-renderer" data-segment-start-time="3.5">
              <div class="ytd-transcript-segment-timestamp">0:03</div>
              <div class="segment-body">Hello there</div>
            </div>
            </body></html>"#;

        let scan = scanner().scan(html, None);
        assert_eq!(scan.video_id.as_deref(), Some("vid42"));
        assert_eq!(scan.video_title, "My Video");
        assert_eq!(scan.duration, Some(3900.0));
        assert_eq!(scan.strategy, Some(ScanStrategy::SegmentRenderers));
        assert_eq!(scan.candidates.len(), 1);

        let candidate = &scan.candidates[0];
        assert_eq!(candidate.start_attr.as_deref(), Some("3.5"));
        assert_eq!(candidate.display_timestamp.as_deref(), Some("0:03"));
        assert!(candidate.raw_text.contains("Hello there"));
    }

    #[test]
    fn test_scan_panel_content_nodes() {
        let html = r#"<html><body>
            <ytd-transcript-renderer>
              <div class="ytd-transcript-segment-content">0:10 first line</div>
              <div class="ytd-transcript-segment-content">0:20 second line</div>
            </ytd-transcript-renderer>
            </body></html>"#;

        let scan = scanner().scan(html, Some("https://www.youtube.com/watch?v=xyz"));
        assert_eq!(scan.video_id.as_deref(), Some("xyz"));
        assert_eq!(scan.video_title, UNKNOWN_TITLE);
        // Content nodes already match the attribute lookup before the panel one
        assert_eq!(scan.strategy, Some(ScanStrategy::SegmentAttributes));
        assert_eq!(scan.candidates.len(), 2);
    }

    #[test]
    fn test_scan_panel_segment_elements() {
        let html = r#"<html><body>
            <ytd-transcript-renderer>
              <ytd-transcript-segment-renderer>
                <div class="segment-timestamp">1:02</div>
                <yt-formatted-string class="segment-text">panel line</yt-formatted-string>
              </ytd-transcript-segment-renderer>
            </ytd-transcript-renderer>
            </body></html>"#;

        let scan = scanner().scan(html, None);
        assert_eq!(scan.strategy, Some(ScanStrategy::TranscriptPanel));
        assert_eq!(scan.candidates.len(), 1);
        assert_eq!(scan.candidates[0].display_timestamp.as_deref(), Some("1:02"));
        assert_eq!(scan.candidates[0].body_text.as_deref(), Some("panel line"));
    }

    #[test]
    fn test_heuristic_scan() {
        let html = r#"<html><body>
            <div><span>1:05 we start with the basics</span></div>
            <p>3:00</p>
            <script>var t = "1:00 not a transcript line";</script>
            </body></html>"#;

        let scan = scanner().scan(html, None);
        assert_eq!(scan.strategy, Some(ScanStrategy::Heuristic));
        assert_eq!(scan.candidates.len(), 1);
        assert_eq!(scan.candidates[0].raw_text, "1:05 we start with the basics");
    }

    #[test]
    fn test_nothing_found() {
        let scan = scanner().scan("<html><body><p>hello</p></body></html>", None);
        assert!(scan.strategy.is_none());
        assert!(scan.candidates.is_empty());
        assert!(scan.duration.is_none());
    }
}

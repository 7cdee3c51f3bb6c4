use criterion::{black_box, criterion_group, criterion_main, Criterion};
use yt_notes_rust::config::TranscriptConfig;
use yt_notes_rust::{parse_transcript, PageScanner, RawCandidate, SegmentResolver};

fn sample_candidates(count: u64) -> Vec<RawCandidate> {
    (0..count)
        .map(|i| {
            let seconds = i * 7;
            RawCandidate::from_text(format!("{}:{:02} line number {}", seconds / 60, seconds % 60, i % 50))
                .with_display_timestamp(format!("{}:{:02}", seconds / 60, seconds % 60))
        })
        .collect()
}

fn sample_page(count: u64) -> String {
    let mut html = String::from("<html><body>");
    for i in 0..count {
        html.push_str(&format!(
            r#"<div class="ytd-transcript-segment-renderer" data-segment-start-time="{}"><div class="segment-timestamp">{}:{:02}</div><div class="segment-text">segment {}</div></div>"#,
            i * 5,
            (i * 5) / 60,
            (i * 5) % 60,
            i
        ));
    }
    html.push_str("</body></html>");
    html
}

fn bench_resolver(c: &mut Criterion) {
    let config = TranscriptConfig::default();
    let resolver = SegmentResolver::new(&config).with_duration(Some(7200.0));

    let small = sample_candidates(100);
    c.bench_function("resolve_100_candidates", |b| {
        b.iter(|| black_box(resolver.resolve(small.clone())))
    });

    let large = sample_candidates(2000);
    c.bench_function("resolve_2000_candidates", |b| {
        b.iter(|| black_box(resolver.resolve(large.clone())))
    });
}

fn bench_scanner(c: &mut Criterion) {
    let config = TranscriptConfig::default();
    let scanner = PageScanner::new(&config).unwrap();
    let page = sample_page(500);

    c.bench_function("scan_500_segment_page", |b| {
        b.iter(|| black_box(scanner.scan(&page, None)))
    });
}

fn bench_formats(c: &mut Criterion) {
    let mut srt = String::new();
    for i in 0..1000u64 {
        srt.push_str(&format!(
            "{}\n00:{:02}:{:02},000 --> 00:{:02}:{:02},500\nline {}\n\n",
            i + 1,
            (i * 3 / 60) % 60,
            i * 3 % 60,
            (i * 3 / 60) % 60,
            i * 3 % 60,
            i
        ));
    }

    c.bench_function("parse_srt_1000_blocks", |b| {
        b.iter(|| black_box(parse_transcript(&srt, "bench.srt")))
    });
}

criterion_group!(benches, bench_resolver, bench_scanner, bench_formats);
criterion_main!(benches);

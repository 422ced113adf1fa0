use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use vidnest::pipeline::{derive_page, filter_and_sort, FilterCriteria, Resolution, SortSpec};
use vidnest::push::{PushMessage, SseDecoder};
use vidnest::types::FileEntry;

fn create_library(count: usize) -> Vec<FileEntry> {
    (0..count)
        .map(|i| FileEntry {
            filename: format!("/videos/folder_{}/clip_{:05}.mp4", i % 12, i),
            title: if i % 3 == 0 { Some(format!("Holiday clip {}", i)) } else { None },
            folder: if i % 5 == 0 { String::new() } else { format!("folder_{}", i % 12) },
            filesize: Some((i as u64 + 1) * 1024 * 1024),
            width: Some(if i % 4 == 0 { 3840 } else { 1280 }),
            height: Some(if i % 4 == 0 { 2160 } else { 720 }),
            duration: Some((i % 90) as f64 * 60.0),
            created: Some(1_600_000_000.0 + i as f64),
            favorite: i % 7 == 0,
            ..FileEntry::default()
        })
        .collect()
}

fn benchmark_derive_page(c: &mut Criterion) {
    let mut group = c.benchmark_group("derive_page");

    for count in [100, 1_000, 10_000].iter() {
        let files = create_library(*count);
        let criteria = FilterCriteria::default();
        let sort = SortSpec::default();
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, _| {
            b.iter(|| black_box(derive_page(&files, &criteria, &sort, 2, 12).items.len()))
        });
    }
    group.finish();
}

fn benchmark_filters(c: &mut Criterion) {
    let files = create_library(5_000);
    let mut group = c.benchmark_group("filter_and_sort");

    group.bench_function("no_filter", |b| {
        let criteria = FilterCriteria::default();
        let sort = SortSpec::default();
        b.iter(|| black_box(filter_and_sort(&files, &criteria, &sort).len()))
    });

    group.bench_function("text_and_resolution", |b| {
        let criteria = FilterCriteria {
            text: "holiday".to_string(),
            resolution: Resolution::Uhd4k,
            ..FilterCriteria::default()
        };
        let sort = SortSpec::default();
        b.iter(|| black_box(filter_and_sort(&files, &criteria, &sort).len()))
    });

    group.bench_function("multi_criteria_sort", |b| {
        let criteria = FilterCriteria { min_duration_minutes: 10, ..FilterCriteria::default() };
        let sort = SortSpec::parse("folder favorite created", "asc");
        b.iter(|| black_box(filter_and_sort(&files, &criteria, &sort).len()))
    });

    group.finish();
}

fn benchmark_push_stream(c: &mut Criterion) {
    let mut payload = String::new();
    for i in 0..500 {
        payload.push_str(&format!("data: Downloading...[{}] {}.5% complete\n\n", i % 20, i % 100));
        if i % 50 == 0 {
            payload.push_str("data: Heartbeat\n\n");
        }
    }
    let bytes = payload.into_bytes();

    c.bench_function("sse_decode_and_parse", |b| {
        b.iter(|| {
            let mut decoder = SseDecoder::new();
            let mut progress = 0usize;
            for chunk in bytes.chunks(256) {
                for text in decoder.feed(chunk) {
                    if matches!(PushMessage::parse(&text), PushMessage::Status(_)) {
                        progress += 1;
                    }
                }
            }
            black_box(progress)
        })
    });
}

criterion_group!(benches, benchmark_derive_page, benchmark_filters, benchmark_push_stream);
criterion_main!(benches);

//! Criterion benchmarks for sink_logger

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sink_logger::core::{CallSite, RecordBuilder};
use sink_logger::dump::dump;
use sink_logger::formatters::FormatOptions;
use sink_logger::prelude::*;
use sink_logger::sinks::Sink;
use sink_logger::{fields, interpolate};

/// Sink that discards every record
struct NullSink;

impl Sink for NullSink {
    fn write(&self, record: &LogRecord) -> Result<()> {
        black_box(record.message.len());
        Ok(())
    }

    fn name(&self) -> &str {
        "null"
    }
}

fn sample_record() -> LogRecord {
    let timestamp = TimestampFormat::default();
    RecordBuilder::new(FieldFlags::ALL, &timestamp).build(
        LogLevel::Warning,
        "disk :disk at :pct%",
        fields!(disk = "/dev/sda1", pct = 91, host = "db-01"),
        CallSite::new("src/storage.rs", 42, Some("app::storage::check")),
    )
}

// ============================================================================
// Record Building Benchmarks
// ============================================================================

fn bench_record_building(c: &mut Criterion) {
    let mut group = c.benchmark_group("record_building");
    group.throughput(Throughput::Elements(1));
    let timestamp = TimestampFormat::default();

    for (name, flags) in [("no_flags", FieldFlags::empty()), ("all_flags", FieldFlags::ALL)] {
        let builder = RecordBuilder::new(flags, &timestamp);
        group.bench_function(name, |b| {
            b.iter(|| {
                let record = builder.build(
                    LogLevel::Info,
                    black_box("user :user signed in"),
                    fields!(user = "ana"),
                    CallSite::new("src/main.rs", 10, None),
                );
                black_box(record)
            });
        });
    }

    group.finish();
}

fn bench_interpolation(c: &mut Criterion) {
    let mut group = c.benchmark_group("interpolation");
    let ctx = fields!(user = "ana", id = 42, identifier = "abc", path = "/users");

    group.bench_function("no_placeholders", |b| {
        b.iter(|| interpolate(black_box("plain message without markers"), &ctx));
    });

    group.bench_function("mixed_placeholders", |b| {
        b.iter(|| interpolate(black_box("{user} :id :identifier {path} :missing"), &ctx));
    });

    group.finish();
}

// ============================================================================
// Encoding Benchmarks
// ============================================================================

fn bench_formatters(c: &mut Criterion) {
    let mut group = c.benchmark_group("formatters");
    group.throughput(Throughput::Elements(1));
    let record = sample_record();
    let options = FormatOptions::new(FieldFlags::ALL);

    for format in [
        LogFormat::Ndjson,
        LogFormat::Csv,
        LogFormat::Plain,
        LogFormat::Xml,
        LogFormat::Yaml,
        LogFormat::Ltsv,
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(format), &format, |b, format| {
            b.iter(|| black_box(format.format(&record, &options)));
        });
    }

    group.finish();
}

fn bench_dump(c: &mut Criterion) {
    let mut group = c.benchmark_group("dump");
    let record = sample_record();
    let nested: Vec<Vec<u32>> = (0..16).map(|i| (0..16).map(|j| i * j).collect()).collect();

    group.bench_function("record", |b| b.iter(|| black_box(dump(&record))));
    group.bench_function("nested_vec", |b| b.iter(|| black_box(dump(&nested))));

    group.finish();
}

// ============================================================================
// Logging Performance Benchmarks
// ============================================================================

fn bench_sync_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("sync_logging");
    group.throughput(Throughput::Elements(1));

    let logger = Logger::builder()
        .outputs(OutputMask::REMOTE)
        .remote(NullSink)
        .build();

    group.bench_function("info_no_context", |b| {
        b.iter(|| logger.info(black_box("Info message"), Fields::new()));
    });

    group.bench_function("info_with_context", |b| {
        b.iter(|| logger.info(black_box("user :user"), fields!(user = "ana", attempt = 3)));
    });

    group.finish();
}

fn bench_async_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("async_logging");
    group.throughput(Throughput::Elements(1));

    for workers in [1usize, 4] {
        let logger = Logger::builder()
            .outputs(OutputMask::REMOTE)
            .remote(NullSink)
            .async_mode(100_000)
            .workers(workers)
            .overflow_policy(OverflowPolicy::Block)
            .build();

        group.bench_with_input(BenchmarkId::new("info", workers), &logger, |b, logger| {
            b.iter(|| logger.info(black_box("Async message"), Fields::new()));
        });
    }

    group.finish();
}

fn bench_level_filtering(c: &mut Criterion) {
    let mut group = c.benchmark_group("level_filtering");

    let logger = Logger::builder()
        .level(LogLevel::Error)
        .outputs(OutputMask::REMOTE)
        .remote(NullSink)
        .build();

    group.bench_function("filtered_debug", |b| {
        b.iter(|| logger.debug(black_box("Filtered out"), Fields::new()));
    });

    group.bench_function("filtered_macro", |b| {
        b.iter(|| sink_logger::debug!(logger, "Filtered :n", n = black_box(1)));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_record_building,
    bench_interpolation,
    bench_formatters,
    bench_dump,
    bench_sync_logging,
    bench_async_logging,
    bench_level_filtering,
);

criterion_main!(benches);

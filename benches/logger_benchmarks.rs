//! Criterion benchmarks for fieldlog

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fieldlog::prelude::*;
use fieldlog::info;
use std::io;
use std::sync::Arc;
use std::thread;

fn sink_logger(level: LogLevel) -> Logger {
    Logger::builder()
        .level(level)
        .output(io::sink())
        .formatter(TextFormatter::new())
        .build()
}

// ============================================================================
// Logger Creation Benchmarks
// ============================================================================

fn bench_logger_creation(c: &mut Criterion) {
    let mut group = c.benchmark_group("logger_creation");
    group.throughput(Throughput::Elements(1));

    group.bench_function("new", |b| {
        b.iter(|| {
            let logger = Logger::new();
            black_box(logger)
        });
    });

    group.bench_function("builder", |b| {
        b.iter(|| {
            let logger = Logger::builder()
                .level(LogLevel::Debug)
                .output(io::sink())
                .formatter(TextFormatter::new().with_disable_timestamp(true))
                .build();
            black_box(logger)
        });
    });

    group.finish();
}

// ============================================================================
// Logging Performance Benchmarks
// ============================================================================

fn bench_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("logging");
    group.throughput(Throughput::Elements(1));

    let logger = sink_logger(LogLevel::Trace);

    group.bench_function("info", |b| {
        b.iter(|| {
            logger.info(black_box("Info message"));
        });
    });

    group.bench_function("info_macro", |b| {
        let port = 8080;
        b.iter(|| {
            info!(logger, "listening on :", black_box(port));
        });
    });

    group.bench_function("quoted_message", |b| {
        b.iter(|| {
            logger.info(black_box("message with spaces needs quoting"));
        });
    });

    group.bench_function("no_lock", |b| {
        let unlocked = sink_logger(LogLevel::Trace);
        unlocked.set_no_lock();
        b.iter(|| {
            unlocked.info(black_box("Info message"));
        });
    });

    group.finish();
}

fn bench_fields(c: &mut Criterion) {
    let mut group = c.benchmark_group("fields");
    group.throughput(Throughput::Elements(1));

    let logger = sink_logger(LogLevel::Info);

    for count in [1usize, 5, 20] {
        let fields: Vec<(String, i64)> = (0..count)
            .map(|i| (format!("key{}", i), i as i64))
            .collect();

        group.bench_with_input(BenchmarkId::new("with_fields", count), &fields, |b, fields| {
            b.iter(|| {
                logger
                    .with_fields(fields.iter().map(|(k, v)| (k.as_str(), *v)))
                    .info(black_box("request handled"));
            });
        });
    }

    let base = logger.with_field("service", "api").with_field("region", "eu-west-1");
    group.bench_function("derived_entry", |b| {
        b.iter(|| {
            base.with_field("request_id", black_box(42)).info("request handled");
        });
    });

    group.finish();
}

// ============================================================================
// Level Filtering Benchmarks
// ============================================================================

fn bench_level_filtering(c: &mut Criterion) {
    let mut group = c.benchmark_group("level_filtering");
    group.throughput(Throughput::Elements(1));

    let logger = sink_logger(LogLevel::Warn);

    group.bench_function("filtered_message", |b| {
        b.iter(|| {
            logger.debug(black_box("filtered"));
        });
    });

    group.bench_function("filtered_macro", |b| {
        let value = 3.5;
        b.iter(|| {
            info!(logger, "never rendered ", black_box(value));
        });
    });

    group.bench_function("filtered_lazy", |b| {
        b.iter(|| {
            logger.log_fn(LogLevel::Trace, || format!("expensive {}", black_box(1)));
        });
    });

    group.finish();
}

// ============================================================================
// Formatting Benchmarks
// ============================================================================

fn bench_formatting(c: &mut Criterion) {
    let mut group = c.benchmark_group("formatting");
    group.throughput(Throughput::Elements(1));

    let logger = sink_logger(LogLevel::Info);
    let entry = logger
        .with_field("user", "alice")
        .with_field("latency_ms", 12.5)
        .with_field("path", "/api/v1/items")
        .with_field("note", "needs quoting here");

    let formatters = [
        ("default", TextFormatter::new()),
        ("no_sorting", TextFormatter::new().with_disable_sorting(true)),
        ("padded", TextFormatter::new().with_pad_level_text(true)),
        ("force_quote", TextFormatter::new().with_force_quote(true)),
    ];

    for (name, formatter) in formatters {
        group.bench_function(name, |b| {
            let mut buf = Vec::with_capacity(256);
            b.iter(|| {
                buf.clear();
                formatter.format(black_box(&entry), &mut buf).unwrap();
                black_box(buf.len())
            });
        });
    }

    group.finish();
}

// ============================================================================
// Concurrent Logging Benchmarks
// ============================================================================

fn bench_concurrent_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_logging");

    for threads in [2usize, 4] {
        let per_thread = 100;
        group.throughput(Throughput::Elements((threads * per_thread) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(threads), &threads, |b, &threads| {
            let logger = Arc::new(sink_logger(LogLevel::Info));
            b.iter(|| {
                let handles: Vec<_> = (0..threads)
                    .map(|t| {
                        let logger = Arc::clone(&logger);
                        thread::spawn(move || {
                            for i in 0..per_thread {
                                logger.with_field("thread", t).with_field("seq", i).info("bench");
                            }
                        })
                    })
                    .collect();
                for handle in handles {
                    handle.join().unwrap();
                }
            });
        });
    }

    group.finish();
}

// ============================================================================
// Criterion Configuration
// ============================================================================

criterion_group!(
    benches,
    bench_logger_creation,
    bench_logging,
    bench_fields,
    bench_level_filtering,
    bench_formatting,
    bench_concurrent_logging
);

criterion_main!(benches);

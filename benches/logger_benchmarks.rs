//! Criterion benchmarks for rust_leveled_logger

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use rust_leveled_logger::prelude::*;
use rust_leveled_logger::{format_message, RecordPool};
use std::io::{self, Write};
use std::sync::Arc;
use std::thread;

struct Discard;

impl Write for Discard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn discard_logger() -> Logger {
    Logger::builder()
        .console_writer(Discard)
        .console_colors(false)
        .build()
        .expect("Failed to build logger")
}

// ============================================================================
// Formatter Benchmarks
// ============================================================================

fn bench_formatter(c: &mut Criterion) {
    let mut group = c.benchmark_group("formatter");
    group.throughput(Throughput::Elements(1));

    group.bench_function("verbatim", |b| {
        b.iter(|| format_message(black_box("plain message"), &[]));
    });

    let args: Vec<Value> = vec!["user".into(), 42.into(), 1.5.into()];
    group.bench_function("printf", |b| {
        b.iter(|| format_message(black_box("%s #%d took %.2f ms"), black_box(&args)));
    });

    group.bench_function("concat", |b| {
        b.iter(|| format_message("", black_box(&args)));
    });

    group.finish();
}

// ============================================================================
// Logging Performance Benchmarks
// ============================================================================

fn bench_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("logging");
    group.throughput(Throughput::Elements(1));

    let logger = discard_logger();

    group.bench_function("info", |b| {
        b.iter(|| logger.info(black_box("Info message")));
    });

    group.bench_function("infof", |b| {
        b.iter(|| logger.infof(black_box("request %d done"), &[black_box(7).into()]));
    });

    group.finish();
    logger.close();
}

fn bench_level_filtering(c: &mut Criterion) {
    let mut group = c.benchmark_group("level_filtering");
    group.throughput(Throughput::Elements(1));

    let logger = Logger::builder()
        .console_writer(Discard)
        .levels(LevelSet::at_least(LogLevel::Error))
        .build()
        .expect("Failed to build logger");

    group.bench_function("filtered_debug", |b| {
        b.iter(|| logger.debug(black_box("never formatted")));
    });

    group.finish();
    logger.close();
}

fn bench_file_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("file_logging");
    group.throughput(Throughput::Elements(1));

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let logger = Logger::builder()
        .log_dir(temp_dir.path())
        .routing(RoutingPolicy::Both)
        .build()
        .expect("Failed to build logger");

    group.bench_function("both_routing", |b| {
        b.iter(|| logger.warn(black_box("Warning message")));
    });

    group.finish();
    logger.close();
}

// ============================================================================
// Concurrency Benchmarks
// ============================================================================

fn bench_concurrent_logging(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_logging");
    let threads = 4;
    let per_thread = 250;
    group.throughput(Throughput::Elements((threads * per_thread) as u64));

    let logger = Arc::new(discard_logger());

    group.bench_function("4_threads", |b| {
        b.iter(|| {
            let handles: Vec<_> = (0..threads)
                .map(|_| {
                    let logger = Arc::clone(&logger);
                    thread::spawn(move || {
                        for i in 0..per_thread {
                            logger.infof("item %d", &[i.into()]);
                        }
                    })
                })
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }
        });
    });

    group.finish();
    logger.close();
}

fn bench_record_pool(c: &mut Criterion) {
    let mut group = c.benchmark_group("record_pool");
    group.throughput(Throughput::Elements(1));

    let pool = RecordPool::default();
    group.bench_function("acquire_release", |b| {
        b.iter(|| {
            let record = pool.acquire(black_box(LogLevel::Info));
            pool.release(record);
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_formatter,
    bench_logging,
    bench_level_filtering,
    bench_file_logging,
    bench_concurrent_logging,
    bench_record_pool,
);
criterion_main!(benches);

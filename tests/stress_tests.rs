//! Stress tests for concurrency and backpressure
//!
//! These tests verify:
//! - No record is lost or duplicated with many concurrent producers
//! - A full sink queue blocks the producer until the consumer drains
//! - A slow sink pushes backpressure all the way to the callers
//! - Concurrent closers all wait for the single drain to finish

use crossbeam_channel::{bounded, Receiver, Sender};
use rust_leveled_logger::prelude::*;
use rust_leveled_logger::sinks::rotating_file::PENDING_FILE_NAME;
use rust_leveled_logger::{ConsoleSink, Line, Sink};
use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// Writer that blocks on every write until the gate is opened (its sender dropped).
struct GatedWriter {
    entered: Sender<()>,
    gate: Receiver<()>,
    out: Arc<Mutex<Vec<u8>>>,
}

impl Write for GatedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let _ = self.entered.try_send(());
        let _ = self.gate.recv();
        self.out.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Writer that takes a fixed time per write.
#[derive(Clone)]
struct SlowWriter {
    delay: Duration,
    out: Arc<Mutex<Vec<u8>>>,
}

impl Write for SlowWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        thread::sleep(self.delay);
        self.out.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_concurrent_producers_no_loss() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let logger = Arc::new(
        Logger::builder()
            .log_dir(temp_dir.path())
            .routing(RoutingPolicy::Both)
            .build()
            .expect("Failed to build logger"),
    );

    let threads = 8;
    let per_thread = 500;
    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..per_thread {
                    logger.infof("t%d-%d", &[t.into(), i.into()]);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    logger.close();

    for path in [
        temp_dir.path().join(PENDING_FILE_NAME),
        temp_dir.path().join("infos").join(PENDING_FILE_NAME),
    ] {
        let content = fs::read_to_string(&path).unwrap();
        let records: Vec<&str> = content
            .lines()
            .map(|line| line.rsplit(' ').next().unwrap())
            .collect();
        assert_eq!(records.len(), threads * per_thread);
        let unique: HashSet<&str> = records.iter().copied().collect();
        assert_eq!(unique.len(), threads * per_thread, "duplicates in {:?}", path);

        // per-producer order is preserved
        for t in 0..threads {
            let prefix = format!("t{}-", t);
            let seq: Vec<usize> = records
                .iter()
                .filter_map(|r| r.strip_prefix(&prefix))
                .map(|n| n.parse().unwrap())
                .collect();
            assert_eq!(seq, (0..per_thread).collect::<Vec<_>>());
        }
    }
    assert_eq!(logger.metrics().accepted(), (threads * per_thread) as u64);
    assert_eq!(logger.metrics().routed(), (threads * per_thread) as u64);
}

#[test]
fn test_full_sink_queue_blocks_producer() {
    let (entered_tx, entered_rx) = bounded(1);
    let (gate_tx, gate_rx) = bounded::<()>(0);
    let out = Arc::new(Mutex::new(Vec::new()));

    let mut sink = ConsoleSink::with_writer(
        GatedWriter {
            entered: entered_tx,
            gate: gate_rx,
            out: Arc::clone(&out),
        },
        1,
    );
    sink.start().unwrap();

    // consumer picks up the first line and blocks inside the writer
    sink.write(LogLevel::Info, Line::from("one\n")).unwrap();
    entered_rx
        .recv_timeout(Duration::from_secs(5))
        .expect("consumer never reached the writer");

    // fills the single queue slot
    sink.write(LogLevel::Info, Line::from("two\n")).unwrap();

    let sink = Arc::new(sink);
    let returned = Arc::new(AtomicBool::new(false));
    let producer = {
        let sink = Arc::clone(&sink);
        let returned = Arc::clone(&returned);
        thread::spawn(move || {
            sink.write(LogLevel::Info, Line::from("three\n")).unwrap();
            returned.store(true, Ordering::SeqCst);
        })
    };

    thread::sleep(Duration::from_millis(200));
    assert!(
        !returned.load(Ordering::SeqCst),
        "write must block while the queue is full"
    );

    let released_at = Instant::now();
    drop(gate_tx);
    producer.join().unwrap();
    assert!(returned.load(Ordering::SeqCst));
    assert!(released_at.elapsed() < Duration::from_secs(5));

    let mut sink = Arc::try_unwrap(sink).ok().expect("producer finished");
    sink.stop();

    let output = String::from_utf8(out.lock().unwrap().clone()).unwrap();
    assert_eq!(output, "one\ntwo\nthree\n");
}

#[test]
fn test_slow_sink_applies_backpressure_without_loss() {
    let out = Arc::new(Mutex::new(Vec::new()));
    let logger = Arc::new(
        Logger::builder()
            .console_writer(SlowWriter {
                delay: Duration::from_micros(50),
                out: Arc::clone(&out),
            })
            .console_colors(false)
            .sink_queue_capacity(1)
            .buffer_capacity(1024)
            .build()
            .expect("Failed to build logger"),
    );

    let threads = 4;
    let per_thread = 2000;
    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..per_thread {
                    logger.debugf("%d/%d", &[t.into(), i.into()]);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    logger.close();

    let output = String::from_utf8(out.lock().unwrap().clone()).unwrap();
    assert_eq!(output.lines().count(), threads * per_thread);
    assert!(logger.metrics().backpressure_events() > 0);
    assert!(logger.metrics().pressure_drains() > 0);
}

#[test]
fn test_close_races_with_producers() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let logger = Arc::new(
        Logger::builder()
            .log_dir(temp_dir.path())
            .build()
            .expect("Failed to build logger"),
    );

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..5000 {
                    logger.warnf("%d:%d", &[t.into(), i.into()]);
                }
            })
        })
        .collect();

    thread::sleep(Duration::from_millis(5));
    logger.close();
    let accepted_at_close = logger.metrics().accepted();
    for handle in handles {
        handle.join().unwrap();
    }

    // records accepted before close are all on disk, nothing after
    let content = fs::read_to_string(temp_dir.path().join(PENDING_FILE_NAME)).unwrap();
    assert_eq!(content.lines().count() as u64, accepted_at_close);
    assert_eq!(logger.metrics().accepted(), accepted_at_close);
}

fn slow_console_logger(out: &Arc<Mutex<Vec<u8>>>) -> Logger {
    Logger::builder()
        .console_writer(SlowWriter {
            delay: Duration::from_millis(2),
            out: Arc::clone(out),
        })
        .console_colors(false)
        .exit_on_fatal(false)
        .build()
        .expect("Failed to build logger")
}

#[test]
fn test_concurrent_close_waits_for_drain() {
    let out = Arc::new(Mutex::new(Vec::new()));
    let logger = Arc::new(slow_console_logger(&out));

    for i in 0..200 {
        logger.infof("queued %d", &[i.into()]);
    }

    let first = {
        let logger = Arc::clone(&logger);
        thread::spawn(move || logger.close())
    };
    thread::sleep(Duration::from_millis(20));
    logger.close();

    // the second closer returns only once the first shutdown is done
    let lines = String::from_utf8(out.lock().unwrap().clone())
        .unwrap()
        .lines()
        .count();
    assert_eq!(lines, 200);
    first.join().unwrap();
}

#[test]
fn test_close_during_fatal_waits_for_drain() {
    let out = Arc::new(Mutex::new(Vec::new()));
    let logger = Arc::new(slow_console_logger(&out));

    for i in 0..200 {
        logger.infof("queued %d", &[i.into()]);
    }

    let fatal = {
        let logger = Arc::clone(&logger);
        thread::spawn(move || logger.fatal("shutting down"))
    };
    thread::sleep(Duration::from_millis(20));
    logger.close();

    let output = String::from_utf8(out.lock().unwrap().clone()).unwrap();
    assert_eq!(output.lines().count(), 201);
    assert!(output.lines().last().unwrap().contains("[F]"));
    fatal.join().unwrap();
}

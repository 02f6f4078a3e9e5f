//! Integration tests for the logging pipeline
//!
//! These tests verify:
//! - Routing policies and the on-disk directory layout
//! - Drain on close (exactly-once delivery)
//! - Level sets, Panic and Fatal post-actions
//! - Size rotation and retention through the public API
//! - Call-site capture and configuration loading

use rust_leveled_logger::prelude::*;
use rust_leveled_logger::sinks::rotating_file::{sweep_retention, PENDING_FILE_NAME};
use rust_leveled_logger::{CallSite, CallerLocator};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, Write};
use std::panic::Location;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

#[derive(Clone, Default)]
struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn read(path: impl AsRef<Path>) -> String {
    fs::read_to_string(path).unwrap_or_default()
}

fn rotated_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".log") && name != PENDING_FILE_NAME)
        .collect();
    names.sort();
    names
}

fn write_all_levels(logger: &Logger) {
    logger.debug("debug-record");
    logger.info("info-record");
    logger.warn("warn-record");
    logger.error("error-record");
}

#[test]
fn test_merged_routing_single_stream() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let logger = Logger::builder()
        .log_dir(temp_dir.path())
        .routing(RoutingPolicy::Merged)
        .build()
        .expect("Failed to build logger");

    write_all_levels(&logger);
    logger.close();

    let merged = read(temp_dir.path().join(PENDING_FILE_NAME));
    assert_eq!(merged.lines().count(), 4);
    for name in ["debugs", "infos", "warns", "errors"] {
        assert!(!temp_dir.path().join(name).exists(), "{} should not exist", name);
    }
}

#[test]
fn test_separated_routing_per_level_streams() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let logger = Logger::builder()
        .log_dir(temp_dir.path())
        .routing(RoutingPolicy::Separated)
        .build()
        .expect("Failed to build logger");

    write_all_levels(&logger);
    logger.close();

    assert!(!temp_dir.path().join(PENDING_FILE_NAME).exists());
    for (dir, token) in [
        ("debugs", "debug-record"),
        ("infos", "info-record"),
        ("warns", "warn-record"),
        ("errors", "error-record"),
    ] {
        let content = read(temp_dir.path().join(dir).join(PENDING_FILE_NAME));
        assert_eq!(content.lines().count(), 1, "{} should hold one line", dir);
        assert!(content.contains(token));
    }
    // enabled levels get their directory even when unused
    assert!(temp_dir.path().join("panics").is_dir());
    assert!(temp_dir.path().join("fatals").is_dir());
}

#[test]
fn test_both_routing_writes_two_copies() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let logger = Logger::builder()
        .log_dir(temp_dir.path())
        .routing(RoutingPolicy::Both)
        .build()
        .expect("Failed to build logger");

    logger.warn("disk almost full");
    logger.close();

    let merged = read(temp_dir.path().join(PENDING_FILE_NAME));
    let warns = read(temp_dir.path().join("warns").join(PENDING_FILE_NAME));
    assert_eq!(merged, warns);
    assert!(merged.contains("disk almost full"));
    assert_eq!(logger.metrics().routed(), 1);
}

#[test]
fn test_separated_only_opens_enabled_levels() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let logger = Logger::builder()
        .log_dir(temp_dir.path())
        .routing(RoutingPolicy::Separated)
        .levels(LogLevel::Error | LogLevel::Warn)
        .build()
        .expect("Failed to build logger");
    logger.close();

    assert!(temp_dir.path().join("errors").is_dir());
    assert!(temp_dir.path().join("warns").is_dir());
    assert!(!temp_dir.path().join("infos").exists());
    assert!(!temp_dir.path().join("debugs").exists());
}

#[test]
fn test_close_drains_full_queue_exactly_once() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let capacity = 1024;
    let logger = Logger::builder()
        .log_dir(temp_dir.path())
        .buffer_capacity(capacity)
        .flush_interval(Duration::from_secs(5))
        .build()
        .expect("Failed to build logger");

    for i in 0..capacity {
        logger.infof("record-%d", &[i.into()]);
    }
    logger.close();

    let content = read(temp_dir.path().join(PENDING_FILE_NAME));
    let records: Vec<&str> = content
        .lines()
        .map(|line| line.rsplit(' ').next().unwrap())
        .collect();
    assert_eq!(records.len(), capacity);

    let unique: HashSet<&str> = records.iter().copied().collect();
    assert_eq!(unique.len(), capacity);
    for (i, record) in records.iter().enumerate() {
        assert_eq!(*record, format!("record-{}", i));
    }
}

#[test]
fn test_level_set_is_not_a_threshold() {
    let capture = Capture::default();
    let logger = Logger::builder()
        .console_writer(capture.clone())
        .console_colors(false)
        .levels(LogLevel::Error | LogLevel::Debug)
        .build()
        .expect("Failed to build logger");

    write_all_levels(&logger);
    logger.close();

    let output = capture.text();
    assert!(output.contains("debug-record"));
    assert!(output.contains("error-record"));
    assert!(!output.contains("info-record"));
    assert!(!output.contains("warn-record"));
}

#[test]
fn test_line_layout_on_console() {
    let capture = Capture::default();
    let logger = Logger::builder()
        .app_name("billing")
        .console_writer(capture.clone())
        .console_colors(false)
        .build()
        .expect("Failed to build logger");

    logger.info("charged");
    let line_no = line!() - 1;
    logger.close();

    let output = capture.text();
    let line = output.lines().next().expect("one line");
    assert!(line.starts_with("[billing] [I] ["));
    assert!(line.ends_with(&format!("integration_tests.rs:{}] charged", line_no)));

    // [YYYY/MM/DD HH:MM:SS.micro]
    let stamp = &line["[billing] [I] [".len()..][..26];
    assert_eq!(stamp.len(), 26);
    assert_eq!(&stamp[4..5], "/");
    assert_eq!(&stamp[19..20], ".");
}

#[test]
fn test_injected_caller_locator() {
    struct FixedSite;

    impl CallerLocator for FixedSite {
        fn locate(&self, _origin: &'static Location<'static>) -> Option<CallSite> {
            Some(CallSite {
                file: "main.rs",
                line: 7,
            })
        }
    }

    let capture = Capture::default();
    let logger = Logger::builder()
        .console_writer(capture.clone())
        .console_colors(false)
        .caller_locator(Arc::new(FixedSite))
        .build()
        .expect("Failed to build logger");

    logger.error("boom");
    logger.close();

    assert!(capture.text().ends_with("[main.rs:7] boom\n"));
}

#[test]
fn test_panic_records_secondary_trace() {
    let capture = Capture::default();
    let logger = Logger::builder()
        .console_writer(capture.clone())
        .console_colors(false)
        .build()
        .expect("Failed to build logger");

    logger.panicf("index %d out of range", &[9.into()]);
    logger.info("after panic");
    logger.close();

    let output = capture.text();
    let panic_lines = output.lines().filter(|l| l.starts_with("[P]")).count();
    assert_eq!(panic_lines, 2);
    assert!(output.contains("panic recovered: index 9 out of range"));
    assert!(output.contains("after panic"));
}

#[test]
fn test_fatal_closes_logger() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let logger = Logger::builder()
        .log_dir(temp_dir.path())
        .exit_on_fatal(false)
        .build()
        .expect("Failed to build logger");

    logger.info("before");
    logger.fatal("unrecoverable");
    logger.info("after");

    assert!(logger.is_closed());
    let content = read(temp_dir.path().join(PENDING_FILE_NAME));
    assert!(content.contains("before"));
    assert!(content.contains("[F]"));
    assert!(!content.contains("after"));
}

#[test]
fn test_no_destination_fails_fast() {
    let result = Logger::builder().app_name("nowhere").build();
    assert!(matches!(result, Err(LoggerError::NoDestination)));

    let result = Logger::from_config(LoggerConfig::default());
    assert!(matches!(result, Err(LoggerError::NoDestination)));
}

#[test]
fn test_size_rotation_through_logger() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let logger = Logger::builder()
        .log_dir(temp_dir.path())
        .rotation(RotationTrigger::size(1))
        .build()
        .expect("Failed to build logger");

    logger.info("rotated away");
    logger.close();

    let rotated = rotated_files(temp_dir.path());
    assert_eq!(rotated.len(), 1);
    assert!(read(temp_dir.path().join(&rotated[0])).contains("rotated away"));
    assert!(read(temp_dir.path().join(PENDING_FILE_NAME)).is_empty());
}

#[test]
fn test_retention_count_and_age() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let dir = temp_dir.path();
    let now = SystemTime::now();

    let names = [
        "2024_01_01_00_00_00.log",
        "2024_01_02_00_00_00.log",
        "2024_01_03_00_00_00.log",
        "2024_01_04_00_00_00.log",
        "2024_01_05_00_00_00.log",
    ];
    for (i, name) in names.iter().enumerate() {
        let file = File::create(dir.join(name)).unwrap();
        // the last name is the newest
        let age = Duration::from_secs(60 * (names.len() - i) as u64);
        file.set_modified(now - age).unwrap();
    }
    File::create(dir.join(PENDING_FILE_NAME))
        .unwrap()
        .set_modified(now - Duration::from_secs(86_400))
        .unwrap();

    // count only: 5 rotated, keep 2 newest
    let removed = sweep_retention(dir, &RetentionPolicy::new(Duration::ZERO, 2)).unwrap();
    assert_eq!(removed, 3);
    assert_eq!(rotated_files(dir), vec![names[3].to_string(), names[4].to_string()]);

    // age only: names[3] is 120s old
    let removed =
        sweep_retention(dir, &RetentionPolicy::new(Duration::from_secs(90), 0)).unwrap();
    assert_eq!(removed, 1);
    assert_eq!(rotated_files(dir), vec![names[4].to_string()]);

    assert!(dir.join(PENDING_FILE_NAME).exists());
}

#[test]
fn test_config_from_json() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let json = format!(
        r#"{{
            "app_name": "svc",
            "routing": "Both",
            "rotation": {{ "Size": {{ "max_bytes": 1048576 }} }},
            "buffer_capacity": 10,
            "log_dir": {:?}
        }}"#,
        temp_dir.path()
    );

    let config: LoggerConfig = serde_json::from_str(&json).expect("valid config");
    assert_eq!(config.routing, RoutingPolicy::Both);
    assert_eq!(config.rotation, RotationTrigger::size(1_048_576));
    assert_eq!(config.levels, LevelSet::all());
    assert!(!config.stdout);

    let logger = Logger::from_config(config).expect("Failed to build logger");
    assert_eq!(logger.config().buffer_capacity, 1024);
    assert_eq!(logger.config().app_name, "svc");
    logger.close();
}

#[test]
fn test_config_roundtrip_json() {
    let config = LoggerConfig {
        app_name: "api".to_string(),
        stdout: true,
        routing: RoutingPolicy::Separated,
        rotation: RotationTrigger::period(Duration::from_secs(3600)),
        retention: RetentionPolicy::new(Duration::from_secs(86_400), 10),
        levels: LevelSet::at_least(LogLevel::Warn),
        ..LoggerConfig::default()
    };

    let json = serde_json::to_string(&config).unwrap();
    let back: LoggerConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}

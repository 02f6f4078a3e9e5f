//! Rotating file with retention
//!
//! Each stream writes into a pending file (`temp.log`) inside its own
//! directory. Rotation closes the pending file, renames it to a timestamped
//! name (`YYYY_MM_DD_HH_MM_SS.log`) and opens a fresh pending file. The
//! retention sweep deletes rotated files by age and by count.

use crate::core::error::{LoggerError, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Name of the file currently being written in every stream directory.
pub const PENDING_FILE_NAME: &str = "temp.log";

/// `chrono` layout of rotated file names.
pub const ROTATED_NAME_FORMAT: &str = "%Y_%m_%d_%H_%M_%S.log";

const LOG_EXTENSION: &str = "log";

/// When the pending file is rotated. Size and period are mutually exclusive.
///
/// # Examples
///
/// ```
/// use rust_leveled_logger::sinks::RotationTrigger;
/// use std::time::Duration;
///
/// // Rotate when the pending file reaches 10 MB
/// let by_size = RotationTrigger::size(10 * 1024 * 1024);
///
/// // Rotate every hour
/// let by_period = RotationTrigger::period(Duration::from_secs(3600));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RotationTrigger {
    /// Never rotate
    #[default]
    Never,

    /// Rotate once the bytes written reach `max_bytes`
    Size { max_bytes: u64 },

    /// Rotate once `interval` has elapsed since the first byte went into the
    /// pending file. An empty pending file is never rotated.
    Period { interval: Duration },
}

impl RotationTrigger {
    #[must_use]
    pub fn size(max_bytes: u64) -> Self {
        RotationTrigger::Size { max_bytes }
    }

    #[must_use]
    pub fn period(interval: Duration) -> Self {
        RotationTrigger::Period { interval }
    }

    #[must_use]
    pub fn never() -> Self {
        RotationTrigger::Never
    }

    /// Zero thresholds are rejected.
    pub fn is_valid(&self) -> bool {
        match self {
            RotationTrigger::Never => true,
            RotationTrigger::Size { max_bytes } => *max_bytes > 0,
            RotationTrigger::Period { interval } => !interval.is_zero(),
        }
    }
}

/// Limits applied to rotated files of one stream. Zero disables a limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RetentionPolicy {
    /// Rotated files modified longer ago than this are deleted
    pub max_age: Duration,
    /// Only the newest `max_count` rotated files are kept
    pub max_count: usize,
}

impl RetentionPolicy {
    #[must_use]
    pub fn new(max_age: Duration, max_count: usize) -> Self {
        Self { max_age, max_count }
    }

    pub fn is_enabled(&self) -> bool {
        !self.max_age.is_zero() || self.max_count > 0
    }
}

/// Pending file of one stream plus its size and age accounting.
///
/// Owned by exactly one sink worker; no locking is done here.
#[derive(Debug)]
pub struct RotatingFile {
    dir: PathBuf,
    pending_path: PathBuf,
    writer: Option<BufWriter<File>>,
    size: u64,
    opened_at: SystemTime,
    trigger: RotationTrigger,
    rotations: u64,
}

impl RotatingFile {
    /// Create `dir` if needed and open its pending file for appending.
    ///
    /// Size accounting continues from the existing file length, and a
    /// non-empty pending file keeps its age, so a restart resets neither trigger.
    ///
    /// # Errors
    ///
    /// Returns error if the directory or the pending file cannot be created
    pub fn open<P: AsRef<Path>>(dir: P, trigger: RotationTrigger) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| {
            LoggerError::io_operation(
                "create log directory",
                format!("Failed to create directory '{}'", dir.display()),
                e,
            )
        })?;

        let pending_path = dir.join(PENDING_FILE_NAME);
        let file = open_append(&pending_path)?;
        let metadata = file.metadata().map_err(|e| {
            LoggerError::file_sink(
                pending_path.display().to_string(),
                format!("Cannot access file metadata: {}", e),
            )
        })?;
        let size = metadata.len();
        let now = SystemTime::now();
        let opened_at = if size > 0 {
            // earliest timestamp the platform reports for the file
            [metadata.created().ok(), metadata.modified().ok()]
                .into_iter()
                .flatten()
                .fold(now, SystemTime::min)
        } else {
            now
        };

        Ok(Self {
            dir,
            pending_path,
            writer: Some(BufWriter::new(file)),
            size,
            opened_at,
            trigger,
            rotations: 0,
        })
    }

    /// Append `bytes` and account for them.
    ///
    /// A failed write is reported but leaves the stream usable; a missing
    /// handle (after a failed rotation) is reopened first.
    pub fn write(&mut self, bytes: &[u8]) -> Result<usize> {
        if self.writer.is_none() {
            self.writer = Some(BufWriter::new(open_append(&self.pending_path)?));
        }
        let Some(ref mut writer) = self.writer else {
            return Err(LoggerError::file_sink(
                self.pending_path.display().to_string(),
                "Writer not initialized",
            ));
        };

        writer.write_all(bytes).map_err(|e| {
            LoggerError::file_sink(
                self.pending_path.display().to_string(),
                format!("Failed to write log line: {}", e),
            )
        })?;
        if self.size == 0 && !bytes.is_empty() {
            // the period runs from the first byte
            self.opened_at = SystemTime::now();
        }
        self.size += bytes.len() as u64;
        Ok(bytes.len())
    }

    pub fn should_rotate(&self) -> bool {
        match self.trigger {
            RotationTrigger::Never => false,
            RotationTrigger::Size { max_bytes } => self.size >= max_bytes,
            RotationTrigger::Period { interval } => {
                self.size > 0
                    && SystemTime::now()
                    .duration_since(self.opened_at)
                    .unwrap_or(Duration::ZERO)
                    >= interval
            }
        }
    }

    /// Sync and close the pending file, rename it to a timestamped name and
    /// reopen a fresh pending file. Returns the rotated path.
    ///
    /// On failure the previous contents stay in the pending file and the
    /// rotation is attempted again at the next check.
    pub fn rotate(&mut self) -> Result<PathBuf> {
        if let Some(mut writer) = self.writer.take() {
            let synced = writer.flush().and_then(|_| writer.get_ref().sync_all());
            if let Err(e) = synced {
                self.writer = Some(writer);
                return Err(LoggerError::file_rotation(
                    self.pending_path.display().to_string(),
                    format!("Failed to sync before rotation: {}", e),
                ));
            }
        }

        let rotated = self
            .dir
            .join(Local::now().format(ROTATED_NAME_FORMAT).to_string());

        if let Err(e) = fs::rename(&self.pending_path, &rotated) {
            // keep writing into the same pending file
            self.writer = open_append(&self.pending_path).ok().map(BufWriter::new);
            return Err(LoggerError::file_rotation(
                self.pending_path.display().to_string(),
                format!("Failed to rename to '{}': {}", rotated.display(), e),
            ));
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.pending_path)
            .map_err(|e| {
                LoggerError::file_rotation(
                    self.pending_path.display().to_string(),
                    format!("Failed to create new pending file: {}", e),
                )
            })?;

        self.writer = Some(BufWriter::new(file));
        self.size = 0;
        self.opened_at = SystemTime::now();
        self.rotations += 1;
        Ok(rotated)
    }

    /// Apply `policy` to the rotated files of this stream.
    pub fn sweep_retention(&self, policy: &RetentionPolicy) -> Result<usize> {
        sweep_retention(&self.dir, policy)
    }

    pub fn flush(&mut self) -> Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush().map_err(|e| {
                LoggerError::file_sink(
                    self.pending_path.display().to_string(),
                    format!("Failed to flush: {}", e),
                )
            })?;
        }
        Ok(())
    }

    /// Flush, fsync and release the handle.
    pub fn close(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        Ok(())
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn pending_path(&self) -> &Path {
        &self.pending_path
    }

    /// Bytes accounted to the pending file.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    #[must_use]
    pub fn opened_at(&self) -> SystemTime {
        self.opened_at
    }

    #[must_use]
    pub fn trigger(&self) -> &RotationTrigger {
        &self.trigger
    }

    /// Successful rotations since open.
    #[must_use]
    pub fn rotations(&self) -> u64 {
        self.rotations
    }
}

impl Drop for RotatingFile {
    fn drop(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            let _ = writer.flush();
        }
    }
}

fn open_append(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            LoggerError::file_sink(path.display().to_string(), format!("Failed to open: {}", e))
        })
}

/// Delete rotated files in `dir` (not descending into subdirectories).
///
/// Files older than `max_age` go first; of the survivors only the newest
/// `max_count` by modification time are kept. The pending file is never
/// touched. Returns the number of files removed.
pub fn sweep_retention(dir: &Path, policy: &RetentionPolicy) -> Result<usize> {
    if !policy.is_enabled() {
        return Ok(0);
    }

    let entries = fs::read_dir(dir).map_err(|e| {
        LoggerError::io_operation(
            "sweeping rotated logs",
            format!("Failed to list '{}'", dir.display()),
            e,
        )
    })?;

    let now = SystemTime::now();
    let mut survivors: Vec<(SystemTime, PathBuf)> = Vec::new();
    let mut removed = 0;

    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        if !metadata.is_file() || !is_rotated_file(&path) {
            continue;
        }

        let modified = metadata.modified().unwrap_or(now);
        let age = now.duration_since(modified).unwrap_or(Duration::ZERO);
        if !policy.max_age.is_zero() && age > policy.max_age {
            removed += remove_rotated(&path);
            continue;
        }
        survivors.push((modified, path));
    }

    if policy.max_count > 0 && survivors.len() > policy.max_count {
        // newest first
        survivors.sort_by(|a, b| b.0.cmp(&a.0));
        for (_, path) in survivors.drain(policy.max_count..) {
            removed += remove_rotated(&path);
        }
    }

    Ok(removed)
}

fn is_rotated_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == LOG_EXTENSION)
        && path.file_name().is_some_and(|name| name != PENDING_FILE_NAME)
}

fn remove_rotated(path: &Path) -> usize {
    match fs::remove_file(path) {
        Ok(()) => 1,
        Err(e) => {
            eprintln!(
                "[LOGGER WARNING] Failed to remove rotated log {}: {}",
                path.display(),
                e
            );
            0
        }
    }
}

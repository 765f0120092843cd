//! Size-based rotating log file
//!
//! The active file lives at `<dir>/<file_name>`. Before each write its size
//! is checked; once it exceeds `max_file_size` the file is renamed to
//! `<file_name>_<YYYY-MM-DD-HH-MM-SS>.log`, the backup is archived next to
//! itself, and a fresh active file is opened in append mode. A companion
//! `<dir>/error-<file_name>` is opened alongside every active file and is
//! never rotated.

use super::archive::ArchiveFormat;
use crate::core::error::{LoggerError, Result};
use crate::core::log_level::LogLevel;
use crate::core::timestamp::BACKUP_SUFFIX_FORMAT;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const DEFAULT_MAX_FILE_SIZE: u64 = 10240;
pub const DEFAULT_LOG_DIR: &str = "./";
pub const DEFAULT_FILE_NAME: &str = "app.log";
const ERROR_FILE_PREFIX: &str = "error-";

/// Where and when to rotate
///
/// # Examples
///
/// ```
/// use fieldlog::appenders::{ArchiveFormat, RotationConfig};
/// use fieldlog::LogLevel;
///
/// let config = RotationConfig::new("/var/log/myapp", "service.log")
///     .with_max_file_size(5 * 1024 * 1024)
///     .with_archive(ArchiveFormat::Gzip)
///     .with_error_file_level(Some(LogLevel::Error));
///
/// assert!(config.active_path().ends_with("service.log"));
/// assert!(config.error_path().ends_with("error-service.log"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    pub dir: PathBuf,
    pub file_name: String,
    /// Rotate once the active file is larger than this many bytes
    pub max_file_size: u64,
    pub archive: ArchiveFormat,
    /// Records at this level or more severe are also copied to the error
    /// file. `None` leaves the error file empty.
    pub error_file_level: Option<LogLevel>,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_LOG_DIR),
            file_name: DEFAULT_FILE_NAME.to_string(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            archive: ArchiveFormat::default(),
            error_file_level: None,
        }
    }
}

impl RotationConfig {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            file_name: file_name.into(),
            ..Self::default()
        }
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_archive(mut self, archive: ArchiveFormat) -> Self {
        self.archive = archive;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_error_file_level(mut self, level: Option<LogLevel>) -> Self {
        self.error_file_level = level;
        self
    }

    pub fn active_path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }

    pub fn error_path(&self) -> PathBuf {
        self.dir
            .join(format!("{}{}", ERROR_FILE_PREFIX, self.file_name))
    }

    /// First free backup path for a rotation at `now`.
    pub fn backup_path(&self, now: &DateTime<Local>) -> PathBuf {
        let stamp = now.format(BACKUP_SUFFIX_FORMAT);
        let candidate = self.dir.join(format!("{}_{}.log", self.file_name, stamp));
        if !candidate.exists() {
            return candidate;
        }
        (1..)
            .map(|n| self.dir.join(format!("{}_{}.{}.log", self.file_name, stamp, n)))
            .find(|path| !path.exists())
            .unwrap_or(candidate)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.file_name.is_empty() {
            return Err(LoggerError::config("rotation", "file name must not be empty"));
        }
        if self.max_file_size == 0 {
            return Err(LoggerError::config(
                "rotation",
                "max file size must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// Outcome of one rotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationReport {
    pub backup: PathBuf,
    pub archive: Option<PathBuf>,
    pub archive_failed: bool,
}

/// Outcome of one record write that reached the active file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReport {
    pub rotation: Option<RotationReport>,
    /// The copy to the error file failed
    pub error_file_failed: bool,
}

/// The active file and its error companion.
///
/// Files are opened lazily on the first write. A failed rotation leaves no
/// active handle, so the next write starts by reopening.
#[derive(Debug)]
pub struct RotatingFile {
    config: RotationConfig,
    active: Option<File>,
    error_file: Option<File>,
}

fn open_append(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            LoggerError::io_operation(
                "open log file",
                format!("Failed to open {}", path.display()),
                e,
            )
        })
}

impl RotatingFile {
    pub fn new(config: RotationConfig) -> Self {
        Self {
            config,
            active: None,
            error_file: None,
        }
    }

    /// Create and open both files immediately.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid or a file cannot be
    /// opened
    pub fn open(config: RotationConfig) -> Result<Self> {
        config.validate()?;
        let mut file = Self::new(config);
        file.ensure_open()?;
        Ok(file)
    }

    pub fn config(&self) -> &RotationConfig {
        &self.config
    }

    /// Replace the configuration. Open handles are closed when the location
    /// changes.
    pub fn set_config(&mut self, config: RotationConfig) {
        if config.active_path() != self.config.active_path() {
            self.close();
        }
        self.config = config;
    }

    pub fn is_open(&self) -> bool {
        self.active.is_some()
    }

    /// Flush and drop both handles.
    pub fn close(&mut self) {
        if let Err(e) = self.flush() {
            eprintln!("[LOGGER ERROR] Failed to flush log file on close: {}", e);
        }
        self.active = None;
        self.error_file = None;
    }

    fn open_files(&mut self) -> Result<()> {
        if !self.config.dir.as_os_str().is_empty() {
            fs::create_dir_all(&self.config.dir).map_err(|e| {
                LoggerError::io_operation(
                    "create log directory",
                    format!("Failed to create {}", self.config.dir.display()),
                    e,
                )
            })?;
        }
        let active = open_append(&self.config.active_path())?;
        let error_file = open_append(&self.config.error_path())?;
        self.active = Some(active);
        self.error_file = Some(error_file);
        Ok(())
    }

    fn ensure_open(&mut self) -> Result<()> {
        if self.active.is_none() || self.error_file.is_none() {
            self.open_files()?;
        }
        Ok(())
    }

    fn active_size(&self) -> Result<u64> {
        let file = self.active.as_ref().ok_or_else(|| {
            LoggerError::file_rotation(
                self.config.active_path().display().to_string(),
                "log file is not open",
            )
        })?;
        let metadata = file.metadata().map_err(|e| {
            LoggerError::io_operation(
                "stat log file",
                format!("Failed to stat {}", self.config.active_path().display()),
                e,
            )
        })?;
        Ok(metadata.len())
    }

    /// Close, rename, archive, reopen.
    fn rotate(&mut self) -> Result<RotationReport> {
        let active_path = self.config.active_path();
        if let Some(mut file) = self.active.take() {
            file.flush().map_err(|e| {
                LoggerError::file_rotation(
                    active_path.display().to_string(),
                    format!("Failed to flush before rotation: {}", e),
                )
            })?;
        }

        let backup = self.config.backup_path(&Local::now());
        fs::rename(&active_path, &backup).map_err(|e| {
            LoggerError::file_rotation(
                active_path.display().to_string(),
                format!("Failed to rename to {}: {}", backup.display(), e),
            )
        })?;

        let (archive, archive_failed) = match self.config.archive.archive(&backup) {
            Ok(archive) => (archive, false),
            Err(e) => {
                eprintln!(
                    "[LOGGER WARNING] Failed to archive {}: {}. The backup is kept.",
                    backup.display(),
                    e
                );
                (None, true)
            }
        };

        self.open_files()?;

        Ok(RotationReport {
            backup,
            archive,
            archive_failed,
        })
    }

    /// Write one rendered record, rotating first if the active file is over
    /// its size limit.
    ///
    /// A failed copy to the error file is reported on stderr and in the
    /// returned [`WriteReport`]; the record still counts as written.
    ///
    /// # Errors
    ///
    /// Returns error if the active file cannot be opened, stat-ed, rotated
    /// or written; the record is not written in that case
    pub fn write_record(&mut self, level: LogLevel, bytes: &[u8]) -> Result<WriteReport> {
        self.ensure_open()?;

        let rotation = if self.active_size()? > self.config.max_file_size {
            Some(self.rotate()?)
        } else {
            None
        };

        if let Some(file) = self.active.as_mut() {
            file.write_all(bytes)?;
        }

        let to_error_file = self
            .config
            .error_file_level
            .is_some_and(|threshold| level <= threshold);
        let mut error_file_failed = false;
        if to_error_file {
            if let Some(file) = self.error_file.as_mut() {
                if let Err(e) = file.write_all(bytes) {
                    eprintln!(
                        "[LOGGER ERROR] Failed to write to error log file {}: {}",
                        self.config.error_path().display(),
                        e
                    );
                    error_file_failed = true;
                }
            }
        }

        Ok(WriteReport {
            rotation,
            error_file_failed,
        })
    }

    pub fn flush(&mut self) -> Result<()> {
        if let Some(file) = self.active.as_mut() {
            file.flush()?;
        }
        if let Some(file) = self.error_file.as_mut() {
            file.flush()?;
        }
        Ok(())
    }
}

impl Drop for RotatingFile {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            eprintln!("[LOGGER ERROR] Failed to flush log file on drop: {}", e);
        }
    }
}

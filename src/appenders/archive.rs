//! Archiving of rotated backups
//!
//! The archive is written next to the backup under a temporary name and
//! moved into place only once complete, so a reader never sees a partial
//! archive. The backup itself is left in place.

use crate::core::error::{LoggerError, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// How a rotated backup is archived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveFormat {
    /// `<backup>.zip` holding the backup as a single deflated member
    #[default]
    Zip,
    /// `<backup>.gz`
    Gzip,
    /// Keep the backup only
    None,
}

impl ArchiveFormat {
    pub fn extension(self) -> Option<&'static str> {
        match self {
            ArchiveFormat::Zip => Some("zip"),
            ArchiveFormat::Gzip => Some("gz"),
            ArchiveFormat::None => None,
        }
    }

    /// Path the archive of `backup` is written to.
    pub fn archive_path(self, backup: &Path) -> Option<PathBuf> {
        let extension = self.extension()?;
        let mut name = backup.as_os_str().to_owned();
        name.push(".");
        name.push(extension);
        Some(PathBuf::from(name))
    }

    /// Archive `backup`, returning the archive path, or `None` for
    /// [`ArchiveFormat::None`].
    pub fn archive(self, backup: &Path) -> Result<Option<PathBuf>> {
        let Some(target) = self.archive_path(backup) else {
            return Ok(None);
        };

        let mut tmp = target.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let written = match self {
            ArchiveFormat::Zip => write_zip(backup, &tmp),
            ArchiveFormat::Gzip => write_gzip(backup, &tmp),
            ArchiveFormat::None => Ok(()),
        };
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }

        fs::rename(&tmp, &target).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            LoggerError::io_operation(
                "archive log file",
                format!("Failed to move archive into place: {}", target.display()),
                e,
            )
        })?;
        Ok(Some(target))
    }
}

fn open_source(backup: &Path) -> Result<BufReader<File>> {
    let input = File::open(backup).map_err(|e| {
        LoggerError::io_operation(
            "archive log file",
            format!("Failed to open file for archiving: {}", backup.display()),
            e,
        )
    })?;
    Ok(BufReader::with_capacity(COPY_BUFFER_SIZE, input))
}

fn create_target(tmp: &Path) -> Result<BufWriter<File>> {
    let output = File::create(tmp).map_err(|e| {
        LoggerError::io_operation(
            "archive log file",
            format!("Failed to create temporary archive: {}", tmp.display()),
            e,
        )
    })?;
    Ok(BufWriter::with_capacity(COPY_BUFFER_SIZE, output))
}

fn member_name(backup: &Path) -> Result<String> {
    backup
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| {
            LoggerError::file_rotation(backup.display().to_string(), "backup has no file name")
        })
}

fn write_zip(backup: &Path, tmp: &Path) -> Result<()> {
    let mut reader = open_source(backup)?;
    let mut archive = ZipWriter::new(create_target(tmp)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    archive.start_file(member_name(backup)?, options)?;
    io::copy(&mut reader, &mut archive)?;
    let mut output = archive.finish()?;
    output.flush()?;
    Ok(())
}

fn write_gzip(backup: &Path, tmp: &Path) -> Result<()> {
    let mut reader = open_source(backup)?;
    let mut encoder =
        flate2::write::GzEncoder::new(create_target(tmp)?, flate2::Compression::default());

    io::copy(&mut reader, &mut encoder)?;
    let mut output = encoder.finish()?;
    output.flush()?;
    Ok(())
}

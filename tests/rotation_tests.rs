//! Rotation tests
//!
//! These tests verify:
//! - A size overflow produces exactly one backup and one archive
//! - The active file only holds post-rotation records
//! - The error companion file is created and routed by level
//! - Rotation failures drop the record instead of failing the caller

use fieldlog::prelude::*;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn files_with(dir: &Path, prefix: &str, suffix: &str) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = fs::read_dir(dir)
        .expect("read dir")
        .map(|entry| entry.expect("dir entry").path())
        .filter(|path| {
            let name = path.file_name().unwrap().to_string_lossy().into_owned();
            name.starts_with(prefix) && name.ends_with(suffix)
        })
        .collect();
    found.sort();
    found
}

fn file_logger(dir: &Path, max_file_size: u64) -> Logger {
    Logger::builder()
        .formatter(TextFormatter::new().with_disable_timestamp(true))
        .rotation(RotationConfig::new(dir, "app.log").with_max_file_size(max_file_size))
        .build()
}

#[test]
fn test_single_rotation_with_zip_archive() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let logger = file_logger(temp_dir.path(), 80);

    // Each record is 33 bytes: three of them push the file past 80 bytes.
    for i in 0..3 {
        logger.info(format!("before-rotation-{}", i));
    }
    logger.info("after-rotation");
    logger.flush().unwrap();

    let backups = files_with(temp_dir.path(), "app.log_", ".log");
    assert_eq!(backups.len(), 1, "backups: {:?}", backups);
    let archives = files_with(temp_dir.path(), "app.log_", ".log.zip");
    assert_eq!(archives.len(), 1, "archives: {:?}", archives);

    let backup_name = backups[0].file_name().unwrap().to_string_lossy().into_owned();
    // app.log_YYYY-MM-DD-HH-MM-SS.log
    assert_eq!(backup_name.len(), "app.log_".len() + 19 + ".log".len());

    let active = fs::read_to_string(temp_dir.path().join("app.log")).unwrap();
    assert_eq!(active, "level=info msg=after-rotation\n");

    let backup = fs::read_to_string(&backups[0]).unwrap();
    assert_eq!(backup.lines().count(), 3);
    assert!(backup.lines().all(|line| line.contains("before-rotation-")));

    let mut zip = zip::ZipArchive::new(File::open(&archives[0]).unwrap()).unwrap();
    assert_eq!(zip.len(), 1);
    let mut member = zip.by_name(&backup_name).unwrap();
    let mut archived = String::new();
    member.read_to_string(&mut archived).unwrap();
    assert_eq!(archived, backup);

    assert_eq!(logger.metrics().rotations(), 1);
    assert_eq!(logger.metrics().archive_failures(), 0);
    assert_eq!(logger.metrics().total_logged(), 4);
}

#[test]
fn test_gzip_archive_option() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let logger = Logger::builder()
        .formatter(TextFormatter::new().with_disable_timestamp(true))
        .rotation(
            RotationConfig::new(temp_dir.path(), "app.log")
                .with_max_file_size(10)
                .with_archive(ArchiveFormat::Gzip),
        )
        .build();

    logger.info("first record");
    logger.info("second record");

    assert_eq!(files_with(temp_dir.path(), "app.log_", ".log.gz").len(), 1);
    assert!(files_with(temp_dir.path(), "app.log_", ".zip").is_empty());
}

#[test]
fn test_error_file_is_created_and_routed() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let logger = Logger::builder()
        .formatter(TextFormatter::new().with_disable_timestamp(true))
        .rotation(RotationConfig::new(temp_dir.path(), "app.log"))
        .build();

    logger.info("plain");
    let error_path = temp_dir.path().join("error-app.log");
    assert!(error_path.exists());
    assert_eq!(fs::read_to_string(&error_path).unwrap(), "");

    logger.set_error_file_level(Some(LogLevel::Warn));
    logger.info("still plain");
    logger.warn("watch out");
    logger.flush().unwrap();

    assert_eq!(
        fs::read_to_string(&error_path).unwrap(),
        "level=warning msg=\"watch out\"\n"
    );
    assert_eq!(
        fs::read_to_string(temp_dir.path().join("app.log"))
            .unwrap()
            .lines()
            .count(),
        3
    );
}

#[test]
fn test_error_file_is_not_rotated() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let logger = Logger::builder()
        .formatter(TextFormatter::new().with_disable_timestamp(true))
        .rotation(
            RotationConfig::new(temp_dir.path(), "app.log")
                .with_max_file_size(16)
                .with_archive(ArchiveFormat::None)
                .with_error_file_level(Some(LogLevel::Error)),
        )
        .build();

    for i in 0..5 {
        logger.error(format!("failure {}", i));
    }

    let errors = fs::read_to_string(temp_dir.path().join("error-app.log")).unwrap();
    assert_eq!(errors.lines().count(), 5);
    assert!(files_with(temp_dir.path(), "error-app.log_", ".log").is_empty());
    assert_eq!(logger.metrics().rotations(), 4);
}

#[test]
fn test_setters_switch_to_file_output() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let logger = Logger::builder()
        .formatter(TextFormatter::new().with_disable_timestamp(true))
        .output(MemorySink::new())
        .build();

    logger.set_file_path(temp_dir.path(), "svc.log");
    logger.set_max_file_size(2048);
    logger.set_file_output(true);
    logger.info("into the file");

    assert_eq!(logger.rotation_config().max_file_size, 2048);
    assert_eq!(
        fs::read_to_string(temp_dir.path().join("svc.log")).unwrap(),
        "level=info msg=\"into the file\"\n"
    );
}

#[test]
fn test_unwritable_directory_drops_record() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let blocker = temp_dir.path().join("not-a-dir");
    fs::write(&blocker, "file in the way").unwrap();

    let logger = file_logger(&blocker, 1024);
    logger.info("lost");

    assert_eq!(logger.metrics().dropped_count(), 1);
    assert_eq!(logger.metrics().total_logged(), 0);
}

//! File and in-memory output targets

pub mod archive;
pub mod memory;
pub mod rotating_file;

pub use archive::ArchiveFormat;
pub use memory::MemorySink;
pub use rotating_file::{
    RotatingFile, RotationConfig, RotationReport, WriteReport, DEFAULT_FILE_NAME,
    DEFAULT_LOG_DIR, DEFAULT_MAX_FILE_SIZE,
};

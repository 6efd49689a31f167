/// Snapshot record types — the complete result of one scan.
///
/// A `Snapshot` is the sole unit of persistence and the sole handoff object
/// between the core and any frontend. It is immutable after construction;
/// readers may share it freely.
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One discovered file. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FileRecord {
    /// Absolute, platform-normalized path. Never carries an
    /// extended-length prefix.
    pub path: String,
    /// Logical size in bytes.
    pub size: u64,
}

/// The transitively-summed size attributed to one directory path.
///
/// One entry exists per directory that is an ancestor of at least one file.
/// Directories with no files anywhere beneath them are never materialized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DirectoryTotal {
    /// Absolute, normalized path without a trailing separator (filesystem
    /// root forms such as `/` or `C:\` keep theirs).
    pub path: String,
    /// Sum of the sizes of every file transitively contained.
    pub total_size: u64,
}

/// The complete, persistable result of one scan.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    /// The scanned root, absolute and normalized.
    pub root_path: String,
    /// When the scan ran.
    pub scan_timestamp: DateTime<Utc>,
    /// Every discovered file, in discovery order. Not sorted.
    pub files: Vec<FileRecord>,
    /// Per-directory totals, in aggregation construction order. Not sorted.
    pub directories: Vec<DirectoryTotal>,
}

impl Snapshot {
    /// Sum of all file sizes in the snapshot.
    pub fn total_file_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn directory_count(&self) -> usize {
        self.directories.len()
    }
}

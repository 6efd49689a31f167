/// Error taxonomy for scanning and persistence.
///
/// Traversal failures are fatal only when the scan root itself cannot be
/// opened. Access failures below the root are swallowed by the walker and
/// never reach this module: an unreadable subtree simply contributes
/// nothing to the result.
use std::path::PathBuf;
use thiserror::Error;

/// Fatal scan failures. A scan that returns one of these produced no
/// snapshot, partial or otherwise.
#[derive(Debug, Error)]
pub enum TraversalError {
    #[error("cannot open scan root {path}: {source}")]
    RootUnreachable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("scan root {path} is not a directory")]
    NotADirectory { path: PathBuf },

    #[error("scan cancelled")]
    Cancelled,
}

/// Fatal save/load failures.
///
/// A failed `save` is guaranteed to have left any previously persisted
/// artifact untouched. A failed `load` never yields a partial snapshot;
/// record-level variants carry positional context for troubleshooting.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to write snapshot {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read snapshot {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("snapshot {path} is corrupt: {detail}")]
    Corrupt { path: PathBuf, detail: String },

    #[error("snapshot {path}: directory record {index} of {count} could not be decoded: {source}")]
    BadDirectoryRecord {
        path: PathBuf,
        index: u32,
        count: u32,
        source: std::io::Error,
    },

    #[error("snapshot {path}: file record {index} of {count} could not be decoded: {source}")]
    BadFileRecord {
        path: PathBuf,
        index: u32,
        count: u32,
        source: std::io::Error,
    },
}

impl PersistenceError {
    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PersistenceError::Write {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PersistenceError::Read {
            path: path.into(),
            source,
        }
    }
}

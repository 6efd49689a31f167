/// Snapshot export — CSV and JSON renditions of a saved scan.
///
/// Exports are a one-way presentation format; the binary store remains
/// the only format `load` accepts.
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;

use crate::error::PersistenceError;
use crate::model::Snapshot;

/// One row of the CSV rendition. Directories come first, then files.
#[derive(Serialize)]
struct CsvRow<'a> {
    kind: &'static str,
    path: &'a str,
    bytes: u64,
}

/// Write the snapshot as CSV: `kind,path,bytes`.
pub fn export_csv(snapshot: &Snapshot, target: &Path) -> Result<(), PersistenceError> {
    let mut writer = csv::Writer::from_path(target)
        .map_err(|e| PersistenceError::write(target, io::Error::other(e)))?;

    for dir in &snapshot.directories {
        writer
            .serialize(CsvRow {
                kind: "directory",
                path: &dir.path,
                bytes: dir.total_size,
            })
            .map_err(|e| PersistenceError::write(target, io::Error::other(e)))?;
    }
    for file in &snapshot.files {
        writer
            .serialize(CsvRow {
                kind: "file",
                path: &file.path,
                bytes: file.size,
            })
            .map_err(|e| PersistenceError::write(target, io::Error::other(e)))?;
    }
    writer
        .flush()
        .map_err(|e| PersistenceError::write(target, e))
}

/// Write the snapshot as pretty-printed JSON.
pub fn export_json(snapshot: &Snapshot, target: &Path) -> Result<(), PersistenceError> {
    let file = File::create(target).map_err(|e| PersistenceError::write(target, e))?;
    serde_json::to_writer_pretty(BufWriter::new(file), snapshot)
        .map_err(|e| PersistenceError::write(target, io::Error::other(e)))
}

/// Snapshot persistence — versioned binary format, zstd-compressed,
/// written atomically.
///
/// # Layout (pre-compression, little-endian)
///
/// ```text
/// version    : u32 (= 1)
/// timestamp  : i64 (microseconds since the Unix epoch)
/// root       : u32 length + UTF-8 bytes
/// dir_count  : u32
/// dir_count  × { path: string, total_size: u64 }
/// file_count : u32
/// file_count × { path: string, size: u64 }
/// ```
///
/// The encoded stream is wrapped in a zstd frame on disk.
///
/// # Crash safety
///
/// `save` writes to a sibling temp file, fsyncs it, then renames over the
/// target (`std::fs::rename` replaces atomically on both Unix and
/// Windows). A reader therefore only ever observes the previous complete
/// snapshot or the new complete snapshot, never a partial one. Any failure
/// removes the temp file and leaves the prior artifact untouched.
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use chrono::{DateTime, Utc};
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::PersistenceError;
use crate::model::{DirectoryTotal, FileRecord, Snapshot};

/// Current on-disk format version. Read back on load; future layout
/// changes must branch on it.
pub const FORMAT_VERSION: u32 = 1;

/// Extension used for snapshot artifacts.
pub const SNAPSHOT_EXTENSION: &str = "snap";

/// Snapshots are written once per scan, so the default level's
/// speed/ratio balance is fine.
const COMPRESSION_LEVEL: i32 = 3;

/// Pre-allocation cap for record vectors. Counts are untrusted until the
/// stream proves them, so a corrupt header cannot reserve gigabytes.
const MAX_PREALLOC_RECORDS: u32 = 1 << 20;

/// Persist a snapshot to `target`, atomically.
pub fn save(snapshot: &Snapshot, target: &Path) -> Result<(), PersistenceError> {
    let tmp = temp_sibling(target);

    if let Err(err) = write_to_temp(snapshot, &tmp) {
        let _ = fs::remove_file(&tmp);
        return Err(PersistenceError::write(target, err));
    }

    if let Err(err) = fs::rename(&tmp, target) {
        let _ = fs::remove_file(&tmp);
        return Err(PersistenceError::write(target, err));
    }

    sync_parent_dir(target);
    debug!(
        "snapshot saved to {} ({} files, {} directories)",
        target.display(),
        snapshot.files.len(),
        snapshot.directories.len()
    );
    Ok(())
}

/// Load a snapshot previously written by [`save`].
///
/// A decode failure on any individual record invalidates the whole load;
/// the error carries the record index and total count for diagnosis.
pub fn load(source: &Path) -> Result<Snapshot, PersistenceError> {
    let file = File::open(source).map_err(|err| PersistenceError::read(source, err))?;
    let decoder = zstd::Decoder::new(file).map_err(|err| PersistenceError::read(source, err))?;
    decode_snapshot(decoder, source)
}

/// Deterministic artifact file name for a scan root.
///
/// Path separators and other characters unsafe in file names are
/// flattened to underscores, so the same root always maps to the same
/// sibling-safe name: `C:\Users` becomes `C__Users.snap`.
pub fn snapshot_file_name(root: &str) -> String {
    let flattened: String = root
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let stem = flattened.trim_matches('_');
    if stem.is_empty() {
        format!("root.{SNAPSHOT_EXTENSION}")
    } else {
        format!("{stem}.{SNAPSHOT_EXTENSION}")
    }
}

fn temp_sibling(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "snapshot".into());
    name.push(".tmp");
    target.with_file_name(name)
}

fn write_to_temp(snapshot: &Snapshot, tmp: &Path) -> io::Result<()> {
    // Plain create: a leftover temp from an earlier crash is truncated
    // and overwritten rather than blocking the save.
    let file = File::create(tmp)?;
    let mut encoder = zstd::Encoder::new(BufWriter::new(file), COMPRESSION_LEVEL)?;
    encode_snapshot(&mut encoder, snapshot)?;
    let mut writer = encoder.finish()?;
    writer.flush()?;
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()
}

/// Make the rename itself durable. Opening a directory for fsync is a
/// Unix-only operation.
#[cfg(unix)]
fn sync_parent_dir(target: &Path) {
    if let Some(parent) = target.parent() {
        if let Ok(dir) = File::open(parent) {
            let _ = dir.sync_all();
        }
    }
}

#[cfg(not(unix))]
fn sync_parent_dir(_target: &Path) {}

fn encode_snapshot<W: Write>(w: &mut W, snapshot: &Snapshot) -> io::Result<()> {
    w.write_u32::<LittleEndian>(FORMAT_VERSION)?;
    w.write_i64::<LittleEndian>(snapshot.scan_timestamp.timestamp_micros())?;
    write_string(w, &snapshot.root_path)?;

    w.write_u32::<LittleEndian>(count_u32(snapshot.directories.len(), "directory")?)?;
    for dir in &snapshot.directories {
        write_string(w, &dir.path)?;
        w.write_u64::<LittleEndian>(dir.total_size)?;
    }

    w.write_u32::<LittleEndian>(count_u32(snapshot.files.len(), "file")?)?;
    for file in &snapshot.files {
        write_string(w, &file.path)?;
        w.write_u64::<LittleEndian>(file.size)?;
    }
    Ok(())
}

fn decode_snapshot<R: Read>(mut r: R, source: &Path) -> Result<Snapshot, PersistenceError> {
    let version = r
        .read_u32::<LittleEndian>()
        .map_err(|err| PersistenceError::read(source, err))?;
    if version != FORMAT_VERSION {
        // Read but not yet used to select an alternate decoder.
        warn!(
            "snapshot {} declares version {version}, decoding as version {FORMAT_VERSION}",
            source.display()
        );
    }

    let micros = r
        .read_i64::<LittleEndian>()
        .map_err(|err| PersistenceError::read(source, err))?;
    let scan_timestamp = DateTime::<Utc>::from_timestamp_micros(micros).ok_or_else(|| {
        PersistenceError::Corrupt {
            path: source.to_path_buf(),
            detail: format!("timestamp {micros} out of range"),
        }
    })?;

    let root_path = read_string(&mut r).map_err(|err| PersistenceError::read(source, err))?;

    let dir_count = r
        .read_u32::<LittleEndian>()
        .map_err(|err| PersistenceError::read(source, err))?;
    let mut directories =
        Vec::with_capacity(dir_count.min(MAX_PREALLOC_RECORDS) as usize);
    for index in 0..dir_count {
        let record = read_directory_record(&mut r).map_err(|err| {
            PersistenceError::BadDirectoryRecord {
                path: source.to_path_buf(),
                index,
                count: dir_count,
                source: err,
            }
        })?;
        directories.push(record);
    }

    let file_count = r
        .read_u32::<LittleEndian>()
        .map_err(|err| PersistenceError::read(source, err))?;
    let mut files = Vec::with_capacity(file_count.min(MAX_PREALLOC_RECORDS) as usize);
    for index in 0..file_count {
        let record =
            read_file_record(&mut r).map_err(|err| PersistenceError::BadFileRecord {
                path: source.to_path_buf(),
                index,
                count: file_count,
                source: err,
            })?;
        files.push(record);
    }

    Ok(Snapshot {
        root_path,
        scan_timestamp,
        files,
        directories,
    })
}

fn read_directory_record<R: Read>(r: &mut R) -> io::Result<DirectoryTotal> {
    let path = read_string(r)?;
    let total_size = r.read_u64::<LittleEndian>()?;
    Ok(DirectoryTotal { path, total_size })
}

fn read_file_record<R: Read>(r: &mut R) -> io::Result<FileRecord> {
    let path = read_string(r)?;
    let size = r.read_u64::<LittleEndian>()?;
    Ok(FileRecord { path, size })
}

fn write_string<W: Write>(w: &mut W, s: &str) -> io::Result<()> {
    let len = u32::try_from(s.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "string exceeds u32 length"))?;
    w.write_u32::<LittleEndian>(len)?;
    w.write_all(s.as_bytes())
}

fn read_string<R: Read>(r: &mut R) -> io::Result<String> {
    let len = r.read_u32::<LittleEndian>()? as u64;
    // `take` bounds the read so a corrupt length cannot trigger a huge
    // allocation up front.
    let mut buf = Vec::new();
    let got = r.take(len).read_to_end(&mut buf)? as u64;
    if got < len {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("string truncated: expected {len} bytes, found {got}"),
        ));
    }
    String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn count_u32(len: usize, what: &str) -> io::Result<u32> {
    u32::try_from(len).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{what} count {len} exceeds u32"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_snapshot() -> Snapshot {
        Snapshot {
            root_path: "/data/projects".to_string(),
            scan_timestamp: Utc.with_ymd_and_hms(2026, 7, 14, 9, 30, 0).unwrap(),
            files: vec![
                FileRecord {
                    path: "/data/projects/a.rs".to_string(),
                    size: 100,
                },
                FileRecord {
                    path: "/data/projects/sub/b.rs".to_string(),
                    size: 2_500,
                },
            ],
            directories: vec![
                DirectoryTotal {
                    path: "/data/projects/sub".to_string(),
                    total_size: 2_500,
                },
                DirectoryTotal {
                    path: "/data/projects".to_string(),
                    total_size: 2_600,
                },
            ],
        }
    }

    fn assert_snapshots_equal(a: &Snapshot, b: &Snapshot) {
        assert_eq!(a.root_path, b.root_path);
        assert_eq!(
            a.scan_timestamp.timestamp_micros(),
            b.scan_timestamp.timestamp_micros()
        );
        assert_eq!(a.files, b.files);
        assert_eq!(a.directories, b.directories);
    }

    #[test]
    fn roundtrip_preserves_every_field() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("projects.snap");
        let original = sample_snapshot();

        save(&original, &target).unwrap();
        let loaded = load(&target).unwrap();
        assert_snapshots_equal(&original, &loaded);
    }

    #[test]
    fn roundtrip_of_empty_snapshot() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("empty.snap");
        let original = Snapshot {
            root_path: "/empty".to_string(),
            scan_timestamp: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            files: Vec::new(),
            directories: Vec::new(),
        };

        save(&original, &target).unwrap();
        let loaded = load(&target).unwrap();
        assert_snapshots_equal(&original, &loaded);
    }

    #[test]
    fn save_leaves_no_temp_file_behind() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("clean.snap");
        save(&sample_snapshot(), &target).unwrap();

        let names: Vec<String> = fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["clean.snap".to_string()]);
    }

    #[test]
    fn load_of_missing_file_reports_read_error() {
        let tmp = tempfile::tempdir().unwrap();
        let result = load(&tmp.path().join("nope.snap"));
        assert!(matches!(result, Err(PersistenceError::Read { .. })));
    }

    #[test]
    fn truncated_record_reports_position() {
        // Hand-build a stream that declares two directory records but
        // provides only one, then ends.
        let mut payload = Vec::new();
        payload.write_u32::<LittleEndian>(FORMAT_VERSION).unwrap();
        payload.write_i64::<LittleEndian>(0).unwrap();
        write_string(&mut payload, "/r").unwrap();
        payload.write_u32::<LittleEndian>(2).unwrap();
        write_string(&mut payload, "/r/only").unwrap();
        payload.write_u64::<LittleEndian>(9).unwrap();

        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("truncated.snap");
        fs::write(&target, zstd::stream::encode_all(&payload[..], 3).unwrap()).unwrap();

        match load(&target) {
            Err(PersistenceError::BadDirectoryRecord { index, count, .. }) => {
                assert_eq!(index, 1);
                assert_eq!(count, 2);
            }
            other => panic!("expected BadDirectoryRecord, got {other:?}"),
        }
    }

    #[test]
    fn garbage_bytes_fail_to_load() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("garbage.snap");
        fs::write(&target, b"definitely not a zstd frame").unwrap();
        assert!(load(&target).is_err());
    }

    #[test]
    fn unknown_version_still_decodes() {
        let mut payload = Vec::new();
        payload.write_u32::<LittleEndian>(99).unwrap();
        payload.write_i64::<LittleEndian>(0).unwrap();
        write_string(&mut payload, "/r").unwrap();
        payload.write_u32::<LittleEndian>(0).unwrap();
        payload.write_u32::<LittleEndian>(0).unwrap();

        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("future.snap");
        fs::write(&target, zstd::stream::encode_all(&payload[..], 3).unwrap()).unwrap();

        let snap = load(&target).unwrap();
        assert_eq!(snap.root_path, "/r");
        assert!(snap.files.is_empty());
    }

    #[test]
    fn overwrite_replaces_previous_snapshot() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("replace.snap");

        let first = sample_snapshot();
        save(&first, &target).unwrap();

        let mut second = sample_snapshot();
        second.root_path = "/other".to_string();
        second.files.clear();
        save(&second, &target).unwrap();

        let loaded = load(&target).unwrap();
        assert_eq!(loaded.root_path, "/other");
        assert!(loaded.files.is_empty());
    }

    #[test]
    fn file_name_derivation_is_deterministic() {
        assert_eq!(snapshot_file_name(r"C:\Users"), "C__Users.snap");
        assert_eq!(snapshot_file_name("/var/log"), "var_log.snap");
        assert_eq!(snapshot_file_name("/"), "root.snap");
        assert_eq!(
            snapshot_file_name("/var/log"),
            snapshot_file_name("/var/log")
        );
    }
}

/// Directory listing as a capability, not an API binding.
///
/// The walker only ever asks one question of the platform: "what are the
/// immediate children of this directory?". Abstracting that behind a trait
/// keeps the traversal logic portable and lets tests drive it with
/// synthetic or failing listings, no real filesystem required.
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;

/// A single immediate child of a directory.
#[derive(Debug, Clone)]
pub struct ChildEntry {
    /// Name only, never a path. Kept as `OsString` so it round-trips
    /// through re-enumeration even when not valid UTF-8.
    pub name: OsString,
    pub is_dir: bool,
    /// Logical size in bytes. Always 0 for directories and non-regular
    /// files.
    pub size: u64,
}

/// Capability for listing the immediate children of a directory.
pub trait ListDir {
    fn list(&self, dir: &Path) -> io::Result<Vec<ChildEntry>>;
}

/// Default lister backed by `std::fs`.
///
/// Symlinks are never followed: `symlink_metadata` describes the link
/// itself, so a symlinked directory cannot introduce traversal cycles and
/// is recorded as a zero-size non-directory entry.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsLister;

impl ListDir for OsLister {
    fn list(&self, dir: &Path) -> io::Result<Vec<ChildEntry>> {
        let mut children = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    // A single unreadable entry drops that entry only, not
                    // the whole listing.
                    debug!("skipping unreadable entry in {}: {err}", dir.display());
                    continue;
                }
            };
            let path = entry.path();
            let meta = match path.symlink_metadata() {
                Ok(m) => m,
                Err(err) => {
                    // Entry vanished mid-walk or metadata is inaccessible.
                    debug!("skipping {}: {err}", path.display());
                    continue;
                }
            };
            let file_type = meta.file_type();
            children.push(ChildEntry {
                name: entry.file_name(),
                is_dir: file_type.is_dir(),
                size: if file_type.is_file() { meta.len() } else { 0 },
            });
        }
        Ok(children)
    }
}

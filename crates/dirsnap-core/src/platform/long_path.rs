/// Extended-length path handling.
///
/// Windows enumeration APIs reject paths beyond the legacy `MAX_PATH`
/// ceiling unless the path carries the `\\?\` verbatim prefix. The walker
/// traverses with the prefix applied and strips it before a path reaches
/// records, callbacks, or logs, so callers and stored snapshots never see
/// the marker. On other platforms both directions are identity operations.
///
/// Design target: paths of tens of thousands of characters.
use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Normalize a scan root to its absolute, traversal-ready form.
///
/// On Windows `fs::canonicalize` already yields a `\\?\`-prefixed path,
/// which is exactly the form the walker needs. Failure here is the one
/// condition that is fatal to a scan.
pub fn normalize_root(root: &Path) -> io::Result<PathBuf> {
    fs::canonicalize(root)
}

/// The display/record form of a traversal path: extended-length marker
/// stripped, lossily decoded to UTF-8.
pub fn display_form(path: &Path) -> String {
    let lossy = path.to_string_lossy();
    strip_extended(&lossy).into_owned()
}

/// Remove the extended-length prefix from a path string, restoring the
/// conventional spelling of UNC shares.
///
/// Pure string logic, so behavior is identical (and testable) on every
/// platform; paths without a marker pass through borrowed.
pub fn strip_extended(path: &str) -> Cow<'_, str> {
    if let Some(rest) = path.strip_prefix(r"\\?\UNC\") {
        return Cow::Owned(format!(r"\\{rest}"));
    }
    if let Some(rest) = path.strip_prefix(r"\\?\") {
        return Cow::Borrowed(rest);
    }
    Cow::Borrowed(path)
}

/// Top-N largest directory totals in a snapshot.
use crate::model::{DirectoryTotal, Snapshot};

/// The N largest directory totals, descending by size, path as tie-break.
///
/// Ancestors dominate their descendants by construction, so the head of
/// this list is the scanned root's own ancestry; frontends typically skip
/// past entries that are prefixes of the root when presenting it.
pub fn top_dirs(snapshot: &Snapshot, n: usize) -> Vec<&DirectoryTotal> {
    if n == 0 {
        return Vec::new();
    }

    let mut refs: Vec<&DirectoryTotal> = snapshot.directories.iter().collect();
    if refs.len() > n {
        refs.select_nth_unstable_by(n - 1, |a, b| b.total_size.cmp(&a.total_size));
        refs.truncate(n);
    }
    refs.sort_unstable_by(|a, b| {
        b.total_size
            .cmp(&a.total_size)
            .then_with(|| a.path.cmp(&b.path))
    });
    refs
}

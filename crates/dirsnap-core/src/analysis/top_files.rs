/// Top-N largest files in a snapshot.
///
/// Uses `select_nth_unstable_by` (O(n) average) to bring the top-N
/// entries to the front, then sorts only those N. Significantly faster
/// than a full sort when n >> N.
use crate::model::{FileRecord, Snapshot};

/// The N largest files, descending by size. Ties break on path so the
/// result is stable across runs.
pub fn top_files(snapshot: &Snapshot, n: usize) -> Vec<&FileRecord> {
    if n == 0 {
        return Vec::new();
    }

    let mut refs: Vec<&FileRecord> = snapshot.files.iter().collect();
    if refs.len() > n {
        refs.select_nth_unstable_by(n - 1, |a, b| b.size.cmp(&a.size));
        refs.truncate(n);
    }
    refs.sort_unstable_by(|a, b| b.size.cmp(&a.size).then_with(|| a.path.cmp(&b.path)));
    refs
}

/// Bottom-up directory size aggregation.
///
/// Turns the walker's flat file list into per-directory totals, including
/// every intermediate ancestor level, in two phases:
///
/// 1. Each file's size is accumulated under its immediate parent.
/// 2. Accumulated keys are processed in descending path-length order and
///    folded into their own parents. A child path is strictly longer than
///    its ancestors under normalized paths, so by the time a directory is
///    processed every descendant has already been folded into it. Parents
///    created mid-pass join the remaining processing order at their sorted
///    position so their totals propagate further up.
///
/// Pure and deterministic: no I/O, no failure mode. A file whose parent
/// cannot be determined is skipped (under-counted, never an error), and a
/// directory with no files anywhere beneath it never materializes.
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::Path;

use crate::model::{DirectoryTotal, FileRecord};

/// Accumulator preserving the first-seen spelling of a path while the map
/// is keyed by the platform-folded form.
struct Accum {
    path: String,
    total: u64,
}

/// Compute the transitive size total of every ancestor directory of the
/// given files.
///
/// Invariant: for every emitted directory D, `total_size` equals the sum
/// of sizes of all files whose path has D as a proper path prefix. Holds
/// for arbitrarily deep, sparse trees.
pub fn aggregate(files: &[FileRecord]) -> Vec<DirectoryTotal> {
    let mut totals: HashMap<String, Accum> = HashMap::with_capacity(files.len() / 4 + 1);

    // Phase 1: direct parents.
    for file in files {
        let Some(parent) = parent_dir(&file.path) else {
            continue;
        };
        match totals.entry(fold_key(&parent)) {
            Entry::Occupied(mut e) => e.get_mut().total += file.size,
            Entry::Vacant(e) => {
                e.insert(Accum {
                    path: parent,
                    total: file.size,
                });
            }
        }
    }

    // Phase 2: fold into ancestors, deepest first. Ties in length can
    // never be parent/child, so the lexical tie-break only pins down the
    // output order.
    let mut order: Vec<String> = totals.keys().cloned().collect();
    order.sort_unstable_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    let mut i = 0;
    while i < order.len() {
        let key = order[i].clone();
        let (path, amount) = {
            let accum = &totals[&key];
            (accum.path.clone(), accum.total)
        };
        if let Some(parent) = parent_dir(&path) {
            let parent_key = fold_key(&parent);
            match totals.entry(parent_key.clone()) {
                Entry::Occupied(mut e) => e.get_mut().total += amount,
                Entry::Vacant(e) => {
                    e.insert(Accum {
                        path: parent,
                        total: amount,
                    });
                    let pos = order[i + 1..]
                        .partition_point(|k| {
                            k.len() > parent_key.len()
                                || (k.len() == parent_key.len() && *k < parent_key)
                        })
                        + i
                        + 1;
                    order.insert(pos, parent_key);
                }
            }
        }
        i += 1;
    }

    order
        .into_iter()
        .filter_map(|key| totals.remove(&key))
        .map(|accum| DirectoryTotal {
            path: accum.path,
            total_size: accum.total,
        })
        .collect()
}

/// Immediate parent of a normalized path, as a string.
///
/// Returns `None` for filesystem roots and for paths with no parent
/// component; those contributions are skipped rather than errored.
fn parent_dir(path: &str) -> Option<String> {
    let parent = Path::new(path).parent()?;
    if parent.as_os_str().is_empty() {
        return None;
    }
    Some(parent.to_string_lossy().into_owned())
}

/// Map key matching the platform's path comparison semantics.
#[cfg(windows)]
fn fold_key(path: &str) -> String {
    path.to_lowercase()
}

#[cfg(not(windows))]
fn fold_key(path: &str) -> String {
    path.to_owned()
}

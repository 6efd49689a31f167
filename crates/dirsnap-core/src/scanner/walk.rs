/// Depth-first tree walker.
///
/// Two traversals of identical shape over the same root:
///
/// 1. *Count pass* — visits every reachable entry solely to size the
///    progress denominator. Retains nothing.
/// 2. *Collect pass* — same recursion, appending a [`FileRecord`] per file
///    and invoking the visit callback before each directory.
///
/// Both passes share one listing call and one skip policy, so a directory
/// that fails to enumerate is skipped identically in each pass and the
/// reported percentage stays within 0..=100 even when the filesystem
/// changes between passes (the clamp covers the residual race).
///
/// Error policy: a failed listing of any non-root directory aborts only
/// that subtree. The directory contributes nothing and the walk continues
/// with siblings and ancestors. Only a root that cannot be listed is fatal.
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

use crate::error::TraversalError;
use crate::model::FileRecord;
use crate::platform::{display_form, ListDir};
use crate::scanner::progress::sanitize_display;

/// Traversal state threaded explicitly through the collect pass.
///
/// Deliberately not global: the walker stays reentrant and testable.
struct WalkState {
    visited: u64,
    total: u64,
}

impl WalkState {
    fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        let pct = self.visited.saturating_mul(100) / self.total;
        pct.min(100) as u8
    }
}

/// Walk everything under `root`, returning the flat file list.
///
/// `root` must already be normalized (see
/// [`normalize_root`](crate::platform::normalize_root)); the walker itself
/// performs no path canonicalization, only child joins.
///
/// `on_visit` receives a sanitized display path and a progress percentage
/// before each directory is entered. It runs synchronously on the
/// traversal's only thread and must not block appreciably.
///
/// `cancel` is checked in the per-directory loop of both passes.
pub fn walk<L, F>(
    root: &Path,
    lister: &L,
    cancel: &AtomicBool,
    mut on_visit: F,
) -> Result<Vec<FileRecord>, TraversalError>
where
    L: ListDir,
    F: FnMut(&str, u8),
{
    let total = count_root(root, lister, cancel)?;

    let mut files = Vec::new();
    let mut state = WalkState { visited: 0, total };
    collect_root(root, lister, cancel, &mut state, &mut files, &mut on_visit)?;
    Ok(files)
}

/// Count pass entry point. Root enumeration failure is the only fatal
/// condition; everything below is counted best-effort.
fn count_root<L: ListDir>(
    root: &Path,
    lister: &L,
    cancel: &AtomicBool,
) -> Result<u64, TraversalError> {
    let children = lister.list(root).map_err(|source| {
        TraversalError::RootUnreachable {
            path: display_form(root).into(),
            source,
        }
    })?;

    if cancel.load(Ordering::Relaxed) {
        return Err(TraversalError::Cancelled);
    }

    let mut total = 0u64;
    for child in &children {
        total += 1;
        if child.is_dir {
            total += count_subtree(&root.join(&child.name), lister, cancel)?;
        }
    }
    Ok(total)
}

fn count_subtree<L: ListDir>(
    dir: &Path,
    lister: &L,
    cancel: &AtomicBool,
) -> Result<u64, TraversalError> {
    if cancel.load(Ordering::Relaxed) {
        return Err(TraversalError::Cancelled);
    }

    let children = match lister.list(dir) {
        Ok(children) => children,
        Err(err) => {
            debug!("count pass skipping {}: {err}", dir.display());
            return Ok(0);
        }
    };

    let mut total = 0u64;
    for child in &children {
        total += 1;
        if child.is_dir {
            total += count_subtree(&dir.join(&child.name), lister, cancel)?;
        }
    }
    Ok(total)
}

/// Collect pass entry point, mirroring [`count_root`]'s fatal policy.
fn collect_root<L, F>(
    root: &Path,
    lister: &L,
    cancel: &AtomicBool,
    state: &mut WalkState,
    files: &mut Vec<FileRecord>,
    on_visit: &mut F,
) -> Result<(), TraversalError>
where
    L: ListDir,
    F: FnMut(&str, u8),
{
    let children = lister.list(root).map_err(|source| {
        TraversalError::RootUnreachable {
            path: display_form(root).into(),
            source,
        }
    })?;

    if cancel.load(Ordering::Relaxed) {
        return Err(TraversalError::Cancelled);
    }

    on_visit(&sanitize_display(&display_form(root)), state.percent());

    for child in &children {
        state.visited += 1;
        let child_path = root.join(&child.name);
        if child.is_dir {
            collect_subtree(&child_path, lister, cancel, state, files, on_visit)?;
        } else {
            files.push(FileRecord {
                path: display_form(&child_path),
                size: child.size,
            });
        }
    }
    Ok(())
}

fn collect_subtree<L, F>(
    dir: &Path,
    lister: &L,
    cancel: &AtomicBool,
    state: &mut WalkState,
    files: &mut Vec<FileRecord>,
    on_visit: &mut F,
) -> Result<(), TraversalError>
where
    L: ListDir,
    F: FnMut(&str, u8),
{
    if cancel.load(Ordering::Relaxed) {
        return Err(TraversalError::Cancelled);
    }

    on_visit(&sanitize_display(&display_form(dir)), state.percent());

    let children = match lister.list(dir) {
        Ok(children) => children,
        Err(err) => {
            // Same skip policy as the count pass: this subtree simply
            // contributes nothing.
            debug!("collect pass skipping {}: {err}", dir.display());
            return Ok(());
        }
    };

    for child in &children {
        state.visited += 1;
        let child_path = dir.join(&child.name);
        if child.is_dir {
            collect_subtree(&child_path, lister, cancel, state, files, on_visit)?;
        } else {
            files.push(FileRecord {
                path: display_form(&child_path),
                size: child.size,
            });
        }
    }
    Ok(())
}

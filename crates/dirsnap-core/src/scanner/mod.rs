/// Scanner module — orchestrates filesystem scanning.
///
/// The walk itself is a plain single-threaded recursive descent: directory
/// enumeration is I/O-bound, and uncoordinated parallel traversal would
/// complicate the per-subtree error policy for little gain. [`scan`] runs
/// the whole pipeline (walk, aggregate, timestamp) synchronously on the
/// caller's thread; [`start_scan`] moves that same single-threaded walk
/// onto a background thread and bridges its progress callback into a
/// bounded channel for interactive frontends.
pub mod progress;
pub mod walk;

use progress::ScanProgress;

use chrono::Utc;
use crossbeam_channel::Receiver;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tracing::info;

use crate::analysis::aggregate;
use crate::error::TraversalError;
use crate::model::Snapshot;
use crate::platform::{display_form, normalize_root, OsLister};

/// Maximum number of progress messages that may queue up in the channel.
///
/// Visit messages beyond this are dropped rather than blocking the scan
/// thread; only the terminal message is delivered with a blocking send.
pub const PROGRESS_CHANNEL_CAPACITY: usize = 4_096;

/// Scan a directory tree and return the completed snapshot.
///
/// `on_progress` receives a sanitized display path and a percentage in
/// 0..=100 before each directory is entered. It is invoked synchronously
/// from the traversal thread and must not block appreciably.
///
/// Fails with [`TraversalError`] only if the root itself is inaccessible;
/// unreadable subtrees below the root are silently skipped.
pub fn scan<F>(root: &Path, on_progress: F) -> Result<Snapshot, TraversalError>
where
    F: FnMut(&str, u8),
{
    let cancel = AtomicBool::new(false);
    scan_with_cancel(root, &cancel, on_progress)
}

/// [`scan`] with an external cancellation flag.
///
/// The flag is checked in the per-directory loop of both traversal passes;
/// a cancelled scan returns [`TraversalError::Cancelled`] and no snapshot.
pub fn scan_with_cancel<F>(
    root: &Path,
    cancel: &AtomicBool,
    on_progress: F,
) -> Result<Snapshot, TraversalError>
where
    F: FnMut(&str, u8),
{
    let canon = normalize_root(root).map_err(|source| TraversalError::RootUnreachable {
        path: root.to_path_buf(),
        source,
    })?;
    let meta = std::fs::metadata(&canon).map_err(|source| TraversalError::RootUnreachable {
        path: root.to_path_buf(),
        source,
    })?;
    if !meta.is_dir() {
        return Err(TraversalError::NotADirectory {
            path: root.to_path_buf(),
        });
    }

    let root_path = display_form(&canon);
    info!("scanning {root_path}");

    let files = walk::walk(&canon, &OsLister, cancel, on_progress)?;
    let directories = aggregate(&files);

    info!(
        "scan of {root_path} complete: {} files, {} directories",
        files.len(),
        directories.len()
    );

    Ok(Snapshot {
        root_path,
        scan_timestamp: Utc::now(),
        files,
        directories,
    })
}

/// Handle to a running or completed background scan. Allows cancellation
/// and receiving progress updates.
pub struct ScanHandle {
    /// Receiver for progress updates from the scan thread. The terminal
    /// message carries the snapshot itself.
    pub progress_rx: Receiver<ScanProgress>,
    /// Flag to request cancellation.
    cancel_flag: Arc<AtomicBool>,
    /// Join handle for the scan thread.
    _thread: Option<thread::JoinHandle<()>>,
}

impl ScanHandle {
    /// Request the scan to stop as soon as possible.
    pub fn cancel(&self) {
        self.cancel_flag.store(true, Ordering::Relaxed);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel_flag.load(Ordering::Relaxed)
    }
}

/// Start a scan on a background thread.
///
/// Returns a `ScanHandle` for receiving progress and requesting
/// cancellation. The walk stays single-threaded; only the thread it runs
/// on changes.
pub fn start_scan(root_path: PathBuf) -> ScanHandle {
    let (progress_tx, progress_rx) =
        crossbeam_channel::bounded::<ScanProgress>(PROGRESS_CHANNEL_CAPACITY);
    let cancel_flag = Arc::new(AtomicBool::new(false));
    let cancel_clone = cancel_flag.clone();

    let thread = thread::Builder::new()
        .name("dirsnap-scanner".into())
        .spawn(move || {
            let start = Instant::now();
            let result = scan_with_cancel(&root_path, &cancel_clone, |display_path, percent| {
                // Lossy on purpose: a full channel drops the update instead
                // of stalling the traversal.
                let _ = progress_tx.try_send(ScanProgress::Visit {
                    display_path: display_path.to_owned(),
                    percent,
                });
            });

            let terminal = match result {
                Ok(snapshot) => ScanProgress::Complete {
                    snapshot,
                    duration: start.elapsed(),
                },
                Err(TraversalError::Cancelled) => ScanProgress::Cancelled,
                Err(error) => ScanProgress::Failed { error },
            };
            let _ = progress_tx.send(terminal);
        })
        .expect("failed to spawn scanner thread");

    ScanHandle {
        progress_rx,
        cancel_flag,
        _thread: Some(thread),
    }
}

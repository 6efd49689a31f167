/// Scan progress reporting — lightweight messages sent from the scan
/// thread, plus the display sanitization applied to every path before it
/// reaches a progress consumer.

use std::time::Duration;

use crate::error::TraversalError;
use crate::model::Snapshot;

/// Placeholder substituted for characters a terminal cannot render.
const PLACEHOLDER: char = '?';

/// Progress updates sent from the scan thread.
///
/// `Visit` messages are advisory and may be dropped under backpressure;
/// exactly one terminal message (`Complete`, `Failed`, or `Cancelled`) is
/// always delivered.
#[derive(Debug)]
pub enum ScanProgress {
    /// The walker is about to enter a directory.
    Visit {
        /// Sanitized path, safe to print as-is.
        display_path: String,
        /// 0..=100, floor(visited * 100 / total) from the count pass.
        percent: u8,
    },
    /// Scanning completed; the finished snapshot is attached.
    Complete {
        snapshot: Snapshot,
        duration: Duration,
    },
    /// Scanning failed before producing a snapshot.
    Failed { error: TraversalError },
    /// Scan was cancelled by the caller.
    Cancelled,
}

/// Replace characters the target display cannot render with a placeholder.
///
/// This runs in the core, not the display layer, so the sanitized form
/// matches exactly what was encountered during traversal. Control
/// characters (including DEL) are replaced; printable Unicode passes
/// through.
pub fn sanitize_display(path: &str) -> String {
    path.chars()
        .map(|c| if c.is_control() { PLACEHOLDER } else { c })
        .collect()
}

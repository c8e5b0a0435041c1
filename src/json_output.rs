//! JSON output for GUI integration
//!
//! When --json-progress is enabled, plan, progress and status information is
//! emitted as JSON lines to stdout, suppressing all other output.

use serde::Serialize;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::slicing::{PlanPreview, SlicePlan, SliceRect};

/// Last progress emission timestamp (milliseconds since epoch)
/// Used for throttling progress updates to ~25 FPS (40ms between updates)
static LAST_PROGRESS_MS: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum JsonMessage<'a> {
    /// Computed plan, sent before export starts
    Plan {
        plan: &'a SlicePlan,
        preview: &'a PlanPreview,
    },
    /// Progress update
    Progress {
        current: usize,
        total: usize,
        message: String,
    },
    /// One slice written
    SliceSaved {
        index: usize,
        path: String,
        rect: SliceRect,
    },
    /// Export summary
    Summary {
        slices: usize,
        output_dir: String,
        dry_run: bool,
        duration_secs: f64,
    },
    /// Fatal error
    Error { message: String },
}

impl JsonMessage<'_> {
    /// Render as a single JSON line
    pub fn to_line(&self) -> Option<String> {
        serde_json::to_string(self).ok()
    }

    /// Emit JSON message to stdout
    pub fn emit(&self) {
        if let Some(json) = self.to_line() {
            println!("{}", json);
        }
    }

    pub fn plan(plan: &SlicePlan, preview: &PlanPreview) {
        JsonMessage::Plan { plan, preview }.emit();
    }

    /// Create and emit progress message (throttled to ~25 FPS for smooth GUI updates)
    ///
    /// The final progress (current == total) is always emitted to ensure 100% completion.
    pub fn progress(current: usize, total: usize, message: impl Into<String>) {
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        let last_ms = LAST_PROGRESS_MS.load(Ordering::Relaxed);

        if now_ms.saturating_sub(last_ms) >= 40 || current == total {
            LAST_PROGRESS_MS.store(now_ms, Ordering::Relaxed);
            JsonMessage::Progress {
                current,
                total,
                message: message.into(),
            }
            .emit();
        }
    }

    pub fn slice_saved(index: usize, path: &Path, rect: SliceRect) {
        JsonMessage::SliceSaved {
            index,
            path: path.display().to_string(),
            rect,
        }
        .emit();
    }

    pub fn summary(slices: usize, output_dir: &Path, dry_run: bool, duration_secs: f64) {
        JsonMessage::Summary {
            slices,
            output_dir: output_dir.display().to_string(),
            dry_run,
            duration_secs,
        }
        .emit();
    }

    pub fn error(message: impl Into<String>) {
        JsonMessage::Error {
            message: message.into(),
        }
        .emit();
    }
}

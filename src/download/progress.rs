//! Per-file download state and progress reporting hooks.

use std::path::PathBuf;
use std::sync::Mutex;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

/// Where a single file's download stands.
///
/// `Pending -> InProgress -> Completed | Failed`, or `Pending -> Skipped`
/// when the overwrite policy leaves an existing file alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Pending,
    InProgress { transferred: u64, total: u64 },
    Completed { path: PathBuf, bytes: u64 },
    Skipped { path: PathBuf },
    Failed { reason: String },
}

impl DownloadOutcome {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed { .. } | Self::Skipped { .. } | Self::Failed { .. }
        )
    }

    /// Completion percentage for an in-progress transfer.
    #[must_use]
    pub fn percent(&self) -> Option<u8> {
        match self {
            Self::InProgress { transferred, total } => Some(percent_of(*transferred, *total)),
            Self::Completed { .. } => Some(100),
            _ => None,
        }
    }
}

/// Integer percentage, clamped to 100. A zero total counts as complete.
#[must_use]
pub fn percent_of(transferred: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let pct = (u128::from(transferred) * 100 / u128::from(total)).min(100);
    u8::try_from(pct).unwrap_or(100)
}

/// Receives progress notifications for each file written.
///
/// `on_progress` fires once per chunk with the cumulative byte count, which
/// never decreases and never exceeds `total`.
pub trait ProgressObserver: Send + Sync {
    fn on_start(&self, _name: &str, _total: u64) {}

    fn on_progress(&self, name: &str, transferred: u64, total: u64);

    fn on_finish(&self, _name: &str, _outcome: &DownloadOutcome) {}
}

/// Discards all notifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&self, _name: &str, _transferred: u64, _total: u64) {}
}

/// Logs progress through `tracing` every `step` percent.
#[derive(Debug)]
pub struct LogProgress {
    step: u8,
    last_logged: Mutex<Option<u8>>,
}

impl Default for LogProgress {
    fn default() -> Self {
        Self::new(10)
    }
}

impl LogProgress {
    #[must_use]
    pub fn new(step: u8) -> Self {
        Self {
            step: step.clamp(1, 100),
            last_logged: Mutex::new(None),
        }
    }
}

impl ProgressObserver for LogProgress {
    fn on_start(&self, name: &str, total: u64) {
        if let Ok(mut last) = self.last_logged.lock() {
            *last = None;
        }
        info!(file = name, bytes = total, "download started");
    }

    fn on_progress(&self, name: &str, transferred: u64, total: u64) {
        let pct = percent_of(transferred, total);
        let bucket = pct - pct % self.step;
        let Ok(mut last) = self.last_logged.lock() else {
            return;
        };
        if *last != Some(bucket) {
            *last = Some(bucket);
            info!(file = name, transferred, total, percent = pct, "download progress");
        } else {
            debug!(file = name, transferred, total, "chunk written");
        }
    }

    fn on_finish(&self, name: &str, outcome: &DownloadOutcome) {
        match outcome {
            DownloadOutcome::Completed { path, bytes } => {
                info!(file = name, path = %path.display(), bytes, "download finished");
            }
            DownloadOutcome::Skipped { path } => {
                info!(file = name, path = %path.display(), "download skipped");
            }
            DownloadOutcome::Failed { reason } => {
                info!(file = name, reason = %reason, "download failed");
            }
            DownloadOutcome::Pending | DownloadOutcome::InProgress { .. } => {}
        }
    }
}

/// A progress notification forwarded over a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub name: String,
    pub outcome: DownloadOutcome,
}

/// Forwards every notification as a [`ProgressEvent`]; a closed receiver is ignored.
impl ProgressObserver for UnboundedSender<ProgressEvent> {
    fn on_start(&self, name: &str, total: u64) {
        let _ = self.send(ProgressEvent {
            name: name.to_string(),
            outcome: DownloadOutcome::InProgress {
                transferred: 0,
                total,
            },
        });
    }

    fn on_progress(&self, name: &str, transferred: u64, total: u64) {
        let _ = self.send(ProgressEvent {
            name: name.to_string(),
            outcome: DownloadOutcome::InProgress { transferred, total },
        });
    }

    fn on_finish(&self, name: &str, outcome: &DownloadOutcome) {
        let _ = self.send(ProgressEvent {
            name: name.to_string(),
            outcome: outcome.clone(),
        });
    }
}

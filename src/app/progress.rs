//! Progress bar rendering for download runs.

use std::sync::Mutex;

use gdown_core::{DownloadOutcome, ProgressObserver};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

const BAR_TEMPLATE: &str = "{msg} [{bar:40.cyan/blue}] | {percent:>3}% ({bytes}/{total_bytes})";

/// Draws one bar per file on stderr.
pub(crate) struct BarProgress {
    current: Mutex<Option<ProgressBar>>,
    draw_target: fn() -> ProgressDrawTarget,
}

impl BarProgress {
    pub(crate) fn new() -> Self {
        Self {
            current: Mutex::new(None),
            draw_target: ProgressDrawTarget::stderr,
        }
    }

    #[cfg(test)]
    fn hidden() -> Self {
        Self {
            current: Mutex::new(None),
            draw_target: ProgressDrawTarget::hidden,
        }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::with_template(BAR_TEMPLATE)
            .map(|style| style.progress_chars("=> "))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
    }
}

impl ProgressObserver for BarProgress {
    fn on_start(&self, name: &str, total: u64) {
        let bar = ProgressBar::with_draw_target(Some(total), (self.draw_target)());
        bar.set_style(Self::style());
        bar.set_message(name.to_string());
        if let Ok(mut current) = self.current.lock()
            && let Some(previous) = current.replace(bar)
        {
            previous.abandon();
        }
    }

    fn on_progress(&self, _name: &str, transferred: u64, _total: u64) {
        if let Ok(current) = self.current.lock()
            && let Some(bar) = current.as_ref()
        {
            bar.set_position(transferred);
        }
    }

    fn on_finish(&self, name: &str, outcome: &DownloadOutcome) {
        let Ok(mut current) = self.current.lock() else {
            return;
        };
        let Some(bar) = current.take() else {
            return;
        };
        match outcome {
            DownloadOutcome::Completed { .. } => bar.finish(),
            DownloadOutcome::Failed { .. } => {
                bar.abandon_with_message(format!("{name} (failed)"));
            }
            _ => bar.finish_and_clear(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_bar_tracks_position_and_clears_on_finish() {
        let progress = BarProgress::hidden();
        progress.on_start("a.bin", 100);
        progress.on_progress("a.bin", 40, 100);
        {
            let current = progress.current.lock().unwrap();
            let bar = current.as_ref().unwrap();
            assert_eq!(bar.position(), 40);
            assert_eq!(bar.length(), Some(100));
        }
        progress.on_finish(
            "a.bin",
            &DownloadOutcome::Completed {
                path: PathBuf::from("a.bin"),
                bytes: 100,
            },
        );
        assert!(progress.current.lock().unwrap().is_none());
    }

    #[test]
    fn test_finish_without_start_is_noop() {
        let progress = BarProgress::hidden();
        progress.on_progress("a.bin", 1, 2);
        progress.on_finish(
            "a.bin",
            &DownloadOutcome::Failed {
                reason: "no url".into(),
            },
        );
        assert!(progress.current.lock().unwrap().is_none());
    }

    #[test]
    fn test_style_template_is_valid() {
        assert!(ProgressStyle::with_template(BAR_TEMPLATE).is_ok());
    }
}

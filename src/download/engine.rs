//! Batch downloader for resolved entries.
//!
//! Files are fetched one at a time, in the order given. Each file's failure
//! is recorded in the [`DownloadReport`] and never stops its siblings.
//! Expanded folders are written into a subdirectory named after the folder;
//! folders the walker left unexpanded are reported as skipped.
//!
//! # Example
//!
//! ```no_run
//! use gdown_core::{
//!     ClientOptions, ContentFetcher, Downloader, Entry, LogProgress, OverwritePolicy,
//!     StreamWriter, build_http_client,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = build_http_client(ClientOptions::default(), false)?;
//! let downloader = Downloader::new(
//!     ContentFetcher::new(client),
//!     StreamWriter::new("./downloads"),
//!     OverwritePolicy::Skip,
//! );
//! let entries = vec![Entry::file(
//!     "1NuuL9qNo5BJYnfNqN_lxBOUN0P-AociQ",
//!     "lecture-01.mp4",
//!     "video/mp4",
//!     Some("https://drive.google.com/uc?id=1NuuL9qNo5BJYnfNqN_lxBOUN0P-AociQ&export=download".into()),
//! )];
//! let report = downloader.download_all(&entries, &LogProgress::default()).await;
//! println!("Completed: {}, Failed: {}", report.completed(), report.failed());
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use futures_util::future::BoxFuture;
use tracing::{info, instrument, warn};

use super::error::DownloadError;
use super::fetcher::ContentFetcher;
use super::filename::{OverwritePolicy, destination_file_name, resolve_destination};
use super::progress::{DownloadOutcome, ProgressObserver};
use super::writer::StreamWriter;
use crate::entry::Entry;

/// The final outcome of one entry in a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    pub id: String,
    pub name: String,
    pub outcome: DownloadOutcome,
}

/// Per-entry outcomes of a batch run, in download order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadReport {
    outcomes: Vec<FileOutcome>,
}

impl DownloadReport {
    #[must_use]
    pub fn outcomes(&self) -> &[FileOutcome] {
        &self.outcomes
    }

    #[must_use]
    pub fn completed(&self) -> usize {
        self.count(|o| matches!(o, DownloadOutcome::Completed { .. }))
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, DownloadOutcome::Failed { .. }))
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, DownloadOutcome::Skipped { .. }))
    }

    /// Sum of bytes written by completed downloads.
    #[must_use]
    pub fn bytes_written(&self) -> u64 {
        self.outcomes
            .iter()
            .map(|f| match f.outcome {
                DownloadOutcome::Completed { bytes, .. } => bytes,
                _ => 0,
            })
            .sum()
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    fn count(&self, predicate: impl Fn(&DownloadOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|f| predicate(&f.outcome)).count()
    }

    fn record(&mut self, entry: &Entry, outcome: DownloadOutcome) {
        self.outcomes.push(FileOutcome {
            id: entry.id().to_string(),
            name: entry.name().to_string(),
            outcome,
        });
    }
}

/// Fetches entries and writes them under the writer's output directory.
#[derive(Debug, Clone)]
pub struct Downloader {
    fetcher: ContentFetcher,
    writer: StreamWriter,
    overwrite: OverwritePolicy,
}

impl Downloader {
    #[must_use]
    pub fn new(fetcher: ContentFetcher, writer: StreamWriter, overwrite: OverwritePolicy) -> Self {
        Self {
            fetcher,
            writer,
            overwrite,
        }
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        self.writer.output_dir()
    }

    /// Downloads one file entry into the output directory.
    ///
    /// Always returns a terminal outcome; errors are folded into
    /// [`DownloadOutcome::Failed`].
    pub async fn download_entry(
        &self,
        entry: &Entry,
        observer: &dyn ProgressObserver,
    ) -> DownloadOutcome {
        self.download_into(entry, self.writer.output_dir(), observer)
            .await
    }

    /// Downloads every file in `entries`, descending into expanded folders.
    #[instrument(skip(self, entries, observer), fields(count = entries.len()))]
    pub async fn download_all(
        &self,
        entries: &[Entry],
        observer: &dyn ProgressObserver,
    ) -> DownloadReport {
        let mut report = DownloadReport::default();
        self.download_level(
            entries,
            self.writer.output_dir().to_path_buf(),
            observer,
            &mut report,
        )
        .await;

        info!(
            completed = report.completed(),
            failed = report.failed(),
            skipped = report.skipped(),
            bytes = report.bytes_written(),
            "batch finished"
        );
        report
    }

    fn download_level<'a>(
        &'a self,
        entries: &'a [Entry],
        dir: PathBuf,
        observer: &'a dyn ProgressObserver,
        report: &'a mut DownloadReport,
    ) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            for entry in entries {
                if !entry.is_folder() {
                    let outcome = self.download_into(entry, &dir, observer).await;
                    report.record(entry, outcome);
                    continue;
                }

                match entry.children() {
                    Some(children) => {
                        let subdir = dir.join(destination_file_name(entry.name()));
                        info!(folder = entry.name(), path = %subdir.display(), "descending into folder");
                        self.download_level(children, subdir, observer, report)
                            .await;
                    }
                    None => {
                        info!(folder = entry.name(), "folder not expanded; skipping");
                        let outcome = DownloadOutcome::Skipped {
                            path: dir.join(destination_file_name(entry.name())),
                        };
                        observer.on_finish(entry.name(), &outcome);
                        report.record(entry, outcome);
                    }
                }
            }
        })
    }

    #[instrument(skip(self, entry, dir, observer), fields(file = %entry.name(), id = %entry.id()))]
    async fn download_into(
        &self,
        entry: &Entry,
        dir: &Path,
        observer: &dyn ProgressObserver,
    ) -> DownloadOutcome {
        let outcome = match self.try_download(entry, dir, observer).await {
            Ok(outcome) => outcome,
            Err(error) => {
                warn!(error = %error, partial = error.leaves_partial_file(), "download failed");
                DownloadOutcome::Failed {
                    reason: error.to_string(),
                }
            }
        };
        observer.on_finish(entry.name(), &outcome);
        outcome
    }

    async fn try_download(
        &self,
        entry: &Entry,
        dir: &Path,
        observer: &dyn ProgressObserver,
    ) -> Result<DownloadOutcome, DownloadError> {
        let Some(path) = resolve_destination(dir, entry.name(), self.overwrite) else {
            let path = dir.join(destination_file_name(entry.name()));
            info!(path = %path.display(), "destination exists; skipping");
            return Ok(DownloadOutcome::Skipped { path });
        };

        let content = self.fetcher.open_stream(entry).await?;
        let total = content.total_length();
        let written = self
            .writer
            .write_to_path(content.into_stream(), total, &path, observer)
            .await?;

        info!(path = %written.path.display(), bytes = written.bytes, "download complete");
        Ok(DownloadOutcome::Completed {
            path: written.path,
            bytes: written.bytes,
        })
    }
}

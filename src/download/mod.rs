//! Content fetching and streaming file writes.
//!
//! [`ContentFetcher`] turns a file entry into an open byte stream, following
//! one HTML confirmation page if the content URL serves one. [`StreamWriter`]
//! writes that stream to disk chunk by chunk while reporting progress, and
//! [`Downloader`] drives both over a batch of entries.

mod engine;
mod error;
mod fetcher;
mod filename;
mod interstitial;
mod progress;
mod writer;

pub use engine::{DownloadReport, Downloader, FileOutcome};
pub use error::DownloadError;
pub use fetcher::{ContentFetcher, FetchedContent};
pub use filename::{OverwritePolicy, destination_file_name, resolve_destination};
pub use interstitial::{DEFAULT_DOWNLOAD_FORM_ID, DownloadFormExtractor, InterstitialExtractor};
pub use progress::{
    DownloadOutcome, LogProgress, NoProgress, ProgressEvent, ProgressObserver, percent_of,
};
pub use writer::{StreamWriter, WrittenFile};

// Note: no module-local Result alias; signatures spell out `Result<T, DownloadError>`.

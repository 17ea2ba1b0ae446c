//! gdown Core Library
//!
//! This library crawls remote drive folders and streams their files to local
//! storage with byte-level progress reporting.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`remote`] - Directory service contract and the Google Drive v3 implementation
//! - [`entry`] - In-memory tree of remote files and folders
//! - [`walker`] - Folder expansion with filter and depth policy
//! - [`resolver`] - Single file identifier to downloadable entry
//! - [`download`] - Interstitial-aware content fetching and streaming writes
//! - [`http_client`] - Shared HTTP client construction policy

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod download;
pub mod entry;
pub mod http_client;
pub mod remote;
pub mod resolver;
#[cfg(test)]
pub mod test_support;
pub(crate) mod user_agent;
pub mod walker;

// Re-export commonly used types
pub use download::{
    ContentFetcher, DownloadError, DownloadFormExtractor, DownloadOutcome, DownloadReport,
    Downloader, FetchedContent, FileOutcome, InterstitialExtractor, LogProgress, NoProgress,
    OverwritePolicy, ProgressEvent, ProgressObserver, StreamWriter, WrittenFile,
};
pub use entry::{Entry, EntryKind};
pub use http_client::{ClientOptions, build_http_client};
pub use remote::{
    Credentials, DirectoryService, DriveService, FOLDER_MIME_TYPE, RemoteFile, ServiceError,
};
pub use resolver::EntryResolver;
pub use walker::{DEFAULT_MAX_DEPTH, ListOptions, TreeWalker};

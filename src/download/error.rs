//! Error types for the download module.
//!
//! Every variant is file-level: the batch downloader records it as a failed
//! outcome for that file and moves on to the next sibling.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while fetching or writing a single file.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The entry has no content URL to fetch.
    #[error("no download URL for {name}")]
    MissingUrl {
        /// Remote file name.
        name: String,
    },

    /// The content URL answered with an HTML page that has no download form.
    #[error("confirmation page for {name} has no download form ({url})")]
    NoDownloadForm {
        /// Remote file name.
        name: String,
        /// URL of the confirmation page.
        url: String,
    },

    /// The resolved response did not declare a content length.
    #[error("unknown content length for {name} ({url})")]
    UnknownLength {
        /// Remote file name.
        name: String,
        /// URL of the resolved response.
        url: String,
    },

    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error downloading {url}: {source}")]
    Network {
        /// The URL that failed to download.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout downloading {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// HTTP error response (4xx client errors, 5xx server errors).
    #[error("HTTP {status} downloading {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The content URL or form target is malformed.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },

    /// The source byte stream failed mid-transfer. The partial file is kept.
    #[error("stream interrupted writing {path}: {source}")]
    Stream {
        /// Destination path holding the partial content.
        path: PathBuf,
        /// The underlying stream error.
        #[source]
        source: std::io::Error,
    },

    /// File system error during download (create directory, create file, write).
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The stream delivered more bytes than the declared content length.
    #[error(
        "stream for {path} exceeded declared length: expected {expected_bytes} bytes, got at least {actual_bytes}"
    )]
    LengthExceeded {
        /// Destination path.
        path: PathBuf,
        /// Declared size in bytes.
        expected_bytes: u64,
        /// Bytes received when the overflow was detected.
        actual_bytes: u64,
    },

    /// The stream ended cleanly before the declared content length.
    #[error("stream for {path} ended early: expected {expected_bytes} bytes, got {actual_bytes}")]
    Truncated {
        /// Destination path holding the partial content.
        path: PathBuf,
        /// Declared size in bytes.
        expected_bytes: u64,
        /// Bytes written before the stream ended.
        actual_bytes: u64,
    },
}

impl DownloadError {
    /// Creates a missing URL error.
    pub fn missing_url(name: impl Into<String>) -> Self {
        Self::MissingUrl { name: name.into() }
    }

    /// Creates a missing download form error.
    pub fn no_download_form(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self::NoDownloadForm {
            name: name.into(),
            url: url.into(),
        }
    }

    /// Creates an unknown length error.
    pub fn unknown_length(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self::UnknownLength {
            name: name.into(),
            url: url.into(),
        }
    }

    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Maps a request error, promoting timeouts to [`DownloadError::Timeout`].
    pub fn from_request(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::timeout(url)
        } else {
            Self::network(url, source)
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Creates a stream interruption error.
    pub fn stream(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Stream {
            path: path.into(),
            source,
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a length overflow error.
    pub fn length_exceeded(path: impl Into<PathBuf>, expected_bytes: u64, actual_bytes: u64) -> Self {
        Self::LengthExceeded {
            path: path.into(),
            expected_bytes,
            actual_bytes,
        }
    }

    /// Creates a short stream error.
    pub fn truncated(path: impl Into<PathBuf>, expected_bytes: u64, actual_bytes: u64) -> Self {
        Self::Truncated {
            path: path.into(),
            expected_bytes,
            actual_bytes,
        }
    }

    /// Returns true when bytes may have reached the destination file.
    #[must_use]
    pub fn leaves_partial_file(&self) -> bool {
        matches!(
            self,
            Self::Stream { .. }
                | Self::Io { .. }
                | Self::LengthExceeded { .. }
                | Self::Truncated { .. }
        )
    }
}

// No `From<reqwest::Error>` / `From<std::io::Error>`: every variant needs the
// url or path, which the source errors do not carry.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_url_display() {
        let error = DownloadError::missing_url("episode-01.mkv");
        assert!(error.to_string().contains("episode-01.mkv"));
    }

    #[test]
    fn test_no_download_form_display() {
        let error = DownloadError::no_download_form("big.zip", "https://drive.google.com/uc?id=1");
        let msg = error.to_string();
        assert!(msg.contains("no download form"), "Expected reason in: {msg}");
        assert!(msg.contains("big.zip"), "Expected name in: {msg}");
    }

    #[test]
    fn test_unknown_length_display() {
        let error = DownloadError::unknown_length("big.zip", "https://example.com/dl");
        assert!(error.to_string().contains("unknown content length"));
    }

    #[test]
    fn test_http_status_display() {
        let error = DownloadError::http_status("https://example.com/file.pdf", 404);
        let msg = error.to_string();
        assert!(msg.contains("404"), "Expected '404' in: {msg}");
        assert!(msg.contains("https://example.com/file.pdf"), "Expected URL in: {msg}");
    }

    #[test]
    fn test_stream_error_keeps_partial_file() {
        let io_error = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "connection reset");
        let error = DownloadError::stream(PathBuf::from("/tmp/a.bin"), io_error);
        assert!(error.leaves_partial_file());
        assert!(error.to_string().contains("/tmp/a.bin"));
    }

    #[test]
    fn test_pre_write_errors_leave_no_file() {
        assert!(!DownloadError::missing_url("a").leaves_partial_file());
        assert!(!DownloadError::no_download_form("a", "u").leaves_partial_file());
        assert!(!DownloadError::unknown_length("a", "u").leaves_partial_file());
    }

    #[test]
    fn test_length_exceeded_display() {
        let error = DownloadError::length_exceeded(PathBuf::from("/tmp/a.bin"), 10, 12);
        let msg = error.to_string();
        assert!(msg.contains("expected 10"), "Expected declared size in: {msg}");
        assert!(msg.contains("12"), "Expected actual size in: {msg}");
    }

    #[test]
    fn test_truncated_display_and_partial_file() {
        let error = DownloadError::truncated(PathBuf::from("/tmp/a.bin"), 1000, 300);
        let msg = error.to_string();
        assert!(msg.contains("ended early"), "Expected reason in: {msg}");
        assert!(msg.contains("1000") && msg.contains("300"), "Expected sizes in: {msg}");
        assert!(error.leaves_partial_file());
    }
}

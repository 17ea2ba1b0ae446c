//! Error types for directory service operations.

use thiserror::Error;

/// The remote directory service could not answer a listing or metadata query.
///
/// Any of these aborts traversal of the affected folder; callers never see a
/// partial listing.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Transport-level failure (DNS, connection refused, TLS, timeout).
    #[error("directory service unreachable for {operation} '{target}': {source}")]
    Network {
        /// Operation being performed (`list` or `get`).
        operation: &'static str,
        /// Folder or file identifier.
        target: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a non-success status.
    #[error("directory service returned HTTP {status} for {operation} '{target}'")]
    HttpStatus {
        /// Operation being performed.
        operation: &'static str,
        /// Folder or file identifier.
        target: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The response body could not be decoded.
    #[error("directory service sent an unreadable response for {operation} '{target}': {source}")]
    Decode {
        /// Operation being performed.
        operation: &'static str,
        /// Folder or file identifier.
        target: String,
        /// The underlying decode error.
        #[source]
        source: reqwest::Error,
    },

    /// The response decoded but lacked the field carrying the result.
    #[error("directory service response for {operation} '{target}' has no `{field}` field")]
    MissingField {
        /// Operation being performed.
        operation: &'static str,
        /// Folder or file identifier.
        target: String,
        /// Name of the absent field.
        field: &'static str,
    },

    /// The service base URL could not be combined with the request path.
    #[error("invalid directory service URL: {url}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
    },
}

impl ServiceError {
    /// Creates a network error.
    pub fn network(operation: &'static str, target: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            operation,
            target: target.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(operation: &'static str, target: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            operation,
            target: target.into(),
            status,
        }
    }

    /// Creates a decode error.
    pub fn decode(operation: &'static str, target: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Decode {
            operation,
            target: target.into(),
            source,
        }
    }

    /// Creates a missing-field error.
    pub fn missing_field(
        operation: &'static str,
        target: impl Into<String>,
        field: &'static str,
    ) -> Self {
        Self::MissingField {
            operation,
            target: target.into(),
            field,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }
}

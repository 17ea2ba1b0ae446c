//! Shared HTTP client construction policy.
//!
//! The directory service and the content fetcher both build their clients
//! here so user-agent and timeout handling stay consistent. Timeouts are off
//! unless the caller opts in.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::user_agent;

/// Network policy injected by the driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientOptions {
    /// Connect timeout; `None` waits indefinitely.
    pub connect_timeout: Option<Duration>,
    /// Whole-request timeout, including body streaming; `None` waits indefinitely.
    pub read_timeout: Option<Duration>,
}

impl ClientOptions {
    /// Builds options from optional second counts (CLI/config form).
    #[must_use]
    pub fn from_secs(connect_timeout_secs: Option<u64>, read_timeout_secs: Option<u64>) -> Self {
        Self {
            connect_timeout: connect_timeout_secs.map(Duration::from_secs),
            read_timeout: read_timeout_secs.map(Duration::from_secs),
        }
    }
}

/// Builds a client with the crate user agent and the given timeouts.
///
/// `decompress` toggles transparent gzip decoding. Content downloads turn it
/// off so the declared `Content-Length` matches the bytes on disk.
///
/// # Errors
///
/// Returns the underlying [`reqwest::Error`] if the TLS backend or system
/// configuration cannot be initialized.
pub fn build_http_client(options: ClientOptions, decompress: bool) -> Result<Client, reqwest::Error> {
    debug!(?options, decompress, "building HTTP client");
    let mut builder = Client::builder()
        .user_agent(user_agent::default_user_agent())
        .gzip(decompress);
    if let Some(timeout) = options.connect_timeout {
        builder = builder.connect_timeout(timeout);
    }
    if let Some(timeout) = options.read_timeout {
        builder = builder.timeout(timeout);
    }
    builder.build()
}

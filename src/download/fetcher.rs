//! Opens the content stream for a file entry.
//!
//! A GET on the entry's content URL either returns the file directly or an
//! HTML confirmation page. In the second case the page's download form is
//! submitted with exactly one POST and that response is used as-is, whatever
//! its content type.

use std::sync::Arc;

use futures_util::Stream;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, Response};
use tracing::{debug, info, instrument};
use url::Url;

use super::error::DownloadError;
use super::interstitial::{DownloadFormExtractor, InterstitialExtractor};
use crate::entry::Entry;

/// An open response body with a known total length.
#[derive(Debug)]
pub struct FetchedContent {
    total_length: u64,
    url: String,
    response: Response,
}

impl FetchedContent {
    /// Declared size in bytes.
    #[must_use]
    pub fn total_length(&self) -> u64 {
        self.total_length
    }

    /// Final URL the content came from, after redirects and form submission.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Consumes the response into a lazy, finite chunk stream.
    pub fn into_stream(self) -> impl Stream<Item = Result<impl AsRef<[u8]>, reqwest::Error>> + Send {
        self.response.bytes_stream()
    }
}

/// Issues content requests and resolves confirmation pages.
#[derive(Debug, Clone)]
pub struct ContentFetcher {
    client: Client,
    extractor: Arc<dyn InterstitialExtractor>,
}

impl ContentFetcher {
    /// Creates a fetcher that recognizes `<form id="download-form">` pages.
    ///
    /// The client should have decompression disabled so the declared length
    /// matches the bytes read from the stream.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self::with_extractor(client, Arc::new(DownloadFormExtractor::default()))
    }

    #[must_use]
    pub fn with_extractor(client: Client, extractor: Arc<dyn InterstitialExtractor>) -> Self {
        Self { client, extractor }
    }

    /// Requests `entry`'s content and returns its stream and declared length.
    ///
    /// # Errors
    ///
    /// - [`DownloadError::MissingUrl`] if the entry has no content URL
    /// - [`DownloadError::NoDownloadForm`] if an HTML page lacks the download form
    /// - [`DownloadError::UnknownLength`] if the final response has no Content-Length
    /// - [`DownloadError::HttpStatus`], [`DownloadError::Network`] or
    ///   [`DownloadError::Timeout`] for request failures
    #[instrument(skip(self, entry), fields(file = %entry.name()))]
    pub async fn open_stream(&self, entry: &Entry) -> Result<FetchedContent, DownloadError> {
        let Some(content_url) = entry.content_url() else {
            return Err(DownloadError::missing_url(entry.name()));
        };
        let url = Url::parse(content_url).map_err(|_| DownloadError::invalid_url(content_url))?;

        let first = self.send(Method::GET, url).await?;
        let response = if self.extractor.is_interstitial(content_type(first.headers())) {
            let page_url = first.url().clone();
            debug!(url = %page_url, "received confirmation page");
            let html = first
                .text()
                .await
                .map_err(|e| DownloadError::from_request(page_url.as_str(), e))?;
            let Some(target) = self.extractor.extract_target(&html, &page_url) else {
                return Err(DownloadError::no_download_form(entry.name(), page_url.as_str()));
            };
            info!(target = %target, "submitting download form");
            self.send(Method::POST, target).await?
        } else {
            first
        };

        let final_url = response.url().to_string();
        let Some(total_length) = declared_length(response.headers()) else {
            return Err(DownloadError::unknown_length(entry.name(), final_url));
        };
        info!(
            url = %final_url,
            bytes = total_length,
            megabytes = format_args!("{:.2}", bytes_to_megabytes(total_length)),
            "content stream opened"
        );

        Ok(FetchedContent {
            total_length,
            url: final_url,
            response,
        })
    }

    async fn send(&self, method: Method, url: Url) -> Result<Response, DownloadError> {
        let request = self.client.request(method.clone(), url.clone());
        let request = if method == Method::POST {
            request.header(CONTENT_LENGTH, HeaderValue::from_static("0"))
        } else {
            request
        };
        let response = request
            .send()
            .await
            .map_err(|e| DownloadError::from_request(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::http_status(url.as_str(), status.as_u16()));
        }
        Ok(response)
    }
}

fn content_type(headers: &HeaderMap) -> Option<&str> {
    headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
}

/// Parses the Content-Length header, if present and numeric.
pub(crate) fn declared_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
}

#[allow(clippy::cast_precision_loss)]
fn bytes_to_megabytes(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

//! Google Drive v3 implementation of [`DirectoryService`].
//!
//! Listing uses `files.list` with a `'<id>' in parents` query and follows
//! `nextPageToken` until the service stops returning one. Credentials are
//! supplied by the caller; token acquisition happens outside this crate.

use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::{DirectoryService, RemoteFile, ServiceError};

/// Production Drive API root.
pub const DEFAULT_DRIVE_API_BASE_URL: &str = "https://www.googleapis.com/";

const FILES_PATH: &str = "drive/v3/files";
const LIST_FIELDS: &str = "nextPageToken, files(id, name, mimeType, webContentLink)";
const GET_FIELDS: &str = "id, name, mimeType, webContentLink";

/// How requests to the Drive API are authorized.
#[derive(Clone, Default)]
pub enum Credentials {
    /// No authorization; only works against fakes and fully public endpoints.
    #[default]
    Anonymous,
    /// OAuth access token sent as a bearer header.
    AccessToken(String),
    /// API key sent as the `key` query parameter (public files only).
    ApiKey(String),
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anonymous => f.write_str("Anonymous"),
            Self::AccessToken(_) => f.write_str("AccessToken(<redacted>)"),
            Self::ApiKey(_) => f.write_str("ApiKey(<redacted>)"),
        }
    }
}

/// One page of a `files.list` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileListPage {
    next_page_token: Option<String>,
    files: Option<Vec<RemoteFile>>,
}

/// Drive v3 directory service handle.
///
/// Construct once in the driver and share by reference.
#[derive(Debug, Clone)]
pub struct DriveService {
    client: Client,
    base_url: Url,
    credentials: Credentials,
}

impl DriveService {
    /// Creates a service talking to the production Drive API.
    ///
    /// # Errors
    ///
    /// Never fails for the built-in base URL; the `Result` mirrors
    /// [`with_base_url`](Self::with_base_url).
    pub fn new(client: Client, credentials: Credentials) -> Result<Self, ServiceError> {
        Self::with_base_url(client, DEFAULT_DRIVE_API_BASE_URL, credentials)
    }

    /// Creates a service rooted at a custom base URL (mirrors, test servers).
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::InvalidUrl`] when `base_url` does not parse.
    pub fn with_base_url(
        client: Client,
        base_url: &str,
        credentials: Credentials,
    ) -> Result<Self, ServiceError> {
        let mut base_url =
            Url::parse(base_url).map_err(|_| ServiceError::invalid_url(base_url.to_string()))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    fn files_url(&self) -> Result<Url, ServiceError> {
        self.base_url
            .join(FILES_PATH)
            .map_err(|_| ServiceError::invalid_url(format!("{}{FILES_PATH}", self.base_url)))
    }

    fn file_url(&self, id: &str) -> Result<Url, ServiceError> {
        let mut url = self.files_url()?;
        url.path_segments_mut()
            .map_err(|()| ServiceError::invalid_url(self.base_url.to_string()))?
            .push(id);
        Ok(url)
    }

    fn authorize_query(&self, url: &mut Url) {
        if let Credentials::ApiKey(key) = &self.credentials {
            url.query_pairs_mut().append_pair("key", key);
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        target: &str,
        url: Url,
    ) -> Result<T, ServiceError> {
        let mut request = self.client.get(url);
        if let Credentials::AccessToken(token) = &self.credentials {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ServiceError::network(operation, target, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::http_status(operation, target, status.as_u16()));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ServiceError::decode(operation, target, e))
    }
}

/// Builds the `q` expression selecting direct children of `parent_id`.
fn parents_query(parent_id: &str) -> String {
    let escaped = parent_id.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{escaped}' in parents")
}

#[async_trait]
impl DirectoryService for DriveService {
    #[instrument(skip(self), fields(parent = %parent_id))]
    async fn list(
        &self,
        parent_id: &str,
        page_size: Option<u32>,
    ) -> Result<Vec<RemoteFile>, ServiceError> {
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let mut url = self.files_url()?;
            {
                let mut pairs = url.query_pairs_mut();
                pairs.append_pair("q", &parents_query(parent_id));
                pairs.append_pair("fields", LIST_FIELDS);
                if let Some(size) = page_size {
                    pairs.append_pair("pageSize", &size.to_string());
                }
                if let Some(token) = &page_token {
                    pairs.append_pair("pageToken", token);
                }
            }
            self.authorize_query(&mut url);

            let page: FileListPage = self.get_json("list", parent_id, url).await?;
            let Some(page_files) = page.files else {
                return Err(ServiceError::missing_field("list", parent_id, "files"));
            };
            pages += 1;
            debug!(page = pages, count = page_files.len(), "received listing page");
            files.extend(page_files);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!(pages, total = files.len(), "listing complete");
        Ok(files)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn get_metadata(&self, id: &str) -> Result<RemoteFile, ServiceError> {
        let mut url = self.file_url(id)?;
        url.query_pairs_mut().append_pair("fields", GET_FIELDS);
        self.authorize_query(&mut url);
        self.get_json("get", id, url).await
    }
}

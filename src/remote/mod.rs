//! Remote directory service contract.
//!
//! The core never talks to a storage API directly. It depends on
//! [`DirectoryService`], which lists the immediate children of a folder (all
//! pages) and fetches metadata for a single identifier. [`DriveService`] is
//! the Google Drive v3 implementation used by the binary; tests substitute
//! in-memory fakes.
//!
//! The service handle is constructed by the driver and passed by reference
//! into the walker and resolver, so ownership stays explicit.

mod drive;
mod error;

pub use drive::{Credentials, DEFAULT_DRIVE_API_BASE_URL, DriveService};
pub use error::ServiceError;

use async_trait::async_trait;

/// MIME type the service uses to mark folders.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Raw metadata for one remote node, as returned by the service.
///
/// Every field is optional because the service may omit any of them; the
/// walker and resolver decide which combinations are usable.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFile {
    /// Opaque identifier.
    pub id: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// MIME type; folders use [`FOLDER_MIME_TYPE`].
    pub mime_type: Option<String>,
    /// Direct-content URL, when the service offers one.
    #[serde(rename = "webContentLink")]
    pub content_url: Option<String>,
}

impl RemoteFile {
    /// Returns true when the MIME type marks a folder.
    #[must_use]
    pub fn is_folder(&self) -> bool {
        self.mime_type.as_deref() == Some(FOLDER_MIME_TYPE)
    }
}

/// Paginated query interface over remote folder/file metadata.
///
/// # Object Safety
///
/// This trait uses `async_trait` so the walker and resolver can hold a
/// `&dyn DirectoryService`.
#[async_trait]
pub trait DirectoryService: Send + Sync {
    /// Lists every immediate child of `parent_id`, following pagination
    /// internally. `page_size` is a hint forwarded to the service.
    ///
    /// An empty folder is `Ok(vec![])`. A response without a listing field
    /// is an error, not an empty list.
    async fn list(
        &self,
        parent_id: &str,
        page_size: Option<u32>,
    ) -> Result<Vec<RemoteFile>, ServiceError>;

    /// Fetches metadata for a single identifier.
    async fn get_metadata(&self, id: &str) -> Result<RemoteFile, ServiceError>;
}

//! Single file identifier to downloadable [`Entry`] resolution.
//!
//! The resolver asks the directory service for one identifier's metadata and
//! only produces an entry when id, name, MIME type and content URL are all
//! present. Anything less is `None`; callers never see a half-filled entry.
//!
//! # Example
//!
//! ```no_run
//! use gdown_core::{ClientOptions, Credentials, DriveService, EntryResolver, build_http_client};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = build_http_client(ClientOptions::default(), true)?;
//! let drive = DriveService::new(client, Credentials::AccessToken("token".into()))?;
//! let resolver = EntryResolver::new(&drive);
//! if let Some(entry) = resolver.resolve("1NuuL9qNo5BJYnfNqN_lxBOUN0P-AociQ").await? {
//!     println!("{} -> {:?}", entry.name(), entry.content_url());
//! }
//! # Ok(())
//! # }
//! ```

use tracing::{debug, instrument};

use crate::entry::Entry;
use crate::remote::{DirectoryService, RemoteFile, ServiceError};

/// Resolves file identifiers using a borrowed directory service handle.
#[derive(Clone, Copy)]
pub struct EntryResolver<'a> {
    service: &'a dyn DirectoryService,
}

impl std::fmt::Debug for EntryResolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryResolver").finish_non_exhaustive()
    }
}

impl<'a> EntryResolver<'a> {
    #[must_use]
    pub fn new(service: &'a dyn DirectoryService) -> Self {
        Self { service }
    }

    /// Fetches metadata for `file_id` and builds a file entry from it.
    ///
    /// Returns `Ok(None)` when the service answered but omitted a required
    /// field. The result is always [`EntryKind::File`](crate::EntryKind::File).
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] when the metadata call itself fails.
    #[instrument(skip(self), fields(file = %file_id))]
    pub async fn resolve(&self, file_id: &str) -> Result<Option<Entry>, ServiceError> {
        let metadata = self.service.get_metadata(file_id).await?;
        let entry = entry_from_metadata(metadata);
        if entry.is_none() {
            debug!("metadata incomplete; no entry produced");
        }
        Ok(entry)
    }
}

fn entry_from_metadata(metadata: RemoteFile) -> Option<Entry> {
    let RemoteFile {
        id: Some(id),
        name: Some(name),
        mime_type: Some(mime_type),
        content_url: Some(content_url),
    } = metadata
    else {
        return None;
    };
    Some(Entry::file(id, name, mime_type, Some(content_url)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entry::EntryKind;
    use crate::remote::FOLDER_MIME_TYPE;
    use crate::test_support::fake_directory::{FakeDirectory, remote_file};

    #[tokio::test]
    async fn test_resolve_complete_metadata_yields_file_entry() {
        let service = FakeDirectory::new().with_file(remote_file(
            "f1",
            "movie.mkv",
            "video/x-matroska",
            Some("https://h/f1"),
        ));
        let resolver = EntryResolver::new(&service);

        let entry = resolver.resolve("f1").await.unwrap().unwrap();

        assert_eq!(entry.id(), "f1");
        assert_eq!(entry.name(), "movie.mkv");
        assert_eq!(entry.mime_type(), "video/x-matroska");
        assert_eq!(entry.content_url(), Some("https://h/f1"));
        assert_eq!(entry.kind(), EntryKind::File);
        assert!(entry.children().is_none());
    }

    #[tokio::test]
    async fn test_resolve_missing_url_yields_none() {
        let service =
            FakeDirectory::new().with_file(remote_file("f1", "movie.mkv", "video/x-matroska", None));
        let resolver = EntryResolver::new(&service);

        assert!(resolver.resolve("f1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_resolve_missing_name_yields_none() {
        let mut file = remote_file("f1", "x", "text/plain", Some("https://h/f1"));
        file.name = None;
        let service = FakeDirectory::new().with_file(file);
        let resolver = EntryResolver::new(&service);

        assert!(resolver.resolve("f1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_resolve_never_produces_folder_kind() {
        let service = FakeDirectory::new().with_file(remote_file(
            "f1",
            "odd",
            FOLDER_MIME_TYPE,
            Some("https://h/f1"),
        ));
        let resolver = EntryResolver::new(&service);

        let entry = resolver.resolve("f1").await.unwrap().unwrap();
        assert_eq!(entry.kind(), EntryKind::File);
    }

    #[tokio::test]
    async fn test_resolve_service_failure_is_error() {
        let service = FakeDirectory::new();
        let resolver = EntryResolver::new(&service);

        let result = resolver.resolve("unknown").await;
        assert!(matches!(result, Err(ServiceError::HttpStatus { status: 404, .. })));
    }
}

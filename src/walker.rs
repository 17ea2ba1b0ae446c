//! Folder expansion into an in-memory [`Entry`] tree.
//!
//! The walker asks the [`DirectoryService`] for a folder's children and turns
//! them into entries, honoring two policies:
//!
//! - `files_only` scopes emission: folder children are dropped from the
//!   result, so the result never has more entries than the folder has children.
//! - `recursive` expands folder children. By default only one extra level is
//!   expanded and that level is listed files-only; `max_depth` raises the cap.
//!
//! An empty folder is a successful empty `Vec`. A listing failure anywhere in
//! the requested subtree fails the whole call; no partial tree is returned.

use futures_util::future::BoxFuture;
use tracing::{debug, instrument, warn};

use crate::entry::{Entry, EntryKind};
use crate::remote::{DirectoryService, RemoteFile, ServiceError};

/// Default number of folder levels expanded below the requested folder.
pub const DEFAULT_MAX_DEPTH: usize = 1;

/// Filter and depth policy for [`TreeWalker::expand`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    /// Drop folder children from the result.
    pub files_only: bool,
    /// Expand folder children (only meaningful with `files_only = false`).
    pub recursive: bool,
    /// Page-size hint forwarded to the directory service.
    pub page_size: Option<u32>,
    /// Maximum number of folder levels expanded below the requested folder.
    pub max_depth: usize,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            files_only: true,
            recursive: false,
            page_size: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ListOptions {
    /// Options used for a folder child one level down.
    ///
    /// The deepest expanded level is always a files-only, non-recursive listing.
    fn nested(self) -> Self {
        if self.max_depth > 1 {
            Self {
                max_depth: self.max_depth - 1,
                ..self
            }
        } else {
            Self {
                files_only: true,
                recursive: false,
                max_depth: 0,
                ..self
            }
        }
    }
}

/// Expands folder identifiers using a borrowed directory service handle.
#[derive(Clone, Copy)]
pub struct TreeWalker<'a> {
    service: &'a dyn DirectoryService,
}

impl std::fmt::Debug for TreeWalker<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeWalker").finish_non_exhaustive()
    }
}

impl<'a> TreeWalker<'a> {
    #[must_use]
    pub fn new(service: &'a dyn DirectoryService) -> Self {
        Self { service }
    }

    /// Lists `folder_id` and returns its entries in service order.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError`] when listing `folder_id`, or any folder the
    /// options ask to expand, fails.
    #[instrument(skip(self), fields(folder = %folder_id))]
    pub async fn expand(
        &self,
        folder_id: &str,
        options: &ListOptions,
    ) -> Result<Vec<Entry>, ServiceError> {
        self.expand_folder(folder_id.to_string(), *options).await
    }

    fn expand_folder(
        &self,
        folder_id: String,
        options: ListOptions,
    ) -> BoxFuture<'_, Result<Vec<Entry>, ServiceError>> {
        Box::pin(async move {
            let children = self.service.list(&folder_id, options.page_size).await?;

            if children.is_empty() {
                warn!(folder = %folder_id, "folder is empty");
                return Ok(Vec::new());
            }

            let mut entries = Vec::with_capacity(children.len());
            for child in children {
                let Some((id, name, mime_type, content_url)) = complete_metadata(child) else {
                    continue;
                };

                match EntryKind::from_mime_type(&mime_type) {
                    EntryKind::File => {
                        entries.push(Entry::file(id, name, mime_type, content_url));
                    }
                    EntryKind::Folder if options.files_only => {
                        debug!(folder = %id, "dropping folder from files-only listing");
                    }
                    EntryKind::Folder => {
                        let children = if options.recursive && options.max_depth > 0 {
                            Some(self.expand_folder(id.clone(), options.nested()).await?)
                        } else {
                            None
                        };
                        entries.push(Entry::folder(id, name, children));
                    }
                }
            }

            debug!(folder = %folder_id, count = entries.len(), "expanded folder");
            Ok(entries)
        })
    }
}

/// Splits a child into its required fields, or `None` if any is missing.
fn complete_metadata(child: RemoteFile) -> Option<(String, String, String, Option<String>)> {
    match (child.id, child.name, child.mime_type) {
        (Some(id), Some(name), Some(mime_type)) => Some((id, name, mime_type, child.content_url)),
        (id, name, _) => {
            debug!(?id, ?name, "skipping child with incomplete metadata");
            None
        }
    }
}

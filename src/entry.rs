//! Remote tree entries.
//!
//! An [`Entry`] is built once through one of its constructors and is read
//! through accessors afterwards. The constructors enforce that folders never
//! carry a content URL and that only folders carry children.

use crate::remote::FOLDER_MIME_TYPE;

/// Whether a remote node is a file or a folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Downloadable file.
    File,
    /// Container of other entries.
    Folder,
}

impl EntryKind {
    /// Classifies a remote MIME type.
    #[must_use]
    pub fn from_mime_type(mime_type: &str) -> Self {
        if mime_type == FOLDER_MIME_TYPE {
            Self::Folder
        } else {
            Self::File
        }
    }
}

/// One node of the remote directory tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    id: String,
    name: String,
    mime_type: String,
    content_url: Option<String>,
    kind: EntryKind,
    children: Option<Vec<Entry>>,
}

impl Entry {
    /// Creates a file entry.
    #[must_use]
    pub fn file(
        id: impl Into<String>,
        name: impl Into<String>,
        mime_type: impl Into<String>,
        content_url: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            mime_type: mime_type.into(),
            content_url,
            kind: EntryKind::File,
            children: None,
        }
    }

    /// Creates a folder entry.
    ///
    /// `children` is `None` when the folder was not recursed into and
    /// `Some(vec![])` when it was recursed into and found empty.
    #[must_use]
    pub fn folder(
        id: impl Into<String>,
        name: impl Into<String>,
        children: Option<Vec<Entry>>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            mime_type: FOLDER_MIME_TYPE.to_string(),
            content_url: None,
            kind: EntryKind::Folder,
            children,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    #[must_use]
    pub fn content_url(&self) -> Option<&str> {
        self.content_url.as_deref()
    }

    #[must_use]
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    #[must_use]
    pub fn is_folder(&self) -> bool {
        self.kind == EntryKind::Folder
    }

    /// Children of an expanded folder; `None` if never expanded.
    #[must_use]
    pub fn children(&self) -> Option<&[Entry]> {
        self.children.as_deref()
    }
}

//! In-memory [`DirectoryService`] for walker and resolver tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::remote::{DirectoryService, FOLDER_MIME_TYPE, RemoteFile, ServiceError};

#[derive(Debug, Default)]
pub struct FakeDirectory {
    folders: HashMap<String, Vec<RemoteFile>>,
    files: HashMap<String, RemoteFile>,
    unavailable: HashSet<String>,
    list_calls: Mutex<Vec<(String, Option<u32>)>>,
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_folder(mut self, id: &str, children: Vec<RemoteFile>) -> Self {
        self.folders.insert(id.to_string(), children);
        self
    }

    pub fn with_file(mut self, file: RemoteFile) -> Self {
        let id = file.id.clone().unwrap_or_default();
        self.files.insert(id, file);
        self
    }

    /// Makes listing `id` fail as if the service answered without a listing.
    pub fn with_unavailable(mut self, id: &str) -> Self {
        self.unavailable.insert(id.to_string());
        self
    }

    pub fn list_calls(&self) -> Vec<(String, Option<u32>)> {
        self.list_calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

pub fn remote_file(id: &str, name: &str, mime_type: &str, url: Option<&str>) -> RemoteFile {
    RemoteFile {
        id: Some(id.to_string()),
        name: Some(name.to_string()),
        mime_type: Some(mime_type.to_string()),
        content_url: url.map(str::to_string),
    }
}

pub fn remote_folder(id: &str, name: &str) -> RemoteFile {
    remote_file(id, name, FOLDER_MIME_TYPE, None)
}

#[async_trait]
impl DirectoryService for FakeDirectory {
    async fn list(
        &self,
        parent_id: &str,
        page_size: Option<u32>,
    ) -> Result<Vec<RemoteFile>, ServiceError> {
        self.list_calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push((parent_id.to_string(), page_size));
        if self.unavailable.contains(parent_id) {
            return Err(ServiceError::missing_field("list", parent_id, "files"));
        }
        self.folders
            .get(parent_id)
            .cloned()
            .ok_or_else(|| ServiceError::http_status("list", parent_id, 404))
    }

    async fn get_metadata(&self, id: &str) -> Result<RemoteFile, ServiceError> {
        self.files
            .get(id)
            .cloned()
            .ok_or_else(|| ServiceError::http_status("get", id, 404))
    }
}

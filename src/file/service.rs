//! Upload/query service for depot.
//!
//! Turns validated requests into metadata + blob state and fans out
//! derived work. Every handle (pool, sessions, blobs, queue) is passed in
//! explicitly so the service can be assembled over test doubles; there is
//! no global state.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use sqlx::SqlitePool;
use tracing::info;

use crate::auth::SessionStore;
use crate::queue::{JobQueue, ThumbnailJob};
use crate::{DepotError, Result};

use super::blob::BlobStore;
use super::record::{FileKind, FileRecord, FileRepository, NewFileRecord};
use super::{ROOT_PARENT_ID, THUMBNAIL_WIDTHS};

/// Request data for an upload.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Display name (must be non-empty).
    pub name: String,
    /// Requested kind, as sent on the wire ("folder", "file", "image").
    pub kind: String,
    /// Parent folder ID, 0 for the root.
    pub parent_id: i64,
    /// Initial visibility.
    pub is_public: bool,
    /// Base64-encoded content; required unless the kind is folder.
    pub data: Option<String>,
}

impl UploadRequest {
    /// Create an upload request targeting the root with private
    /// visibility and no content.
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            parent_id: ROOT_PARENT_ID,
            is_public: false,
            data: None,
        }
    }

    /// Set the parent folder.
    pub fn with_parent(mut self, parent_id: i64) -> Self {
        self.parent_id = parent_id;
        self
    }

    /// Set the initial visibility.
    pub fn with_visibility(mut self, is_public: bool) -> Self {
        self.is_public = is_public;
        self
    }

    /// Set the base64-encoded content.
    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }
}

/// A record together with its raw or derived content.
#[derive(Debug)]
pub struct FileContent {
    /// The file record.
    pub record: FileRecord,
    /// The requested bytes.
    pub bytes: Vec<u8>,
}

/// High-level upload and query operations.
pub struct FileService<'a> {
    pool: &'a SqlitePool,
    sessions: &'a SessionStore,
    blobs: &'a BlobStore,
    queue: &'a JobQueue,
}

impl<'a> FileService<'a> {
    /// Create a new FileService over explicit store handles.
    pub fn new(
        pool: &'a SqlitePool,
        sessions: &'a SessionStore,
        blobs: &'a BlobStore,
        queue: &'a JobQueue,
    ) -> Self {
        Self {
            pool,
            sessions,
            blobs,
            queue,
        }
    }

    /// Resolve a session token to a user id.
    fn resolve_session(&self, token: Option<&str>) -> Result<i64> {
        token
            .and_then(|t| self.sessions.get(t))
            .ok_or(DepotError::Unauthorized)
    }

    /// Upload a folder, file, or image.
    ///
    /// Validation and authorization run before any mutation; a rejected
    /// request leaves no partial writes behind. For images the thumbnail
    /// job is enqueued only after the metadata record is durably
    /// persisted, so the worker can always resolve the file id.
    pub async fn upload(&self, token: Option<&str>, request: UploadRequest) -> Result<FileRecord> {
        let user_id = self.resolve_session(token)?;

        if request.name.is_empty() {
            return Err(DepotError::Validation("Missing name".to_string()));
        }

        let kind: FileKind = request
            .kind
            .parse()
            .map_err(|_| DepotError::Validation("Missing or invalid type".to_string()))?;

        let data = match kind {
            FileKind::Folder => None,
            FileKind::File | FileKind::Image => Some(
                request
                    .data
                    .as_deref()
                    .ok_or_else(|| DepotError::Validation("Missing data".to_string()))?,
            ),
        };

        let repo = FileRepository::new(self.pool);

        if request.parent_id != ROOT_PARENT_ID {
            let parent = repo
                .get_by_id(request.parent_id)
                .await?
                .ok_or(DepotError::ParentNotFound)?;
            if parent.kind != FileKind::Folder {
                return Err(DepotError::ParentNotFolder);
            }
        }

        let mut record = NewFileRecord::new(user_id, &request.name, kind)
            .with_parent(request.parent_id)
            .with_visibility(request.is_public);

        if let Some(data) = data {
            let bytes = BASE64
                .decode(data)
                .map_err(|_| DepotError::Validation("Invalid base64 data".to_string()))?;
            let path = self.blobs.write(&bytes, &request.name)?;
            record = record.with_storage_path(path);
        }

        let stored = repo.create(&record).await?;

        if stored.kind == FileKind::Image {
            self.queue
                .enqueue(ThumbnailJob {
                    file_id: stored.id,
                    user_id,
                })
                .await?;
        }

        info!(
            file_id = stored.id,
            owner_id = user_id,
            kind = %stored.kind,
            "Stored upload"
        );

        Ok(stored)
    }

    /// Fetch a record owned by the session's user.
    ///
    /// Ownership mismatch and true absence are indistinguishable.
    pub async fn get(&self, token: Option<&str>, file_id: i64) -> Result<FileRecord> {
        let user_id = self.resolve_session(token)?;

        FileRepository::new(self.pool)
            .get_by_id_for_owner(file_id, user_id)
            .await?
            .ok_or_else(|| DepotError::NotFound("file".to_string()))
    }

    /// List one page of the user's records under a parent.
    ///
    /// An empty page is a normal result, never an error.
    pub async fn list(
        &self,
        token: Option<&str>,
        parent_id: i64,
        page: i64,
    ) -> Result<Vec<FileRecord>> {
        let user_id = self.resolve_session(token)?;

        FileRepository::new(self.pool)
            .list_by_parent(user_id, parent_id, page)
            .await
    }

    /// Publish or unpublish a record owned by the session's user.
    pub async fn set_visibility(
        &self,
        token: Option<&str>,
        file_id: i64,
        is_public: bool,
    ) -> Result<FileRecord> {
        let user_id = self.resolve_session(token)?;

        let repo = FileRepository::new(self.pool);
        repo.get_by_id_for_owner(file_id, user_id)
            .await?
            .ok_or_else(|| DepotError::NotFound("file".to_string()))?;

        repo.set_visibility(file_id, is_public)
            .await?
            .ok_or_else(|| DepotError::NotFound("file".to_string()))
    }

    /// Read raw or derived content.
    ///
    /// Public records are readable without a session; private ones only
    /// by their owner (anything else looks like absence). `size` selects
    /// a derived thumbnail and must be one of the configured widths; a
    /// thumbnail that has not been generated yet reads as absent.
    pub async fn read_content(
        &self,
        token: Option<&str>,
        file_id: i64,
        size: Option<u32>,
    ) -> Result<FileContent> {
        let record = FileRepository::new(self.pool)
            .get_by_id(file_id)
            .await?
            .ok_or_else(|| DepotError::NotFound("file".to_string()))?;

        if !record.is_public {
            let is_owner = token
                .and_then(|t| self.sessions.get(t))
                .map(|user_id| user_id == record.owner_id)
                .unwrap_or(false);
            if !is_owner {
                return Err(DepotError::NotFound("file".to_string()));
            }
        }

        if record.kind == FileKind::Folder {
            return Err(DepotError::Validation(
                "A folder doesn't have content".to_string(),
            ));
        }

        let bytes = match size {
            None => self.blobs.read(&record.storage_path)?,
            Some(width) if THUMBNAIL_WIDTHS.contains(&width) => {
                self.blobs.read_derived(&record.storage_path, width)?
            }
            Some(_) => return Err(DepotError::Validation("Invalid size".to_string())),
        };

        Ok(FileContent { record, bytes })
    }
}

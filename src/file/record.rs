//! File record types and repository for depot.
//!
//! A record describes one node of a user's namespace: a folder, a plain
//! file, or an image. Records are never deleted; the only field that may
//! change after creation is `is_public`.

use std::fmt;
use std::str::FromStr;

use sqlx::SqlitePool;

use super::{PAGE_SIZE, ROOT_PARENT_ID};
use crate::{DepotError, Result};

/// Kind of a file record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
pub enum FileKind {
    /// A folder; carries no blob.
    Folder,
    /// A plain file.
    File,
    /// An image; uploads of this kind feed the thumbnail pipeline.
    Image,
}

impl FileKind {
    /// Convert to the wire/database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Folder => "folder",
            FileKind::File => "file",
            FileKind::Image => "image",
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FileKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "folder" => Ok(FileKind::Folder),
            "file" => Ok(FileKind::File),
            "image" => Ok(FileKind::Image),
            _ => Err(format!("unknown file kind: {s}")),
        }
    }
}

/// Metadata for one node in the namespace.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FileRecord {
    /// Unique record ID.
    pub id: i64,
    /// Owning user ID.
    pub owner_id: i64,
    /// Display name.
    pub name: String,
    /// Record kind.
    pub kind: FileKind,
    /// Parent folder ID, 0 for the root.
    pub parent_id: i64,
    /// Whether the content is readable without a session.
    pub is_public: bool,
    /// Blob path; empty for folders, set exactly once otherwise.
    pub storage_path: String,
    /// Creation timestamp.
    pub created_at: String,
}

impl FileRecord {
    /// Whether this record sits at the root of its owner's namespace.
    pub fn is_root_level(&self) -> bool {
        self.parent_id == ROOT_PARENT_ID
    }
}

/// Data for creating a new file record.
#[derive(Debug, Clone)]
pub struct NewFileRecord {
    /// Owning user ID.
    pub owner_id: i64,
    /// Display name.
    pub name: String,
    /// Record kind.
    pub kind: FileKind,
    /// Parent folder ID, 0 for the root.
    pub parent_id: i64,
    /// Initial visibility.
    pub is_public: bool,
    /// Blob path; empty for folders.
    pub storage_path: String,
}

impl NewFileRecord {
    /// Create a new record at the root with private visibility.
    pub fn new(owner_id: i64, name: impl Into<String>, kind: FileKind) -> Self {
        Self {
            owner_id,
            name: name.into(),
            kind,
            parent_id: ROOT_PARENT_ID,
            is_public: false,
            storage_path: String::new(),
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

    /// Set the blob path.
    pub fn with_storage_path(mut self, path: impl Into<String>) -> Self {
        self.storage_path = path.into();
        self
    }
}

const RECORD_COLUMNS: &str =
    "id, owner_id, name, kind, parent_id, is_public, storage_path, created_at";

/// Repository for file record operations.
pub struct FileRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FileRepository<'a> {
    /// Create a new FileRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new record.
    ///
    /// Returns the stored record including its generated id. Generated ids
    /// never collide across concurrent inserts.
    pub async fn create(&self, record: &NewFileRecord) -> Result<FileRecord> {
        let result = sqlx::query(
            "INSERT INTO files (owner_id, name, kind, parent_id, is_public, storage_path)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(record.owner_id)
        .bind(&record.name)
        .bind(record.kind)
        .bind(record.parent_id)
        .bind(record.is_public)
        .bind(&record.storage_path)
        .execute(self.pool)
        .await
        .map_err(|e| DepotError::Database(e.to_string()))?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DepotError::NotFound("file".to_string()))
    }

    /// Get a record by ID, regardless of owner.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<FileRecord>> {
        let query = format!("SELECT {RECORD_COLUMNS} FROM files WHERE id = ?");
        let record = sqlx::query_as::<_, FileRecord>(&query)
            .bind(id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| DepotError::Database(e.to_string()))?;

        Ok(record)
    }

    /// Get a record by ID, scoped to one owner.
    ///
    /// Absence and non-ownership both come back as `None` so callers
    /// cannot distinguish them.
    pub async fn get_by_id_for_owner(&self, id: i64, owner_id: i64) -> Result<Option<FileRecord>> {
        let query = format!("SELECT {RECORD_COLUMNS} FROM files WHERE id = ? AND owner_id = ?");
        let record = sqlx::query_as::<_, FileRecord>(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| DepotError::Database(e.to_string()))?;

        Ok(record)
    }

    /// List one page of an owner's records under a parent.
    ///
    /// Records come back in insertion order; `page` is zero-indexed with a
    /// fixed page size of `PAGE_SIZE`.
    pub async fn list_by_parent(
        &self,
        owner_id: i64,
        parent_id: i64,
        page: i64,
    ) -> Result<Vec<FileRecord>> {
        let page = page.max(0);
        let query = format!(
            "SELECT {RECORD_COLUMNS} FROM files
             WHERE owner_id = ? AND parent_id = ?
             ORDER BY id LIMIT ? OFFSET ?"
        );
        let records = sqlx::query_as::<_, FileRecord>(&query)
            .bind(owner_id)
            .bind(parent_id)
            .bind(PAGE_SIZE)
            .bind(page * PAGE_SIZE)
            .fetch_all(self.pool)
            .await
            .map_err(|e| DepotError::Database(e.to_string()))?;

        Ok(records)
    }

    /// Atomically update the visibility flag of a record.
    ///
    /// A single UPDATE at the store level; never read-modify-write, so
    /// concurrent publish/unpublish calls on the same id cannot lose
    /// updates. Returns the refreshed record, or `None` if absent.
    pub async fn set_visibility(&self, id: i64, is_public: bool) -> Result<Option<FileRecord>> {
        let result = sqlx::query("UPDATE files SET is_public = ? WHERE id = ?")
            .bind(is_public)
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| DepotError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_id(id).await
    }

    /// Count all file records.
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM files")
            .fetch_one(self.pool)
            .await
            .map_err(|e| DepotError::Database(e.to_string()))?;

        Ok(count)
    }
}

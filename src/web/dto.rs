//! Request and response shapes for the depot Web API.

use serde::{Deserialize, Serialize};

use crate::file::{FileRecord, ROOT_PARENT_ID};

/// POST /users request body.
#[derive(Debug, Deserialize)]
pub struct RegisterBody {
    /// Email address.
    pub email: Option<String>,
    /// Plaintext password.
    pub password: Option<String>,
}

/// Registered or resolved user.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    /// User ID.
    pub id: i64,
    /// Email address.
    pub email: String,
}

/// GET /connect response body.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    /// Opaque session token.
    pub token: String,
}

/// POST /files request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadBody {
    /// Display name.
    pub name: Option<String>,
    /// Kind: "folder", "file", or "image".
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Parent folder ID (default 0 = root).
    #[serde(default)]
    pub parent_id: i64,
    /// Initial visibility (default false).
    #[serde(default)]
    pub is_public: bool,
    /// Base64-encoded content.
    pub data: Option<String>,
}

/// A file record as returned to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResponse {
    /// Record ID.
    pub id: i64,
    /// Owning user ID.
    pub user_id: i64,
    /// Display name.
    pub name: String,
    /// Kind: "folder", "file", or "image".
    #[serde(rename = "type")]
    pub kind: String,
    /// Visibility flag.
    pub is_public: bool,
    /// Parent folder ID, 0 for the root.
    pub parent_id: i64,
    /// Blob path; empty for folders.
    pub local_path: String,
}

impl From<FileRecord> for FileResponse {
    fn from(record: FileRecord) -> Self {
        Self {
            id: record.id,
            user_id: record.owner_id,
            name: record.name,
            kind: record.kind.as_str().to_string(),
            is_public: record.is_public,
            parent_id: record.parent_id,
            local_path: record.storage_path,
        }
    }
}

/// GET /files query parameters.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// Parent folder ID (default 0 = root).
    #[serde(default = "default_parent_id")]
    pub parent_id: i64,
    /// Zero-indexed page (default 0).
    #[serde(default)]
    pub page: i64,
}

fn default_parent_id() -> i64 {
    ROOT_PARENT_ID
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            parent_id: ROOT_PARENT_ID,
            page: 0,
        }
    }
}

/// GET /files/:id/data query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct DataQuery {
    /// Optional thumbnail width.
    pub size: Option<u32>,
}

/// GET /status response body.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// Whether the session store is reachable.
    pub sessions: bool,
    /// Whether the database answers queries.
    pub db: bool,
}

/// GET /stats response body.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    /// Number of registered users.
    pub users: i64,
    /// Number of file records.
    pub files: i64,
}

//! API handlers for the depot Web API.

pub mod app;
pub mod files;
pub mod users;

pub use app::*;
pub use files::*;
pub use users::*;

use std::sync::Arc;
use std::time::Duration;

use crate::auth::SessionStore;
use crate::db::Database;
use crate::file::{BlobStore, FileService};
use crate::queue::JobQueue;

/// Shared application state.
///
/// One instance per process, handed to every handler through axum's
/// `State`. Services are assembled per-call from these explicit handles.
pub struct AppState {
    /// Database handle.
    pub db: Arc<Database>,
    /// Session store.
    pub sessions: Arc<SessionStore>,
    /// Blob store.
    pub blobs: BlobStore,
    /// Thumbnail job queue.
    pub queue: JobQueue,
    /// TTL for newly created sessions.
    pub session_ttl: Duration,
}

impl AppState {
    /// Create a new application state.
    pub fn new(db: Arc<Database>, blobs: BlobStore, session_ttl: Duration) -> Self {
        let queue = JobQueue::new(db.pool().clone());
        Self {
            db,
            sessions: Arc::new(SessionStore::new()),
            blobs,
            queue,
            session_ttl,
        }
    }

    /// Assemble a file service over this state's handles.
    pub fn file_service(&self) -> FileService<'_> {
        FileService::new(self.db.pool(), &self.sessions, &self.blobs, &self.queue)
    }
}

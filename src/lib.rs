//! depot - multi-tenant file storage backend
//!
//! Users authenticate with opaque session tokens, upload files or folders
//! into a per-user hierarchical namespace, toggle visibility, and retrieve
//! raw or derived content. Image uploads feed a durable job queue consumed
//! by a background worker that generates thumbnails at fixed widths.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod file;
pub mod logging;
pub mod queue;
pub mod web;
pub mod worker;

pub use auth::{hash_password, verify_password, PasswordError, SessionStore};
pub use config::Config;
pub use db::{Database, NewUser, User, UserRepository};
pub use error::{DepotError, Result};
pub use file::{
    BlobStore, FileKind, FileRecord, FileRepository, FileService, NewFileRecord, UploadRequest,
    PAGE_SIZE, THUMBNAIL_WIDTHS,
};
pub use queue::{JobQueue, QueuedJob, ThumbnailJob};
pub use web::DepotServer;
pub use worker::{JobError, ThumbnailWorker};

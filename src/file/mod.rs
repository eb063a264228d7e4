//! File management module for depot.
//!
//! This module provides the metadata model, blob storage, and the
//! upload/query service:
//! - Hierarchical file records (folder / file / image) with ownership
//! - Write-once blob storage with UUID naming
//! - Visibility toggling and paged listing

mod blob;
mod record;
mod service;

pub use blob::BlobStore;
pub use record::{FileKind, FileRecord, FileRepository, NewFileRecord};
pub use service::{FileContent, FileService, UploadRequest};

/// Fixed page size for listings.
pub const PAGE_SIZE: i64 = 20;

/// Thumbnail widths generated for every image, in processing order.
pub const THUMBNAIL_WIDTHS: [u32; 3] = [500, 250, 100];

/// Parent id designating the root of a user's namespace.
pub const ROOT_PARENT_ID: i64 = 0;

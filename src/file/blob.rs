//! Blob storage for depot.
//!
//! Flat directory of write-once blobs plus their derived thumbnails:
//! - originals get a fresh `{uuid}_{name}` path, so no write ever collides
//! - derivatives live at `{original}_{width}` and overwrite freely, since
//!   regeneration is deterministic

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::{DepotError, Result};

/// Blob store rooted at a single local directory.
///
/// The root is created once at construction; that is the only
/// initialization side effect.
#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    /// Create a new BlobStore, creating the root directory if absent.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;

        Ok(Self { root })
    }

    /// Get the storage root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write bytes to a freshly named blob.
    ///
    /// The path embeds a new UUID ahead of the display name, so two
    /// concurrent uploads of the same name land on distinct paths.
    /// Returns the absolute blob path as a string.
    pub fn write(&self, bytes: &[u8], display_name: &str) -> Result<String> {
        let blob_name = format!("{}_{}", Uuid::new_v4(), sanitize_name(display_name));
        let path = self.root.join(blob_name);

        fs::write(&path, bytes)?;

        Ok(path.to_string_lossy().into_owned())
    }

    /// Write a derived blob beside its original.
    ///
    /// The target is `{original}_{width}`; an existing derivative at that
    /// path is overwritten (idempotent regeneration).
    pub fn write_derived(&self, original: &str, width: u32, bytes: &[u8]) -> Result<()> {
        fs::write(Self::derived_path(original, width), bytes)?;
        Ok(())
    }

    /// Read a blob back.
    pub fn read(&self, path: &str) -> Result<Vec<u8>> {
        match fs::read(path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(DepotError::NotFound("blob".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Read the derived blob for a given width.
    pub fn read_derived(&self, original: &str, width: u32) -> Result<Vec<u8>> {
        self.read(&Self::derived_path(original, width))
    }

    /// Check whether a blob exists.
    pub fn exists(&self, path: &str) -> bool {
        Path::new(path).exists()
    }

    /// Path of the derived blob for a given width.
    pub fn derived_path(original: &str, width: u32) -> String {
        format!("{original}_{width}")
    }
}

/// Strip directory components from a client-supplied display name.
fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect()
}

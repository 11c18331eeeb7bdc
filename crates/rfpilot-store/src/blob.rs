//! Filesystem blob store for uploaded RFP documents

use rfpilot_domain::traits::BlobStore;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while fetching a blob
#[derive(Error, Debug)]
pub enum BlobError {
    /// Reference is empty or escapes the blob root
    #[error("Invalid blob reference: {0}")]
    InvalidReference(String),

    /// No blob stored under the reference
    #[error("Blob not found: {0}")]
    NotFound(String),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Blob store rooted at a local directory
///
/// References are relative paths under the root, e.g. `rfps/tender-42.pdf`.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Create a blob store rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory blobs are read from
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, reference: &str) -> Result<PathBuf, BlobError> {
        let trimmed = reference.trim();
        if trimmed.is_empty() {
            return Err(BlobError::InvalidReference("empty reference".to_string()));
        }

        let relative = Path::new(trimmed);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(BlobError::InvalidReference(reference.to_string()));
        }

        Ok(self.root.join(relative))
    }
}

impl BlobStore for FsBlobStore {
    type Error = BlobError;

    fn fetch(&self, reference: &str) -> Result<Vec<u8>, Self::Error> {
        let path = self.resolve(reference)?;

        match std::fs::read(&path) {
            Ok(bytes) => {
                debug!("Fetched blob {} ({} bytes)", reference, bytes.len());
                Ok(bytes)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(BlobError::NotFound(reference.to_string()))
            }
            Err(e) => Err(BlobError::Io(e)),
        }
    }
}

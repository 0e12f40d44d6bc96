//! Storage port interface

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

/// Storage errors
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Invalid file path: {}", .0.display())]
    InvalidPath(PathBuf),

    #[error("I/O error on {}: {message}", .path.display())]
    Io { path: PathBuf, message: String },
}

/// Metadata returned by [`StorageMover::stat`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub path: PathBuf,
    pub size: u64,
}

/// Port for moving recordings and saving documents
#[async_trait]
pub trait StorageMover: Send + Sync {
    /// Look up an existing file.
    ///
    /// # Returns
    /// The resolved path and its size in bytes; `NotFound` if missing
    async fn stat(&self, path: &Path) -> Result<FileInfo, StorageError>;

    /// Move a file, creating the destination directory if needed.
    ///
    /// # Arguments
    /// * `from` - Existing file
    /// * `to` - Destination path, replaced if it exists
    async fn move_file(&self, from: &Path, to: &Path) -> Result<(), StorageError>;

    /// Delete a file.
    async fn remove(&self, path: &Path) -> Result<(), StorageError>;

    /// Write a file, creating parent directories and replacing any
    /// existing file.
    ///
    /// # Arguments
    /// * `path` - Destination path
    /// * `contents` - Bytes to write
    async fn write(&self, path: &Path, contents: &[u8]) -> Result<(), StorageError>;
}

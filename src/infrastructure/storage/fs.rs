//! Local filesystem storage adapter

use std::io::ErrorKind;
use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use crate::application::ports::{FileInfo, StorageError, StorageMover};

/// Storage on the local filesystem via `tokio::fs`
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStorage;

impl FsStorage {
    pub fn new() -> Self {
        Self
    }

    fn io_error(path: &Path, err: std::io::Error) -> StorageError {
        if err.kind() == ErrorKind::NotFound {
            StorageError::NotFound(path.to_path_buf())
        } else {
            StorageError::Io {
                path: path.to_path_buf(),
                message: err.to_string(),
            }
        }
    }

    async fn ensure_parent(path: &Path) -> Result<(), StorageError> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Self::io_error(parent, e)),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl StorageMover for FsStorage {
    async fn stat(&self, path: &Path) -> Result<FileInfo, StorageError> {
        let meta = tokio::fs::metadata(path)
            .await
            .map_err(|e| Self::io_error(path, e))?;
        if !meta.is_file() {
            return Err(StorageError::InvalidPath(path.to_path_buf()));
        }
        Ok(FileInfo {
            path: path.to_path_buf(),
            size: meta.len(),
        })
    }

    async fn move_file(&self, from: &Path, to: &Path) -> Result<(), StorageError> {
        Self::ensure_parent(to).await?;

        if tokio::fs::rename(from, to).await.is_ok() {
            debug!(from = %from.display(), to = %to.display(), "file renamed");
            return Ok(());
        }

        // Rename fails across filesystems
        tokio::fs::copy(from, to)
            .await
            .map_err(|e| Self::io_error(from, e))?;
        tokio::fs::remove_file(from)
            .await
            .map_err(|e| Self::io_error(from, e))?;
        debug!(from = %from.display(), to = %to.display(), "file copied");
        Ok(())
    }

    async fn remove(&self, path: &Path) -> Result<(), StorageError> {
        tokio::fs::remove_file(path)
            .await
            .map_err(|e| Self::io_error(path, e))
    }

    async fn write(&self, path: &Path, contents: &[u8]) -> Result<(), StorageError> {
        Self::ensure_parent(path).await?;
        tokio::fs::write(path, contents)
            .await
            .map_err(|e| Self::io_error(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stat_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.flac");

        let err = FsStorage::new().stat(&missing).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(p) if p == missing));
    }

    #[tokio::test]
    async fn stat_directory_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let err = FsStorage::new().stat(dir.path()).await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidPath(_)));
    }

    #[tokio::test]
    async fn move_creates_destination_dir() {
        let dir = tempfile::tempdir().unwrap();
        let from = dir.path().join("capture-1.partial");
        let to = dir.path().join("recordings/2024/capture-1.flac");
        tokio::fs::write(&from, b"fLaC").await.unwrap();

        let storage = FsStorage::new();
        storage.move_file(&from, &to).await.unwrap();

        assert!(!from.exists());
        assert_eq!(storage.stat(&to).await.unwrap().size, 4);
    }

    #[tokio::test]
    async fn move_missing_source_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = FsStorage::new()
            .move_file(&dir.path().join("a"), &dir.path().join("b"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn write_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs/report.pdf");
        let storage = FsStorage::new();

        storage.write(&path, b"first").await.unwrap();
        storage.write(&path, b"second").await.unwrap();

        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"second");

        storage.remove(&path).await.unwrap();
        assert!(!path.exists());
    }
}

//! Staged files
//!
//! An upload is written to the staging directory first and moved into the
//! storage directory only once every byte is on disk. A [`StagedFile`] that
//! is dropped without being persisted removes itself.

use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

/// A partially written upload in the staging directory
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
    file: Option<File>,
    written: u64,
    persisted: bool,
}

impl StagedFile {
    /// Create a new, empty staged file. Fails if the name is already taken.
    pub async fn create(staging_dir: &Path, filename: &str) -> io::Result<Self> {
        let path = staging_dir.join(filename);
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;

        Ok(Self {
            path,
            file: Some(file),
            written: 0,
            persisted: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes written so far
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Append a chunk
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        let file = self.file.as_mut().ok_or_else(closed)?;
        file.write_all(chunk).await?;
        self.written += chunk.len() as u64;
        Ok(())
    }

    /// Flush to disk and move into place without replacing an existing file.
    ///
    /// Fails with `AlreadyExists` if `destination` is taken; the staged file
    /// is kept so the caller can retry under another name. Any other error
    /// leaves cleanup to the guard.
    pub async fn persist(&mut self, destination: &Path) -> io::Result<()> {
        if self.persisted {
            return Err(closed());
        }

        if let Some(mut file) = self.file.take() {
            file.flush().await?;
            file.sync_all().await?;
        }

        match tokio::fs::hard_link(&self.path, destination).await {
            Ok(()) => {
                self.persisted = true;
                if let Err(e) = tokio::fs::remove_file(&self.path).await {
                    tracing::warn!(
                        "Stored {} but failed to remove staged file: {}",
                        destination.display(),
                        e
                    );
                }
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(e),
            Err(e) => {
                // Filesystems without hard links: check, then rename
                tracing::debug!("Hard link into place failed ({}), renaming instead", e);
                if tokio::fs::try_exists(destination).await? {
                    return Err(io::Error::new(
                        io::ErrorKind::AlreadyExists,
                        format!("{} already exists", destination.display()),
                    ));
                }
                tokio::fs::rename(&self.path, destination).await?;
                self.persisted = true;
                Ok(())
            }
        }
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if self.persisted {
            return;
        }

        drop(self.file.take());
        // Blocking unlink: the file must be gone once the guard is dropped
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!("Removed staged file {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                "Failed to remove staged file {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

fn closed() -> io::Error {
    io::Error::new(io::ErrorKind::Other, "staged file already closed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_persist_moves_file() {
        let staging = TempDir::new().unwrap();
        let books = TempDir::new().unwrap();

        let mut staged = StagedFile::create(staging.path(), "book.kepub.epub")
            .await
            .unwrap();
        staged.write_chunk(b"Hello, ").await.unwrap();
        staged.write_chunk(b"World!").await.unwrap();
        assert_eq!(staged.written(), 13);

        let destination = books.path().join("book.kepub.epub");
        staged.persist(&destination).await.unwrap();

        assert_eq!(std::fs::read(&destination).unwrap(), b"Hello, World!");
        assert!(!staging.path().join("book.kepub.epub").exists());
    }

    #[tokio::test]
    async fn test_drop_removes_file() {
        let staging = TempDir::new().unwrap();

        let mut staged = StagedFile::create(staging.path(), "partial.kepub.epub")
            .await
            .unwrap();
        staged.write_chunk(b"partial").await.unwrap();
        let path = staged.path().to_path_buf();
        assert!(path.exists());

        drop(staged);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_failed_persist_removes_file() {
        let staging = TempDir::new().unwrap();
        let books = TempDir::new().unwrap();

        let mut staged = StagedFile::create(staging.path(), "book.kepub.epub")
            .await
            .unwrap();
        let destination = books.path().join("missing").join("book.kepub.epub");

        assert!(staged.persist(&destination).await.is_err());
        drop(staged);
        assert!(!staging.path().join("book.kepub.epub").exists());
    }

    #[tokio::test]
    async fn test_persist_never_replaces_existing_file() {
        let staging = TempDir::new().unwrap();
        let books = TempDir::new().unwrap();

        let taken = books.path().join("book.kepub.epub");
        std::fs::write(&taken, b"already here").unwrap();

        let mut staged = StagedFile::create(staging.path(), "book.kepub.epub")
            .await
            .unwrap();
        staged.write_chunk(b"new content").await.unwrap();

        let err = staged.persist(&taken).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(std::fs::read(&taken).unwrap(), b"already here");
        assert!(staged.path().exists());

        let free = books.path().join("book_2.kepub.epub");
        staged.persist(&free).await.unwrap();
        assert_eq!(std::fs::read(&free).unwrap(), b"new content");
        assert!(!staging.path().join("book.kepub.epub").exists());
    }

    #[tokio::test]
    async fn test_create_refuses_existing_name() {
        let staging = TempDir::new().unwrap();
        let _first = StagedFile::create(staging.path(), "same.kepub.epub")
            .await
            .unwrap();

        let second = StagedFile::create(staging.path(), "same.kepub.epub").await;
        assert_eq!(second.unwrap_err().kind(), io::ErrorKind::AlreadyExists);
    }
}

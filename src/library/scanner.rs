//! Library scanner for the flat storage directory
//!
//! The directory is the only source of truth: every call re-reads it, so
//! anything renamed into it becomes visible on the next scan.

use chrono::{DateTime, Utc};
use std::path::PathBuf;

use super::book::{is_book_filename, BookEntry};

/// Catalog read errors
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Storage directory unavailable: {path}: {source}")]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Scanner over the storage directory
#[derive(Debug, Clone)]
pub struct LibraryScanner {
    books_dir: PathBuf,
}

impl LibraryScanner {
    /// Create a new library scanner
    pub fn new(books_dir: impl Into<PathBuf>) -> Self {
        Self {
            books_dir: books_dir.into(),
        }
    }

    /// List every recognized book, newest first.
    ///
    /// Entries that cannot be stat'ed (removed mid-scan, permissions) are
    /// skipped with a warning; only a failure to read the directory itself
    /// is an error.
    pub async fn list_books(&self) -> Result<Vec<BookEntry>, CatalogError> {
        let start = std::time::Instant::now();

        let mut dir = tokio::fs::read_dir(&self.books_dir)
            .await
            .map_err(|e| self.unavailable(e))?;

        let mut books = Vec::new();
        while let Some(entry) = dir.next_entry().await.map_err(|e| self.unavailable(e))? {
            let filename = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(name) => {
                    tracing::debug!("Skipping non UTF-8 filename: {:?}", name);
                    continue;
                }
            };

            if !is_book_filename(&filename) {
                continue;
            }

            // Follows symlinks, unlike `DirEntry::metadata`
            let metadata = match tokio::fs::metadata(entry.path()).await {
                Ok(metadata) => metadata,
                Err(e) => {
                    tracing::warn!("Could not stat {}: {}", filename, e);
                    continue;
                }
            };

            if !metadata.is_file() {
                tracing::debug!("Skipping non-file entry: {}", filename);
                continue;
            }

            let modified_at = match metadata.modified() {
                Ok(time) => DateTime::<Utc>::from(time),
                Err(e) => {
                    tracing::warn!("No modification time for {}: {}", filename, e);
                    continue;
                }
            };

            books.push(BookEntry::new(filename, metadata.len(), modified_at));
        }

        sort_newest_first(&mut books);

        tracing::debug!(
            "Library scan complete: {} books in {:?}",
            books.len(),
            start.elapsed()
        );

        Ok(books)
    }

    /// Books fit for display: zero-byte files are left out
    pub async fn visible_books(&self) -> Result<Vec<BookEntry>, CatalogError> {
        let mut books = self.list_books().await?;
        books.retain(BookEntry::is_complete);
        Ok(books)
    }

    fn unavailable(&self, source: std::io::Error) -> CatalogError {
        CatalogError::StorageUnavailable {
            path: self.books_dir.clone(),
            source,
        }
    }
}

/// Descending by modification time, ties by filename
pub fn sort_newest_first(books: &mut [BookEntry]) {
    books.sort_by(|a, b| {
        b.modified_at
            .cmp(&a.modified_at)
            .then_with(|| a.filename.cmp(&b.filename))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File, FileTimes};
    use std::path::Path;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    fn write_book(dir: &Path, name: &str, data: &[u8], age_secs: u64) {
        let path = dir.join(name);
        fs::write(&path, data).unwrap();
        let mtime = SystemTime::now() - Duration::from_secs(age_secs);
        File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_times(FileTimes::new().set_modified(mtime))
            .unwrap();
    }

    #[tokio::test]
    async fn test_lists_recognized_books_newest_first() {
        let temp_dir = TempDir::new().unwrap();
        write_book(temp_dir.path(), "old.epub", b"old", 300);
        write_book(temp_dir.path(), "newest.kepub.epub", b"newest", 10);
        write_book(temp_dir.path(), "MIDDLE.KEPUB", b"middle", 100);
        write_book(temp_dir.path(), "notes.txt", b"ignored", 5);
        write_book(temp_dir.path(), "cover.jpg", b"ignored", 5);

        let scanner = LibraryScanner::new(temp_dir.path());
        let books = scanner.list_books().await.unwrap();

        let names: Vec<&str> = books.iter().map(|b| b.filename.as_str()).collect();
        assert_eq!(names, vec!["newest.kepub.epub", "MIDDLE.KEPUB", "old.epub"]);
        assert_eq!(books[0].size_bytes, 6);

        for pair in books.windows(2) {
            assert!(pair[0].modified_at >= pair[1].modified_at);
        }
    }

    #[tokio::test]
    async fn test_zero_byte_files_hidden_from_visible_books() {
        let temp_dir = TempDir::new().unwrap();
        write_book(temp_dir.path(), "empty.epub", b"", 10);
        write_book(temp_dir.path(), "full.epub", b"content", 20);

        let scanner = LibraryScanner::new(temp_dir.path());

        let all = scanner.list_books().await.unwrap();
        assert_eq!(all.len(), 2);

        let visible = scanner.visible_books().await.unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].filename, "full.epub");
    }

    #[tokio::test]
    async fn test_directories_are_skipped() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("folder.epub")).unwrap();
        write_book(temp_dir.path(), "real.epub", b"x", 1);

        let scanner = LibraryScanner::new(temp_dir.path());
        let books = scanner.list_books().await.unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].filename, "real.epub");
    }

    #[tokio::test]
    async fn test_missing_directory_is_unavailable() {
        let temp_dir = TempDir::new().unwrap();
        let scanner = LibraryScanner::new(temp_dir.path().join("missing"));

        let result = scanner.list_books().await;
        assert!(matches!(result, Err(CatalogError::StorageUnavailable { .. })));
    }

    #[test]
    fn test_ties_sorted_by_filename() {
        let now = Utc::now();
        let mut books = vec![
            BookEntry::new("b.epub".into(), 1, now),
            BookEntry::new("a.epub".into(), 1, now),
        ];
        sort_newest_first(&mut books);
        assert_eq!(books[0].filename, "a.epub");
    }
}

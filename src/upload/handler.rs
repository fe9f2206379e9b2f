//! Upload Handler
//!
//! Validates an incoming ebook, streams it into the staging directory and
//! moves it into the storage directory once complete. A stored book is
//! never overwritten: a taken name is replaced by a fresh one.

use axum::body::Bytes;
use chrono::Utc;
use futures::{pin_mut, Stream, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::staging::StagedFile;
use super::types::{
    StoredUpload, UploadError, ACCEPTED_EXTENSION, MAX_NAME_ATTEMPTS, STORED_SUFFIX,
};
use crate::config::StorageConfig;

// ============================================================================
// Name Clock
// ============================================================================

/// Millisecond timestamps that never repeat within the process.
///
/// Two uploads landing in the same millisecond get consecutive values, so
/// identical original names still map to distinct stored names.
#[derive(Debug, Default)]
pub struct NameClock {
    last: AtomicU64,
}

impl NameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next timestamp, strictly greater than any previously issued
    pub fn next(&self) -> u64 {
        let now = Utc::now().timestamp_millis().max(0) as u64;
        let previous = self
            .last
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        now.max(previous + 1)
    }
}

// ============================================================================
// Upload Handler
// ============================================================================

/// Accepts uploads into the storage directory
#[derive(Debug, Clone)]
pub struct UploadHandler {
    books_dir: PathBuf,
    staging_dir: PathBuf,
    max_upload_bytes: u64,
    clock: Arc<NameClock>,
}

impl UploadHandler {
    pub fn new(storage: &StorageConfig) -> Self {
        Self {
            books_dir: storage.books_dir.clone(),
            staging_dir: storage.staging_dir.clone(),
            max_upload_bytes: storage.max_upload_bytes,
            clock: Arc::new(NameClock::new()),
        }
    }

    /// Validate, stage and store one uploaded file.
    ///
    /// `declared_size` is checked before anything touches the disk; the
    /// streamed byte count is checked again while writing.
    pub async fn accept<S, E>(
        &self,
        original_filename: &str,
        declared_size: Option<u64>,
        content: S,
    ) -> Result<StoredUpload, UploadError>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: std::fmt::Display,
    {
        let base_name = client_base_name(original_filename);
        if !has_accepted_extension(base_name) {
            return Err(UploadError::UnsupportedType(original_filename.to_string()));
        }

        if let Some(size) = declared_size {
            if size > self.max_upload_bytes {
                return Err(UploadError::TooLarge {
                    size,
                    max: self.max_upload_bytes,
                });
            }
        }

        let mut filename = stored_filename(base_name, self.clock.next());
        let mut staged = StagedFile::create(&self.staging_dir, &filename).await?;

        pin_mut!(content);
        while let Some(chunk) = content.next().await {
            let chunk = chunk.map_err(|e| UploadError::InvalidBody(e.to_string()))?;

            let size = staged.written() + chunk.len() as u64;
            if size > self.max_upload_bytes {
                return Err(UploadError::TooLarge {
                    size,
                    max: self.max_upload_bytes,
                });
            }

            staged.write_chunk(&chunk).await?;
        }

        let size_bytes = staged.written();
        let mut attempts = 1;
        loop {
            match staged.persist(&self.books_dir.join(&filename)).await {
                Ok(()) => break,
                Err(e)
                    if e.kind() == std::io::ErrorKind::AlreadyExists
                        && attempts < MAX_NAME_ATTEMPTS =>
                {
                    attempts += 1;
                    let taken = std::mem::replace(
                        &mut filename,
                        stored_filename(base_name, self.clock.next()),
                    );
                    tracing::debug!("Destination {} taken, storing as {}", taken, filename);
                }
                Err(e) => return Err(e.into()),
            }
        }

        tracing::info!(
            original = %original_filename,
            stored = %filename,
            size = size_bytes,
            "Upload stored"
        );

        Ok(StoredUpload {
            filename,
            size_bytes,
        })
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Final path component of a client-supplied filename
pub fn client_base_name(original: &str) -> &str {
    original
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(original)
}

/// Whether the filename has the accepted extension (any case)
pub fn has_accepted_extension(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(ACCEPTED_EXTENSION))
}

/// `<name without .epub>_<timestamp>.kepub.epub`
pub fn stored_filename(original: &str, timestamp_ms: u64) -> String {
    let stem = strip_suffix_ignore_case(original, ".epub");
    format!("{}_{}{}", stem, timestamp_ms, STORED_SUFFIX)
}

fn strip_suffix_ignore_case<'a>(text: &'a str, suffix: &str) -> &'a str {
    let split = text.len().saturating_sub(suffix.len());
    match (text.get(..split), text.get(split..)) {
        (Some(head), Some(tail)) if tail.eq_ignore_ascii_case(suffix) => head,
        _ => text,
    }
}

// ============================================================================
// Tests
// ============================================================================

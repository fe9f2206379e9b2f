//! Book types and structures

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

use super::title::{derive_title, display_title};

/// Recognized ebook suffixes, longest first
pub const BOOK_EXTENSIONS: [&str; 3] = [".kepub.epub", ".kepub", ".epub"];

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// A file in the storage directory recognized as an ebook.
///
/// Entries are never persisted; every catalog request rebuilds them from
/// the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookEntry {
    /// On-disk file name, unique within the storage directory
    pub filename: String,

    /// Byte length of the file
    pub size_bytes: u64,

    /// Last modification time, also the sort key
    pub modified_at: DateTime<Utc>,
}

impl BookEntry {
    pub fn new(filename: String, size_bytes: u64, modified_at: DateTime<Utc>) -> Self {
        Self {
            filename,
            size_bytes,
            modified_at,
        }
    }

    /// Size label such as `"1.50 MB"`
    pub fn display_size(&self) -> String {
        format_size(self.size_bytes)
    }

    /// Markup-safe title derived from the filename
    pub fn display_title(&self) -> String {
        display_title(&self.filename)
    }

    /// Zero-byte files are leftovers of broken uploads
    pub fn is_complete(&self) -> bool {
        self.size_bytes > 0
    }

    /// JSON shape served by `/api/books`
    pub fn summary(&self) -> BookSummary {
        BookSummary {
            name: self.filename.clone(),
            title: derive_title(&self.filename),
            size: self.display_size(),
            size_bytes: self.size_bytes,
            date_added: self.modified_at,
        }
    }
}

/// Catalog entry as exposed over the JSON API
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookSummary {
    pub name: String,
    pub title: String,
    pub size: String,
    pub size_bytes: u64,
    #[serde(serialize_with = "serialize_millis")]
    pub date_added: DateTime<Utc>,
}

/// RFC 3339 in UTC with exactly three fractional digits
fn serialize_millis<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Whether a filename carries one of the recognized ebook suffixes
pub fn is_book_filename(filename: &str) -> bool {
    let lower = filename.to_ascii_lowercase();
    BOOK_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Format a byte count as megabytes with two decimals
pub fn format_size(size_bytes: u64) -> String {
    format!("{:.2} MB", size_bytes as f64 / BYTES_PER_MB)
}

//! Upload types

use serde::Serialize;

// ============================================================================
// Constants
// ============================================================================

/// The only extension accepted from clients
pub const ACCEPTED_EXTENSION: &str = "epub";

/// Suffix given to every stored upload
pub const STORED_SUFFIX: &str = ".kepub.epub";

/// MIME type used when serving stored books
pub const EPUB_MIME_TYPE: &str = "application/epub+zip";

/// Attempts at finding a free destination name before giving up
pub const MAX_NAME_ATTEMPTS: usize = 5;

// ============================================================================
// Result Types
// ============================================================================

/// A file that made it into the storage directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredUpload {
    /// Name of the file inside the storage directory
    pub filename: String,

    /// Bytes written
    pub size_bytes: u64,
}

// ============================================================================
// Error Types
// ============================================================================

/// Upload error types
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("No file provided")]
    NoFileProvided,

    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("File too large: {size} bytes (max: {max})")]
    TooLarge { size: u64, max: u64 },

    #[error("Invalid upload body: {0}")]
    InvalidBody(String),

    #[error("Storage write failed: {0}")]
    StorageWriteFailed(#[from] std::io::Error),
}

impl UploadError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            Self::NoFileProvided => StatusCode::BAD_REQUEST,
            Self::UnsupportedType(_) => StatusCode::BAD_REQUEST,
            Self::TooLarge { .. } => StatusCode::BAD_REQUEST,
            Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
            Self::StorageWriteFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the person uploading
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NoFileProvided => "No file selected",
            Self::UnsupportedType(_) => "Only EPUB ebooks are supported!",
            Self::TooLarge { .. } => "File size is too large",
            Self::InvalidBody(_) => "Malformed upload request",
            Self::StorageWriteFailed(_) => "Error saving file",
        }
    }
}

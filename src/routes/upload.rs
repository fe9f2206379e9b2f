//! Upload Routes
//!
//! Endpoints:
//! - POST /api/upload - multipart form with a single `epub` file field

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::header,
    response::{IntoResponse, Redirect},
    routing::post,
    Router,
};

use crate::state::AppState;
use crate::upload::UploadError;

/// Form field carrying the file
pub const UPLOAD_FIELD: &str = "epub";

impl IntoResponse for UploadError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Upload failed: {}", self);
        } else {
            tracing::warn!("Upload rejected: {}", self);
        }

        (status, self.user_message()).into_response()
    }
}

/// Create the upload router.
///
/// The default body limit is lifted here; the upload handler enforces its
/// own limit while streaming.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/upload", post(upload_book))
        .layer(DefaultBodyLimit::disable())
}

/// POST /api/upload
///
/// Stores the first `epub` file in the form and redirects to the library.
async fn upload_book(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Redirect, UploadError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| UploadError::InvalidBody(e.body_text()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        // Browsers send an unnamed, empty part when no file was picked
        let file_name = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => continue,
        };

        let declared_size = field
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<u64>().ok());

        state
            .uploads()
            .accept(&file_name, declared_size, field)
            .await?;

        return Ok(Redirect::to("/"));
    }

    Err(UploadError::NoFileProvided)
}

//! Catalog routes
//!
//! The library page, the upload form and the JSON listing. All three
//! re-scan the storage directory on every request.

use axum::{extract::State, response::Html, routing::get, Json, Router};

use crate::error::Result;
use crate::html::{render_catalog, render_upload_form};
use crate::library::BookSummary;
use crate::state::AppState;

/// Create the catalog router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(catalog_page))
        .route("/upload", get(upload_page))
        .route("/api/books", get(list_books))
}

/// GET /
async fn catalog_page(State(state): State<AppState>) -> Result<Html<String>> {
    let books = state.scanner().visible_books().await?;
    Ok(Html(render_catalog(&books)))
}

/// GET /upload
async fn upload_page() -> Html<String> {
    Html(render_upload_form())
}

/// GET /api/books
///
/// Newest first; zero-byte files are left out, same as the library page.
async fn list_books(State(state): State<AppState>) -> Result<Json<Vec<BookSummary>>> {
    let books = state.scanner().visible_books().await?;
    Ok(Json(books.iter().map(|book| book.summary()).collect()))
}

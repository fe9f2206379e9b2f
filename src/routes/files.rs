//! File serving routes
//!
//! Serves stored books from the storage directory. Range requests, missing
//! files and path traversal are handled by `ServeDir`.

use axum::{
    extract::{ConnectInfo, Request},
    http::{header, HeaderName, HeaderValue},
    middleware::{self, Next},
    response::Response,
    Router,
};
use std::net::SocketAddr;
use std::path::Path;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::state::AppState;
use crate::upload::EPUB_MIME_TYPE;

/// Create the files router, rooted at the storage directory
pub fn router(books_dir: &Path) -> Router<AppState> {
    let serve_dir = ServeDir::new(books_dir).append_index_html_on_directories(false);

    Router::new()
        .nest_service("/books", serve_dir)
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_TYPE,
            epub_content_type,
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-cache"),
        ))
        .layer(middleware::from_fn(log_download))
}

/// Every served book is labelled as an EPUB; error responses keep theirs
fn epub_content_type(response: &Response) -> Option<HeaderValue> {
    response
        .status()
        .is_success()
        .then(|| HeaderValue::from_static(EPUB_MIME_TYPE))
}

async fn log_download(request: Request, next: Next) -> Response {
    let headers = request.headers();
    let header_str = |name: HeaderName| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("-")
            .to_string()
    };

    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    tracing::info!(
        path = %request.uri().path(),
        user_agent = %header_str(header::USER_AGENT),
        client = %client,
        range = %header_str(header::RANGE),
        "Download requested"
    );

    next.run(request).await
}

//! Application state management

use std::sync::Arc;

use crate::config::Config;
use crate::library::LibraryScanner;
use crate::upload::UploadHandler;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    scanner: LibraryScanner,
    uploads: UploadHandler,
}

impl AppState {
    /// Create a new application state from a loaded configuration
    pub fn new(config: Config) -> Self {
        let scanner = LibraryScanner::new(config.storage.books_dir.clone());
        let uploads = UploadHandler::new(&config.storage);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                scanner,
                uploads,
            }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the catalog scanner
    pub fn scanner(&self) -> &LibraryScanner {
        &self.inner.scanner
    }

    /// Get the upload handler
    pub fn uploads(&self) -> &UploadHandler {
        &self.inner.uploads
    }

    /// Create the storage and staging directories if missing
    pub async fn prepare_directories(&self) -> std::io::Result<()> {
        let storage = &self.inner.config.storage;
        for dir in [&storage.books_dir, &storage.staging_dir] {
            tokio::fs::create_dir_all(dir).await?;
            tracing::debug!("Using directory {}", dir.display());
        }
        Ok(())
    }
}

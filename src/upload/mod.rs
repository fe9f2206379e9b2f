//! Upload Module
//!
//! Single-request ebook uploads:
//! - Extension and size validation
//! - Streaming into a staging directory
//! - Atomic rename into the storage directory
//!
//! Flow:
//! 1. Client posts a multipart form with one `epub` file field
//! 2. Server validates the name and declared size
//! 3. Content is streamed to `<staging>/<stored name>`
//! 4. The staged file is renamed to `<books>/<stored name>`

pub mod handler;
pub mod staging;
pub mod types;

pub use handler::{NameClock, UploadHandler};
pub use staging::StagedFile;
pub use types::*;

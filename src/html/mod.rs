//! HTML pages
//!
//! Server-rendered library and upload pages. Titles are escaped by the
//! library module before they reach the templates.

mod pages;

pub use pages::{render_catalog, render_upload_form};

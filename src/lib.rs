//! Kobi Server Library
//!
//! A minimal self-hosted ebook server: upload EPUB files, browse them as a
//! library sorted newest first, and download them as Kobo-ready `.kepub.epub`.
//!
//! # Modules
//!
//! - `library`: Directory scanning and display titles
//! - `upload`: Validated, staged uploads into the storage directory
//! - `routes`: HTTP endpoints
//! - `html`: Server-rendered pages

pub mod config;
pub mod error;
pub mod html;
pub mod library;
pub mod routes;
pub mod state;
pub mod upload;

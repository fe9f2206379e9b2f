//! Library module for book management
//!
//! Handles directory scanning, entry metadata, and display title derivation.

mod book;
mod scanner;
mod title;

pub use book::*;
pub use scanner::*;
pub use title::*;

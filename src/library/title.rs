//! Display titles derived from stored filenames
//!
//! Stored uploads are named `<original>_<13-digit ms timestamp>.kepub.epub`;
//! the title is what remains once the suffixes, separators and timestamp
//! are removed.

/// Length of the millisecond timestamp appended to uploaded filenames
pub const TIMESTAMP_DIGITS: usize = 13;

/// Derive a human-readable title from a catalog filename.
///
/// A name that reduces to nothing, such as a bare timestamp, keeps the full
/// filename as its title. The result is not escaped; see [`display_title`] for markup-safe output.
pub fn derive_title(filename: &str) -> String {
    let mut title = filename
        .replacen(".kepub", "", 1)
        .replacen(".epub", "", 1)
        .replace('_', " ");

    if has_timestamp_suffix(&title) {
        title.truncate(title.len() - TIMESTAMP_DIGITS);
    }

    let title = title.trim_end();
    if title.is_empty() {
        filename.to_string()
    } else {
        title.to_string()
    }
}

/// Escape `<` and `>` so a title can be embedded in markup.
pub fn escape_markup(text: &str) -> String {
    text.replace('<', "&lt;").replace('>', "&gt;")
}

/// Title as rendered in the catalog page
pub fn display_title(filename: &str) -> String {
    escape_markup(&derive_title(filename))
}

fn has_timestamp_suffix(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() >= TIMESTAMP_DIGITS
        && bytes[bytes.len() - TIMESTAMP_DIGITS..]
            .iter()
            .all(u8::is_ascii_digit)
}

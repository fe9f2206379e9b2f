//! Catalog and upload pages

use crate::library::BookEntry;
use crate::upload::EPUB_MIME_TYPE;

const BASE_STYLE: &str = r#"
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body { font-family: Arial, sans-serif; background-color: #f5f5f5; }
        .navbar { background-color: #333; overflow: hidden; position: fixed; top: 0; width: 100%; z-index: 1000; }
        .navbar a { float: left; display: block; color: #f2f2f2; text-align: center; padding: 14px 20px; text-decoration: none; font-size: 17px; }
        .navbar a:hover { background-color: #ddd; color: black; }
        .navbar a.active { background-color: #4CAF50; color: white; }
        .container { margin-top: 60px; padding: 20px; max-width: 1200px; margin-left: auto; margin-right: auto; }
        h1 { color: #333; margin-bottom: 20px; }
"#;

const CATALOG_STYLE: &str = r#"
        .book-item { background: white; padding: 15px; margin-bottom: 15px; border-radius: 8px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }
        .book-title { font-size: 18px; font-weight: bold; color: #333; margin-bottom: 8px; }
        .book-info { color: #666; font-size: 14px; margin-bottom: 10px; }
        .download-btn, .refresh-btn { color: white; padding: 10px 20px; border-radius: 4px; font-size: 16px; text-decoration: none; display: inline-block; }
        .download-btn { background-color: #4CAF50; }
        .download-btn:hover { background-color: #45a049; }
        .refresh-btn { background-color: #2196F3; margin-bottom: 15px; }
        .refresh-btn:hover { background-color: #0b7dda; }
        .empty-message { text-align: center; color: #666; padding: 40px 20px; }
"#;

const UPLOAD_STYLE: &str = r#"
        .upload-section { background: white; padding: 30px; border-radius: 8px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }
        .file-input-wrapper { margin: 20px 0; }
        input[type="file"] { padding: 10px; border: 1px solid #ddd; border-radius: 4px; width: 100%; max-width: 400px; }
        .upload-btn { background-color: #4CAF50; color: white; padding: 12px 30px; border: none; border-radius: 4px; cursor: pointer; font-size: 16px; margin-top: 10px; }
        .upload-btn:hover { background-color: #45a049; }
"#;

/// Which navbar link is highlighted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    Library,
    Upload,
}

/// Render the library page. Zero-byte entries are skipped.
pub fn render_catalog(books: &[BookEntry]) -> String {
    let items: Vec<String> = books
        .iter()
        .filter(|book| book.is_complete())
        .map(render_book_item)
        .collect();

    let listing = if items.is_empty() {
        r#"<p class="empty-message">No books available in the library.</p>"#.to_string()
    } else {
        items.join("\n")
    };

    let body = format!(
        r#"<h1>Library</h1>
        <a href="/" class="refresh-btn">Refresh</a>
        <div class="book-grid">
            {listing}
        </div>"#
    );

    layout("Kobi", Page::Library, CATALOG_STYLE, &body)
}

/// Render the upload form
pub fn render_upload_form() -> String {
    let body = format!(
        r#"<h1>Upload EPUB ebook</h1>
        <div class="upload-section">
            <form action="/api/upload" method="POST" enctype="multipart/form-data">
                <p>Select an EPUB file to upload</p>
                <div class="file-input-wrapper">
                    <input type="file" name="epub" accept="{EPUB_MIME_TYPE},.epub" required>
                </div>
                <button type="submit" class="upload-btn">Upload</button>
            </form>
        </div>"#
    );

    layout("Upload book", Page::Upload, UPLOAD_STYLE, &body)
}

fn render_book_item(book: &BookEntry) -> String {
    format!(
        r#"<div class="book-item">
                <div class="book-title">{title}</div>
                <div class="book-info">Size: {size}</div>
                <a href="/books/{href}" class="download-btn">Download</a>
            </div>"#,
        title = book.display_title(),
        size = book.display_size(),
        href = urlencoding::encode(&book.filename),
    )
}

fn layout(title: &str, active: Page, style: &str, body: &str) -> String {
    let class_for = |page: Page| if page == active { r#" class="active""# } else { "" };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{BASE_STYLE}{style}</style>
</head>
<body>
    <div class="navbar">
        <a href="/"{library}>Library</a>
        <a href="/upload"{upload}>Upload book</a>
    </div>

    <div class="container">
        {body}
    </div>
</body>
</html>"#,
        library = class_for(Page::Library),
        upload = class_for(Page::Upload),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_catalog_lists_books() {
        let books = vec![BookEntry::new(
            "War_and_Peace_1700000000000.kepub.epub".to_string(),
            2 * 1024 * 1024,
            Utc::now(),
        )];

        let html = render_catalog(&books);
        assert!(html.contains(r#"<div class="book-title">War and Peace</div>"#));
        assert!(html.contains("Size: 2.00 MB"));
        assert!(html.contains(r#"href="/books/War_and_Peace_1700000000000.kepub.epub""#));
        assert!(html.contains(r#"<a href="/" class="active">Library</a>"#));
    }

    #[test]
    fn test_catalog_skips_zero_byte_books() {
        let books = vec![BookEntry::new("Empty.epub".to_string(), 0, Utc::now())];

        let html = render_catalog(&books);
        assert!(!html.contains("book-item"));
        assert!(html.contains("empty-message"));
    }

    #[test]
    fn test_catalog_escapes_titles_and_links() {
        let books = vec![BookEntry::new(
            "<b>Bold</b> & co.epub".to_string(),
            10,
            Utc::now(),
        )];

        let html = render_catalog(&books);
        assert!(html.contains("&lt;b&gt;Bold&lt;/b&gt; & co"));
        assert!(html.contains("/books/%3Cb%3EBold%3C%2Fb%3E%20%26%20co.epub"));
        assert!(!html.contains("<b>Bold</b>"));
    }

    #[test]
    fn test_upload_form() {
        let html = render_upload_form();
        assert!(html.contains(r#"action="/api/upload""#));
        assert!(html.contains(r#"name="epub""#));
        assert!(html.contains(r#"enctype="multipart/form-data""#));
        assert!(html.contains(r#"<a href="/upload" class="active">Upload book</a>"#));
    }
}

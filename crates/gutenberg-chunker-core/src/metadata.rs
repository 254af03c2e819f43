//! Title and author scraping from the Gutenberg preamble.
//!
//! The preamble carries lines such as `Title: Moby Dick; Or, The Whale`
//! and `Author: Herman Melville`. Scanning stops at the first line that
//! starts with `***` or once both fields are known.

use serde::Serialize;

/// Bibliographic fields found in a book's preamble.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BookMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
}

pub fn extract_metadata(content: &str) -> BookMetadata {
    let mut meta = BookMetadata::default();

    for line in content.lines() {
        if meta.title.is_some() && meta.author.is_some() {
            break;
        }

        let text = line.trim();
        if text.starts_with("***") {
            break;
        }

        if text.starts_with("Title") {
            if let Some(value) = field_value(text) {
                meta.title = Some(value);
            }
        }
        if text.starts_with("Author") {
            if let Some(value) = field_value(text) {
                meta.author = Some(value);
            }
        }
    }

    meta
}

fn field_value(line: &str) -> Option<String> {
    line.split_once(':')
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

//! Flattening documents into searchable records.

use crate::config::RoutesConfig;
use crate::types::{Document, RichTextBlock, SearchRecord};

/// Separator between flattened blocks, and between title and body.
pub const BLOCK_SEPARATOR: &str = "\n";

/// Plain text of a block stream for indexing.
///
/// Only text blocks contribute (headings and body paragraphs alike); their
/// spans are concatenated and non-empty blocks joined with
/// [`BLOCK_SEPARATOR`]. Callouts, code, images, and tables contribute
/// nothing.
pub fn flatten_text(blocks: &[RichTextBlock]) -> String {
    let mut parts: Vec<String> = Vec::new();

    for block in blocks {
        match block {
            RichTextBlock::Text(text_block) => {
                let text = text_block.plain_text();
                if !text.is_empty() {
                    parts.push(text);
                }
            },
            RichTextBlock::Callout(_)
            | RichTextBlock::Code(_)
            | RichTextBlock::Image(_)
            | RichTextBlock::Table(_)
            | RichTextBlock::Unknown => {},
        }
    }

    parts.join(BLOCK_SEPARATOR)
}

impl SearchRecord {
    /// Derive the record for one document.
    ///
    /// `indexed_text` is the title followed by the flattened body, so title
    /// words count both as a stored field and inline.
    pub fn from_document(document: &Document, routes: &RoutesConfig) -> Self {
        let body = flatten_text(&document.content);
        let indexed_text = if body.is_empty() {
            document.title.clone()
        } else {
            format!("{}{BLOCK_SEPARATOR}{body}", document.title)
        };

        Self {
            url: document.url(routes),
            indexed_text,
            title: document.title.clone(),
            page_title: document.title.clone(),
        }
    }
}

//! Table of contents extraction from a rich-text block stream.
//!
//! H1 and H2 blocks open a section, H3 blocks become subsections of the
//! most recent section, and everything else is ignored. Ids come from one
//! [`SlugAllocator`] per call, so repeated heading text still yields
//! distinct anchors.

use crate::slug::SlugAllocator;
use crate::types::{
    BlockStyle, HeadingAnchor, HeadingLevel, OutlineSection, OutlineSubsection, RichTextBlock,
};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    Section,
    Subsection,
}

#[derive(Debug)]
struct OutlineHeading {
    block_index: usize,
    level: HeadingLevel,
    placement: Placement,
    title: String,
    id: String,
}

/// Build the two-level outline for a document's content.
///
/// ```rust
/// use docsite_core::{extract_outline, HeadingLevel, RichTextBlock};
///
/// let blocks = vec![
///     RichTextBlock::heading(HeadingLevel::H2, "Setup"),
///     RichTextBlock::heading(HeadingLevel::H3, "Install"),
///     RichTextBlock::paragraph("Run the installer."),
///     RichTextBlock::heading(HeadingLevel::H2, "Setup"),
/// ];
///
/// let outline = extract_outline(&blocks);
/// assert_eq!(outline.len(), 2);
/// assert_eq!(outline[0].children[0].id, "install");
/// assert_ne!(outline[0].id, outline[1].id);
/// ```
pub fn extract_outline(blocks: &[RichTextBlock]) -> Vec<OutlineSection> {
    let mut sections: Vec<OutlineSection> = Vec::new();

    for heading in outline_headings(blocks) {
        match heading.placement {
            Placement::Section => sections.push(OutlineSection {
                id: heading.id,
                title: heading.title,
                children: Vec::new(),
            }),
            Placement::Subsection => {
                // outline_headings never yields a subsection before a section
                if let Some(parent) = sections.last_mut() {
                    parent.children.push(OutlineSubsection {
                        id: heading.id,
                        title: heading.title,
                    });
                }
            },
        }
    }

    sections
}

/// Anchor ids for every heading that appears in the outline, in document
/// order, so a renderer can put the same `id` on the heading element that
/// the table of contents links to.
pub fn heading_anchors(blocks: &[RichTextBlock]) -> Vec<HeadingAnchor> {
    outline_headings(blocks)
        .into_iter()
        .map(|heading| HeadingAnchor {
            block_index: heading.block_index,
            level: heading.level.depth(),
            title: heading.title,
            id: heading.id,
        })
        .collect()
}

fn outline_headings(blocks: &[RichTextBlock]) -> Vec<OutlineHeading> {
    let mut slugs = SlugAllocator::new();
    let mut headings = Vec::new();
    let mut has_section = false;

    for (block_index, block) in blocks.iter().enumerate() {
        let text_block = match block {
            RichTextBlock::Text(text_block) => text_block,
            RichTextBlock::Callout(_)
            | RichTextBlock::Code(_)
            | RichTextBlock::Image(_)
            | RichTextBlock::Table(_)
            | RichTextBlock::Unknown => continue,
        };

        let (level, placement) = match text_block.style {
            BlockStyle::Heading(level @ (HeadingLevel::H1 | HeadingLevel::H2)) => {
                (level, Placement::Section)
            },
            BlockStyle::Heading(level @ HeadingLevel::H3) => (level, Placement::Subsection),
            BlockStyle::Heading(HeadingLevel::H4 | HeadingLevel::H5 | HeadingLevel::H6)
            | BlockStyle::Body => continue,
        };

        let title = text_block.plain_text();
        if title.trim().is_empty() {
            continue;
        }

        if placement == Placement::Subsection && !has_section {
            debug!("Dropping subsection '{}' with no preceding section", title);
            continue;
        }
        has_section |= placement == Placement::Section;

        let id = slugs.allocate(&title);
        headings.push(OutlineHeading {
            block_index,
            level,
            placement,
            title,
            id,
        });
    }

    headings
}

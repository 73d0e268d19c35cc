use anyhow::{Result, bail};
use docsite_core::{Page, SearchService};
use serde_json::json;
use std::fmt::Write as _;

use crate::cli::OutputFormat;

pub async fn execute(service: &SearchService, slug: &str, format: OutputFormat) -> Result<()> {
    let Some(page) = service.page(slug).await? else {
        bail!("Page '{slug}' not found");
    };

    match format {
        OutputFormat::Text => print!("{}", render_text(&page)),
        OutputFormat::Json => {
            let payload = json!({
                "url": page.url,
                "title": page.document.title,
                "outline": page.outline,
                "anchors": page.anchors,
            });
            println!("{}", serde_json::to_string_pretty(&payload)?);
        },
    }

    Ok(())
}

fn render_text(page: &Page) -> String {
    let mut out = format!("{} ({})\n\n", page.document.title, page.url);

    if page.outline.is_empty() {
        out.push_str("(no headings)\n");
        return out;
    }

    for section in &page.outline {
        let _ = writeln!(out, "- {}  #{}", section.title, section.id);
        for child in &section.children {
            let _ = writeln!(out, "  - {}  #{}", child.title, child.id);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsite_core::{
        Document, HeadingLevel, PageType, RichTextBlock, extract_outline, heading_anchors,
    };

    fn page(content: Vec<RichTextBlock>) -> Page {
        let outline = extract_outline(&content);
        let anchors = heading_anchors(&content);
        Page {
            url: "/docs/setup".to_string(),
            document: Document {
                id: "1".to_string(),
                title: "Setup".to_string(),
                slug: "setup".to_string(),
                page_type: PageType::General,
                meta_description: None,
                content,
            },
            outline,
            anchors,
        }
    }

    #[test]
    fn test_render_text_nests_subsections() {
        let out = render_text(&page(vec![
            RichTextBlock::heading(HeadingLevel::H2, "Install"),
            RichTextBlock::heading(HeadingLevel::H3, "Linux"),
            RichTextBlock::heading(HeadingLevel::H2, "Install"),
        ]));

        assert_eq!(
            out,
            "Setup (/docs/setup)\n\n- Install  #install\n  - Linux  #linux\n- Install  #install-2\n"
        );
    }

    #[test]
    fn test_render_text_without_headings() {
        let out = render_text(&page(vec![RichTextBlock::paragraph("Just text")]));
        assert!(out.ends_with("(no headings)\n"));
    }
}

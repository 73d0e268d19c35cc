use anyhow::Result;
use docsite_core::{PageSummary, RoutesConfig, SearchService};
use serde_json::{Value, json};
use std::fmt::Write as _;

use crate::cli::OutputFormat;

pub async fn execute(service: &SearchService, format: OutputFormat) -> Result<()> {
    let pages = service.store().list_pages().await?;
    let routes = &service.config().routes;

    match format {
        OutputFormat::Text => print!("{}", render_text(&pages, routes)),
        OutputFormat::Json => {
            let payload: Vec<Value> = pages
                .iter()
                .map(|page| {
                    json!({
                        "_id": page.id,
                        "title": page.title,
                        "slug": page.slug,
                        "pageType": page.page_type,
                        "url": page.url(routes),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&payload)?);
        },
    }

    Ok(())
}

fn render_text(pages: &[PageSummary], routes: &RoutesConfig) -> String {
    if pages.is_empty() {
        return "No pages\n".to_string();
    }

    let width = pages
        .iter()
        .map(|page| page.title.chars().count())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for page in pages {
        let _ = writeln!(out, "{:<width$}  {}", page.title, page.url(routes));
    }
    out
}

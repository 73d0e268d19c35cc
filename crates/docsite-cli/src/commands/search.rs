use anyhow::Result;
use docsite_core::{SearchOptions, SearchResult, SearchService};
use serde_json::json;
use std::fmt::Write as _;

use crate::cli::OutputFormat;

pub async fn execute(
    service: &SearchService,
    query: &str,
    limit: Option<usize>,
    format: OutputFormat,
) -> Result<()> {
    let results = service.search(query, &SearchOptions { limit }).await?;

    match format {
        OutputFormat::Text => print!("{}", render_text(query, &results)),
        OutputFormat::Json => {
            let payload = json!({
                "query": query,
                "total": results.len(),
                "results": results,
            });
            println!("{}", serde_json::to_string_pretty(&payload)?);
        },
    }

    Ok(())
}

fn render_text(query: &str, results: &[SearchResult]) -> String {
    if results.is_empty() {
        return format!("No results for \"{query}\"\n");
    }

    let noun = if results.len() == 1 { "result" } else { "results" };
    let mut out = format!("Found {} {noun} for \"{query}\":\n\n", results.len());
    for (rank, result) in results.iter().enumerate() {
        let _ = writeln!(out, "{:>3}. {}", rank + 1, result.title);
        let _ = writeln!(out, "     {}", result.url);
    }
    out
}

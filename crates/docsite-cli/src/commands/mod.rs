//! Command implementations.

mod outline;
mod pages;
mod search;

use anyhow::{Context, Result};
use docsite_core::{Config, SearchService, open_store};

use crate::cli::{Cli, Commands};

/// Resolve configuration: file, then `DOCSITE_*` environment, then flags.
pub fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load()?,
    };

    config.apply_env_overrides()?;

    if let Some(corpus) = &cli.corpus {
        config.store.corpus = Some(corpus.clone());
    }
    if let Some(endpoint) = &cli.endpoint {
        // an explicit endpoint beats a corpus file picked up from config
        config.store.corpus = None;
        config.store.endpoint = Some(endpoint.clone());
    }

    Ok(config)
}

pub async fn execute(cli: Cli) -> Result<()> {
    let config = resolve_config(&cli)?;
    let store = open_store(&config.store)?;
    let service = SearchService::new(store, config);

    match cli.command {
        Commands::Search {
            query,
            limit,
            format,
        } => search::execute(&service, &query.join(" "), limit, format).await,
        Commands::Outline { slug, format } => outline::execute(&service, &slug, format).await,
        Commands::Pages { format } => pages::execute(&service, format).await,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("global.toml");
        std::fs::write(
            &path,
            "[store]\ncorpus = \"/srv/from-file.json\"\n\n[search]\ndefault_limit = 7\n",
        )
        .unwrap();
        let config_arg = path.to_str().unwrap();

        let cli = Cli::try_parse_from(["docsite", "--config", config_arg, "pages"]).unwrap();
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.search.default_limit, 7);

        let cli = Cli::try_parse_from([
            "docsite",
            "--config",
            config_arg,
            "--endpoint",
            "https://abc.example.io",
            "pages",
        ])
        .unwrap();
        let config = resolve_config(&cli).unwrap();
        assert!(config.store.corpus.is_none());
        assert_eq!(config.store.endpoint.as_deref(), Some("https://abc.example.io"));

        let cli = Cli::try_parse_from([
            "docsite",
            "--config",
            config_arg,
            "--corpus",
            "local.json",
            "pages",
        ])
        .unwrap();
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.store.corpus, Some(PathBuf::from("local.json")));
    }
}

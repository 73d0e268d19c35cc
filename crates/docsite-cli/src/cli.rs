//! # CLI Structure and Argument Parsing
//!
//! ```bash
//! # Search the corpus
//! docsite --corpus pages.json search dense depth --limit 5
//!
//! # Table of contents for one page
//! docsite --corpus pages.json outline coherent-ofdm-radar
//!
//! # Every page, ordered by title
//! docsite --endpoint https://abc123.api.example-cms.io pages --format json
//! ```
//!
//! The content store comes from `--corpus` or `--endpoint`, falling back to
//! the configuration file and `DOCSITE_*` environment variables.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Main CLI structure for the `docsite` command
#[derive(Parser, Clone, Debug)]
#[command(name = "docsite")]
#[command(version)]
#[command(about = "docsite - Search and outline a rich-text documentation corpus", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Suppress informational messages (only show errors)
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Read documents from a JSON corpus file
    #[arg(long, global = true, value_name = "PATH")]
    pub corpus: Option<PathBuf>,

    /// Query documents from a CMS endpoint
    #[arg(long, global = true, value_name = "URL", conflicts_with = "corpus")]
    pub endpoint: Option<String>,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Full-text search across every page
    Search {
        /// Search query
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Maximum number of results (defaults to search.default_limit)
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Table of contents for one page
    Outline {
        /// Page slug
        slug: String,

        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// List every page, ordered by title
    Pages {
        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

impl Commands {
    pub const fn format(&self) -> OutputFormat {
        match self {
            Self::Search { format, .. } | Self::Outline { format, .. } | Self::Pages { format } => {
                *format
            },
        }
    }
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON for scripting
    Json,
}

impl OutputFormat {
    pub const fn is_machine_readable(self) -> bool {
        matches!(self, Self::Json)
    }
}

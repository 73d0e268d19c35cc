//! docsite CLI - search and outline a rich-text documentation corpus
//!
//! This is the main entry point for the docsite command-line interface.
//! Command implementations live in [`commands`].

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod utils;

use cli::Cli;
use utils::initialize_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    initialize_logging(&cli)?;

    commands::execute(cli).await
}

//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod config_cmd;
mod scrape;
mod serve;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::config::load_settings;

#[derive(Parser)]
#[command(name = "weatherscrape")]
#[command(about = "Headless-browser weather scraping service")]
#[command(version)]
pub struct Cli {
    /// Config file (TOML)
    #[arg(long, global = true, env = "WEATHERSCRAPE_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Start the weather HTTP service
    Serve {
        /// Bind address: PORT, HOST, or HOST:PORT (default from config)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Scrape one or more cities once and print the JSON
    Scrape {
        /// City names
        #[arg(required = true)]
        cities: Vec<String>,
        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Print the effective configuration
    Config,
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = load_settings(cli.config.as_deref()).context("Failed to load settings")?;

    match cli.command {
        Commands::Serve { bind } => serve::cmd_serve(&settings, bind.as_deref()).await,
        Commands::Scrape { cities, pretty } => scrape::cmd_scrape(&settings, &cities, pretty).await,
        Commands::Config => config_cmd::cmd_config_show(&settings, cli.config.as_deref()),
    }
}

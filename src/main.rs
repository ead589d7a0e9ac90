//! Folio - a static site generator for markdown articles and html templates.

mod build;
mod cli;
mod config;
mod engine;
mod generator;
mod logger;
mod plugin;
mod pool;
mod serve;
mod site;
mod utils;
mod watch;

use anyhow::Result;
use build::generate_site;
use clap::Parser;
use cli::{Cli, Commands};
use config::SiteConfig;
use serve::serve_site;
use std::sync::Arc;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Arc::new(SiteConfig::load(&cli.config)?);

    match &cli.command {
        Commands::Generate => generate_site(&config).map(|_| ()),
        Commands::Serve { .. } => {
            let watch = cli.is_watch();
            if watch {
                generate_site(&config)?;
            }
            serve_site(config, watch)
        }
    }
}

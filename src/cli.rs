//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Folio static site generator CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Config file path (JSON or TOML, decided by extension)
    #[arg(short = 'C', long, global = true, default_value = "folio.json")]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the generation pipeline once
    Generate,

    /// Serve the output directory over HTTP
    Serve {
        /// Regenerate the site when content or templates change
        #[arg(short, long)]
        watch: bool,
    },
}

impl Cli {
    pub const fn is_watch(&self) -> bool {
        matches!(self.command, Commands::Serve { watch: true })
    }
}

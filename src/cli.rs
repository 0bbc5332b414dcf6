//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use crate::logger::LogLevel;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// contentmap: keeps content collection types in sync with your content tree
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Project root directory (default: current directory)
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Settings file name, relative to root (default: contentmap.toml)
    #[arg(short = 'C', long, default_value = "contentmap.toml")]
    pub config: PathBuf,

    /// Content directory path (relative to project root)
    #[arg(short, long)]
    pub content: Option<PathBuf>,

    /// Minimum severity of messages to print
    #[arg(short, long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Scan the content directory once and write the type declarations
    Sync,

    /// Keep type declarations up to date while files change
    Watch {
        /// Quiet period in milliseconds before a batch of changes is processed
        #[arg(short, long)]
        debounce: Option<u64>,
    },

    /// Print the virtual module with a freshly computed lookup map
    Lookup,
}

#[allow(unused)]
impl Cli {
    pub const fn is_sync(&self) -> bool {
        matches!(self.command, Commands::Sync)
    }
    pub const fn is_watch(&self) -> bool {
        matches!(self.command, Commands::Watch { .. })
    }
    pub const fn is_lookup(&self) -> bool {
        matches!(self.command, Commands::Lookup)
    }
}

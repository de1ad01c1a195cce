use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::ui::OutputFormat;

/// Cycle desktop wallpapers from local files or online downloads
#[derive(Parser, Debug)]
#[command(name = "wallloop", author, version, about, long_about = None)]
pub struct Cli {
    /// Activate debug mode
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Output format for messages
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Directory holding session_images/, session.json and metadata.json
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Never download images; online mode becomes unavailable
    #[arg(long, global = true)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Show the interactive menu (default)
    Menu,
    /// Resume the last saved session
    Resume,
    /// Set a single wallpaper and exit
    Set {
        /// Path to the wallpaper image
        path: PathBuf,
    },
    /// List images in the session images directory
    List,
    /// Show recent downloads and wallpaper changes
    History {
        /// Number of entries to show
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
    /// Print the effective configuration and file locations
    Config {
        /// Write the effective configuration to the config file if none exists
        #[arg(long)]
        init: bool,
    },
}

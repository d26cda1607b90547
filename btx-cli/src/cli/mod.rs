use std::path::PathBuf;

use clap::{Parser, Subcommand};

use self::commands::{extract::Extract, serve::Serve, status::StatusCheck};

pub mod commands;
pub mod extra;

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Extract categorized tags from a single post page
    Extract(Extract),
    /// Check whether the supported sites are reachable
    Status(StatusCheck),
    /// List the sites with a dedicated extraction profile
    Sites,
    /// Serve the extraction and status endpoints over HTTP
    Serve(Serve),
}

#[derive(Parser, Debug)]
#[clap(name = "Booru Tag Extractor", author, version, about, long_about = None)]
pub struct Cli {
    #[clap(subcommand)]
    pub mode: Commands,

    /// Read settings from this file instead of the default config location
    ///
    /// A commented sample is written there when the file does not exist.
    #[clap(
        short,
        long,
        value_name = "PATH",
        global = true,
        help_heading = "GENERAL"
    )]
    pub config: Option<PathBuf>,
}

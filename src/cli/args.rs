//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Map PubMed/MEDLINE citation documents into typed records and ingestion items
#[derive(Parser, Debug)]
#[command(name = "pmcollect")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug level, repeat for more (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Directory holding the local .pmcollect.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Map every record and report counts
    Parse {
        /// Citation files or directories
        #[arg(required = true, value_hint = ValueHint::AnyPath)]
        inputs: Vec<PathBuf>,
        /// Fail on the first record that cannot be mapped
        #[arg(long)]
        strict: bool,
    },

    /// Map, project and write ingestion items as JSON lines
    Ingest {
        /// Citation files or directories
        #[arg(required = true, value_hint = ValueHint::AnyPath)]
        inputs: Vec<PathBuf>,
        /// Output file (appended to)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: PathBuf,
        /// Fail on the first record that cannot be mapped
        #[arg(long)]
        strict: bool,
    },

    /// Print one record
    Show {
        /// Citation file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Record position in the document
        #[arg(short, long, default_value_t = 0)]
        index: usize,
        /// Print the node structure instead of the mapped record
        #[arg(long)]
        tree: bool,
    },

    /// Retrieve archive sources into the cache directory
    Fetch {
        /// Paths or file:// URLs
        #[arg(required = true)]
        sources: Vec<String>,
        /// Destination directory (default: configured cache_dir)
        #[arg(long, value_hint = ValueHint::DirPath)]
        dest: Option<PathBuf>,
        /// Maximum simultaneous fetches (default: configured concurrency_limit)
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// Expand the baseline URL template for a range of archive numbers
    Urls {
        /// First archive number (1-based)
        #[arg(long)]
        from: u32,
        /// Last archive number (inclusive)
        #[arg(long)]
        to: u32,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
    },

    /// Show config paths
    Path,
}

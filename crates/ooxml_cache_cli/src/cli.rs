//! CLI argument definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use ooxml_cache::Tier;

/// ooxml-cache - Inspect and drive the three-tier cache of an OOXML package
#[derive(Parser)]
#[command(name = "ooxml-cache")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Storage root for cache directories (overrides the configuration)
    #[arg(long, global = true, value_name = "DIR")]
    pub storage_root: Option<PathBuf>,

    /// Package file whose cache to use
    #[arg(short, long, global = true, value_name = "FILE")]
    pub document: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the cache file path of a part
    Path {
        /// Part path inside the package (e.g. word/document.xml)
        logical_path: String,

        /// Tier to map into
        #[arg(short, long, value_enum, default_value_t = TierArg::Normal)]
        tier: TierArg,
    },

    /// Resolve a cache file path back to its tier and part path
    Resolve {
        /// Path reported by a file watcher
        path: PathBuf,
    },

    /// Cache a newly extracted part
    Create {
        /// Part path inside the package
        logical_path: String,

        /// File holding the part contents ("-" for stdin)
        source: PathBuf,

        /// Leave the compare tier empty (part is new to the package)
        #[arg(long)]
        empty_compare: bool,
    },

    /// Update a cached part after an edit
    Update {
        /// Part path inside the package
        logical_path: String,

        /// File holding the new contents ("-" for stdin)
        source: PathBuf,

        /// Keep the current compare baseline
        #[arg(long)]
        no_compare: bool,
    },

    /// Pin the compare baseline of a part
    Pin {
        /// Part path inside the package
        logical_path: String,

        /// File holding the baseline contents ("-" for stdin)
        source: PathBuf,
    },

    /// Write a cached tier file to stdout
    Show {
        /// Part path inside the package
        logical_path: String,

        /// Tier to read
        #[arg(short, long, value_enum, default_value_t = TierArg::Normal)]
        tier: TierArg,
    },

    /// Delete every tier file of a part
    Delete {
        /// Part path inside the package
        logical_path: String,
    },

    /// List cached parts
    List,

    /// Clear the document's cache
    Reset,
}

/// Cache tier selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TierArg {
    Normal,
    Prev,
    Compare,
}

impl From<TierArg> for Tier {
    fn from(tier: TierArg) -> Self {
        match tier {
            TierArg::Normal => Tier::Normal,
            TierArg::Prev => Tier::Prev,
            TierArg::Compare => Tier::Compare,
        }
    }
}

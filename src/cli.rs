//! CLI definitions for acrotip.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// acrotip CLI.
#[derive(Parser)]
#[command(name = "acrotip")]
#[command(about = "Acronym detection and definition lookups")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path. Defaults to the platform config directory.
    #[arg(short, long, global = true, env = "ACROTIP_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Detect acronyms in a page (plain text paragraphs or a JSON node tree)
    Scan {
        /// Page file; `.json` files are read as a node tree
        file: PathBuf,

        /// Also look up every detected term
        #[arg(long)]
        define: bool,

        /// Output format (table, json)
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Look up a single term
    Lookup {
        term: String,

        /// Surrounding text passed to the AI fallback
        #[arg(long)]
        context: Option<String>,
    },

    /// Stop highlighting a term everywhere
    Dismiss { term: String },

    /// Highlight a previously dismissed term again
    Enable { term: String },

    /// List dismissed terms
    Dismissed,

    /// Per-site enablement
    Site {
        #[command(subcommand)]
        action: SiteAction,
    },

    /// AI credential management
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },

    /// Tooltip hover delay in milliseconds
    Delay { ms: Option<u64> },

    /// Cache management
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Show recent lookups, most recent first
    Recent,
}

#[derive(Subcommand)]
pub(crate) enum SiteAction {
    /// Turn detection back on for a host
    Enable { host: String },

    /// Turn detection off for a host
    Disable { host: String },

    /// List disabled hosts
    List,
}

#[derive(Subcommand)]
pub(crate) enum KeyAction {
    /// Store the AI credential
    Set { key: String },

    /// Remove the stored AI credential
    Clear,
}

#[derive(Subcommand)]
pub(crate) enum CacheAction {
    /// Drop every cached definition
    Clear,
}

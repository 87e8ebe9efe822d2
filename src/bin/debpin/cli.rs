//! CLI definitions using clap.

use std::path::PathBuf;

use clap::Parser;

/// debpin - Refresh pinned Debian packages in build documents
#[derive(Parser)]
#[command(name = "debpin")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Armored OpenPGP public key trusted to sign Release files (repeatable)
    #[arg(long = "pgp-key", value_name = "PATH")]
    pub pgp_keys: Vec<PathBuf>,

    /// Print the updated documents instead of writing them
    #[arg(long)]
    pub dry_run: bool,

    /// Build documents to update
    #[arg(value_name = "FILES", default_value = "WORKSPACE.toml")]
    pub files: Vec<PathBuf>,
}

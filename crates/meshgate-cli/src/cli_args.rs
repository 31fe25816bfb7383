//! CLI argument definitions for the meshgate command-line interface.
//!
//! All `#[derive(Parser)]` and `#[derive(Subcommand)]` types are defined here,
//! keeping `main.rs` focused on dispatch logic.

use clap::{Parser, Subcommand};

/// meshgate - glTF structural and binary-layout integrity checker
#[derive(Parser)]
#[command(name = "meshgate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub(crate) struct Cli {
    /// Log pass activity to stderr (repeat for trace output)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Check .gltf/.glb files (directories are scanned recursively)
    Check {
        /// Files or directories to check
        #[arg(required = true)]
        paths: Vec<String>,

        /// Correct stale buffer byteLength declarations and write the file back
        #[arg(long)]
        fix: bool,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,

        /// Path to validator config file (JSON)
        #[arg(long)]
        config: Option<String>,

        /// Pass IDs to skip (can be repeated)
        #[arg(long = "disable-pass")]
        disable_passes: Vec<String>,

        /// Only run these passes (comma-separated)
        #[arg(long = "only-pass")]
        only_passes: Option<String>,

        /// Do not require TEXCOORD_0 on every primitive
        #[arg(long)]
        no_uv_policy: bool,
    },

    /// List the registered validation passes
    Passes {
        /// Output machine-readable JSON
        #[arg(long)]
        json: bool,
    },
}

//! CLI interface using clap.
//!
//! Provides command-line arguments and subcommands for the tool.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

/// Cursor Markdown Export - list Cursor IDE chat sessions and export them as Markdown.
#[derive(Parser, Debug)]
#[command(name = "cursor-md-export")]
#[command(author, version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Enable verbose logging (use multiple times for more verbosity).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (defaults to the platform config directory).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List chat sessions, oldest first.
    Ls {
        /// Path to Cursor's state.vscdb.
        #[arg(long, value_name = "PATH")]
        db: Option<PathBuf>,

        /// Emit a JSON report instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Export one session by ID, or every session passing the time filters.
    Export {
        /// Session ID (as shown by `ls`); exports all sessions if omitted.
        id: Option<String>,

        /// Path to Cursor's state.vscdb.
        #[arg(long, value_name = "PATH")]
        db: Option<PathBuf>,

        /// Output directory for Markdown files [default: markdown_output].
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,

        /// Emit a JSON report instead of status lines.
        #[arg(long)]
        json: bool,

        /// Sort newest first (`--sort-desc=false` for oldest first) [default: true].
        #[arg(
            long,
            action = ArgAction::Set,
            value_name = "BOOL",
            num_args = 0..=1,
            require_equals = true,
            default_missing_value = "true"
        )]
        sort_desc: Option<bool>,

        /// Name files by title instead of by sequence number.
        #[arg(long)]
        byname: bool,

        /// Only sessions started at or after this time.
        #[arg(long, value_name = "TIME")]
        start_after: Option<String>,

        /// Only sessions started at or before this time.
        #[arg(long, value_name = "TIME")]
        start_before: Option<String>,

        /// Only sessions ended at or after this time (open sessions always pass).
        #[arg(long, value_name = "TIME")]
        end_after: Option<String>,

        /// Only sessions ended at or before this time (open sessions always pass).
        #[arg(long, value_name = "TIME")]
        end_before: Option<String>,
    },

    /// Print the version.
    Version {
        /// Emit JSON.
        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    /// Whether the command reports in JSON.
    #[must_use]
    pub const fn json(&self) -> bool {
        match self {
            Self::Ls { json, .. } | Self::Export { json, .. } | Self::Version { json } => *json,
        }
    }
}

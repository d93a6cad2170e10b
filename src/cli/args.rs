//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

use crate::application::OutputFormat;
use crate::domain::SchemaPolicy;

/// Statistical summaries for grouped tabular data
#[derive(Parser, Debug)]
#[command(name = "datasummary")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Directory holding a local .datasummary.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Collapse grouped items and derive AVG/SD/Count
    Summarize {
        /// Dataset file (.json or .toml)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Output format: json, toml or tree
        #[arg(short, long)]
        format: Option<OutputFormat>,
        /// Schema policy: ignore, warn or strict
        #[arg(short, long)]
        policy: Option<SchemaPolicy>,
        /// Write to file instead of stdout
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Report groups whose items do not share the first item's fields
    Check {
        /// Dataset file (.json or .toml)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Show a dataset as a tree, without aggregating
    Tree {
        /// Dataset file (.json or .toml)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
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
    Show {
        /// Show only the local config file (on top of defaults)
        #[arg(short, long)]
        local: bool,
    },

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
    },

    /// Show config paths
    Path,
}

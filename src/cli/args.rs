//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint};

use crate::domain::NodeId;

/// Schema-configurable forest builder: turn flat parent-referencing records into sorted trees
#[derive(Parser, Debug)]
#[command(name = "rsforest")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity: -d info, -dd debug, -ddd trace
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Record file plus per-run overrides of the loaded settings.
#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    /// Record file (TOML array of tables)
    #[arg(value_hint = ValueHint::FilePath)]
    pub file: PathBuf,

    /// Nodes at this depth keep no children (roots are depth 0)
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Parent id marking a root
    #[arg(long, conflicts_with = "no_sentinel")]
    pub root_parent_id: Option<NodeId>,

    /// Only missing or unresolved parents make roots
    #[arg(long)]
    pub no_sentinel: bool,

    /// Name of the array of tables holding the records
    #[arg(long)]
    pub table: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the forest as a tree
    Tree {
        #[command(flatten)]
        args: BuildArgs,
        /// Hang all roots below one synthetic root
        #[arg(long)]
        single: bool,
    },

    /// List roots in sorted order
    Roots {
        #[command(flatten)]
        args: BuildArgs,
    },

    /// Show every leaf with its ancestors
    Leaves {
        #[command(flatten)]
        args: BuildArgs,
    },

    /// Show the ancestor chain of a node
    Path {
        #[command(flatten)]
        args: BuildArgs,
        /// Node id
        id: NodeId,
    },

    /// Show the attributes of a node
    Show {
        #[command(flatten)]
        args: BuildArgs,
        /// Node id
        id: NodeId,
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
    /// Show effective configuration
    Show {
        /// Directory whose local config is applied
        #[arg(value_hint = ValueHint::DirPath)]
        dir: Option<PathBuf>,
    },

    /// Print a commented config template
    Template,

    /// Show config file locations
    Path {
        /// Directory whose local config path is shown
        #[arg(value_hint = ValueHint::DirPath)]
        dir: Option<PathBuf>,
    },
}

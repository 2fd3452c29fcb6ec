//! Command-line front-end.

use std::path::PathBuf;

use clap::{ArgAction, Parser};

pub mod commands;
pub mod output;

pub use commands::Commands;

/// agency - pick the skills a project should carry
#[derive(Parser, Debug)]
#[command(name = "agency", version, about, long_about = None)]
pub struct Cli {
    /// Machine-readable JSON output on stdout
    #[arg(long, global = true)]
    pub robot: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable logging
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// HQ directory holding the skill registry and knowledge files
    #[arg(long, global = true, env = "AGENCY_HQ")]
    pub hq: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

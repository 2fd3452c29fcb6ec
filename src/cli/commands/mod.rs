//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - run() function to execute the command

use clap::Subcommand;

pub mod feedback;
pub mod quality;
pub mod suggest;

use crate::app::AppContext;
use crate::error::Result;

pub fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Suggest(args) => suggest::run(ctx, args),
        Commands::Feedback(args) => feedback::run(ctx, args),
        Commands::Quality(args) => quality::run(ctx, args),
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Select skills for a project and print the manifest
    Suggest(suggest::SuggestArgs),

    /// Record how a skill worked out
    Feedback(feedback::FeedbackArgs),

    /// Fold pending feedback into the quality index
    Quality(quality::QualityArgs),
}

//! agency - profile-driven skill selection
//!
//! Reads a project config and a skill registry, scores every skill against
//! the project, applies the policy's hard rules and budget, and emits an
//! auditable manifest of what was chosen and why.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod profile;
pub mod quality;
pub mod registry;
pub mod search;
pub mod selection;
pub mod test_utils;
pub mod utils;

pub use error::{AgencyError, Result};
pub use selection::{SelectionOutcome, SkillSelector, suggest};

//! Utility functions and helpers.

pub mod format;
pub mod fs;
pub mod text;

pub use format::*;
pub use fs::*;

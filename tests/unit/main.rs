//! Unit test suite entry point.

mod budget_tests;
mod config_tests;
mod constraint_tests;
mod manifest_tests;
mod registry_tests;

use std::path::PathBuf;

pub fn fixture_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(relative)
}

//! Shared test utilities for agency.

pub mod fixtures;
pub mod logging;

pub use fixtures::{HqFixture, SkillBuilder};

/// One named row of a table-driven test.
#[derive(Debug, Clone)]
pub struct TestCase<I, E> {
    pub name: &'static str,
    pub input: I,
    pub expected: E,
}

impl<I, E> TestCase<I, E> {
    #[must_use]
    pub const fn new(name: &'static str, input: I, expected: E) -> Self {
        Self {
            name,
            input,
            expected,
        }
    }
}

/// Run every row through `check` and report all mismatching rows at once.
///
/// Returns `Err` with one line per failing row, so a table test can simply
/// return the result.
pub fn run_table_tests<I, E, F>(cases: Vec<TestCase<I, E>>, check: F) -> Result<(), String>
where
    I: std::fmt::Debug,
    E: std::fmt::Debug + PartialEq,
    F: Fn(I) -> E,
{
    let total = cases.len();
    let failures: Vec<String> = cases
        .into_iter()
        .filter_map(|case| {
            let label = format!("{} <- {:?}", case.name, case.input);
            let actual = check(case.input);
            if actual == case.expected {
                tracing::debug!(case = case.name, "table row ok");
                None
            } else {
                Some(format!("{label}: expected {:?}, got {actual:?}", case.expected))
            }
        })
        .collect();

    if failures.is_empty() {
        Ok(())
    } else {
        Err(format!(
            "{} of {total} rows failed:\n  {}",
            failures.len(),
            failures.join("\n  ")
        ))
    }
}

//! Property-based invariants of the selection pipeline.

mod determinism_tests;
mod strategies;

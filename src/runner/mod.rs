// src/runner/mod.rs
mod report;
mod runner;

pub use report::{RunReport, ALL_PASSED, SOME_FAILED};
pub use runner::Runner;

// src/runner/report.rs
use crate::checks::CheckResult;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

pub const ALL_PASSED: &str = "ALL TESTS PASSED";
pub const SOME_FAILED: &str = "SOME TESTS FAILED";

/// Outcome of one invocation of the runner.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub results: Vec<CheckResult>,
    /// Set by the first failing check and never cleared
    pub failed: bool,
}

impl RunReport {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            results: Vec::new(),
            failed: false,
        }
    }

    pub fn push(&mut self, result: CheckResult) {
        if !result.passed {
            self.failed = true;
        }
        self.results.push(result);
    }

    pub fn passed(&self) -> bool {
        !self.failed
    }

    pub fn exit_code(&self) -> i32 {
        if self.failed {
            1
        } else {
            0
        }
    }

    pub fn summary_line(&self) -> &'static str {
        if self.failed {
            SOME_FAILED
        } else {
            ALL_PASSED
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.results.iter().filter(|r| !r.passed)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}

// src/checks/outcome.rs
use super::burst::StatusTally;
use serde::Serialize;
use std::time::Duration;

/// What a check requires of the target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expectation {
    Status { code: u16 },
    AllowedAndThrottled { allowed: u16, throttled: u16 },
}

/// What the target actually did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Observation {
    Status { code: u16 },
    Burst { tally: StatusTally },
    Error { message: String },
}

#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("port {port} returned status {actual}, expected {expected}")]
    UnexpectedStatus { port: u16, expected: u16, actual: u16 },

    #[error("could not connect to port {port}: {source}")]
    Transport {
        port: u16,
        #[source]
        source: reqwest::Error,
    },

    #[error("burst against port {port} hit {failed} transport errors in {total} requests: {source}")]
    BurstTransport {
        port: u16,
        failed: usize,
        total: usize,
        #[source]
        source: reqwest::Error,
    },

    #[error(
        "port {port} did not rate limit a burst of {total} requests \
         ({allowed} allowed, {throttled} throttled, {other} other)"
    )]
    RateLimitNotObserved {
        port: u16,
        total: usize,
        allowed: usize,
        throttled: usize,
        other: usize,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    /// Stable identifier used for metrics labels
    pub name: &'static str,
    pub expected: Expectation,
    pub observed: Observation,
    pub passed: bool,
    pub message: String,
    pub duration_ms: u64,
}

impl CheckResult {
    pub fn pass(
        name: &'static str,
        expected: Expectation,
        observed: Observation,
        message: String,
        duration: Duration,
    ) -> Self {
        Self {
            name,
            expected,
            observed,
            passed: true,
            message,
            duration_ms: duration.as_millis() as u64,
        }
    }

    pub fn fail(
        name: &'static str,
        expected: Expectation,
        observed: Observation,
        error: CheckError,
        duration: Duration,
    ) -> Self {
        Self {
            name,
            expected,
            observed,
            passed: false,
            message: error.to_string(),
            duration_ms: duration.as_millis() as u64,
        }
    }

    /// The console line for this result.
    pub fn line(&self) -> String {
        let verdict = if self.passed { "PASS" } else { "FAIL" };
        format!("{}: {}", verdict, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_line_uses_error_message() {
        let result = CheckResult::fail(
            "availability",
            Expectation::Status { code: 200 },
            Observation::Status { code: 500 },
            CheckError::UnexpectedStatus {
                port: 8080,
                expected: 200,
                actual: 500,
            },
            Duration::from_millis(12),
        );

        assert!(!result.passed);
        assert_eq!(result.line(), "FAIL: port 8080 returned status 500, expected 200");
        assert_eq!(result.duration_ms, 12);
    }

    #[test]
    fn test_result_serializes_tagged_outcomes() {
        let result = CheckResult::pass(
            "access_control",
            Expectation::Status { code: 403 },
            Observation::Status { code: 403 },
            "port 8081 returned status 403".into(),
            Duration::ZERO,
        );

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["name"], "access_control");
        assert_eq!(json["expected"]["kind"], "status");
        assert_eq!(json["observed"]["code"], 403);
        assert_eq!(json["passed"], true);
    }
}

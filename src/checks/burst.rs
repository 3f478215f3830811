// src/checks/burst.rs
use super::{port_of, Check, CheckError, CheckResult, Expectation, Observation};
use crate::config::ConfigError;
use crate::metrics::Timer;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};
use url::Url;

/// Status codes seen during a burst, keyed by code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StatusTally {
    counts: BTreeMap<u16, usize>,
}

impl StatusTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, status: StatusCode) {
        *self.counts.entry(status.as_u16()).or_insert(0) += 1;
    }

    pub fn count(&self, code: u16) -> usize {
        self.counts.get(&code).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u16, usize)> + '_ {
        self.counts.iter().map(|(code, count)| (*code, *count))
    }
}

impl FromIterator<StatusCode> for StatusTally {
    fn from_iter<I: IntoIterator<Item = StatusCode>>(iter: I) -> Self {
        let mut tally = Self::new();
        for status in iter {
            tally.record(status);
        }
        tally
    }
}

/// Fires a burst of GETs with bounded concurrency and requires the target to
/// both admit and throttle some of them.
pub struct RateLimitCheck {
    url: Url,
    requests: usize,
    concurrency: usize,
    allowed: u16,
    throttled: u16,
}

impl RateLimitCheck {
    /// Fails when `allowed` and `throttled` are the same code, since a burst
    /// could then never tell admitted and throttled requests apart.
    pub fn new(
        url: Url,
        requests: usize,
        concurrency: usize,
        allowed: u16,
        throttled: u16,
    ) -> Result<Self, ConfigError> {
        if allowed == throttled {
            return Err(ConfigError::IndistinctStatuses(allowed));
        }
        Ok(Self {
            url,
            requests,
            concurrency: concurrency.max(1),
            allowed,
            throttled,
        })
    }

    /// Rate limiting is demonstrated only when both outcomes appear.
    pub fn is_rate_limited(&self, tally: &StatusTally) -> bool {
        tally.count(self.allowed) > 0 && tally.count(self.throttled) > 0
    }

    fn expectation(&self) -> Expectation {
        Expectation::AllowedAndThrottled {
            allowed: self.allowed,
            throttled: self.throttled,
        }
    }

    async fn fire(&self, client: &Client) -> Vec<Result<StatusCode, reqwest::Error>> {
        stream::iter(0..self.requests)
            .map(|_| {
                let request = client.get(self.url.clone());
                async move { request.send().await.map(|response| response.status()) }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await
    }

    fn evaluate(
        &self,
        responses: Vec<Result<StatusCode, reqwest::Error>>,
        timer: &Timer,
    ) -> CheckResult {
        let port = port_of(&self.url);
        let mut tally = StatusTally::new();
        let mut failed = 0;
        let mut first_error = None;

        for response in responses {
            match response {
                Ok(status) => tally.record(status),
                Err(e) => {
                    failed += 1;
                    first_error.get_or_insert(e);
                }
            }
        }

        let allowed = tally.count(self.allowed);
        let throttled = tally.count(self.throttled);
        debug!(port, allowed, throttled, failed, "burst complete");

        if let Some(source) = first_error {
            return CheckResult::fail(
                self.name(),
                self.expectation(),
                Observation::Error {
                    message: source.to_string(),
                },
                CheckError::BurstTransport {
                    port,
                    failed,
                    total: self.requests,
                    source,
                },
                timer.elapsed(),
            );
        }

        if self.is_rate_limited(&tally) {
            CheckResult::pass(
                self.name(),
                self.expectation(),
                Observation::Burst { tally },
                format!(
                    "port {} rate limited a burst of {} requests ({} allowed, {} throttled)",
                    port, self.requests, allowed, throttled
                ),
                timer.elapsed(),
            )
        } else {
            let other = tally.total() - allowed - throttled;
            CheckResult::fail(
                self.name(),
                self.expectation(),
                Observation::Burst { tally },
                CheckError::RateLimitNotObserved {
                    port,
                    total: self.requests,
                    allowed,
                    throttled,
                    other,
                },
                timer.elapsed(),
            )
        }
    }
}

#[async_trait]
impl Check for RateLimitCheck {
    async fn run(&self, client: &Client) -> CheckResult {
        info!(
            url = %self.url,
            requests = self.requests,
            concurrency = self.concurrency,
            "Starting rate limit burst"
        );
        let timer = Timer::new();
        let responses = self.fire(client).await;
        self.evaluate(responses, &timer)
    }

    fn name(&self) -> &'static str {
        "rate_limit"
    }
}

// src/checks/mod.rs
mod burst;
mod outcome;
mod status;

pub use burst::{RateLimitCheck, StatusTally};
pub use outcome::{CheckError, CheckResult, Expectation, Observation};
pub use status::StatusCheck;

use crate::config::{Config, ConfigError};
use async_trait::async_trait;
use reqwest::Client;
use url::Url;

#[async_trait]
pub trait Check: Send + Sync {
    /// Run against the target. Transport errors become a failing result.
    async fn run(&self, client: &Client) -> CheckResult;

    fn name(&self) -> &'static str;
}

/// Build the ordered check list for a configuration.
pub fn create_checks(config: &Config) -> Result<Vec<Box<dyn Check>>, ConfigError> {
    let primary = config.target.primary_url()?;
    let secondary = config.target.secondary_url()?;

    let mut checks: Vec<Box<dyn Check>> = vec![
        Box::new(StatusCheck::new(
            "availability",
            primary.clone(),
            config.checks.primary_status,
        )),
        Box::new(StatusCheck::new(
            "access_control",
            secondary,
            config.checks.secondary_status,
        )),
    ];

    let rate_limit = &config.rate_limit;
    if rate_limit.enabled {
        checks.push(Box::new(RateLimitCheck::new(
            primary,
            rate_limit.requests,
            rate_limit.concurrency,
            rate_limit.allowed_status,
            rate_limit.throttled_status,
        )?));
    } else {
        tracing::info!("Rate limit check disabled");
    }

    Ok(checks)
}

pub(crate) fn port_of(url: &Url) -> u16 {
    url.port_or_known_default().unwrap_or(80)
}

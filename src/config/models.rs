// src/config/models.rs
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub target: TargetConfig,

    #[serde(default)]
    pub checks: StatusChecksConfig,

    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

/// The deployment under test: one host, two ports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_scheme")]
    pub scheme: String,

    /// Serves content and is rate limited
    #[serde(default = "default_primary_port")]
    pub primary_port: u16,

    /// Denies every request
    #[serde(default = "default_secondary_port")]
    pub secondary_port: u16,

    #[serde(default = "default_path")]
    pub path: String,

    /// Per-request timeout. Unset leaves the HTTP client default in place.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Expected statuses for the single-request checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChecksConfig {
    #[serde(default = "default_primary_status")]
    pub primary_status: u16,

    #[serde(default = "default_secondary_status")]
    pub secondary_status: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Total requests fired at the primary port
    #[serde(default = "default_requests")]
    pub requests: usize,

    /// Requests in flight at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    #[serde(default = "default_allowed_status")]
    pub allowed_status: u16,

    #[serde(default = "default_throttled_status")]
    pub throttled_status: u16,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("target host must not be empty")]
    EmptyHost,

    #[error("unsupported scheme {0:?}, expected http or https")]
    UnsupportedScheme(String),

    #[error("{0} port must be non-zero")]
    ZeroPort(&'static str),

    #[error("target path {0:?} must start with '/'")]
    RelativePath(String),

    #[error("{field} = {value} is not a valid HTTP status code")]
    InvalidStatus { field: &'static str, value: u16 },

    #[error("rate_limit.requests must be non-zero")]
    ZeroRequests,

    #[error("rate_limit.concurrency must be between 1 and requests ({requests}), got {concurrency}")]
    InvalidConcurrency { concurrency: usize, requests: usize },

    #[error("rate_limit.allowed_status and rate_limit.throttled_status must differ (both {0})")]
    IndistinctStatuses(u16),

    #[error("invalid target URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

// Default value functions
fn default_host() -> String {
    "nginx".to_string()
}

fn default_scheme() -> String {
    "http".to_string()
}

fn default_primary_port() -> u16 {
    8080
}

fn default_secondary_port() -> u16 {
    8081
}

fn default_path() -> String {
    "/".to_string()
}

fn default_primary_status() -> u16 {
    200
}

fn default_secondary_status() -> u16 {
    403
}

fn default_true() -> bool {
    true
}

fn default_requests() -> usize {
    50
}

fn default_concurrency() -> usize {
    20
}

fn default_allowed_status() -> u16 {
    200
}

fn default_throttled_status() -> u16 {
    503
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            scheme: default_scheme(),
            primary_port: default_primary_port(),
            secondary_port: default_secondary_port(),
            path: default_path(),
            timeout_secs: None,
        }
    }
}

impl Default for StatusChecksConfig {
    fn default() -> Self {
        Self {
            primary_status: default_primary_status(),
            secondary_status: default_secondary_status(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            requests: default_requests(),
            concurrency: default_concurrency(),
            allowed_status: default_allowed_status(),
            throttled_status: default_throttled_status(),
        }
    }
}

impl TargetConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn primary_url(&self) -> Result<Url, ConfigError> {
        self.url_for(self.primary_port)
    }

    pub fn secondary_url(&self) -> Result<Url, ConfigError> {
        self.url_for(self.secondary_port)
    }

    fn url_for(&self, port: u16) -> Result<Url, ConfigError> {
        let url = Url::parse(&format!(
            "{}://{}:{}{}",
            self.scheme, self.host, port, self.path
        ))?;
        Ok(url)
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let target = &self.target;
        if target.host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if target.scheme != "http" && target.scheme != "https" {
            return Err(ConfigError::UnsupportedScheme(target.scheme.clone()));
        }
        if target.primary_port == 0 {
            return Err(ConfigError::ZeroPort("primary"));
        }
        if target.secondary_port == 0 {
            return Err(ConfigError::ZeroPort("secondary"));
        }
        if !target.path.starts_with('/') {
            return Err(ConfigError::RelativePath(target.path.clone()));
        }

        validate_status("checks.primary_status", self.checks.primary_status)?;
        validate_status("checks.secondary_status", self.checks.secondary_status)?;

        let rate_limit = &self.rate_limit;
        validate_status("rate_limit.allowed_status", rate_limit.allowed_status)?;
        validate_status("rate_limit.throttled_status", rate_limit.throttled_status)?;
        if rate_limit.requests == 0 {
            return Err(ConfigError::ZeroRequests);
        }
        if rate_limit.concurrency == 0 || rate_limit.concurrency > rate_limit.requests {
            return Err(ConfigError::InvalidConcurrency {
                concurrency: rate_limit.concurrency,
                requests: rate_limit.requests,
            });
        }
        if rate_limit.allowed_status == rate_limit.throttled_status {
            return Err(ConfigError::IndistinctStatuses(rate_limit.allowed_status));
        }

        target.primary_url()?;
        target.secondary_url()?;
        Ok(())
    }
}

fn validate_status(field: &'static str, value: u16) -> Result<(), ConfigError> {
    if reqwest::StatusCode::from_u16(value).is_err() {
        return Err(ConfigError::InvalidStatus { field, value });
    }
    Ok(())
}

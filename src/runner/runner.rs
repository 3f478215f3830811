// src/runner/runner.rs
use super::report::RunReport;
use crate::checks::{create_checks, Check, CheckResult};
use crate::config::Config;
use crate::metrics::MetricsCollector;
use anyhow::{Context, Result};
use reqwest::Client;
use std::sync::Arc;
use tracing::{info, warn};

/// Runs the configured checks in order against one shared client.
pub struct Runner {
    client: Client,
    checks: Vec<Box<dyn Check>>,
    metrics: Option<Arc<MetricsCollector>>,
}

impl Runner {
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.target.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            checks: create_checks(config)?,
            metrics: None,
        })
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn check_names(&self) -> Vec<&'static str> {
        self.checks.iter().map(|c| c.name()).collect()
    }

    /// Run every check, printing one PASS/FAIL line per check to stdout.
    pub async fn run(&self) -> RunReport {
        self.run_with(|result| println!("{}", result.line())).await
    }

    /// Run every check, handing each result to `on_result` as soon as it
    /// completes. A failing check never stops the ones after it.
    pub async fn run_with<F>(&self, mut on_result: F) -> RunReport
    where
        F: FnMut(&CheckResult),
    {
        let mut report = RunReport::new();
        info!(
            run_id = %report.run_id,
            checks = ?self.check_names(),
            "Starting smoke checks"
        );

        for check in &self.checks {
            let result = check.run(&self.client).await;
            if !result.passed {
                warn!(check = result.name, "{}", result.message);
            }

            if let Some(metrics) = &self.metrics {
                metrics.record_check(&result);
            }

            on_result(&result);
            report.push(result);
        }

        info!(
            run_id = %report.run_id,
            failed = report.failures().count(),
            total = report.results.len(),
            "Smoke checks complete"
        );
        report
    }
}

// src/metrics/collector.rs
use crate::checks::{CheckResult, Observation};
use anyhow::Result;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub struct MetricsRegistry {
    registry: Registry,
    collector: Arc<MetricsCollector>,
}

impl MetricsRegistry {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();
        let collector = Arc::new(MetricsCollector::new(&registry)?);

        Ok(Self {
            registry,
            collector,
        })
    }

    pub fn collector(&self) -> Arc<MetricsCollector> {
        self.collector.clone()
    }

    /// Render every registered metric in the text exposition format.
    pub fn gather(&self) -> Result<Vec<u8>> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(buffer)
    }
}

pub struct MetricsCollector {
    pub checks_total: IntCounterVec,
    pub check_duration_seconds: HistogramVec,
    pub burst_responses_total: IntCounterVec,
}

impl MetricsCollector {
    pub fn new(registry: &Registry) -> Result<Self> {
        let checks_total = IntCounterVec::new(
            Opts::new("smoke_checks_total", "Checks run, by outcome"),
            &["check", "outcome"],
        )?;
        registry.register(Box::new(checks_total.clone()))?;

        let check_duration_seconds = HistogramVec::new(
            HistogramOpts::new("smoke_check_duration_seconds", "Check duration in seconds"),
            &["check"],
        )?;
        registry.register(Box::new(check_duration_seconds.clone()))?;

        let burst_responses_total = IntCounterVec::new(
            Opts::new(
                "smoke_burst_responses_total",
                "Responses received during the rate limit burst, by status code",
            ),
            &["status"],
        )?;
        registry.register(Box::new(burst_responses_total.clone()))?;

        Ok(Self {
            checks_total,
            check_duration_seconds,
            burst_responses_total,
        })
    }

    pub fn record_check(&self, result: &CheckResult) {
        let outcome = if result.passed { "pass" } else { "fail" };
        self.checks_total
            .with_label_values(&[result.name, outcome])
            .inc();

        self.check_duration_seconds
            .with_label_values(&[result.name])
            .observe(Duration::from_millis(result.duration_ms).as_secs_f64());

        if let Observation::Burst { tally } = &result.observed {
            for (code, count) in tally.iter() {
                let status = code.to_string();
                self.burst_responses_total
                    .with_label_values(&[status.as_str()])
                    .inc_by(count as u64);
            }
        }
    }
}

// Helper for timing operations
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

// src/main.rs
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use nginx_smoke_check::{
    config::{self, Config},
    metrics::MetricsRegistry,
    runner::{RunReport, Runner},
};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Smoke checks for the nginx deployment: content on the primary port,
/// access denied on the secondary port, rate limiting under a burst.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// YAML or JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Target host
    #[arg(long)]
    host: Option<String>,

    #[arg(long)]
    primary_port: Option<u16>,

    #[arg(long)]
    secondary_port: Option<u16>,

    /// Only run the availability and access-control checks
    #[arg(long)]
    skip_rate_limit: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Write Prometheus metrics for this run to a textfile
    #[arg(long)]
    metrics_file: Option<PathBuf>,
}

impl Cli {
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.target.host = host.clone();
        }
        if let Some(port) = self.primary_port {
            config.target.primary_port = port;
        }
        if let Some(port) = self.secondary_port {
            config.target.secondary_port = port;
        }
        if self.skip_rate_limit {
            config.rate_limit.enabled = false;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Diagnostics go to stderr; stdout carries the PASS/FAIL lines
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("nginx_smoke_check=info".parse()?)
                .add_directive("hyper=warn".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            config::load_config(path).await?
        }
        None => Config::default(),
    };
    cli.apply_overrides(&mut config);

    let metrics_registry = MetricsRegistry::new()?;
    let runner = Runner::new(&config)?.with_metrics(metrics_registry.collector());

    let report = runner.run().await;
    let code = finish(&report, cli.format, &metrics_registry, cli.metrics_file.as_deref()).await;
    std::process::exit(code);
}

/// Print the summary and optional outputs. The exit code depends on the
/// checks alone; a failed report or metrics write is only logged.
async fn finish(
    report: &RunReport,
    format: OutputFormat,
    metrics_registry: &MetricsRegistry,
    metrics_file: Option<&Path>,
) -> i32 {
    println!("{}", report.summary_line());

    if format == OutputFormat::Json {
        match report.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => warn!("Failed to serialize report: {}", e),
        }
    }

    if let Some(path) = metrics_file {
        match write_metrics(metrics_registry, path).await {
            Ok(()) => info!("Metrics written to {}", path.display()),
            Err(e) => warn!("{:#}", e),
        }
    }

    report.exit_code()
}

async fn write_metrics(registry: &MetricsRegistry, path: &Path) -> Result<()> {
    let metrics = registry.gather()?;
    tokio::fs::write(path, metrics)
        .await
        .with_context(|| format!("Failed to write metrics to {}", path.display()))?;
    Ok(())
}

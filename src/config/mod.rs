// src/config/mod.rs
mod models;

pub use models::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a file (YAML or JSON)
pub async fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    let config = parse_config(&contents, path)?;
    config.validate()?;
    Ok(config)
}

fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let is_yaml = matches!(
        path.extension().and_then(|s| s.to_str()),
        Some("yaml") | Some("yml")
    );

    let config = if is_yaml {
        serde_yaml::from_str(contents).context("Failed to parse YAML config")?
    } else {
        serde_json::from_str(contents).context("Failed to parse JSON config")?
    };
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_load_yaml_config_with_partial_sections() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "target:\n  host: localhost\n  primary_port: 9080\nrate_limit:\n  enabled: false\n"
        )
        .unwrap();

        let config = load_config(file.path()).await.unwrap();

        assert_eq!(config.target.host, "localhost");
        assert_eq!(config.target.primary_port, 9080);
        assert_eq!(config.target.secondary_port, 8081);
        assert!(!config.rate_limit.enabled);
        assert_eq!(config.rate_limit.requests, 50);
    }

    #[tokio::test]
    async fn test_load_json_config() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"target": {{"host": "web", "timeout_secs": 3}}, "checks": {{"secondary_status": 401}}}}"#
        )
        .unwrap();

        let config = load_config(file.path()).await.unwrap();

        assert_eq!(config.target.host, "web");
        assert_eq!(config.target.timeout_secs, Some(3));
        assert_eq!(config.checks.secondary_status, 401);
        assert_eq!(config.checks.primary_status, 200);
    }

    #[tokio::test]
    async fn test_load_config_rejects_invalid_values() {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        writeln!(file, "rate_limit:\n  requests: 5\n  concurrency: 20\n").unwrap();

        let err = load_config(file.path()).await.unwrap_err();
        assert!(err.to_string().contains("concurrency"));
    }

    #[tokio::test]
    async fn test_load_config_missing_file() {
        let err = load_config("/nonexistent/smoke.yaml").await.unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}

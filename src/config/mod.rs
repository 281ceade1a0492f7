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
    match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => {
            serde_yaml::from_str(contents).context("Failed to parse YAML config")
        }
        _ => serde_json::from_str(contents).context("Failed to parse JSON config"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ConsistencyLevel;

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
health:
  checker: liveness
  reactive: false
  consistency_level: LOCAL_QUORUM
  local_datacenter: dc1
monitor:
  enabled: true
  interval_secs: 10
"#;
        let config = parse_config(yaml, Path::new("health.yaml")).unwrap();

        assert_eq!(config.health.checker, CheckerKind::Liveness);
        assert!(!config.health.reactive);
        assert_eq!(config.health.consistency_level, Some(ConsistencyLevel::LocalQuorum));
        assert_eq!(config.health.local_datacenter.as_deref(), Some("dc1"));
        assert!(config.monitor.enabled);
        assert_eq!(config.monitor.interval_secs, 10);
        assert_eq!(config.monitor.timeout_secs, 5);
        assert_eq!(config.endpoint.path, "/health");
    }

    #[test]
    fn test_parse_json_defaults() {
        let config = parse_config("{}", Path::new("health.json")).unwrap();

        assert!(config.health.enabled);
        assert_eq!(config.health.checker, CheckerKind::Diagnostic);
        assert!(config.health.reactive);
        assert!(config.validate().is_ok());
    }

    #[tokio::test]
    async fn test_load_config_rejects_invalid_values() {
        let path = std::env::temp_dir().join(format!(
            "cassandra-health-invalid-{}.json",
            std::process::id()
        ));
        tokio::fs::write(&path, r#"{"endpoint": {"path": "health"}}"#)
            .await
            .unwrap();

        let result = load_config(&path).await;
        let _ = tokio::fs::remove_file(&path).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_load_config_missing_file() {
        let result = load_config("/nonexistent/cassandra-health.yaml").await;
        assert!(result.is_err());
    }
}

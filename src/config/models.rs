// src/config/models.rs
use crate::health::CheckerSettings;
use crate::session::ConsistencyLevel;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub health: HealthConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub endpoint: EndpointConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        self.health.validate()?;
        self.monitor.validate()?;

        if !self.endpoint.path.starts_with('/') {
            bail!("endpoint.path must start with '/': {}", self.endpoint.path);
        }
        if self.metrics.enabled {
            if !self.metrics.path.starts_with('/') {
                bail!("metrics.path must start with '/': {}", self.metrics.path);
            }
            if normalize_path(&self.metrics.path) == normalize_path(&self.endpoint.path) {
                bail!("metrics.path and endpoint.path must differ");
            }
        }
        Ok(())
    }
}

/// Drops trailing slashes; an empty result becomes `/`.
pub fn normalize_path(path: &str) -> String {
    match path.trim_end_matches('/') {
        "" => "/".to_string(),
        trimmed => trimmed.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckerKind {
    /// Topology and token ring diagnostics.
    #[default]
    Diagnostic,
    /// `SELECT release_version FROM system.local`.
    Liveness,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub checker: CheckerKind,
    #[serde(default = "default_true")]
    pub reactive: bool,
    #[serde(default)]
    pub consistency_level: Option<ConsistencyLevel>,
    #[serde(default)]
    pub local_datacenter: Option<String>,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            checker: CheckerKind::default(),
            reactive: true,
            consistency_level: None,
            local_datacenter: None,
        }
    }
}

impl HealthConfig {
    pub fn checker_settings(&self) -> CheckerSettings {
        CheckerSettings {
            consistency_level: self.consistency_level,
            local_datacenter: self.local_datacenter.clone(),
        }
    }

    fn validate(&self) -> Result<()> {
        if matches!(&self.local_datacenter, Some(dc) if dc.trim().is_empty()) {
            bail!("health.local_datacenter must not be blank");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_secs: default_interval_secs(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl MonitorConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.interval_secs == 0 {
            bail!("monitor.interval_secs must be greater than 0");
        }
        if self.timeout_secs == 0 {
            bail!("monitor.timeout_secs must be greater than 0");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_health_path")]
    pub path: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            path: default_health_path(),
        }
    }
}

impl EndpointConfig {
    pub fn addr(&self) -> SocketAddr {
        ([0, 0, 0, 0], self.port).into()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_metrics_path(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_interval_secs() -> u64 {
    30
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_port() -> u16 {
    8081
}

fn default_health_path() -> String {
    "/health".to_string()
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

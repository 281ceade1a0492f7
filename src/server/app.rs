// src/server/app.rs
use super::builder::ServerBuilder;
use super::handler::HealthEndpoint;
use crate::config::Config;
use crate::health::{CassandraHealthRegistration, HealthContributorRegistry, HealthMonitor};
use crate::metrics::MetricsRegistry;
use crate::session::CqlSession;
use anyhow::Result;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use tracing::info;

/// Everything a [`Config`] describes, wired together: the Cassandra
/// contributor, the optional monitor and metrics, and the HTTP endpoint.
pub struct HealthServer {
    config: Config,
    registry: Arc<HealthContributorRegistry>,
    metrics: Option<Arc<MetricsRegistry>>,
    monitor: Option<Arc<HealthMonitor>>,
}

impl HealthServer {
    pub fn new(config: Config, connections: BTreeMap<String, Arc<dyn CqlSession>>) -> Result<Self> {
        config.validate()?;

        let registry = Arc::new(HealthContributorRegistry::new());
        let mut registration = CassandraHealthRegistration::new(config.health.clone());
        registration.connections = connections;
        registration.register_into(&registry)?;

        let metrics = if config.metrics.enabled {
            let metrics = Arc::new(MetricsRegistry::new()?);
            metrics.collector().update_contributor_count(registry.len());
            Some(metrics)
        } else {
            None
        };

        let monitor = config.monitor.enabled.then(|| {
            Arc::new(HealthMonitor::new(
                config.monitor.clone(),
                registry.clone(),
                metrics.as_ref().map(|m| m.collector()),
            ))
        });

        Ok(Self {
            config,
            registry,
            metrics,
            monitor,
        })
    }

    pub fn registry(&self) -> Arc<HealthContributorRegistry> {
        self.registry.clone()
    }

    pub fn monitor(&self) -> Option<Arc<HealthMonitor>> {
        self.monitor.clone()
    }

    pub fn endpoint(&self) -> HealthEndpoint {
        let endpoint = HealthEndpoint::new(self.registry.clone(), &self.config.endpoint.path);
        match &self.metrics {
            Some(metrics) => endpoint.with_metrics(metrics.clone(), &self.config.metrics.path),
            None => endpoint,
        }
    }

    /// Serves on `endpoint.port` until `shutdown` resolves, with the monitor
    /// running alongside when enabled.
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let monitor = self.monitor.clone().map(|monitor| (monitor.spawn(), monitor));

        info!(
            contributors = self.registry.len(),
            monitor = self.config.monitor.enabled,
            metrics = self.config.metrics.enabled,
            "Starting Cassandra health server"
        );

        let served = ServerBuilder::new(self.config.endpoint.addr())
            .with_endpoint(self.endpoint())
            .serve_with_shutdown(shutdown)
            .await;

        if let Some((handle, monitor)) = monitor {
            monitor.shutdown();
            if let Err(e) = handle.await {
                tracing::error!("Health monitor task failed: {}", e);
            }
        }

        served
    }
}

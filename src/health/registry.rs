// src/health/registry.rs
use super::checker::{HealthChecker, LivenessChecker};
use super::indicator::{HealthContributor, HealthIndicator, ReactiveHealthIndicator};
use super::status::{HealthReport, Status};
use crate::config::{CheckerKind, HealthConfig};
use crate::session::CqlSession;
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Name the Cassandra contributor is registered under.
pub const CASSANDRA_CONTRIBUTOR: &str = "cassandra";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("A contributor named '{0}' is already registered")]
    DuplicateName(String),
}

/// Runs every child contributor and reports `DOWN` if any of them is down.
#[derive(Clone, Default)]
pub struct CompositeHealthContributor {
    contributors: BTreeMap<String, Arc<dyn HealthContributor>>,
}

impl CompositeHealthContributor {
    pub fn new(contributors: BTreeMap<String, Arc<dyn HealthContributor>>) -> Self {
        Self { contributors }
    }

    pub fn len(&self) -> usize {
        self.contributors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contributors.is_empty()
    }
}

#[async_trait]
impl HealthContributor for CompositeHealthContributor {
    async fn health(&self) -> HealthReport {
        aggregate(
            self.contributors
                .iter()
                .map(|(name, contributor)| (name.clone(), contributor.clone()))
                .collect(),
        )
        .await
    }
}

async fn aggregate(contributors: Vec<(String, Arc<dyn HealthContributor>)>) -> HealthReport {
    let checks = contributors.iter().map(|(_, contributor)| contributor.health());
    let reports = futures::future::join_all(checks).await;

    let status = if reports.iter().all(|report| report.status().is_up()) {
        Status::Up
    } else {
        Status::Down
    };

    contributors
        .into_iter()
        .zip(reports)
        .fold(HealthReport::new(status), |root, ((name, _), report)| {
            root.with_component(name, report)
        })
}

/// Named contributors the health endpoint exposes.
#[derive(Default)]
pub struct HealthContributorRegistry {
    contributors: DashMap<String, Arc<dyn HealthContributor>>,
}

impl HealthContributorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &self,
        name: impl Into<String>,
        contributor: Arc<dyn HealthContributor>,
    ) -> Result<(), RegistryError> {
        use dashmap::mapref::entry::Entry;

        let name = name.into();
        match self.contributors.entry(name.clone()) {
            Entry::Occupied(_) => Err(RegistryError::DuplicateName(name)),
            Entry::Vacant(slot) => {
                slot.insert(contributor);
                tracing::info!(contributor = %name, "Registered health contributor");
                Ok(())
            }
        }
    }

    pub fn unregister(&self, name: &str) -> Option<Arc<dyn HealthContributor>> {
        self.contributors.remove(name).map(|(_, contributor)| contributor)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn HealthContributor>> {
        self.contributors.get(name).map(|entry| entry.value().clone())
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .contributors
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }

    /// Snapshot of all contributors, sorted by name.
    pub fn entries(&self) -> Vec<(String, Arc<dyn HealthContributor>)> {
        let mut entries: Vec<_> = self
            .contributors
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    pub fn len(&self) -> usize {
        self.contributors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contributors.is_empty()
    }

    /// Runs every registered contributor and aggregates the results.
    pub async fn health(&self) -> HealthReport {
        aggregate(self.entries()).await
    }
}

/// Explicit wiring of Cassandra sessions into the health endpoint.
pub struct CassandraHealthRegistration {
    pub enabled: bool,
    pub connections: BTreeMap<String, Arc<dyn CqlSession>>,
    config: HealthConfig,
}

impl CassandraHealthRegistration {
    pub fn new(config: HealthConfig) -> Self {
        Self {
            enabled: config.enabled,
            connections: BTreeMap::new(),
            config,
        }
    }

    pub fn with_connection(
        mut self,
        name: impl Into<String>,
        session: Arc<dyn CqlSession>,
    ) -> Self {
        self.connections.insert(name.into(), session);
        self
    }

    fn indicator(&self, session: Arc<dyn CqlSession>) -> Arc<dyn HealthContributor> {
        let settings = self.config.checker_settings();
        match (self.config.checker, self.config.reactive) {
            (CheckerKind::Diagnostic, true) => {
                Arc::new(ReactiveHealthIndicator::new(HealthChecker::new(settings), session))
            }
            (CheckerKind::Diagnostic, false) => {
                Arc::new(HealthIndicator::new(HealthChecker::new(settings), session))
            }
            (CheckerKind::Liveness, true) => {
                Arc::new(ReactiveHealthIndicator::new(LivenessChecker::new(), session))
            }
            (CheckerKind::Liveness, false) => {
                Arc::new(HealthIndicator::new(LivenessChecker::new(), session))
            }
        }
    }

    /// One connection yields its indicator, several yield a composite keyed
    /// by connection name. `None` when disabled or nothing is connected.
    pub fn into_contributor(self) -> Option<Arc<dyn HealthContributor>> {
        if !self.enabled || self.connections.is_empty() {
            return None;
        }

        if self.connections.len() == 1 {
            let session = self.connections.values().next()?.clone();
            return Some(self.indicator(session));
        }

        let contributors = self
            .connections
            .iter()
            .map(|(name, session)| (name.clone(), self.indicator(session.clone())))
            .collect();
        Some(Arc::new(CompositeHealthContributor::new(contributors)))
    }

    /// Registers under [`CASSANDRA_CONTRIBUTOR`]. Returns whether anything
    /// was registered.
    pub fn register_into(
        self,
        registry: &HealthContributorRegistry,
    ) -> Result<bool, RegistryError> {
        match self.into_contributor() {
            Some(contributor) => {
                registry.register(CASSANDRA_CONTRIBUTOR, contributor)?;
                Ok(true)
            }
            None => {
                tracing::debug!("Cassandra health contributor not registered");
                Ok(false)
            }
        }
    }
}

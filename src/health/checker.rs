// src/health/checker.rs
use super::status::HealthReport;
use crate::session::{ConsistencyLevel, CqlSession, SessionError, Statement, TokenRingDiagnostic};
use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::debug;

/// A single health check against a cluster session.
///
/// Errors are returned as-is; turning them into `DOWN` reports is the job of
/// the indicator adapters.
#[async_trait]
pub trait Checker: Send + Sync {
    async fn check(&self, session: &dyn CqlSession) -> Result<HealthReport, SessionError>;
}

/// Per-check overrides. Unset values fall back to what the session reports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckerSettings {
    pub consistency_level: Option<ConsistencyLevel>,
    pub local_datacenter: Option<String>,
}

/// Reports cluster topology and, when a keyspace is selected, token ring
/// availability for that keyspace.
///
/// The status is `DOWN` if the whole cluster is down or if at least one token
/// range cannot satisfy the consistency level. Both reports come from the
/// driver's gossip view and are best-effort.
#[derive(Debug, Clone, Default)]
pub struct HealthChecker {
    settings: CheckerSettings,
}

impl HealthChecker {
    pub fn new(settings: CheckerSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &CheckerSettings {
        &self.settings
    }

    fn consistency_level(&self, session: &dyn CqlSession) -> ConsistencyLevel {
        self.settings
            .consistency_level
            .unwrap_or_else(|| session.default_consistency_level())
    }

    fn datacenter(&self, session: &dyn CqlSession) -> Option<String> {
        self.settings
            .local_datacenter
            .clone()
            .or_else(|| session.local_datacenter())
            .filter(|dc| !dc.is_empty())
    }

    async fn token_ring_diagnostic(
        &self,
        session: &dyn CqlSession,
    ) -> Result<Option<TokenRingDiagnostic>, SessionError> {
        let Some(keyspace) = session.keyspace().filter(|ks| !ks.is_empty()) else {
            debug!("No keyspace selected, skipping token ring diagnostic");
            return Ok(None);
        };

        let consistency_level = self.consistency_level(session);
        let datacenter = self.datacenter(session);

        if consistency_level.is_dc_local() && datacenter.is_none() {
            debug!(
                keyspace = %keyspace,
                consistency_level = %consistency_level,
                "No local datacenter resolved, skipping token ring diagnostic"
            );
            return Ok(None);
        }

        session
            .token_ring_diagnostic(&keyspace, consistency_level, datacenter.as_deref())
            .await
    }
}

#[async_trait]
impl Checker for HealthChecker {
    async fn check(&self, session: &dyn CqlSession) -> Result<HealthReport, SessionError> {
        let topology = session.topology_diagnostic().await?;
        let mut status = topology.status();

        let mut details = Map::new();
        details.insert("topology".to_string(), Value::Object(topology.details().clone()));

        if let Some(ring) = self.token_ring_diagnostic(session).await? {
            status = status.merge_with(ring.status());
            details.insert("ring".to_string(), Value::Object(ring.details().clone()));
        }

        debug!(status = status.as_str(), "Cassandra diagnostics collected");

        Ok(HealthReport::new(status.into()).with_details(details))
    }
}

const SELECT_VERSION: &str = "SELECT release_version FROM system.local";

/// Liveness check that reads the server version from `system.local`.
///
/// Runs at `LOCAL_ONE` so a single reachable local replica is enough.
#[derive(Debug, Clone, Default)]
pub struct LivenessChecker;

impl LivenessChecker {
    pub fn new() -> Self {
        Self
    }

    fn statement() -> Statement {
        Statement::new(SELECT_VERSION).with_consistency_level(ConsistencyLevel::LocalOne)
    }
}

#[async_trait]
impl Checker for LivenessChecker {
    async fn check(&self, session: &dyn CqlSession) -> Result<HealthReport, SessionError> {
        let row = session.execute(&Self::statement()).await?;

        let mut report = HealthReport::up();
        if let Some(row) = row {
            if let Some(version) = row.get_text(0)? {
                report = report.with_detail("version", version);
            }
        }
        Ok(report)
    }
}

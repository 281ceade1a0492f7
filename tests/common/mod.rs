// tests/common/mod.rs
#![allow(dead_code)]

use async_trait::async_trait;
use cassandra_health::session::{
    ConsistencyLevel, CqlSession, CqlValue, NodeState, Row, SessionError, Statement,
    TokenRingDiagnostic, TopologyDiagnostic,
};
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory session with scripted diagnostics.
pub struct ScriptedSession {
    pub keyspace: Option<String>,
    pub local_datacenter: Option<String>,
    pub nodes: Vec<(String, NodeState)>,
    pub ranges: Vec<(String, bool)>,
    pub version: Option<String>,
    pub unreachable: bool,
    pub queries: AtomicUsize,
}

impl ScriptedSession {
    pub fn healthy() -> Self {
        Self {
            keyspace: None,
            local_datacenter: Some("dc1".into()),
            nodes: vec![
                ("10.0.0.1:9042".into(), NodeState::Up),
                ("10.0.0.2:9042".into(), NodeState::Up),
            ],
            ranges: vec![("]0, 100]".into(), true), ("]100, 0]".into(), true)],
            version: Some("4.0.1".into()),
            unreachable: false,
            queries: AtomicUsize::new(0),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::healthy()
        }
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    fn connect(&self) -> Result<(), SessionError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.unreachable {
            Err(SessionError::ConnectionUnavailable(
                "All host(s) tried for query failed".into(),
            ))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CqlSession for ScriptedSession {
    fn keyspace(&self) -> Option<String> {
        self.keyspace.clone()
    }

    fn default_consistency_level(&self) -> ConsistencyLevel {
        ConsistencyLevel::LocalOne
    }

    fn local_datacenter(&self) -> Option<String> {
        self.local_datacenter.clone()
    }

    async fn topology_diagnostic(&self) -> Result<TopologyDiagnostic, SessionError> {
        self.connect()?;
        Ok(TopologyDiagnostic::from_nodes(self.nodes.clone()))
    }

    async fn token_ring_diagnostic(
        &self,
        keyspace: &str,
        consistency_level: ConsistencyLevel,
        datacenter: Option<&str>,
    ) -> Result<Option<TokenRingDiagnostic>, SessionError> {
        self.connect()?;
        Ok(Some(TokenRingDiagnostic::from_ranges(
            keyspace,
            consistency_level,
            datacenter.map(str::to_string),
            self.ranges.clone(),
        )))
    }

    async fn execute(&self, _statement: &Statement) -> Result<Option<Row>, SessionError> {
        self.connect()?;
        Ok(Some(Row::new(vec![self.version.clone().map(CqlValue::Text)])))
    }
}

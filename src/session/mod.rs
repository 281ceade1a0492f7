// src/session/mod.rs
//
// The database driver is an external collaborator. Everything the health
// checks need from it goes through `CqlSession`.
//
mod consistency;
mod diagnostic;
mod statement;

pub use consistency::{ConsistencyLevel, ParseConsistencyLevelError};
pub use diagnostic::{DiagnosticStatus, NodeState, TokenRingDiagnostic, TopologyDiagnostic};
pub use statement::{CqlValue, Row, Statement};

use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Connection unavailable: {0}")]
    ConnectionUnavailable(String),

    #[error("Malformed result: {0}")]
    MalformedResult(String),
}

/// Read-only view of an established cluster session.
///
/// The session is owned by the host application and may be shared by
/// concurrent health checks, so every method takes `&self`.
#[async_trait]
pub trait CqlSession: Send + Sync {
    /// Keyspace selected on the session, if any.
    fn keyspace(&self) -> Option<String>;

    /// Consistency level of the driver's default execution profile.
    fn default_consistency_level(&self) -> ConsistencyLevel;

    /// Local datacenter negotiated (or configured) by the driver.
    fn local_datacenter(&self) -> Option<String>;

    async fn topology_diagnostic(&self) -> Result<TopologyDiagnostic, SessionError>;

    /// Returns `Ok(None)` when the driver cannot produce a diagnostic for the
    /// given arguments, e.g. because the keyspace metadata is unknown.
    async fn token_ring_diagnostic(
        &self,
        keyspace: &str,
        consistency_level: ConsistencyLevel,
        datacenter: Option<&str>,
    ) -> Result<Option<TokenRingDiagnostic>, SessionError>;

    /// Executes a statement and returns its first row.
    async fn execute(&self, statement: &Statement) -> Result<Option<Row>, SessionError>;
}

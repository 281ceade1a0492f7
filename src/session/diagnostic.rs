// src/session/diagnostic.rs
//
// Diagnostic reports produced by the driver. The helper constructors build
// them from raw node/range states for drivers that do not compute a status
// themselves.
//
use super::ConsistencyLevel;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Availability reported by a diagnostic.
///
/// Variants are declared from best to worst; the derived `Ord` is what
/// `merge_with` relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticStatus {
    Available,
    PartiallyAvailable,
    Unavailable,
}

impl DiagnosticStatus {
    /// Worst of the two statuses.
    pub fn merge_with(self, other: DiagnosticStatus) -> DiagnosticStatus {
        self.max(other)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticStatus::Available => "AVAILABLE",
            DiagnosticStatus::PartiallyAvailable => "PARTIALLY_AVAILABLE",
            DiagnosticStatus::Unavailable => "UNAVAILABLE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NodeState {
    Up,
    Down,
    Unknown,
}

impl NodeState {
    fn as_str(&self) -> &'static str {
        match self {
            NodeState::Up => "UP",
            NodeState::Down => "DOWN",
            NodeState::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopologyDiagnostic {
    status: DiagnosticStatus,
    details: Map<String, Value>,
}

impl TopologyDiagnostic {
    pub fn new(status: DiagnosticStatus, details: Map<String, Value>) -> Self {
        Self { status, details }
    }

    /// Builds a diagnostic from the state of every known node.
    pub fn from_nodes<I, S>(nodes: I) -> Self
    where
        I: IntoIterator<Item = (S, NodeState)>,
        S: Into<String>,
    {
        let mut states = Map::new();
        let (mut up, mut down, mut unknown) = (0u64, 0u64, 0u64);

        for (node, state) in nodes {
            match state {
                NodeState::Up => up += 1,
                NodeState::Down => down += 1,
                NodeState::Unknown => unknown += 1,
            }
            states.insert(node.into(), Value::from(state.as_str()));
        }

        let total = up + down + unknown;
        let status = if up == 0 {
            DiagnosticStatus::Unavailable
        } else if up == total {
            DiagnosticStatus::Available
        } else {
            DiagnosticStatus::PartiallyAvailable
        };

        let mut details = Map::new();
        details.insert("status".into(), Value::from(status.as_str()));
        details.insert("total".into(), Value::from(total));
        details.insert("up".into(), Value::from(up));
        details.insert("down".into(), Value::from(down));
        details.insert("unknown".into(), Value::from(unknown));
        details.insert("nodes".into(), Value::Object(states));

        Self { status, details }
    }

    pub fn status(&self) -> DiagnosticStatus {
        self.status
    }

    pub fn details(&self) -> &Map<String, Value> {
        &self.details
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TokenRingDiagnostic {
    keyspace: String,
    consistency_level: ConsistencyLevel,
    datacenter: Option<String>,
    status: DiagnosticStatus,
    details: Map<String, Value>,
}

impl TokenRingDiagnostic {
    pub fn new(
        keyspace: impl Into<String>,
        consistency_level: ConsistencyLevel,
        datacenter: Option<String>,
        status: DiagnosticStatus,
        details: Map<String, Value>,
    ) -> Self {
        Self {
            keyspace: keyspace.into(),
            consistency_level,
            datacenter,
            status,
            details,
        }
    }

    /// Builds a diagnostic from the availability of every token range.
    /// A single unavailable range makes the ring unavailable.
    pub fn from_ranges<I, S>(
        keyspace: impl Into<String>,
        consistency_level: ConsistencyLevel,
        datacenter: Option<String>,
        ranges: I,
    ) -> Self
    where
        I: IntoIterator<Item = (S, bool)>,
        S: Into<String>,
    {
        let keyspace = keyspace.into();
        let mut states = Map::new();
        let (mut available, mut unavailable) = (0u64, 0u64);

        for (range, ok) in ranges {
            let state = if ok {
                available += 1;
                DiagnosticStatus::Available
            } else {
                unavailable += 1;
                DiagnosticStatus::Unavailable
            };
            states.insert(range.into(), Value::from(state.as_str()));
        }

        let status = if unavailable > 0 {
            DiagnosticStatus::Unavailable
        } else {
            DiagnosticStatus::Available
        };

        let mut details = Map::new();
        details.insert("status".into(), Value::from(status.as_str()));
        details.insert("keyspace".into(), Value::from(keyspace.clone()));
        details.insert(
            "consistencyLevel".into(),
            Value::from(consistency_level.as_str()),
        );
        if let Some(dc) = &datacenter {
            details.insert("datacenter".into(), Value::from(dc.clone()));
        }
        details.insert("availableRanges".into(), Value::from(available));
        details.insert("unavailableRanges".into(), Value::from(unavailable));
        details.insert("ranges".into(), Value::Object(states));

        Self {
            keyspace,
            consistency_level,
            datacenter,
            status,
            details,
        }
    }

    pub fn keyspace(&self) -> &str {
        &self.keyspace
    }

    pub fn consistency_level(&self) -> ConsistencyLevel {
        self.consistency_level
    }

    pub fn datacenter(&self) -> Option<&str> {
        self.datacenter.as_deref()
    }

    pub fn status(&self) -> DiagnosticStatus {
        self.status
    }

    pub fn details(&self) -> &Map<String, Value> {
        &self.details
    }
}

// src/health/status.rs
use crate::session::DiagnosticStatus;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Up,
    Down,
}

impl Status {
    pub fn is_up(&self) -> bool {
        *self == Status::Up
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Up => "UP",
            Status::Down => "DOWN",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<DiagnosticStatus> for Status {
    fn from(status: DiagnosticStatus) -> Self {
        match status {
            DiagnosticStatus::Available | DiagnosticStatus::PartiallyAvailable => Status::Up,
            DiagnosticStatus::Unavailable => Status::Down,
        }
    }
}

/// Outcome of one health check.
///
/// Serializes to `{"status":"UP","details":{...}}`; composite reports add a
/// `components` object keyed by contributor name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    status: Status,
    details: Map<String, Value>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    components: BTreeMap<String, HealthReport>,
}

impl HealthReport {
    pub fn new(status: Status) -> Self {
        Self {
            status,
            details: Map::new(),
            components: BTreeMap::new(),
        }
    }

    pub fn up() -> Self {
        Self::new(Status::Up)
    }

    pub fn down() -> Self {
        Self::new(Status::Down)
    }

    /// A `DOWN` report carrying the failure message under `error`.
    pub fn from_error(error: &dyn std::error::Error) -> Self {
        Self::down().with_detail("error", error.to_string())
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    pub fn with_details(mut self, details: Map<String, Value>) -> Self {
        self.details.extend(details);
        self
    }

    pub fn with_component(mut self, name: impl Into<String>, report: HealthReport) -> Self {
        self.components.insert(name.into(), report);
        self
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn details(&self) -> &Map<String, Value> {
        &self.details
    }

    pub fn detail(&self, key: &str) -> Option<&Value> {
        self.details.get(key)
    }

    pub fn components(&self) -> &BTreeMap<String, HealthReport> {
        &self.components
    }

    pub fn component(&self, name: &str) -> Option<&HealthReport> {
        self.components.get(name)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_mapping() {
        assert_eq!(Status::from(DiagnosticStatus::Available), Status::Up);
        assert_eq!(Status::from(DiagnosticStatus::PartiallyAvailable), Status::Up);
        assert_eq!(Status::from(DiagnosticStatus::Unavailable), Status::Down);
    }

    #[test]
    fn test_report_json_shape() {
        let report = HealthReport::up().with_detail("version", "4.0.1");
        let value: Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(value, json!({"status": "UP", "details": {"version": "4.0.1"}}));

        let empty: Value = serde_json::to_value(HealthReport::up()).unwrap();
        assert_eq!(empty, json!({"status": "UP", "details": {}}));
    }

    #[test]
    fn test_components_are_nested() {
        let report = HealthReport::down()
            .with_component("primary", HealthReport::up())
            .with_component("analytics", HealthReport::down().with_detail("error", "boom"));

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["status"], "DOWN");
        assert_eq!(value["components"]["analytics"]["details"]["error"], "boom");
        assert_eq!(report.component("primary").map(|r| r.status()), Some(Status::Up));
    }
}

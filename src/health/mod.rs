// src/health/mod.rs
mod checker;
mod indicator;
mod monitor;
mod registry;
mod status;

pub use checker::{Checker, CheckerSettings, HealthChecker, LivenessChecker};
pub use indicator::{HealthContributor, HealthIndicator, ReactiveHealthIndicator};
pub use monitor::HealthMonitor;
pub use registry::{
    CassandraHealthRegistration, CompositeHealthContributor, HealthContributorRegistry,
    RegistryError, CASSANDRA_CONTRIBUTOR,
};
pub use status::{HealthReport, Status};

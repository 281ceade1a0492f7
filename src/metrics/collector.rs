// src/metrics/collector.rs
use crate::health::{HealthReport, Status};
use anyhow::Result;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;
use std::time::Duration;

pub struct MetricsRegistry {
    registry: Registry,
    collector: Arc<MetricsCollector>,
}

impl MetricsRegistry {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();
        let collector = Arc::new(MetricsCollector::new(&registry)?);

        Ok(Self {
            registry,
            collector,
        })
    }

    pub fn collector(&self) -> Arc<MetricsCollector> {
        self.collector.clone()
    }

    /// Text exposition of every registered metric.
    pub fn gather(&self) -> Vec<u8> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            tracing::error!("Failed to encode metrics: {}", e);
        }
        buffer
    }
}

pub struct MetricsCollector {
    pub checks_total: IntCounterVec,
    pub check_duration_seconds: HistogramVec,
    pub contributor_status: IntGaugeVec,
    pub contributors: IntGauge,
}

impl MetricsCollector {
    pub fn new(registry: &Registry) -> Result<Self> {
        let checks_total = IntCounterVec::new(
            Opts::new("cassandra_health_checks_total", "Total number of health checks"),
            &["contributor", "status"],
        )?;
        registry.register(Box::new(checks_total.clone()))?;

        let check_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "cassandra_health_check_duration_seconds",
                "Health check duration in seconds",
            ),
            &["contributor"],
        )?;
        registry.register(Box::new(check_duration_seconds.clone()))?;

        let contributor_status = IntGaugeVec::new(
            Opts::new(
                "cassandra_health_status",
                "Last reported health status (1=up, 0=down)",
            ),
            &["contributor"],
        )?;
        registry.register(Box::new(contributor_status.clone()))?;

        let contributors = IntGauge::new(
            "cassandra_health_contributors",
            "Number of registered health contributors",
        )?;
        registry.register(Box::new(contributors.clone()))?;

        Ok(Self {
            checks_total,
            check_duration_seconds,
            contributor_status,
            contributors,
        })
    }

    pub fn record_check(&self, contributor: &str, report: &HealthReport, duration: Duration) {
        let status = report.status();
        self.checks_total
            .with_label_values(&[contributor, status.as_str()])
            .inc();

        self.check_duration_seconds
            .with_label_values(&[contributor])
            .observe(duration.as_secs_f64());

        let value = if status == Status::Up { 1 } else { 0 };
        self.contributor_status
            .with_label_values(&[contributor])
            .set(value);
    }

    pub fn update_contributor_count(&self, count: usize) {
        self.contributors.set(count as i64);
    }
}

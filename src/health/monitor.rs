// src/health/monitor.rs
use super::registry::HealthContributorRegistry;
use super::status::{HealthReport, Status};
use crate::config::MonitorConfig;
use crate::metrics::MetricsCollector;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, timeout, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Periodically runs every registered contributor so status changes show up
/// in logs and metrics even when nobody polls the endpoint.
pub struct HealthMonitor {
    config: MonitorConfig,
    registry: Arc<HealthContributorRegistry>,
    metrics: Option<Arc<MetricsCollector>>,
    last_status: DashMap<String, Status>,
    stop: watch::Sender<bool>,
}

impl HealthMonitor {
    pub fn new(
        config: MonitorConfig,
        registry: Arc<HealthContributorRegistry>,
        metrics: Option<Arc<MetricsCollector>>,
    ) -> Self {
        Self {
            config,
            registry,
            metrics,
            last_status: DashMap::new(),
            stop: watch::channel(false).0,
        }
    }

    /// Checks every contributor once per interval until `shutdown` is called.
    /// A round that overruns the interval delays the next one.
    pub async fn run(self: Arc<Self>) {
        let mut ticker = interval(self.config.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut stop = self.stop.subscribe();

        info!(interval = ?self.config.interval(), "Health monitor started");

        while !*stop.borrow_and_update() {
            tokio::select! {
                _ = ticker.tick() => {
                    self.check_all().await;
                }
                changed = stop.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        info!("Health monitor stopped");
    }

    pub fn spawn(self: &Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(self.clone().run())
    }

    /// Stops the loop after the round in progress, if any.
    pub fn shutdown(&self) {
        self.stop.send_replace(true);
    }

    pub fn last_status(&self, contributor: &str) -> Option<Status> {
        self.last_status.get(contributor).map(|entry| *entry.value())
    }

    /// Runs one round over all contributors.
    pub async fn check_all(&self) -> Vec<(String, HealthReport)> {
        let entries = self.registry.entries();
        let check_timeout = self.config.timeout();
        let mut names = Vec::with_capacity(entries.len());
        let mut tasks = Vec::with_capacity(entries.len());

        for (name, contributor) in entries {
            names.push(name);
            tasks.push(tokio::spawn(async move {
                let start = Instant::now();
                let report = match timeout(check_timeout, contributor.health()).await {
                    Ok(report) => report,
                    Err(_) => HealthReport::down().with_detail(
                        "error",
                        format!("Health check timed out after {:?}", check_timeout),
                    ),
                };
                (report, start.elapsed())
            }));
        }

        let results = futures::future::join_all(tasks).await;

        let mut reports = Vec::with_capacity(results.len());
        let (mut up, mut down) = (0usize, 0usize);

        for (name, result) in names.into_iter().zip(results) {
            let (report, elapsed) = match result {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(contributor = %name, error = %e, "Health check task failed");
                    (HealthReport::from_error(&e), Duration::ZERO)
                }
            };

            if report.status().is_up() {
                up += 1;
            } else {
                down += 1;
            }
            if let Some(metrics) = &self.metrics {
                metrics.record_check(&name, &report, elapsed);
            }
            self.record_transition(&name, &report);
            reports.push((name, report));
        }

        if let Some(metrics) = &self.metrics {
            metrics.update_contributor_count(self.registry.len());
        }

        debug!(up, down, "Health monitor round complete");
        reports
    }

    fn record_transition(&self, name: &str, report: &HealthReport) {
        let status = report.status();
        let previous = self.last_status.insert(name.to_string(), status);

        match (previous, status) {
            (Some(Status::Up) | None, Status::Down) => {
                warn!(
                    contributor = %name,
                    error = ?report.detail("error"),
                    "Health contributor is DOWN"
                );
            }
            (Some(Status::Down), Status::Up) => {
                info!(contributor = %name, "Health contributor recovered");
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::HealthContributor;
    use async_trait::async_trait;
    use std::time::Duration;

    struct Slow;

    #[async_trait]
    impl HealthContributor for Slow {
        async fn health(&self) -> HealthReport {
            tokio::time::sleep(Duration::from_secs(60)).await;
            HealthReport::up()
        }
    }

    struct Fixed(Status);

    struct Broken;

    #[async_trait]
    impl HealthContributor for Broken {
        async fn health(&self) -> HealthReport {
            panic!("contributor bug")
        }
    }

    #[async_trait]
    impl HealthContributor for Fixed {
        async fn health(&self) -> HealthReport {
            HealthReport::new(self.0)
        }
    }

    fn monitor(registry: HealthContributorRegistry) -> HealthMonitor {
        let config = MonitorConfig {
            enabled: true,
            interval_secs: 1,
            timeout_secs: 1,
        };
        HealthMonitor::new(config, Arc::new(registry), None)
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_out_contributor_is_down() {
        let registry = HealthContributorRegistry::new();
        registry.register("slow", Arc::new(Slow)).unwrap();
        registry.register("fast", Arc::new(Fixed(Status::Up))).unwrap();
        let monitor = monitor(registry);

        let reports = monitor.check_all().await;

        assert_eq!(reports.len(), 2);
        assert_eq!(monitor.last_status("fast"), Some(Status::Up));
        assert_eq!(monitor.last_status("slow"), Some(Status::Down));
        let slow = reports.iter().find(|(name, _)| name == "slow").map(|(_, r)| r);
        assert!(slow.and_then(|r| r.detail("error")).is_some());
    }

    #[tokio::test]
    async fn test_failed_task_is_reported_down_under_its_name() {
        let registry = HealthContributorRegistry::new();
        registry.register("broken", Arc::new(Broken)).unwrap();
        registry.register("db", Arc::new(Fixed(Status::Up))).unwrap();
        let monitor = monitor(registry);

        let reports = monitor.check_all().await;

        assert_eq!(reports.len(), 2);
        let broken = reports.iter().find(|(name, _)| name == "broken").map(|(_, r)| r);
        assert_eq!(broken.map(|r| r.status()), Some(Status::Down));
        assert!(broken.and_then(|r| r.detail("error")).is_some());
        assert_eq!(monitor.last_status("broken"), Some(Status::Down));
        assert_eq!(monitor.last_status("db"), Some(Status::Up));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_loop() {
        let registry = HealthContributorRegistry::new();
        registry.register("db", Arc::new(Fixed(Status::Up))).unwrap();
        let monitor = Arc::new(monitor(registry));

        let handle = monitor.spawn();
        tokio::time::sleep(Duration::from_millis(1500)).await;
        monitor.shutdown();

        assert!(handle.await.is_ok());
        assert_eq!(monitor.last_status("db"), Some(Status::Up));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_before_run_skips_checks() {
        let registry = HealthContributorRegistry::new();
        registry.register("db", Arc::new(Fixed(Status::Up))).unwrap();
        let monitor = Arc::new(monitor(registry));

        monitor.shutdown();
        monitor.clone().run().await;

        assert_eq!(monitor.last_status("db"), None);
    }
}

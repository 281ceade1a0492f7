// src/health/indicator.rs
use super::checker::Checker;
use super::status::HealthReport;
use crate::session::{CqlSession, SessionError};
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::warn;

const FAILURE_MESSAGE: &str = "Cassandra health check failed";

/// Pluggable unit the host's health endpoint invokes on demand.
#[async_trait]
pub trait HealthContributor: Send + Sync {
    async fn health(&self) -> HealthReport;
}

fn report_from_result(result: Result<HealthReport, SessionError>) -> HealthReport {
    match result {
        Ok(report) => report,
        Err(e) => {
            warn!(error = %e, "{}", FAILURE_MESSAGE);
            HealthReport::from_error(&e)
        }
    }
}

fn report_from_panic(payload: Box<dyn Any + Send>) -> HealthReport {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "health check panicked".to_string());

    warn!(error = %message, "{}", FAILURE_MESSAGE);
    HealthReport::down().with_detail("error", message)
}

/// Runs a check to completion, turning errors and panics into `DOWN`.
async fn guarded_check<C>(checker: &C, session: &dyn CqlSession) -> HealthReport
where
    C: Checker + ?Sized,
{
    match AssertUnwindSafe(checker.check(session)).catch_unwind().await {
        Ok(result) => report_from_result(result),
        Err(payload) => report_from_panic(payload),
    }
}

/// Synchronous adapter: the check runs on the calling thread.
///
/// `health()` blocks until the driver answers, driving the check on the tokio
/// runtime captured at construction (or set with `with_runtime`). Call it
/// from blocking code such as a `std::thread` or `spawn_blocking`; from
/// inside an async task use the `HealthContributor` impl or
/// `ReactiveHealthIndicator`. On a `current_thread` runtime the timers and
/// I/O only make progress while that runtime is being driven elsewhere.
pub struct HealthIndicator<C> {
    checker: C,
    session: Arc<dyn CqlSession>,
    runtime: Option<Handle>,
}

impl<C: Checker> HealthIndicator<C> {
    pub fn new(checker: C, session: Arc<dyn CqlSession>) -> Self {
        Self {
            checker,
            session,
            runtime: Handle::try_current().ok(),
        }
    }

    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn health(&self) -> HealthReport {
        let check = guarded_check(&self.checker, self.session.as_ref());

        // Handle::block_on panics when called from an async context.
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| match &self.runtime {
            Some(runtime) => runtime.block_on(check),
            None => futures::executor::block_on(check),
        }));
        outcome.unwrap_or_else(report_from_panic)
    }
}

#[async_trait]
impl<C: Checker> HealthContributor for HealthIndicator<C> {
    async fn health(&self) -> HealthReport {
        guarded_check(&self.checker, self.session.as_ref()).await
    }
}

/// Asynchronous adapter: the check runs as its own task.
///
/// The returned future never fails. Check errors, panics and task
/// cancellation all resolve to a `DOWN` report.
pub struct ReactiveHealthIndicator<C> {
    checker: Arc<C>,
    session: Arc<dyn CqlSession>,
}

impl<C: Checker + 'static> ReactiveHealthIndicator<C> {
    pub fn new(checker: C, session: Arc<dyn CqlSession>) -> Self {
        Self {
            checker: Arc::new(checker),
            session,
        }
    }

    pub fn health(&self) -> BoxFuture<'static, HealthReport> {
        let checker = self.checker.clone();
        let session = self.session.clone();
        let check = async move { guarded_check(checker.as_ref(), session.as_ref()).await };

        match Handle::try_current() {
            Ok(handle) => {
                let task = handle.spawn(check);
                async move {
                    match task.await {
                        Ok(report) => report,
                        Err(e) => {
                            warn!(error = %e, "{}", FAILURE_MESSAGE);
                            HealthReport::from_error(&e)
                        }
                    }
                }
                .boxed()
            }
            // No runtime to spawn on; the caller's executor drives the check.
            Err(_) => check.boxed(),
        }
    }
}

#[async_trait]
impl<C: Checker + 'static> HealthContributor for ReactiveHealthIndicator<C> {
    async fn health(&self) -> HealthReport {
        ReactiveHealthIndicator::health(self).await
    }
}

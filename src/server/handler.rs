// src/server/handler.rs
use crate::config::normalize_path;
use crate::health::{HealthContributorRegistry, HealthReport};
use crate::metrics::MetricsRegistry;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{Body, Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::sync::Arc;
use tower::Service;

const JSON: &str = "application/json";
const PROMETHEUS_TEXT: &str = "text/plain; version=0.0.4";

/// Serves health reports as JSON and, optionally, Prometheus metrics.
#[derive(Clone)]
pub struct HealthEndpoint {
    registry: Arc<HealthContributorRegistry>,
    path: Arc<str>,
    metrics: Option<(Arc<MetricsRegistry>, Arc<str>)>,
}

impl HealthEndpoint {
    pub fn new(registry: Arc<HealthContributorRegistry>, path: &str) -> Self {
        Self {
            registry,
            path: Arc::from(normalize_path(path)),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>, path: &str) -> Self {
        self.metrics = Some((metrics, Arc::from(normalize_path(path))));
        self
    }

    async fn handle(&self, req: Request<Body>) -> Response<Body> {
        if req.method() != Method::GET {
            return respond(StatusCode::METHOD_NOT_ALLOWED, "text/plain", "Method Not Allowed");
        }

        let path = req.uri().path();

        if let Some((metrics, metrics_path)) = &self.metrics {
            if path == metrics_path.as_ref() {
                return respond(StatusCode::OK, PROMETHEUS_TEXT, metrics.gather());
            }
        }

        if path == self.path.as_ref() {
            return render(&self.registry.health().await);
        }

        // `{path}/{name}`, or `/{name}` when mounted at the root
        let component = path
            .strip_prefix(self.path.as_ref())
            .and_then(|rest| {
                if self.path.as_ref() == "/" {
                    Some(rest)
                } else {
                    rest.strip_prefix('/')
                }
            })
            .filter(|name| !name.is_empty() && !name.contains('/'));

        match component.and_then(|name| self.registry.get(name)) {
            Some(contributor) => render(&contributor.health().await),
            None => respond(StatusCode::NOT_FOUND, "text/plain", "Not Found"),
        }
    }
}

fn render(report: &HealthReport) -> Response<Body> {
    let status = if report.status().is_up() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    match report.to_json() {
        Ok(body) => respond(status, JSON, body),
        Err(e) => {
            tracing::error!(%e, "failed to serialize health report");
            respond(StatusCode::SERVICE_UNAVAILABLE, JSON, r#"{"status":"DOWN"}"#)
        }
    }
}

fn respond(
    status: StatusCode,
    content_type: &'static str,
    body: impl Into<Body>,
) -> Response<Body> {
    let mut response = Response::new(body.into());
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

impl Service<Request<Body>> for HealthEndpoint {
    type Response = Response<Body>;
    type Error = Infallible;
    type Future = futures::future::BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let endpoint = self.clone();
        Box::pin(async move { Ok(endpoint.handle(req).await) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::{HealthContributor, Status};
    use async_trait::async_trait;
    use serde_json::Value;

    struct Fixed(Status);

    #[async_trait]
    impl HealthContributor for Fixed {
        async fn health(&self) -> HealthReport {
            HealthReport::new(self.0).with_detail("version", "4.0.1")
        }
    }

    fn endpoint(status: Status) -> HealthEndpoint {
        let registry = Arc::new(HealthContributorRegistry::new());
        registry.register("cassandra", Arc::new(Fixed(status))).unwrap();
        HealthEndpoint::new(registry, "/health")
    }

    async fn get(endpoint: &mut HealthEndpoint, uri: &str) -> (StatusCode, String) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = endpoint.call(request).await.unwrap();
        let status = response.status();
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_root_report() {
        let mut endpoint = endpoint(Status::Up);

        let (status, body) = get(&mut endpoint, "/health").await;

        assert_eq!(status, StatusCode::OK);
        let value: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["status"], "UP");
        assert_eq!(value["components"]["cassandra"]["details"]["version"], "4.0.1");
    }

    #[tokio::test]
    async fn test_component_report_down_is_503() {
        let mut endpoint = endpoint(Status::Down);

        let (status, body) = get(&mut endpoint, "/health/cassandra").await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        let value: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["status"], "DOWN");
    }

    #[tokio::test]
    async fn test_unknown_component_is_404() {
        let mut endpoint = endpoint(Status::Up);

        let (status, _) = get(&mut endpoint, "/health/redis").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = get(&mut endpoint, "/other").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_metrics_path() {
        let metrics = Arc::new(MetricsRegistry::new().unwrap());
        metrics.collector().update_contributor_count(1);
        let mut endpoint = endpoint(Status::Up).with_metrics(metrics, "/metrics");

        let (status, body) = get(&mut endpoint, "/metrics").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("cassandra_health_contributors 1"));
    }

    #[tokio::test]
    async fn test_trailing_slashes_are_normalized() {
        let metrics = Arc::new(MetricsRegistry::new().unwrap());
        let registry = Arc::new(HealthContributorRegistry::new());
        registry.register("cassandra", Arc::new(Fixed(Status::Up))).unwrap();
        let mut endpoint =
            HealthEndpoint::new(registry, "/health/").with_metrics(metrics, "/metrics/");

        let (status, _) = get(&mut endpoint, "/health").await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = get(&mut endpoint, "/health/cassandra").await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = get(&mut endpoint, "/metrics").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_post_is_rejected() {
        let mut endpoint = endpoint(Status::Up);
        let request = Request::builder()
            .method(Method::POST)
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = endpoint.call(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}

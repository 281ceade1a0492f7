// src/server/builder.rs
use super::handler::HealthEndpoint;
use anyhow::{anyhow, Context, Result};
use hyper::server::conn::Http;
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Serves a [`HealthEndpoint`] over plain HTTP/1.
pub struct ServerBuilder {
    addr: SocketAddr,
    endpoint: Option<HealthEndpoint>,
    listener: Option<TcpListener>,
}

impl ServerBuilder {
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            endpoint: None,
            listener: None,
        }
    }

    pub fn with_endpoint(mut self, endpoint: HealthEndpoint) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// Serves on an already bound listener instead of binding `addr`.
    pub fn with_listener(mut self, listener: TcpListener) -> Self {
        self.listener = Some(listener);
        self
    }

    pub async fn serve(self) -> Result<()> {
        self.serve_with_shutdown(std::future::pending()).await
    }

    /// Accepts connections until `shutdown` resolves. Connections already
    /// being served keep running on their own tasks.
    pub async fn serve_with_shutdown<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let endpoint = self
            .endpoint
            .ok_or_else(|| anyhow!("endpoint must be set via with_endpoint()"))?;

        let listener = match self.listener {
            Some(listener) => listener,
            None => TcpListener::bind(self.addr)
                .await
                .with_context(|| format!("Failed to bind health endpoint on {}", self.addr))?,
        };
        tracing::info!("Health endpoint listening on {}", listener.local_addr()?);

        tokio::pin!(shutdown);

        loop {
            let (stream, peer) = tokio::select! {
                accepted = listener.accept() => accepted?,
                _ = &mut shutdown => {
                    tracing::info!("Health endpoint shutting down");
                    return Ok(());
                }
            };
            let service = endpoint.clone();

            tokio::spawn(async move {
                if let Err(err) = Http::new().serve_connection(stream, service).await {
                    tracing::warn!(%peer, %err, "connection error");
                }
            });
        }
    }
}

//! Request pipeline shared by every `ApiClient` call.
//!
//! Each middleware receives the outgoing request and a [`Next`] handle for
//! the rest of the chain. It may rewrite the request before calling
//! [`Next::run`] and may react to the response before returning it. The end
//! of the chain executes the request with the underlying `reqwest::Client`.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use reqwest::{Client, Request, Response};
use tracing::{debug, warn};

use super::ApiError;

#[async_trait]
pub trait Middleware: Send + Sync + 'static {
    async fn handle(&self, request: Request, next: Next<'_>) -> Result<Response, ApiError>;
}

/// The remainder of the pipeline after the current middleware.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    client: &'a Client,
    middlewares: &'a [Arc<dyn Middleware>],
}

impl<'a> Next<'a> {
    pub(crate) fn new(client: &'a Client, middlewares: &'a [Arc<dyn Middleware>]) -> Self {
        Self {
            client,
            middlewares,
        }
    }

    pub async fn run(self, request: Request) -> Result<Response, ApiError> {
        match self.middlewares.split_first() {
            Some((current, rest)) => {
                current
                    .handle(request, Next::new(self.client, rest))
                    .await
            }
            None => Ok(self.client.execute(request).await?),
        }
    }
}

/// Logs method, path, status and latency of each request.
pub struct RequestLogger;

#[async_trait]
impl Middleware for RequestLogger {
    async fn handle(&self, request: Request, next: Next<'_>) -> Result<Response, ApiError> {
        let method = request.method().clone();
        let path = request.url().path().to_string();
        let started = Instant::now();

        let result = next.run(request).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(response) => debug!(
                %method,
                path = %path,
                status = response.status().as_u16(),
                elapsed_ms,
                "Request completed"
            ),
            Err(e) => warn!(%method, path = %path, elapsed_ms, error = %e, "Request failed"),
        }

        result
    }
}

//! API client for communicating with the Divisão de Contas REST API.
//!
//! This module provides the `ApiClient` struct, a thin generic wrapper that
//! joins paths onto the configured base URL, encodes query parameters and
//! JSON bodies, and sends every request through the middleware pipeline.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, ClientBuilder, Method, Request, Url};
use serde::{de::DeserializeOwned, Serialize};

use super::middleware::{Middleware, Next};
use super::query::to_query_pairs;
use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// User agent sent with every request.
const USER_AGENT: &str = concat!("divisao/", env!("CARGO_PKG_VERSION"));

/// API client for the Divisão de Contas service.
/// Clone is cheap - reqwest::Client and the middleware list are shared.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    middlewares: Arc<Vec<Arc<dyn Middleware>>>,
}

impl ApiClient {
    /// Create a client with no middleware
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        Self::builder().base_url(base_url).build()
    }

    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET `path`. `params` must serialize to an object (or `()` for none);
    /// see [`super::query`] for how values are encoded.
    pub async fn get<T, P>(&self, path: &str, params: &P) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        let pairs = to_query_pairs(params)?;
        let mut builder = self.client.request(Method::GET, self.url(path));
        if !pairs.is_empty() {
            builder = builder.query(&pairs);
        }
        self.send(builder.build()?).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self
            .client
            .request(Method::POST, self.url(path))
            .json(body)
            .build()?;
        self.send(request).await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self
            .client
            .request(Method::PUT, self.url(path))
            .json(body)
            .build()?;
        self.send(request).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let request = self.client.request(Method::DELETE, self.url(path)).build()?;
        self.send(request).await
    }

    async fn send<T: DeserializeOwned>(&self, request: Request) -> Result<T, ApiError> {
        let path = request.url().path().to_string();

        let response = Next::new(&self.client, &self.middlewares)
            .run(request)
            .await?;
        let response = Self::check_response(response).await?;

        let bytes = response.bytes().await?;
        // Empty bodies (204, bare 200) read as JSON null.
        let body: &[u8] = if bytes.is_empty() { b"null" } else { &bytes };
        serde_json::from_slice(body).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse JSON response from {}: {}", path, e))
        })
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }
}

/// Builder for `ApiClient`
#[derive(Default)]
pub struct ApiClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl ApiClientBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Override the per-request timeout (default 30s)
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Append a middleware. The first one added runs outermost.
    pub fn with<M: Middleware>(self, middleware: M) -> Self {
        self.with_arc(Arc::new(middleware))
    }

    pub fn with_arc(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.middlewares.push(middleware);
        self
    }

    pub fn build(self) -> Result<ApiClient, ApiError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ApiError::Configuration("base_url is required".into()))?;
        let base_url = base_url.trim().trim_end_matches('/').to_string();

        Url::parse(&base_url)
            .map_err(|e| ApiError::Configuration(format!("Invalid base URL {:?}: {}", base_url, e)))?;

        let client = ClientBuilder::new()
            .timeout(
                self.timeout
                    .unwrap_or(Duration::from_secs(REQUEST_TIMEOUT_SECS)),
            )
            .user_agent(USER_AGENT)
            .build()?;

        Ok(ApiClient {
            client,
            base_url,
            middlewares: Arc::new(self.middlewares),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_requires_base_url() {
        let result = ApiClient::builder().build();
        assert!(matches!(result, Err(ApiError::Configuration(_))));
    }

    #[test]
    fn test_builder_rejects_invalid_url() {
        let result = ApiClient::new("not a url");
        assert!(matches!(result, Err(ApiError::Configuration(_))));
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:8080/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
        assert_eq!(client.url("/api/pessoas"), "http://localhost:8080/api/pessoas");
    }
}

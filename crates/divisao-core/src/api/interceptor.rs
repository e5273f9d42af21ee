//! Session handling for outgoing requests.
//!
//! Every request outside `/auth/` carries the stored token as a bearer
//! credential. A 401 from the server clears the store and sends the user
//! back to the login route; the response itself still reaches the caller.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Request, Response, StatusCode};
use tracing::{debug, info, warn};

use super::middleware::{Middleware, Next};
use super::ApiError;
use crate::auth::TokenStore;
use crate::routes::{Navigator, Route};

/// Requests whose path contains this segment never carry the session token.
pub const AUTH_PATH_SEGMENT: &str = "/auth/";

/// Attaches the stored session token as a bearer credential and ends the
/// session when the server answers 401.
pub struct AuthInterceptor {
    store: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
}

impl AuthInterceptor {
    pub fn new(store: Arc<dyn TokenStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self { store, navigator }
    }

    fn is_auth_endpoint(request: &Request) -> bool {
        request.url().path().contains(AUTH_PATH_SEGMENT)
    }

    fn current_token(&self) -> Option<String> {
        match self.store.get() {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(error = %e, "Failed to read session token, sending request without it");
                None
            }
        }
    }

    fn end_session(&self) {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear session token");
        }
        self.navigator.navigate(Route::Login);
    }
}

#[async_trait]
impl Middleware for AuthInterceptor {
    async fn handle(&self, mut request: Request, next: Next<'_>) -> Result<Response, ApiError> {
        if Self::is_auth_endpoint(&request) {
            return next.run(request).await;
        }

        if let Some(token) = self.current_token() {
            let value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
                ApiError::InvalidRequest("Session token contains invalid header characters".into())
            })?;
            request.headers_mut().insert(AUTHORIZATION, value);
        } else {
            debug!(path = %request.url().path(), "No session token, sending unauthenticated request");
        }

        let response = next.run(request).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            info!(path = %response.url().path(), "Session rejected by server, logging out");
            self.end_session();
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::auth::MemoryTokenStore;
    use crate::routes::History;
    use serde_json::Value;
    use wiremock::matchers::any;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer, store: Arc<dyn TokenStore>, history: Arc<History>) -> ApiClient {
        ApiClient::builder()
            .base_url(server.uri())
            .with(AuthInterceptor::new(store, history))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_token_with_invalid_header_characters_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryTokenStore::with_token("abc\ndef"));
        let history = Arc::new(History::new());
        let api = client(&server, store.clone(), history.clone());

        let result: Result<Value, ApiError> = api.get("/api/pessoas", &()).await;

        assert!(matches!(result, Err(ApiError::InvalidRequest(_))));
        assert!(server.received_requests().await.unwrap().is_empty());
        // Not a server rejection, so the session stays
        assert_eq!(store.get().unwrap().as_deref(), Some("abc\ndef"));
        assert_eq!(history.current(), None);
    }

    #[tokio::test]
    async fn test_invalid_token_is_ignored_on_auth_endpoints() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let store = Arc::new(MemoryTokenStore::with_token("abc\ndef"));
        let api = client(&server, store, Arc::new(History::new()));

        let result: Result<Value, ApiError> = api.post("/auth/login", &Value::Null).await;

        assert_eq!(result.unwrap(), Value::Null);
    }
}

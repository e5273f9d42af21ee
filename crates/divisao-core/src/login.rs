//! Login form behaviour: one submission at a time, a 10 second bound on
//! the request, and two user-facing failure messages.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, error, warn};

use crate::auth::{AuthService, Credentials};
use crate::routes::{Navigator, Route};

/// How long a login request may take before it counts as a connection failure.
pub const LOGIN_TIMEOUT: Duration = Duration::from_millis(10_000);

pub const MSG_CONNECTION_FAILED: &str = "Não foi possível conectar ao servidor.";
pub const MSG_INVALID_CREDENTIALS: &str = "Usuário e/ou senha inválidos.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    LoggedIn,
    /// A submission was already in flight; nothing was sent.
    Busy,
    Failed(String),
}

pub struct LoginController {
    auth: AuthService,
    navigator: Arc<dyn Navigator>,
    timeout: Duration,
    loading: AtomicBool,
    error_message: Mutex<Option<String>>,
}

/// Clears the loading flag however the submission ends.
struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl LoginController {
    pub fn new(auth: AuthService, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            auth,
            navigator,
            timeout: LOGIN_TIMEOUT,
            loading: AtomicBool::new(false),
            error_message: Mutex::new(None),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    pub fn error_message(&self) -> Option<String> {
        self.error_slot().clone()
    }

    pub async fn submit(&self, credentials: &Credentials) -> LoginOutcome {
        if self
            .loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Login already in progress, ignoring submission");
            return LoginOutcome::Busy;
        }
        let _loading = LoadingGuard(&self.loading);

        *self.error_slot() = None;

        if credentials.is_blank() {
            return self.fail(MSG_INVALID_CREDENTIALS);
        }

        match tokio::time::timeout(self.timeout, self.auth.login(credentials)).await {
            Ok(Ok(())) => {
                self.navigator.navigate(Route::Home);
                LoginOutcome::LoggedIn
            }
            Ok(Err(e)) => {
                error!(error = %e, "Login failed");
                if e.is_connectivity() {
                    self.fail(MSG_CONNECTION_FAILED)
                } else {
                    self.fail(MSG_INVALID_CREDENTIALS)
                }
            }
            Err(_) => {
                warn!(timeout_ms = self.timeout.as_millis() as u64, "Login timed out");
                self.fail(MSG_CONNECTION_FAILED)
            }
        }
    }

    fn fail(&self, message: &str) -> LoginOutcome {
        *self.error_slot() = Some(message.to_string());
        LoginOutcome::Failed(message.to_string())
    }

    fn error_slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.error_message
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::auth::MemoryTokenStore;
    use crate::routes::History;

    #[test]
    fn test_login_timeout_is_ten_seconds() {
        assert_eq!(LOGIN_TIMEOUT.as_millis(), 10_000);
    }

    #[tokio::test]
    async fn test_blank_credentials_fail_without_request() {
        // Nothing listens here; a request would surface as a connection error.
        let api = ApiClient::new("http://127.0.0.1:9").unwrap();
        let auth = AuthService::new(api, Arc::new(MemoryTokenStore::new()));
        let history = Arc::new(History::new());
        let controller = LoginController::new(auth, history.clone());

        let outcome = controller.submit(&Credentials::new("admin", "")).await;

        assert_eq!(outcome, LoginOutcome::Failed(MSG_INVALID_CREDENTIALS.to_string()));
        assert_eq!(controller.error_message().as_deref(), Some(MSG_INVALID_CREDENTIALS));
        assert!(!controller.is_loading());
        assert_eq!(history.current(), None);
    }

    #[tokio::test]
    async fn test_unreachable_server_reports_connection_failure() {
        let api = ApiClient::new("http://127.0.0.1:9").unwrap();
        let auth = AuthService::new(api, Arc::new(MemoryTokenStore::new()));
        let controller = LoginController::new(auth, Arc::new(History::new()));

        let outcome = controller.submit(&Credentials::new("admin", "123456")).await;

        assert_eq!(outcome, LoginOutcome::Failed(MSG_CONNECTION_FAILED.to_string()));
        assert!(!controller.is_loading());
    }
}

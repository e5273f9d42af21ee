//! Application wiring: one token store shared by the auth service and the
//! request interceptor, one navigator shared by everything that redirects.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use crate::api::{ApiClient, AuthInterceptor, RequestLogger};
use crate::auth::{AuthService, TokenStore};
use crate::config::Config;
use crate::login::LoginController;
use crate::routes::{settle, History, Navigator, Route, RouteGuard};
use crate::shell::Shell;

/// Main application state container
pub struct App {
    pub config: Config,
    pub auth: AuthService,
    pub history: Arc<History>,
    pub login: LoginController,
    pub shell: Shell,
    guard: RouteGuard,
}

impl App {
    /// Create an application using the store configured in `config`
    pub fn new(config: Config) -> Result<Self> {
        let store = config.open_store().context("Failed to open token store")?;
        Self::with_store(config, store)
    }

    pub fn with_store(config: Config, store: Arc<dyn TokenStore>) -> Result<Self> {
        debug!(api_url = %config.api_url, store = ?config.store, "App::new() starting");

        let history = Arc::new(History::new());
        let navigator: Arc<dyn Navigator> = history.clone();

        let mut builder = ApiClient::builder()
            .base_url(config.api_url.clone())
            .with(RequestLogger)
            .with(AuthInterceptor::new(store.clone(), navigator.clone()));
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let api = builder.build().context("Failed to build API client")?;

        let auth = AuthService::new(api, store);
        let login = LoginController::new(auth.clone(), navigator.clone());
        let shell = Shell::new(auth.clone(), navigator);

        Ok(Self {
            config,
            auth,
            history,
            login,
            shell,
            guard: RouteGuard,
        })
    }

    pub fn api(&self) -> &ApiClient {
        self.auth.api()
    }

    pub fn is_authenticated(&self) -> bool {
        self.guard.can_activate(&self.auth)
    }

    /// Where navigating to `path` ends up, after guard and redirects
    pub fn route_for(&self, path: &str) -> Route {
        settle(path, self.is_authenticated())
    }

    /// Navigate to `path`, applying the route table
    pub fn open(&self, path: &str) -> Route {
        let route = self.route_for(path);
        self.history.navigate(route);
        route
    }

    pub fn current_route(&self) -> Option<Route> {
        self.history.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryTokenStore;

    fn app_with(store: Arc<dyn TokenStore>) -> App {
        App::with_store(Config::default(), store).unwrap()
    }

    #[test]
    fn test_open_without_session_lands_on_login() {
        let app = app_with(Arc::new(MemoryTokenStore::new()));
        assert_eq!(app.open("/"), Route::Login);
        assert_eq!(app.open("/relatorios"), Route::Login);
        assert_eq!(app.current_route(), Some(Route::Login));
    }

    #[test]
    fn test_open_with_session_lands_on_home() {
        let app = app_with(Arc::new(MemoryTokenStore::with_token("abc")));
        assert!(app.is_authenticated());
        assert_eq!(app.open("/relatorios"), Route::Home);
        assert_eq!(app.open("/login"), Route::Login);
    }

    #[test]
    fn test_invalid_api_url_is_rejected() {
        let config = Config {
            api_url: "::".into(),
            ..Config::default()
        };
        assert!(App::with_store(config, Arc::new(MemoryTokenStore::new())).is_err());
    }
}

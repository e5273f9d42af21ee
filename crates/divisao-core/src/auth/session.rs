use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::store::TokenStore;
use crate::api::{ApiClient, ApiError};

/// Login endpoint, relative to the API base URL
pub const LOGIN_PATH: &str = "/auth/login";

/// Login request body. Only lives for the duration of one login call.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub usuario: String,
    pub senha: String,
}

impl Credentials {
    pub fn new(usuario: impl Into<String>, senha: impl Into<String>) -> Self {
        Self {
            usuario: usuario.into(),
            senha: senha.into(),
        }
    }

    /// True when either field is empty or whitespace
    pub fn is_blank(&self) -> bool {
        self.usuario.trim().is_empty() || self.senha.trim().is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("usuario", &self.usuario)
            .field("senha", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default, rename = "type")]
    pub token_type: Option<String>,
}

/// Owns the session lifecycle: login writes the token, logout removes it,
/// and "logged in" means exactly that a token is present.
#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
    store: Arc<dyn TokenStore>,
}

impl AuthService {
    pub fn new(api: ApiClient, store: Arc<dyn TokenStore>) -> Self {
        Self { api, store }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Authenticate and persist the returned session token
    pub async fn login(&self, credentials: &Credentials) -> Result<(), ApiError> {
        info!(usuario = %credentials.usuario, "Authenticating");

        let response: LoginResponse = self.api.post(LOGIN_PATH, credentials).await?;
        if response.token.is_empty() {
            return Err(ApiError::InvalidResponse(
                "Login response carried an empty token".into(),
            ));
        }
        if let Some(kind) = response.token_type.as_deref() {
            if !kind.eq_ignore_ascii_case("bearer") {
                warn!(token_type = kind, "Unexpected token type, sending it as a bearer token anyway");
            }
        }

        self.store.set(&response.token)?;
        info!(usuario = %credentials.usuario, "Login successful");
        Ok(())
    }

    /// Drop the session token. Safe to call when already logged out.
    pub fn logout(&self) {
        match self.store.clear() {
            Ok(()) => info!("Logged out"),
            Err(e) => warn!(error = %e, "Failed to clear session token"),
        }
    }

    pub fn token(&self) -> Option<String> {
        match self.store.get() {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(error = %e, "Failed to read session token");
                None
            }
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.token().is_some()
    }
}

//! Authentication module for managing the user session.
//!
//! This module provides:
//! - `TokenStore`: the slot holding the session token, with file, keychain
//!   and in-memory implementations
//! - `AuthService`: login, logout and the logged-in check
//!
//! The session token has no expiry on the client side; it lives until
//! logout or until the server rejects it with a 401.

pub mod credentials;
pub mod session;
pub mod store;

pub use credentials::KeyringTokenStore;
pub use session::{AuthService, Credentials, LoginResponse, LOGIN_PATH};
pub use store::{FileTokenStore, MemoryTokenStore, StoreError, TokenStore, TOKEN_KEY};

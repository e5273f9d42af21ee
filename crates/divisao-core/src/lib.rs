//! Client for the Divisão de Contas API.
//!
//! The library covers the session side of the client: the token store,
//! the API client and its middleware pipeline, the auth interceptor that
//! attaches the bearer token and logs out on 401, the route guard, and the
//! login flow.

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod login;
pub mod routes;
pub mod shell;

pub use api::{ApiClient, ApiError};
pub use app::App;
pub use auth::{AuthService, Credentials, TokenStore};
pub use config::Config;
pub use login::{LoginController, LoginOutcome};
pub use routes::{Navigator, Route, RouteGuard};

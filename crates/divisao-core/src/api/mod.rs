//! REST API client module for the Divisão de Contas service.
//!
//! This module provides the `ApiClient` for communicating with the API,
//! the middleware pipeline every request passes through, and the
//! `AuthInterceptor` that attaches the session token as a bearer
//! credential and ends the session on 401 responses.

pub mod client;
pub mod error;
pub mod interceptor;
pub mod middleware;
pub mod query;

pub use client::{ApiClient, ApiClientBuilder};
pub use error::ApiError;
pub use interceptor::AuthInterceptor;
pub use middleware::{Middleware, Next, RequestLogger};

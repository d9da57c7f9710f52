//! REST API client module for the Horizon Travel backend.
//!
//! This module provides the `ApiClient` for the auth endpoints and the
//! `ApiError` taxonomy every call resolves to.
//!
//! Authenticated endpoints take a JWT bearer token issued by
//! `/api/auth/login` or `/api/auth/register`.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::{ApiError, ErrorKind};

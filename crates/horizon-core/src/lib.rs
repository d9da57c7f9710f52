//! Core library for the Horizon Travel client.
//!
//! - `api`: REST client for the auth endpoints and the error taxonomy
//! - `auth`: cookie-backed credential store, auth service and route guard
//! - `nav`: role-gated console navigation
//! - `forms`: client-side checks for the account forms
//! - `config`: backend URL, environment and storage locations
//! - `models`: wire types shared with the backend

pub mod api;
pub mod auth;
pub mod config;
pub mod forms;
pub mod models;
pub mod nav;

pub use api::{ApiClient, ApiError, ErrorKind};
pub use auth::{AuthGuard, AuthService, CredentialStore, GuardState, GuardView, Session};
pub use config::{Config, Environment};
pub use models::{Role, UserProfile};
pub use nav::{NavItem, NavSection, Sidebar};

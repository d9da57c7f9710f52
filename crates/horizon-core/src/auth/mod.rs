//! Authentication module for managing the signed-in session.
//!
//! This module provides:
//! - `CookieJar`: durable cookie storage whose entries expire on their own
//! - `CredentialStore`: the session's token and profile cookies
//! - `AuthService`: login, register and password calls plus local session queries
//! - `AuthGuard`: the gate protected screens render behind
//!
//! Sessions are stored for 3 days and are never refreshed in the background.

pub mod credentials;
pub mod guard;
pub mod jar;
pub mod service;
pub mod session;

pub use credentials::CredentialStore;
pub use guard::{AuthGuard, GuardState, GuardView, History, Navigator};
pub use jar::{Cookie, CookieJar, SameSite};
pub use service::{AdminPasswordOutcome, AuthOutcome, AuthService};
pub use session::Session;

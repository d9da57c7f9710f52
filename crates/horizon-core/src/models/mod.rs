//! Data models for Horizon Travel accounts.
//!
//! This module contains the structures exchanged with the auth endpoints:
//!
//! - `UserProfile`, `Role`: the signed-in user snapshot and its role claim
//! - `AuthResponse`: the token/user envelope returned by login, register and
//!   password updates
//! - `ErrorBody`: the `{ message, errors }` shape of rejected requests

pub mod auth;
pub mod user;

pub use auth::{AuthResponse, ErrorBody};
pub use user::{Role, UserProfile};

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use tracing::{debug, warn};

use crate::models::UserProfile;

use super::jar::{Cookie, CookieJar, SameSite};
use super::Session;

/// Cookie holding the raw bearer token
pub const TOKEN_KEY: &str = "access_token";

/// Cookie holding the JSON-serialized user profile
pub const USER_KEY: &str = "user";

/// Lifetime of both session cookies.
const SESSION_TTL_DAYS: i64 = 3;

const COOKIE_PATH: &str = "/";

/// Durable home of the session: a token cookie and a profile cookie.
///
/// Reads never fail. Anything missing, expired or unparsable reads as
/// "no session".
pub struct CredentialStore {
    jar: CookieJar,
    secure: bool,
}

impl CredentialStore {
    /// `secure` marks both cookies `Secure` + `SameSite=Strict` (production)
    pub fn new(jar: CookieJar, secure: bool) -> Self {
        Self { jar, secure }
    }

    /// Persist token and profile with a fresh 3-day expiry
    pub fn set(&self, token: &str, user: &UserProfile) -> Result<Session> {
        let expires = Utc::now() + Duration::days(SESSION_TTL_DAYS);
        let same_site = if self.secure {
            SameSite::Strict
        } else {
            SameSite::Lax
        };
        let cookie = |value: String| Cookie {
            value,
            expires,
            path: COOKIE_PATH.to_string(),
            secure: self.secure,
            same_site,
        };

        let profile = serde_json::to_string(user).context("Failed to serialize user profile")?;
        self.jar.set(TOKEN_KEY, cookie(token.to_string()))?;
        self.jar.set(USER_KEY, cookie(profile))?;

        debug!(username = %user.username, expires = %expires, "Stored session");
        Ok(Session {
            token: token.to_string(),
            user: user.clone(),
            expires_at: expires,
        })
    }

    pub fn get(&self) -> Option<Session> {
        let token = self.token_cookie()?;
        let user = self.user()?;
        Some(Session {
            token: token.value,
            user,
            expires_at: token.expires,
        })
    }

    pub fn token(&self) -> Option<String> {
        self.token_cookie().map(|c| c.value)
    }

    /// Token cookie with its attributes
    pub fn token_cookie(&self) -> Option<Cookie> {
        self.jar.get(TOKEN_KEY).filter(|c| !c.value.is_empty())
    }

    pub fn user(&self) -> Option<UserProfile> {
        let raw = self.jar.get(USER_KEY)?;
        match serde_json::from_str(&raw.value) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "Stored user profile is unreadable, treating as logged out");
                None
            }
        }
    }

    pub fn clear(&self) -> Result<()> {
        self.jar.remove(&[TOKEN_KEY, USER_KEY])
    }
}

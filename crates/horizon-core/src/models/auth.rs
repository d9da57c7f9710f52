use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::UserProfile;

/// Envelope returned by the login, register and password update endpoints.
///
/// The admin password endpoint omits both tokens, so they are optional here
/// and each caller decides whether a missing token is an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub struct AuthResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub user: UserProfile,
    #[serde(default)]
    pub message: String,
}

/// Body of a rejected request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Option<BTreeMap<String, String>>,
}

impl ErrorBody {
    /// Parse an error body, tolerating non-JSON responses (proxies, HTML 502 pages)
    pub fn parse(body: &str) -> Self {
        if let Ok(parsed) = serde_json::from_str(body) {
            return parsed;
        }
        // Keep the message even when `errors` has an unexpected shape
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string));
        Self {
            message,
            errors: None,
        }
    }
}

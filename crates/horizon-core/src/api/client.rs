//! API client for communicating with the Horizon Travel REST API.
//!
//! This module provides the `ApiClient` struct for the auth endpoints. It
//! never touches local state; persisting what the server returns is the
//! job of `AuthService`.

use std::time::Duration;

use reqwest::{header, Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::models::{AuthResponse, UserProfile};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

const LOGIN_PATH: &str = "/api/auth/login";
const REGISTER_PATH: &str = "/api/auth/register";
const UPDATE_PASSWORD_PATH: &str = "/api/auth/update-password";
const ADMIN_UPDATE_PASSWORD_PATH: &str = "/api/admin/update-password";
const CURRENT_USER_PATH: &str = "/api/auth/me";

// ============================================================================
// Request bodies
// ============================================================================

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct UpdatePasswordRequest<'a> {
    current_password: &'a str,
    new_password: &'a str,
}

#[derive(Serialize)]
struct AdminUpdatePasswordRequest<'a> {
    user_id: i64,
    new_password: &'a str,
}

/// API client for the Horizon backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client rooted at `base_url` (e.g. `https://api.horizon.travel`)
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether requests leave over TLS. Tokens stored as secure are only
    /// attached when this holds.
    pub fn is_https(&self) -> bool {
        self.base_url.starts_with("https://")
    }

    // =========================================================================
    // Auth endpoints
    // =========================================================================

    pub async fn login(&self, username: &str, password: &str) -> Result<AuthResponse, ApiError> {
        self.post(LOGIN_PATH, &LoginRequest { username, password }, None)
            .await
    }

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ApiError> {
        let body = RegisterRequest {
            username,
            email,
            password,
        };
        self.post(REGISTER_PATH, &body, None).await
    }

    pub async fn update_password(
        &self,
        token: Option<&str>,
        current_password: &str,
        new_password: &str,
    ) -> Result<AuthResponse, ApiError> {
        let body = UpdatePasswordRequest {
            current_password,
            new_password,
        };
        self.post(UPDATE_PASSWORD_PATH, &body, token).await
    }

    /// Reset another user's password (admin only, enforced by the server)
    pub async fn admin_update_password(
        &self,
        token: Option<&str>,
        user_id: i64,
        new_password: &str,
    ) -> Result<AuthResponse, ApiError> {
        let body = AdminUpdatePasswordRequest {
            user_id,
            new_password,
        };
        self.post(ADMIN_UPDATE_PASSWORD_PATH, &body, token).await
    }

    /// Fetch the profile of the token's owner
    pub async fn current_user(&self, token: Option<&str>) -> Result<UserProfile, ApiError> {
        self.get(CURRENT_USER_PATH, token).await
    }

    // =========================================================================
    // Transport
    // =========================================================================

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn with_headers(request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        let request = request.header(header::ACCEPT, "application/json");
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn post<B, T>(&self, path: &str, body: &B, token: Option<&str>) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        debug!(url = %url, authenticated = token.is_some(), "POST");

        let request = Self::with_headers(self.client.post(&url), token).json(body);
        let response = Self::check_response(request.send().await?).await?;
        Self::parse_json(response, path).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, token: Option<&str>) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!(url = %url, authenticated = token.is_some(), "GET");

        let request = Self::with_headers(self.client.get(&url), token);
        let response = Self::check_response(request.send().await?).await?;
        Self::parse_json(response, path).await
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            debug!(status = %status, body = %ApiError::truncate_body(&body), "Request rejected");
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn parse_json<T: DeserializeOwned>(response: Response, path: &str) -> Result<T, ApiError> {
        // Accepted by the server: a broken body is a bad response, not a network failure
        let body = response.text().await.map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to read response body from {}: {}", path, e))
        })?;
        serde_json::from_str(&body).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse JSON response from {}: {}", path, e))
        })
    }
}

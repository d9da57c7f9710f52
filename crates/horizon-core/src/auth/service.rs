//! Account operations against the backend, and the local view of who is
//! signed in.

use tracing::{info, warn};

use crate::api::{ApiClient, ApiError};
use crate::models::{AuthResponse, UserProfile};

use super::{CredentialStore, Session};

/// Result of a call that signs the caller in (or re-issues their token)
#[derive(Debug, Clone)]
pub struct AuthOutcome {
    pub session: Session,
    /// Server confirmation, e.g. "Login successful"
    pub message: String,
}

/// Result of an admin resetting some user's password
#[derive(Debug, Clone)]
pub struct AdminPasswordOutcome {
    /// The user whose password changed
    pub user: UserProfile,
    pub message: String,
    /// True when the affected user was the caller and the local session was rewritten
    pub session_replaced: bool,
}

/// The one auth context of a running client.
///
/// Built once at start-up and handed by reference to whatever needs to know
/// about the session (guards, navigation, commands).
pub struct AuthService {
    api: ApiClient,
    store: CredentialStore,
}

impl AuthService {
    pub fn new(api: ApiClient, store: CredentialStore) -> Self {
        Self { api, store }
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    // =========================================================================
    // Remote operations
    // =========================================================================

    pub async fn login(&self, username: &str, password: &str) -> Result<AuthOutcome, ApiError> {
        let response = self.api.login(username, password).await?;
        let outcome = self.store_response(response)?;
        info!(username = %outcome.session.username(), "Login successful");
        Ok(outcome)
    }

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthOutcome, ApiError> {
        let response = self.api.register(username, email, password).await?;
        let outcome = self.store_response(response)?;
        info!(username = %outcome.session.username(), "Registration successful");
        Ok(outcome)
    }

    /// Change the caller's own password. The server re-issues the token.
    pub async fn update_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> Result<AuthOutcome, ApiError> {
        let token = self.bearer_token();
        let result = self
            .api
            .update_password(token.as_deref(), current_password, new_password)
            .await;
        let response = self.invalidate_on_failure(token.is_some(), result)?;

        let outcome = self.store_response(response)?;
        info!(username = %outcome.session.username(), "Password updated");
        Ok(outcome)
    }

    /// Reset another user's password as an admin.
    ///
    /// The local session is only rewritten when the affected account has the
    /// same *username* as the one signed in. Ids are deliberately not compared.
    pub async fn update_user_password(
        &self,
        user_id: i64,
        new_password: &str,
    ) -> Result<AdminPasswordOutcome, ApiError> {
        let token = self.bearer_token();
        let result = self
            .api
            .admin_update_password(token.as_deref(), user_id, new_password)
            .await;
        let response = self.invalidate_on_failure(token.is_some(), result)?;

        let current = self.current_username();
        let session_replaced = if current.as_deref() == Some(response.user.username.as_str()) {
            self.replace_own_session(&response)?
        } else {
            info!(
                target_user = %response.user.username,
                user_id,
                "Password reset for another user, session untouched"
            );
            false
        };

        Ok(AdminPasswordOutcome {
            user: response.user,
            message: response.message,
            session_replaced,
        })
    }

    /// Refetch the signed-in user's profile and rewrite the stored copy,
    /// keeping the current token.
    pub async fn refresh_profile(&self) -> Result<UserProfile, ApiError> {
        let token = self.bearer_token();
        let result = self.api.current_user(token.as_deref()).await;
        let user = self.invalidate_on_failure(token.is_some(), result)?;

        if let Some(token) = self.store.token() {
            self.store.set(&token, &user).map_err(ApiError::Storage)?;
        }
        Ok(user)
    }

    // =========================================================================
    // Local state
    // =========================================================================

    pub fn is_authenticated(&self) -> bool {
        self.store.get().is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.store.user().map(|u| u.is_admin()).unwrap_or(false)
    }

    pub fn session(&self) -> Option<Session> {
        self.store.get()
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.store.user()
    }

    pub fn current_username(&self) -> Option<String> {
        self.store.user().map(|u| u.username)
    }

    pub fn token(&self) -> Option<String> {
        self.store.token()
    }

    /// Forget the session locally. There is no server-side revocation.
    pub fn logout(&self) -> Result<(), ApiError> {
        self.store.clear().map_err(ApiError::Storage)?;
        info!("Logged out");
        Ok(())
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Token to attach to an authenticated request. A token stored as
    /// secure is withheld from plain-http backends.
    fn bearer_token(&self) -> Option<String> {
        let cookie = self.store.token_cookie()?;
        if cookie.secure && !self.api.is_https() {
            warn!(base_url = %self.api.base_url(), "Secure token withheld from non-https backend");
            return None;
        }
        Some(cookie.value)
    }

    /// Drop the stored session when an authenticated request comes back with
    /// a status that means the token is no good. The error still propagates.
    fn invalidate_on_failure<T>(
        &self,
        authenticated: bool,
        result: Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        if let Err(ref e) = result {
            if authenticated && e.invalidates_session() {
                warn!(error = %e, "Authenticated request failed, clearing session");
                if let Err(clear_err) = self.store.clear() {
                    warn!(error = %clear_err, "Failed to clear session");
                }
            }
        }
        result
    }

    /// Rewrite the session after an admin reset of the caller's own account.
    /// Returns whether anything was written.
    fn replace_own_session(&self, response: &AuthResponse) -> Result<bool, ApiError> {
        // The admin endpoint may not rotate the token; keep ours if so
        let Some(token) = response.access_token.clone().or_else(|| self.store.token()) else {
            warn!("Session vanished while resetting own password");
            return Ok(false);
        };

        self.store
            .set(&token, &response.user)
            .map_err(ApiError::Storage)?;
        info!(username = %response.user.username, "Own password reset, session replaced");
        Ok(true)
    }

    fn store_response(&self, response: AuthResponse) -> Result<AuthOutcome, ApiError> {
        let token = response
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::InvalidResponse("Response is missing access_token".to_string()))?;

        let session = self
            .store
            .set(&token, &response.user)
            .map_err(ApiError::Storage)?;

        Ok(AuthOutcome {
            session,
            message: response.message,
        })
    }
}

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::models::UserProfile;

/// Signed-in state read back from the credential store.
///
/// Only ever built from a token *and* a parsable profile; a half-present
/// session is not representable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub token: String,
    pub user: UserProfile,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn username(&self) -> &str {
        &self.user.username
    }

    pub fn is_admin(&self) -> bool {
        self.user.is_admin()
    }

    pub fn time_until_expiry(&self) -> Duration {
        self.expires_at - Utc::now()
    }

    /// Human readable remaining lifetime (for display)
    pub fn expiry_display(&self) -> String {
        let remaining = self.time_until_expiry();
        if remaining <= Duration::zero() {
            "expired".to_string()
        } else if remaining.num_days() >= 1 {
            format!("{}d {}h", remaining.num_days(), remaining.num_hours() % 24)
        } else if remaining.num_hours() >= 1 {
            format!("{}h {}m", remaining.num_hours(), remaining.num_minutes() % 60)
        } else {
            format!("{}m", remaining.num_minutes().max(1))
        }
    }
}

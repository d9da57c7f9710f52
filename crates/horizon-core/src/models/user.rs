use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Role claim carried in the user profile.
///
/// The backend emits `member` and `admin`. `user` is accepted as an alias of
/// `member`; anything else maps to `Unknown` so a surprising value can never
/// be mistaken for an admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    #[serde(alias = "user")]
    Member,
    #[serde(other)]
    Unknown,
}

impl Role {
    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Role::Admin => "Administrator",
            Role::Member => "Member",
            Role::Unknown => "Unknown",
        }
    }
}

/// Snapshot of the signed-in user as last returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub avatar: String,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Two-letter initials used when no avatar image can be shown
    pub fn initials(&self) -> String {
        self.username
            .chars()
            .take(2)
            .flat_map(char::to_uppercase)
            .collect()
    }

    pub fn member_since(&self) -> String {
        match self.created_at {
            Some(ts) => ts.format("%B %Y").to_string(),
            None => "Unknown".to_string(),
        }
    }
}

/// Accepts RFC 3339 (what we write back to the jar) as well as the RFC 2822
/// form the backend serializes datetimes with (`Tue, 14 Oct 2025 10:00:00 GMT`).
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(None);
    };

    if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }
    DateTime::parse_from_rfc2822(&raw)
        .map(|ts| Some(ts.with_timezone(&Utc)))
        .map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_role_parsing() {
        let admin: Role = serde_json::from_str(r#""admin""#).unwrap();
        let member: Role = serde_json::from_str(r#""member""#).unwrap();
        let user: Role = serde_json::from_str(r#""user""#).unwrap();
        let other: Role = serde_json::from_str(r#""superuser""#).unwrap();

        assert_eq!(admin, Role::Admin);
        assert_eq!(member, Role::Member);
        assert_eq!(user, Role::Member);
        assert_eq!(other, Role::Unknown);
        assert!(!other.is_admin());
    }

    #[test]
    fn test_profile_parses_backend_payload() {
        let json = r#"{"id": 7, "username": "nben", "email": "nben@horizon.test", "role": "admin",
            "avatar": "https://boring-avatars-api.vercel.app/api/avatar?size=40&variant=beam&name=nben",
            "created_at": "Tue, 14 Oct 2025 10:30:00 GMT"}"#;

        let user: UserProfile = serde_json::from_str(json).expect("backend payload should parse");
        assert_eq!(user.id, 7);
        assert!(user.is_admin());

        let created = user.created_at.expect("created_at should be present");
        assert_eq!(created.year(), 2025);
        assert_eq!(created.month(), 10);
        assert_eq!(created.hour(), 10);
        assert_eq!(user.member_since(), "October 2025");
    }

    #[test]
    fn test_profile_survives_reserialization() {
        let json = r#"{"id": 1, "username": "alice", "email": "alice@horizon.test", "role": "member",
            "avatar": "", "created_at": "Tue, 14 Oct 2025 10:30:00 GMT"}"#;
        let user: UserProfile = serde_json::from_str(json).unwrap();

        // The jar stores the RFC 3339 form, which must read back identically
        let stored = serde_json::to_string(&user).unwrap();
        let reread: UserProfile = serde_json::from_str(&stored).unwrap();
        assert_eq!(reread, user);
    }

    #[test]
    fn test_profile_optional_fields() {
        let json = r#"{"id": 3, "username": "bob", "email": "bob@horizon.test"}"#;
        let user: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(user.role, Role::Member);
        assert!(user.avatar.is_empty());
        assert!(user.created_at.is_none());
        assert_eq!(user.member_since(), "Unknown");
    }

    #[test]
    fn test_initials() {
        let user = UserProfile {
            id: 1,
            username: "alice".to_string(),
            email: "alice@horizon.test".to_string(),
            role: Role::Member,
            avatar: String::new(),
            created_at: None,
        };
        assert_eq!(user.initials(), "AL");
    }
}

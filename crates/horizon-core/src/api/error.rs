use std::collections::BTreeMap;

use thiserror::Error;

use crate::models::ErrorBody;

/// Failure of a request to the Horizon backend, or of persisting its result.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{message}")]
    Validation {
        status: u16,
        message: String,
        errors: BTreeMap<String, String>,
    },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Session expired - please log in again")]
    SessionExpired,

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Request rejected ({status}): {message}")]
    Client { status: u16, message: String },

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Failed to persist session: {0:#}")]
    Storage(anyhow::Error),
}

/// Coarse classification for callers that only care where a failure came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request never reached the server
    Network,
    /// The server rejected the request (4xx)
    Auth,
    /// The server failed (5xx) or answered with something unreadable
    Server,
    /// Local persistence failed
    Local,
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Shown when the server gave no usable message
const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    pub(crate) fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut cut = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..cut], body.len())
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let parsed = ErrorBody::parse(body);
        let message = parsed.message.unwrap_or_default();

        match status.as_u16() {
            code @ (400 | 422) => ApiError::Validation {
                status: code,
                message,
                errors: parsed.errors.unwrap_or_default(),
            },
            401 => ApiError::Unauthorized(message),
            403 => ApiError::Forbidden(message),
            404 => ApiError::NotFound(message),
            419 => ApiError::SessionExpired,
            429 => ApiError::RateLimited,
            code @ 500..=599 => ApiError::Server {
                status: code,
                message,
            },
            code => ApiError::Client {
                status: code,
                message,
            },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Network(_) => ErrorKind::Network,
            ApiError::Validation { .. }
            | ApiError::Unauthorized(_)
            | ApiError::Forbidden(_)
            | ApiError::NotFound(_)
            | ApiError::SessionExpired
            | ApiError::RateLimited
            | ApiError::Client { .. } => ErrorKind::Auth,
            ApiError::Server { .. } | ApiError::InvalidResponse(_) => ErrorKind::Server,
            ApiError::Storage(_) => ErrorKind::Local,
        }
    }

    /// HTTP status behind the error, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized(_) => Some(401),
            ApiError::Forbidden(_) => Some(403),
            ApiError::NotFound(_) => Some(404),
            ApiError::SessionExpired => Some(419),
            ApiError::RateLimited => Some(429),
            ApiError::Validation { status, .. }
            | ApiError::Client { status, .. }
            | ApiError::Server { status, .. } => Some(*status),
            ApiError::Network(_) | ApiError::InvalidResponse(_) | ApiError::Storage(_) => None,
        }
    }

    /// Whether a failed authenticated request means the stored session can no
    /// longer be trusted (401, 403, 419, 500, or the server was unreachable).
    pub fn invalidates_session(&self) -> bool {
        match self {
            ApiError::Network(_)
            | ApiError::Unauthorized(_)
            | ApiError::Forbidden(_)
            | ApiError::SessionExpired => true,
            ApiError::Server { status, .. } => *status == 500,
            _ => false,
        }
    }

    /// Field-level validation messages, `None` for every other error
    pub fn field_errors(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            ApiError::Validation { errors, .. } if !errors.is_empty() => Some(errors),
            _ => None,
        }
    }

    /// Message suitable for a notification: the server's own wording when it
    /// sent one, a generic fallback otherwise.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Validation { message, .. }
            | ApiError::Unauthorized(message)
            | ApiError::Forbidden(message)
            | ApiError::NotFound(message)
            | ApiError::Client { message, .. }
            | ApiError::Server { message, .. }
                if !message.trim().is_empty() =>
            {
                message.clone()
            }
            ApiError::Network(e) if e.is_timeout() => {
                "Connection timed out. Please try again.".to_string()
            }
            ApiError::Network(_) => {
                "Unable to connect to server. Check your internet connection.".to_string()
            }
            ApiError::SessionExpired => "Your session has expired. Please log in again.".to_string(),
            ApiError::RateLimited => "Too many requests. Please wait a moment.".to_string(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_uses_server_message() {
        let err = ApiError::from_status(
            StatusCode::UNAUTHORIZED,
            r#"{"message": "Invalid credentials"}"#,
        );
        assert!(matches!(err, ApiError::Unauthorized(ref m) if m == "Invalid credentials"));
        assert_eq!(err.kind(), ErrorKind::Auth);
        assert_eq!(err.user_message(), "Invalid credentials");
        assert!(err.invalidates_session());
    }

    #[test]
    fn test_from_status_validation_errors() {
        let body = r#"{"message": "Oops! Validation failed.", "errors": {"new_password": "Password must be at least 8 characters"}}"#;
        for status in [StatusCode::BAD_REQUEST, StatusCode::UNPROCESSABLE_ENTITY] {
            let err = ApiError::from_status(status, body);
            assert_eq!(err.status(), Some(status.as_u16()));
            let fields = err.field_errors().expect("validation errors expected");
            assert_eq!(
                fields.get("new_password").map(String::as_str),
                Some("Password must be at least 8 characters")
            );
            assert_eq!(err.kind(), ErrorKind::Auth);
            assert!(!err.invalidates_session());
        }
    }

    #[test]
    fn test_from_status_server_errors() {
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "{}");
        assert_eq!(err.kind(), ErrorKind::Server);
        assert_eq!(err.status(), Some(500));
        assert!(err.invalidates_session());

        let err = ApiError::from_status(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert_eq!(err.kind(), ErrorKind::Server);
        assert!(!err.invalidates_session());
    }

    #[test]
    fn test_from_status_session_timeout() {
        let err = ApiError::from_status(StatusCode::from_u16(419).unwrap(), "");
        assert!(matches!(err, ApiError::SessionExpired));
        assert!(err.invalidates_session());
    }

    #[test]
    fn test_user_message_fallback() {
        let err = ApiError::from_status(StatusCode::BAD_GATEWAY, "");
        assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);

        let err = ApiError::InvalidResponse("missing access_token".to_string());
        assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);
        assert_eq!(err.kind(), ErrorKind::Server);
    }

    #[test]
    fn test_truncate_body() {
        let long = "x".repeat(MAX_ERROR_BODY_LENGTH + 20);
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.starts_with(&"x".repeat(MAX_ERROR_BODY_LENGTH)));
        assert!(truncated.ends_with("(truncated, 520 total bytes)"));

        // Never split a multi-byte character
        let accented = "é".repeat(MAX_ERROR_BODY_LENGTH);
        let truncated = ApiError::truncate_body(&accented);
        assert!(truncated.contains("truncated"));
    }
}

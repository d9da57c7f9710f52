//! Client-side checks for the account forms.
//!
//! These mirror what the sign-in, sign-up and settings screens enforce
//! before a request is sent. The backend validates again on its own.

use std::collections::BTreeMap;
use std::fmt;

const USERNAME_MIN_LEN: usize = 4;
const USERNAME_MAX_LEN: usize = 12;
const PASSWORD_MIN_LEN: usize = 8;
const PASSWORD_MAX_LEN: usize = 15;

/// Field name → first problem found with it
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for FieldErrors {}

impl FieldErrors {
    fn check(&mut self, field: &'static str, result: Result<(), String>) {
        if let Err(message) = result {
            self.0.entry(field).or_insert(message);
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }

    fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

pub fn check_username(username: &str) -> Result<(), String> {
    let len = username.chars().count();
    if len < USERNAME_MIN_LEN {
        return Err(format!("Username must be at least {} characters long.", USERNAME_MIN_LEN));
    }
    if len > USERNAME_MAX_LEN {
        return Err(format!("Username must be at most {} characters long.", USERNAME_MAX_LEN));
    }
    if !username.chars().all(|c| c.is_ascii_lowercase()) {
        return Err("Username can only contain letters a-z.".to_string());
    }
    Ok(())
}

pub fn check_password(password: &str) -> Result<(), String> {
    let len = password.chars().count();
    if len < PASSWORD_MIN_LEN {
        return Err(format!("Password must be at least {} characters long.", PASSWORD_MIN_LEN));
    }
    if len > PASSWORD_MAX_LEN {
        return Err(format!("Password must be at most {} characters long.", PASSWORD_MAX_LEN));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err("Password must include at least one lowercase letter (a-z).".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err("Password must include at least one uppercase letter (A-Z).".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must include at least one digit (0-9).".to_string());
    }
    if password.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err("Password must include at least one symbol (e.g. !@#$%).".to_string());
    }
    Ok(())
}

pub fn check_email(email: &str) -> Result<(), String> {
    let invalid = || Err("Invalid email".to_string());
    let Some((local, domain)) = email.split_once('@') else {
        return invalid();
    };
    if local.is_empty() || domain.contains('@') || email.chars().any(char::is_whitespace) {
        return invalid();
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) if !host.is_empty() && !tld.is_empty() => Ok(()),
        _ => invalid(),
    }
}

pub fn validate_login(username: &str, password: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();
    errors.check("username", check_username(username));
    errors.check("password", check_password(password));
    errors.into_result()
}

pub fn validate_registration(username: &str, email: &str, password: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();
    errors.check("username", check_username(username));
    errors.check("email", check_email(email));
    errors.check("password", check_password(password));
    errors.into_result()
}

pub fn validate_password_change(current: &str, new: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();
    errors.check("current_password", check_password(current));
    errors.check("new_password", check_password(new));
    if current == new {
        errors.check(
            "new_password",
            Err("New password must be different from current password.".to_string()),
        );
    }
    errors.into_result()
}

pub fn validate_admin_reset(user_id: i64, new_password: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();
    if user_id < 1 {
        errors.check("user_id", Err("User ID is required".to_string()));
    }
    errors.check("new_password", check_password(new_password));
    errors.into_result()
}

//! Subcommand handlers.
//!
//! Each handler plays the part of one screen of the web console: the login
//! and register screens sit behind the guest gate, everything else behind
//! the auth guard.

use std::io::{self, Write};

use anyhow::{bail, Result};
use tracing::{debug, warn};

use horizon_core::auth::guard::{guest_only, login_route_with_error, logout_and_leave, FORCED_LOGOUT_ERROR};
use horizon_core::auth::{AuthGuard, GuardView, Navigator};
use horizon_core::forms::{self, FieldErrors};
use horizon_core::{ApiError, AuthService, Config, Sidebar};

use crate::render;

/// There are no screens to switch in a terminal, so navigation is reported
#[derive(Default)]
struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn push(&mut self, path: &str) {
        debug!(path, "Navigate");
        eprintln!("→ {}", path);
    }

    fn replace(&mut self, path: &str) {
        self.push(path);
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Run `screen` only if the auth guard lets it render
fn guarded<T>(auth: &AuthService, nav: &mut dyn Navigator, screen: impl FnOnce() -> T) -> Result<T> {
    let mut guard = AuthGuard::new();
    guard.check(auth, nav);
    match guard.view(screen) {
        GuardView::Children(value) => Ok(value),
        GuardView::Loading | GuardView::Nothing => {
            bail!("Not signed in. Run `horizon login` first.")
        }
    }
}

fn prompt_line(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn prompt_password(label: &str) -> Result<String> {
    let password = rpassword::prompt_password(format!("{}: ", label))?;
    Ok(password)
}

fn print_field_error(field: &str, message: &str) {
    eprintln!("  {}: {}", field, message);
}

fn invalid_form(errors: FieldErrors) -> anyhow::Error {
    eprintln!("✗ Please fix the following:");
    for (field, message) in errors.iter() {
        print_field_error(field, message);
    }
    errors.into()
}

/// Show a failed request the way the console's notifications do, and send
/// the user to the login screen if the failure cost them their session.
fn request_failed(auth: &AuthService, nav: &mut dyn Navigator, had_session: bool, err: ApiError) -> anyhow::Error {
    eprintln!("✗ {}", err.user_message());
    if let Some(fields) = err.field_errors() {
        for (field, message) in fields {
            print_field_error(field, message);
        }
    }

    if had_session && !auth.is_authenticated() {
        nav.push(&login_route_with_error(FORCED_LOGOUT_ERROR));
    }
    err.into()
}

fn remember_username(config: &mut Config, username: &str) {
    if let Err(e) = config.remember_username(username) {
        warn!(error = %e, "Failed to save config");
    }
}

// ============================================================================
// Guest screens
// ============================================================================

pub async fn login(auth: &AuthService, config: &mut Config, username: Option<String>) -> Result<()> {
    let mut nav = TerminalNavigator;
    if !guest_only(auth, &mut nav) {
        let name = auth.current_username().unwrap_or_default();
        println!("Already signed in as {}. Run `horizon logout` to switch accounts.", name);
        return Ok(());
    }

    let username = match username.or_else(|| config.last_username.clone()) {
        Some(name) if !name.is_empty() => name,
        _ => prompt_line("Username")?,
    };
    let password = prompt_password("Password")?;
    forms::validate_login(&username, &password).map_err(invalid_form)?;

    let outcome = auth
        .login(&username, &password)
        .await
        .map_err(|e| request_failed(auth, &mut nav, false, e))?;

    remember_username(config, &username);
    println!("Welcome back, {}", outcome.session.username());
    nav.push("/");
    Ok(())
}

pub async fn register(auth: &AuthService, config: &mut Config, username: &str, email: &str) -> Result<()> {
    let mut nav = TerminalNavigator;
    if !guest_only(auth, &mut nav) {
        println!("Already signed in. Run `horizon logout` before creating another account.");
        return Ok(());
    }

    let password = prompt_password("Password")?;
    forms::validate_registration(username, email, &password).map_err(invalid_form)?;

    let outcome = auth
        .register(username, email, &password)
        .await
        .map_err(|e| request_failed(auth, &mut nav, false, e))?;

    remember_username(config, username);
    println!("{}. Welcome, {}", outcome.message, outcome.session.username());
    nav.push("/");
    Ok(())
}

// ============================================================================
// Console screens
// ============================================================================

pub fn logout(auth: &AuthService) -> Result<()> {
    let mut nav = TerminalNavigator;
    logout_and_leave(auth, &mut nav)?;
    println!("Logged out");
    Ok(())
}

pub fn whoami(auth: &AuthService, json: bool) -> Result<()> {
    let mut nav = TerminalNavigator;
    let session = guarded(auth, &mut nav, || auth.session())?;
    let Some(session) = session else {
        bail!("Session disappeared while reading it");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&session.user)?);
    } else {
        render::profile(&session);
    }
    Ok(())
}

pub async fn refresh(auth: &AuthService) -> Result<()> {
    let mut nav = TerminalNavigator;
    guarded(auth, &mut nav, || ())?;

    let user = auth
        .refresh_profile()
        .await
        .map_err(|e| request_failed(auth, &mut nav, true, e))?;
    println!("Profile refreshed for {}", user.username);
    Ok(())
}

pub async fn change_password(auth: &AuthService) -> Result<()> {
    let mut nav = TerminalNavigator;
    guarded(auth, &mut nav, || ())?;

    let current = prompt_password("Current password")?;
    let new = prompt_password("New password")?;
    let confirm = prompt_password("Confirm new password")?;
    if new != confirm {
        bail!("Passwords do not match");
    }
    forms::validate_password_change(&current, &new).map_err(invalid_form)?;

    let outcome = auth
        .update_password(&current, &new)
        .await
        .map_err(|e| request_failed(auth, &mut nav, true, e))?;
    println!("{}", outcome.message);
    Ok(())
}

pub async fn admin_reset_password(auth: &AuthService, user_id: i64) -> Result<()> {
    let mut nav = TerminalNavigator;
    guarded(auth, &mut nav, || ())?;
    if !auth.is_admin() {
        // Only a hint: the backend is what actually refuses non-admins
        warn!("Signed-in account is not an admin; the server is expected to refuse");
    }

    let new = prompt_password(&format!("New password for user {}", user_id))?;
    forms::validate_admin_reset(user_id, &new).map_err(invalid_form)?;

    let outcome = auth
        .update_user_password(user_id, &new)
        .await
        .map_err(|e| request_failed(auth, &mut nav, true, e))?;

    println!("{} ({})", outcome.message, outcome.user.username);
    if outcome.session_replaced {
        println!("That was your own account; your local session was updated.");
    }
    Ok(())
}

pub fn nav(auth: &AuthService, json: bool) -> Result<()> {
    let mut nav = TerminalNavigator;
    let sidebar = guarded(auth, &mut nav, || Sidebar::for_session(auth))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&sidebar)?);
    } else {
        render::sidebar(&sidebar);
    }
    Ok(())
}

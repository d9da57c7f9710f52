//! Route gates for protected and guest-only screens.
//!
//! A guard decides once, when its screen mounts, whether the screen may
//! render. Session expiry after that point is only noticed by the next guard.

use tracing::debug;

use super::AuthService;

pub const LOGIN_ROUTE: &str = "/login";
pub const HOME_ROUTE: &str = "/";

/// Error code appended to the login route after a forced logout
pub const FORCED_LOGOUT_ERROR: &str = "SomethingWentWrong";

/// Login route carrying an error code, e.g. `/login?error=SomethingWentWrong`
pub fn login_route_with_error(code: &str) -> String {
    format!("{}?error={}", LOGIN_ROUTE, code)
}

/// Client-side navigation. Calls are fire-and-forget.
pub trait Navigator {
    fn push(&mut self, path: &str);

    /// Navigate without leaving the current entry behind (used by logout)
    fn replace(&mut self, path: &str);
}

/// In-memory navigation history
#[derive(Debug, Default, Clone)]
pub struct History {
    entries: Vec<String>,
}

impl History {
    pub fn new(start: &str) -> Self {
        Self {
            entries: vec![start.to_string()],
        }
    }

    pub fn current(&self) -> Option<&str> {
        self.entries.last().map(String::as_str)
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

impl Navigator for History {
    fn push(&mut self, path: &str) {
        self.entries.push(path.to_string());
    }

    fn replace(&mut self, path: &str) {
        self.entries.pop();
        self.entries.push(path.to_string());
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardState {
    Checking,
    Authenticated,
    Redirecting { to: String },
}

/// What a guarded screen shows for the guard's current state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardView<T> {
    /// Blocking spinner, children not rendered
    Loading,
    Children(T),
    /// Navigation is underway; render nothing
    Nothing,
}

/// Gate in front of the signed-in console
#[derive(Debug, Clone)]
pub struct AuthGuard {
    state: GuardState,
    login_route: String,
}

impl Default for AuthGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthGuard {
    pub fn new() -> Self {
        Self::with_login_route(LOGIN_ROUTE)
    }

    pub fn with_login_route(route: &str) -> Self {
        Self {
            state: GuardState::Checking,
            login_route: route.to_string(),
        }
    }

    pub fn state(&self) -> &GuardState {
        &self.state
    }

    /// Resolve the guard. Only the first call does anything; the outcome
    /// holds until the guard is dropped.
    pub fn check(&mut self, auth: &AuthService, nav: &mut dyn Navigator) -> &GuardState {
        if self.state != GuardState::Checking {
            return &self.state;
        }

        if auth.is_authenticated() {
            debug!("Guard passed");
            self.state = GuardState::Authenticated;
        } else {
            debug!(to = %self.login_route, "Not authenticated, redirecting");
            nav.push(&self.login_route);
            self.state = GuardState::Redirecting {
                to: self.login_route.clone(),
            };
        }
        &self.state
    }

    pub fn view<T>(&self, children: impl FnOnce() -> T) -> GuardView<T> {
        match self.state {
            GuardState::Checking => GuardView::Loading,
            GuardState::Authenticated => GuardView::Children(children()),
            GuardState::Redirecting { .. } => GuardView::Nothing,
        }
    }
}

/// Gate in front of the login and register screens: a signed-in user is sent
/// home instead. Returns whether the screen may render.
pub fn guest_only(auth: &AuthService, nav: &mut dyn Navigator) -> bool {
    if auth.is_authenticated() {
        debug!("Already authenticated, leaving guest screen");
        nav.push(HOME_ROUTE);
        false
    } else {
        true
    }
}

/// Log out from the user menu and land on the login screen
pub fn logout_and_leave(auth: &AuthService, nav: &mut dyn Navigator) -> Result<(), crate::api::ApiError> {
    auth.logout()?;
    nav.replace(LOGIN_ROUTE);
    Ok(())
}

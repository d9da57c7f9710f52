//! Role-gated console navigation.
//!
//! Which links show is decided from the locally cached role claim only.
//! Hiding the admin section is a convenience: the backend still has to
//! refuse admin calls from non-admins.

use serde::Serialize;

use crate::auth::AuthService;
use crate::models::UserProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub title: &'static str,
    pub href: &'static str,
}

const fn item(title: &'static str, href: &'static str) -> NavItem {
    NavItem { title, href }
}

pub const MAIN_NAV_ITEMS: &[NavItem] = &[
    item("Dashboard", "/dashboard"),
    item("Bookings", "/bookings"),
    item("Invoices", "/invoices"),
];

pub const ADMIN_NAV_ITEMS: &[NavItem] = &[
    item("Analytics", "/admin"),
    item("Users", "/admin/users"),
    item("Destinations", "/admin/destinations"),
    item("Avenues", "/admin/avenues"),
    item("Bookings", "/admin/bookings"),
    item("Transactions", "/admin/transactions"),
    item("Legal", "/admin/legal"),
    item("Faqs", "/admin/faqs"),
    item("Contacts", "/admin/contacts"),
    item("Changelogs", "/admin/changelogs"),
];

pub const FOOTER_NAV_ITEMS: &[NavItem] = &[
    item("Repository", "https://github.com/horizen/horizen"),
    item("Author", "https://horizen.com"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavSection {
    pub label: &'static str,
    pub items: Vec<NavItem>,
    pub admin_only: bool,
}

/// Sections to render: `main` always, `admin` only for admins
pub fn gate(main: &[NavItem], admin: &[NavItem], is_admin: bool) -> Vec<NavSection> {
    let mut sections = vec![NavSection {
        label: "Platform",
        items: main.to_vec(),
        admin_only: false,
    }];
    if is_admin {
        sections.push(NavSection {
            label: "Administration",
            items: admin.to_vec(),
            admin_only: true,
        });
    }
    sections
}

/// Console sidebar as seen by the signed-in user
#[derive(Debug, Clone, Serialize)]
pub struct Sidebar {
    pub sections: Vec<NavSection>,
    pub footer: Vec<NavItem>,
    pub user: Option<UserProfile>,
}

impl Sidebar {
    /// Evaluate the role claim now. No network call is made.
    pub fn for_session(auth: &AuthService) -> Self {
        Self {
            sections: gate(MAIN_NAV_ITEMS, ADMIN_NAV_ITEMS, auth.is_admin()),
            footer: FOOTER_NAV_ITEMS.to_vec(),
            user: auth.current_user(),
        }
    }

    pub fn shows_admin(&self) -> bool {
        self.sections.iter().any(|s| s.admin_only)
    }

    pub fn contains(&self, href: &str) -> bool {
        self.sections
            .iter()
            .flat_map(|s| s.items.iter())
            .any(|item| item.href == href)
    }
}

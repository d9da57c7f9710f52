use horizon_core::nav::NavItem;
use horizon_core::{Session, Sidebar};

/// Width of the title column in navigation listings
const TITLE_WIDTH: usize = 16;

fn item_line(item: &NavItem) -> String {
    format!("  {:<width$} {}", item.title, item.href, width = TITLE_WIDTH)
}

pub fn sidebar(sidebar: &Sidebar) {
    println!("Horizon Travel");
    for section in &sidebar.sections {
        println!();
        println!("{}", section.label);
        for item in &section.items {
            println!("{}", item_line(item));
        }
    }

    println!();
    for item in &sidebar.footer {
        println!("{}", item_line(item));
    }

    if let Some(ref user) = sidebar.user {
        println!();
        println!("[{}] {} <{}>", user.initials(), user.username, user.email);
    }
}

pub fn profile(session: &Session) {
    let user = &session.user;
    println!("{} ({})", user.username, user.role.display_name());
    println!("  id:            {}", user.id);
    println!("  email:         {}", user.email);
    println!("  member since:  {}", user.member_since());
    println!("  session ends:  {}", session.expiry_display());
}

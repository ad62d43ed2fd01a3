use once_cell::sync::Lazy;

use crate::session::{Role, Session};

/// One sidebar entry: a label and the command that activates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub label: &'static str,
    pub command: &'static str,
}

static FOUNDER_NAV: Lazy<Vec<NavItem>> = Lazy::new(|| {
    vec![
        NavItem { label: "Home", command: "dashboard" },
        NavItem { label: "My Startups", command: "startups" },
        NavItem { label: "Funding Requests", command: "requests" },
        NavItem { label: "Logout", command: "logout" },
    ]
});

static INVESTOR_NAV: Lazy<Vec<NavItem>> = Lazy::new(|| {
    vec![
        NavItem { label: "Home", command: "dashboard" },
        NavItem { label: "Browse Startups", command: "browse" },
        NavItem { label: "Saved Startups", command: "saved" },
        NavItem { label: "My Investments", command: "investments" },
        NavItem { label: "Logout", command: "logout" },
    ]
});

/// Role-aware navigation; anonymous users get no menu.
pub fn nav_items(role: Option<Role>) -> &'static [NavItem] {
    match role {
        Some(Role::Founder) => FOUNDER_NAV.as_slice(),
        Some(Role::Investor) => INVESTOR_NAV.as_slice(),
        None => &[],
    }
}

/// Wraps page content in the shared shell: identity line plus navigation.
pub fn render_frame(session: &Session, body: &str) -> String {
    let mut out = String::new();
    match (&session.username, session.role) {
        (Some(username), Some(role)) => {
            out.push_str(&format!("VentureLink — {username} ({role:?})\n"));
        }
        _ => out.push_str("VentureLink — signed out\n"),
    }
    let nav = nav_items(session.role);
    if !nav.is_empty() {
        let labels: Vec<&str> = nav.iter().map(|item| item.label).collect();
        out.push_str(&format!("[{}]\n", labels.join(" | ")));
    }
    out.push('\n');
    out.push_str(body);
    out
}

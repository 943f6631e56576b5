use serde::Serialize;

use crate::constants::{nav_groups, APP_NAME};
use crate::router::Route;
use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SidebarLink {
    pub label: String,
    pub path: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SidebarGroup {
    pub category: String,
    pub links: Vec<SidebarLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Header {
    pub name: String,
    pub role: String,
}

/// Chrome around every authenticated page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub app_name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<Header>,
    pub sidebar: Vec<SidebarGroup>,
}

impl Layout {
    pub fn for_session(session: &Session, current: &Route) -> Self {
        Self {
            app_name: APP_NAME,
            header: header(session),
            sidebar: sidebar(session, current),
        }
    }

    pub fn visible_paths(&self) -> Vec<&str> {
        self.sidebar
            .iter()
            .flat_map(|g| g.links.iter().map(|l| l.path.as_str()))
            .collect()
    }
}

/// Navigation filtered by permission. Gated items stay hidden until the
/// session has loaded and grants them.
pub fn sidebar(session: &Session, current: &Route) -> Vec<SidebarGroup> {
    nav_groups()
        .into_iter()
        .filter_map(|group| {
            let links: Vec<SidebarLink> = group
                .items
                .into_iter()
                .filter(|item| match &item.required {
                    Some(permission) => session.has_permission(permission),
                    None => true,
                })
                .map(|item| SidebarLink {
                    label: item.label.to_string(),
                    path: item.route.path().to_string(),
                    active: &item.route == current,
                })
                .collect();

            (!links.is_empty()).then(|| SidebarGroup {
                category: group.category.to_string(),
                links,
            })
        })
        .collect()
}

pub fn header(session: &Session) -> Option<Header> {
    let principal = session.principal.as_ref()?;
    Some(Header {
        name: principal.name.clone(),
        role: principal.role.label().to_string(),
    })
}

impl std::fmt::Display for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.header {
            Some(h) => writeln!(f, "{} | {} ({})", self.app_name, h.name, h.role)?,
            None => writeln!(f, "{}", self.app_name)?,
        }
        for group in &self.sidebar {
            let links: Vec<String> = group
                .links
                .iter()
                .map(|l| if l.active { format!("[{}]", l.label) } else { l.label.clone() })
                .collect();
            writeln!(f, "  {}: {}", group.category, links.join("  "))?;
        }
        Ok(())
    }
}

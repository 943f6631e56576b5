use super::{ago, or_error, Link, PageContext, Section, View};
use crate::models::{DashboardStats, Incident, SosStatus};
use crate::permissions::Permission;
use crate::router::Route;
use crate::session::Session;

/// What the signed-in principal may do from the overview
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardAccess {
    pub manage_incidents: bool,
    pub view_incidents: bool,
    pub manage_users: bool,
    pub manage_admins: bool,
}

impl DashboardAccess {
    pub fn for_session(session: &Session) -> Self {
        let manage_incidents = session.has_permission(&Permission::ManageIncidents);
        Self {
            manage_incidents,
            view_incidents: manage_incidents || session.has_permission(&Permission::ViewIncidents),
            manage_users: session.has_permission(&Permission::ManageUsers),
            manage_admins: session.has_permission(&Permission::ManageAdmins),
        }
    }
}

pub async fn render(ctx: &PageContext<'_>) -> View {
    let access = DashboardAccess::for_session(ctx.session);
    let mut view = View::new("Overview");

    if let Some(p) = &ctx.session.principal {
        view.push(Section::text(format!("Logged in as {} ({})", p.name, p.role.as_str())));
    }

    let mut actions = Vec::new();
    if access.manage_users {
        actions.push(Link {
            label: "Manage Users".into(),
            path: Route::Personnel.path().to_string(),
        });
    }
    if access.manage_admins {
        actions.push(Link {
            label: "Manage Admins".into(),
            path: Route::Personnel.path().to_string(),
        });
    }
    if !actions.is_empty() {
        view.push(Section::Links {
            title: "Quick actions".into(),
            items: actions,
        });
    }

    let incidents_fetch = async {
        if access.view_incidents {
            Some(ctx.incidents.list().await)
        } else {
            None
        }
    };
    let (incidents, alerts) = futures::join!(incidents_fetch, ctx.sos.list());

    let alerts = or_error(&mut view, alerts);

    if let Some(active) = alerts.iter().find(|a| a.status == SosStatus::Active) {
        view.push(Section::text(format!(
            "ACTIVE SOS: {} - {} ({})",
            if active.user_name.is_empty() { "Unknown caller" } else { active.user_name.as_str() },
            active.message.as_deref().unwrap_or("SOS Alert"),
            ago(active.timestamp, ctx.now),
        )));
    }

    let incidents: Vec<Incident> = match incidents {
        None => Vec::new(),
        Some(result) => or_error(&mut view, result),
    };

    let stats = DashboardStats::compute(&incidents, &alerts, ctx.now);
    let mut items = vec![
        ("Active SOS", stats.active_sos.to_string()),
        ("Alerts", alerts.len().to_string()),
    ];
    if access.view_incidents {
        items.insert(0, ("Active Incidents", stats.active_incidents.to_string()));
        items.push(("Resolved Today", stats.resolved_today.to_string()));
    }
    if let Some(minutes) = stats.average_response_minutes {
        items.push(("Avg Response", format!("{:.1} min", minutes)));
    }
    view.push(Section::stats(items));

    if access.view_incidents {
        let rows = incidents
            .iter()
            .filter(|i| i.is_open())
            .map(|i| {
                vec![
                    i.id.clone(),
                    i.title.clone(),
                    i.priority.label().to_string(),
                    i.status.label().to_string(),
                    ago(i.created_at, ctx.now),
                ]
            })
            .collect();
        view.push(Section::table(
            "Active Incidents",
            &["ID", "Title", "Priority", "Status", "Reported"],
            rows,
            "No active incidents",
        ));
    } else {
        view.push(Section::text("You do not have permission to view incidents."));
    }

    view
}

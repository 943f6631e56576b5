use std::str::FromStr;

use super::{ago, or_error, PageContext, Section, View};
use crate::error::ClientError;
use crate::models::{Incident, IncidentStatus};

pub async fn render(ctx: &PageContext<'_>) -> View {
    let mut view = View::new("Incidents").subtitle("Manage and track all reported incidents");

    let filter = match ctx.params.status.as_deref().map(IncidentStatus::from_str) {
        None => None,
        Some(Ok(status)) => Some(status),
        Some(Err(e)) => {
            view.push(Section::error(&ClientError::validation(e)));
            None
        }
    };

    let result = match filter {
        Some(status) => ctx.incidents.by_status(status).await,
        None => ctx.incidents.list().await,
    };
    let incidents = or_error(&mut view, result);

    let title = match filter {
        Some(status) => format!("{} Incidents", status.label()),
        None => "All Incidents".to_string(),
    };
    view.push(Section::table(
        title,
        &["ID", "Title", "Category", "Priority", "Status", "Location", "Reported"],
        incidents.iter().map(|i| row(i, ctx)).collect(),
        "No incidents found",
    ));
    view
}

fn row(incident: &Incident, ctx: &PageContext<'_>) -> Vec<String> {
    let location = incident
        .location
        .as_ref()
        .map(|l| {
            l.address
                .clone()
                .unwrap_or_else(|| format!("{:.4}, {:.4}", l.latitude, l.longitude))
        })
        .unwrap_or_else(|| "-".to_string());

    vec![
        incident.id.clone(),
        incident.title.clone(),
        incident.category.label().to_string(),
        incident.priority.label().to_string(),
        incident.status.label().to_string(),
        location,
        ago(incident.created_at, ctx.now),
    ]
}

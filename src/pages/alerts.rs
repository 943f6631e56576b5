use super::{ago, PageContext, Section, View};
use crate::models::alert::sample_alerts;

pub fn render(ctx: &PageContext<'_>) -> View {
    let mut view = View::new("Safety Alerts").subtitle("Broadcast and manage public safety notifications");
    let alerts = sample_alerts(ctx.now);

    let active = alerts.iter().filter(|a| a.is_live(ctx.now)).count();
    view.push(Section::stats([("Active", active), ("Total", alerts.len())]));

    let rows = alerts
        .iter()
        .map(|a| {
            vec![
                a.alert_type.label().to_string(),
                a.title.clone(),
                a.scope.as_str().to_string(),
                a.affected_areas.join(", "),
                if a.is_live(ctx.now) { "Active" } else { "Inactive" }.to_string(),
                ago(Some(a.created_at), ctx.now),
            ]
        })
        .collect();

    view.push(Section::table(
        "All Safety Alerts",
        &["Type", "Title", "Scope", "Affected Areas", "Status", "Created"],
        rows,
        "No safety alerts",
    ));
    view
}

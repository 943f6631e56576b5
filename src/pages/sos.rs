use super::{ago, or_error, PageContext, Section, View};
use crate::models::{SosAlert, SosStatus};

/// Headline counts for the live operations page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SosCounts {
    pub active: usize,
    pub acknowledged: usize,
    pub total: usize,
}

impl SosCounts {
    pub fn from_alerts(alerts: &[SosAlert]) -> Self {
        Self {
            active: alerts.iter().filter(|a| a.status == SosStatus::Active).count(),
            acknowledged: alerts.iter().filter(|a| a.status == SosStatus::Acknowledged).count(),
            total: alerts.len(),
        }
    }
}

pub async fn render(ctx: &PageContext<'_>) -> View {
    let mut view = View::new("Live SOS").subtitle("Real-time emergency monitoring");

    let result = ctx.sos.list().await;
    let alerts = or_error(&mut view, result);
    let counts = SosCounts::from_alerts(&alerts);

    view.push(Section::stats([
        ("Active", counts.active),
        ("Acknowledged", counts.acknowledged),
        ("Total", counts.total),
    ]));

    let rows = alerts
        .iter()
        .map(|a| {
            vec![
                a.id.clone(),
                a.user_name.clone(),
                a.status.as_str().to_string(),
                a.message.clone().unwrap_or_default(),
                a.location
                    .as_ref()
                    .map(|l| format!("{:.4}, {:.4}", l.latitude, l.longitude))
                    .unwrap_or_else(|| "-".to_string()),
                ago(a.timestamp, ctx.now),
            ]
        })
        .collect();

    view.push(Section::table(
        "SOS Alerts",
        &["ID", "Caller", "Status", "Message", "Location", "Raised"],
        rows,
        "No SOS alerts",
    ));
    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn counts_by_status() {
        let alerts: Vec<SosAlert> = serde_json::from_value(json!([
            {"id": 1, "status": "active"},
            {"id": 2, "status": "acknowledged"},
            {"id": 3, "status": "resolved"},
            {"id": 4, "status": "active"}
        ]))
        .unwrap();
        assert_eq!(
            SosCounts::from_alerts(&alerts),
            SosCounts { active: 2, acknowledged: 1, total: 4 }
        );
    }
}

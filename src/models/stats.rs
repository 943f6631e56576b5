use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Incident, IncidentCategory, IncidentStatus, SosAlert, SosStatus};

/// Headline numbers for the dashboard, derived from the incident and SOS lists
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    pub active_incidents: usize,
    pub active_sos: usize,
    pub resolved_today: usize,
    /// Mean minutes from SOS raised to acknowledged, over alerts that carry both
    pub average_response_minutes: Option<f64>,
    pub incidents_by_category: BTreeMap<IncidentCategory, usize>,
    pub incidents_by_status: BTreeMap<IncidentStatus, usize>,
}

impl DashboardStats {
    pub fn compute(incidents: &[Incident], alerts: &[SosAlert], now: DateTime<Utc>) -> Self {
        let mut stats = DashboardStats {
            active_incidents: incidents.iter().filter(|i| i.is_open()).count(),
            active_sos: alerts.iter().filter(|a| a.status == SosStatus::Active).count(),
            ..DashboardStats::default()
        };

        let today = now.date_naive();
        for incident in incidents {
            *stats.incidents_by_category.entry(incident.category).or_default() += 1;
            *stats.incidents_by_status.entry(incident.status).or_default() += 1;

            if incident.status == IncidentStatus::Resolved {
                let resolved_on = incident.resolved_at.or(incident.updated_at).map(|t| t.date_naive());
                if resolved_on == Some(today) {
                    stats.resolved_today += 1;
                }
            }
        }

        let response_minutes: Vec<f64> = alerts
            .iter()
            .filter_map(|a| match (a.timestamp, a.acknowledged_at) {
                (Some(raised), Some(acked)) if acked >= raised => {
                    Some((acked - raised).num_seconds() as f64 / 60.0)
                }
                _ => None,
            })
            .collect();

        if !response_minutes.is_empty() {
            stats.average_response_minutes =
                Some(response_minutes.iter().sum::<f64>() / response_minutes.len() as f64);
        }

        stats
    }
}

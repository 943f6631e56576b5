use serde::Serialize;

use super::{or_error, PageContext, Section, View};
use crate::constants::MAP_CONFIG;
use crate::models::{GeoLocation, Incident, SosAlert, SosStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    Sos,
    Incident,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub kind: MarkerKind,
    pub id: String,
    pub label: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Marker {
    fn at(kind: MarkerKind, id: &str, label: String, location: &GeoLocation) -> Self {
        Self {
            kind,
            id: id.to_string(),
            label,
            latitude: location.latitude,
            longitude: location.longitude,
        }
    }
}

/// Markers for active SOS alerts and open incidents that carry a location
pub fn markers(incidents: &[Incident], alerts: &[SosAlert]) -> Vec<Marker> {
    let sos = alerts
        .iter()
        .filter(|a| a.status == SosStatus::Active)
        .filter_map(|a| {
            let location = a.location.as_ref()?;
            Some(Marker::at(MarkerKind::Sos, &a.id, a.user_name.clone(), location))
        });

    let open = incidents.iter().filter(|i| i.is_open()).filter_map(|i| {
        let location = i.location.as_ref()?;
        Some(Marker::at(MarkerKind::Incident, &i.id, i.title.clone(), location))
    });

    sos.chain(open).collect()
}

pub async fn render(ctx: &PageContext<'_>) -> View {
    let mut view = View::new("Map View").subtitle("Geographic visualization");

    let (incidents, alerts) = futures::join!(ctx.incidents.list(), ctx.sos.active());
    let incidents = or_error(&mut view, incidents);
    let alerts = or_error(&mut view, alerts);

    let markers = markers(&incidents, &alerts);
    let sos_count = markers.iter().filter(|m| m.kind == MarkerKind::Sos).count();

    view.push(Section::stats([
        ("Center", format!("{}, {}", MAP_CONFIG.center_lat, MAP_CONFIG.center_lng)),
        ("Zoom", MAP_CONFIG.zoom.to_string()),
        ("Active SOS", sos_count.to_string()),
        ("Incidents", (markers.len() - sos_count).to_string()),
    ]));

    let rows = markers
        .iter()
        .map(|m| {
            vec![
                match m.kind {
                    MarkerKind::Sos => "SOS".to_string(),
                    MarkerKind::Incident => "Incident".to_string(),
                },
                m.id.clone(),
                m.label.clone(),
                format!("{:.5}", m.latitude),
                format!("{:.5}", m.longitude),
            ]
        })
        .collect();

    view.push(Section::table(
        "Markers",
        &["Kind", "ID", "Label", "Lat", "Lng"],
        rows,
        "Nothing to plot",
    ));
    view
}

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    Warning,
    Danger,
    Info,
    AllClear,
}

impl AlertType {
    pub fn label(&self) -> &'static str {
        match self {
            AlertType::Warning => "warning",
            AlertType::Danger => "danger",
            AlertType::Info => "info",
            AlertType::AllClear => "all clear",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertScope {
    Local,
    Regional,
    National,
}

impl AlertScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertScope::Local => "local",
            AlertScope::Regional => "regional",
            AlertScope::National => "national",
        }
    }
}

/// Public safety broadcast shown on the alerts page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyAlert {
    pub id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub scope: AlertScope,
    pub affected_areas: Vec<String>,
    pub is_active: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl SafetyAlert {
    /// Active and not past its expiry at `now`
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.expires_at.map_or(true, |at| at > now)
    }
}

/// There is no broadcast endpoint yet; the page shows this fixed set.
pub fn sample_alerts(now: DateTime<Utc>) -> Vec<SafetyAlert> {
    vec![
        SafetyAlert {
            id: "1".into(),
            title: "Typhoon Warning - Signal #2".into(),
            message: "Tropical storm approaching Metro Manila. Expect heavy rainfall and strong winds.".into(),
            alert_type: AlertType::Warning,
            scope: AlertScope::Regional,
            affected_areas: vec!["Metro Manila".into(), "Cavite".into(), "Laguna".into()],
            is_active: true,
            created_by: "admin-1".into(),
            created_at: now - Duration::minutes(30),
            expires_at: Some(now + Duration::hours(24)),
        },
        SafetyAlert {
            id: "2".into(),
            title: "Road Closure - EDSA Northbound".into(),
            message: "Construction work in progress. Expect heavy traffic.".into(),
            alert_type: AlertType::Info,
            scope: AlertScope::Local,
            affected_areas: vec!["Quezon City".into()],
            is_active: true,
            created_by: "admin-2".into(),
            created_at: now - Duration::hours(2),
            expires_at: None,
        },
        SafetyAlert {
            id: "3".into(),
            title: "Fire Incident Resolved - Tondo".into(),
            message: "Fire has been extinguished. Residents may return.".into(),
            alert_type: AlertType::AllClear,
            scope: AlertScope::Local,
            affected_areas: vec!["Tondo, Manila".into()],
            is_active: false,
            created_by: "admin-1".into(),
            created_at: now - Duration::hours(5),
            expires_at: None,
        },
    ]
}

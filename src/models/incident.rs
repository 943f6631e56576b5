use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    #[default]
    Pending,
    Dispatched,
    InProgress,
    Resolved,
    Closed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentPriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentCategory {
    MedicalEmergency,
    Fire,
    Crime,
    TrafficAccident,
    NaturalDisaster,
    PublicDisturbance,
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    #[serde(alias = "lat")]
    pub latitude: f64,
    #[serde(alias = "lng", alias = "lon")]
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    #[serde(deserialize_with = "super::flexible_id::deserialize")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: IncidentCategory,
    #[serde(default)]
    pub priority: IncidentPriority,
    #[serde(default)]
    pub status: IncidentStatus,
    #[serde(default)]
    pub location: Option<GeoLocation>,
    #[serde(default, alias = "created_at")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "updated_at")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "resolved_at", skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Body of `PATCH /admin/incidents/:id`; unset fields are left untouched server-side
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IncidentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<IncidentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<IncidentPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl IncidentUpdate {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.priority.is_none() && self.notes.is_none()
    }
}

impl Incident {
    /// Still needs attention: neither resolved nor closed
    pub fn is_open(&self) -> bool {
        !matches!(self.status, IncidentStatus::Resolved | IncidentStatus::Closed)
    }
}

impl IncidentStatus {
    pub const ALL: [IncidentStatus; 5] = [
        IncidentStatus::Pending,
        IncidentStatus::Dispatched,
        IncidentStatus::InProgress,
        IncidentStatus::Resolved,
        IncidentStatus::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentStatus::Pending => "pending",
            IncidentStatus::Dispatched => "dispatched",
            IncidentStatus::InProgress => "in_progress",
            IncidentStatus::Resolved => "resolved",
            IncidentStatus::Closed => "closed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            IncidentStatus::Pending => "Pending",
            IncidentStatus::Dispatched => "Dispatched",
            IncidentStatus::InProgress => "In Progress",
            IncidentStatus::Resolved => "Resolved",
            IncidentStatus::Closed => "Closed",
        }
    }
}

impl IncidentPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentPriority::Low => "low",
            IncidentPriority::Medium => "medium",
            IncidentPriority::High => "high",
            IncidentPriority::Critical => "critical",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            IncidentPriority::Low => "Low",
            IncidentPriority::Medium => "Medium",
            IncidentPriority::High => "High",
            IncidentPriority::Critical => "Critical",
        }
    }
}

impl IncidentCategory {
    pub const ALL: [IncidentCategory; 7] = [
        IncidentCategory::MedicalEmergency,
        IncidentCategory::Fire,
        IncidentCategory::Crime,
        IncidentCategory::TrafficAccident,
        IncidentCategory::NaturalDisaster,
        IncidentCategory::PublicDisturbance,
        IncidentCategory::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            IncidentCategory::MedicalEmergency => "Medical Emergency",
            IncidentCategory::Fire => "Fire",
            IncidentCategory::Crime => "Crime",
            IncidentCategory::TrafficAccident => "Traffic Accident",
            IncidentCategory::NaturalDisaster => "Natural Disaster",
            IncidentCategory::PublicDisturbance => "Public Disturbance",
            IncidentCategory::Other => "Other",
        }
    }
}

impl fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IncidentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IncidentStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown incident status '{}'", s))
    }
}

impl FromStr for IncidentPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(IncidentPriority::Low),
            "medium" => Ok(IncidentPriority::Medium),
            "high" => Ok(IncidentPriority::High),
            "critical" => Ok(IncidentPriority::Critical),
            other => Err(format!("unknown incident priority '{}'", other)),
        }
    }
}

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::GeoLocation;

/// Lifecycle of an SOS alert; transitions only move forward
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SosStatus {
    #[default]
    Active,
    Acknowledged,
    Responding,
    Resolved,
}

impl SosStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SosStatus::Active => "active",
            SosStatus::Acknowledged => "acknowledged",
            SosStatus::Responding => "responding",
            SosStatus::Resolved => "resolved",
        }
    }

    pub fn can_transition_to(&self, next: SosStatus) -> bool {
        next > *self
    }
}

impl fmt::Display for SosStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SosStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(SosStatus::Active),
            "acknowledged" => Ok(SosStatus::Acknowledged),
            "responding" => Ok(SosStatus::Responding),
            "resolved" => Ok(SosStatus::Resolved),
            other => Err(format!("unknown SOS status '{}'", other)),
        }
    }
}

/// Operator action on an alert, one per backend transition endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SosAction {
    Acknowledge,
    Dispatch,
    MarkSafe,
}

impl SosAction {
    /// Final path segment of `PATCH /admin/sos/:id/<segment>`
    pub fn path_segment(&self) -> &'static str {
        match self {
            SosAction::Acknowledge => "acknowledge",
            SosAction::Dispatch => "dispatch",
            SosAction::MarkSafe => "safe",
        }
    }

    pub fn target_status(&self) -> SosStatus {
        match self {
            SosAction::Acknowledge => SosStatus::Acknowledged,
            SosAction::Dispatch => SosStatus::Responding,
            SosAction::MarkSafe => SosStatus::Resolved,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SosAlert {
    #[serde(deserialize_with = "super::flexible_id::deserialize")]
    pub id: String,
    #[serde(default, alias = "user_id", deserialize_with = "super::flexible_id::deserialize_option")]
    pub user_id: Option<String>,
    #[serde(default, alias = "user_name")]
    pub user_name: String,
    #[serde(default, alias = "user_phone", skip_serializing_if = "Option::is_none")]
    pub user_phone: Option<String>,
    #[serde(default)]
    pub location: Option<GeoLocation>,
    #[serde(default)]
    pub status: SosStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, alias = "created_at")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(
        default,
        alias = "acknowledged_by",
        deserialize_with = "super::flexible_id::deserialize_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub acknowledged_by: Option<String>,
    #[serde(default, alias = "acknowledged_at", skip_serializing_if = "Option::is_none")]
    pub acknowledged_at: Option<DateTime<Utc>>,
}

impl SosAlert {
    /// Whether `action` moves this alert forward
    pub fn accepts(&self, action: SosAction) -> bool {
        self.status.can_transition_to(action.target_status())
    }
}

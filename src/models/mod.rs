pub mod alert;
pub mod incident;
pub mod personnel;
pub mod sos;
pub mod stats;

pub use alert::{AlertScope, AlertType, SafetyAlert};
pub use incident::{GeoLocation, Incident, IncidentCategory, IncidentPriority, IncidentStatus, IncidentUpdate};
pub use personnel::{Personnel, Role};
pub use sos::{SosAction, SosAlert, SosStatus};
pub use stats::DashboardStats;

/// Backend ids arrive as strings or numbers depending on the table
pub(crate) mod flexible_id {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(serde::de::Error::custom(format!("invalid id: {}", other))),
        }
    }

    pub fn deserialize_option<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(other) => Err(serde::de::Error::custom(format!("invalid id: {}", other))),
        }
    }
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Supervisor,
    Dispatcher,
    Personnel,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Supervisor => "supervisor",
            Role::Dispatcher => "dispatcher",
            Role::Personnel => "personnel",
            Role::Unknown => "unknown",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Supervisor => "Supervisor",
            Role::Dispatcher => "Dispatcher",
            Role::Personnel => "Personnel",
            Role::Unknown => "Unknown",
        }
    }
}

/// Admin or personnel account as listed by `/admin/admins` and `/admin/users`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Personnel {
    #[serde(deserialize_with = "super::flexible_id::deserialize")]
    pub id: String,
    #[serde(default, alias = "fullName", alias = "displayName", alias = "name")]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl Personnel {
    /// Case-insensitive match against email or full name; an empty query matches everyone
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.email.to_lowercase().contains(&query) || self.full_name.to_lowercase().contains(&query)
    }

    pub fn initials(&self) -> String {
        self.full_name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .collect()
    }
}

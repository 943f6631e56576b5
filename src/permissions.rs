use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Named capability granted to a principal by the backend.
///
/// Known capabilities are variants so call sites cannot misspell them;
/// anything else the backend sends is kept as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Permission {
    ManageUsers,
    ManageAdmins,
    ManageIncidents,
    ViewIncidents,
    Other(String),
}

impl Permission {
    pub fn as_str(&self) -> &str {
        match self {
            Permission::ManageUsers => "manage_users",
            Permission::ManageAdmins => "manage_admins",
            Permission::ManageIncidents => "manage_incidents",
            Permission::ViewIncidents => "view_incidents",
            Permission::Other(name) => name,
        }
    }
}

impl From<&str> for Permission {
    fn from(s: &str) -> Self {
        match s {
            "manage_users" => Permission::ManageUsers,
            "manage_admins" => Permission::ManageAdmins,
            "manage_incidents" => Permission::ManageIncidents,
            "view_incidents" => Permission::ViewIncidents,
            other => Permission::Other(other.to_string()),
        }
    }
}

impl FromStr for Permission {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Permission::from(s))
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Permission {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Permission {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Permission::from(raw.as_str()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(HashSet<Permission>);

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, permission: &Permission) -> bool {
        self.0.contains(permission)
    }

    /// At least one of `permissions` is granted; false for an empty query
    pub fn contains_any(&self, permissions: &[Permission]) -> bool {
        !permissions.is_empty() && permissions.iter().any(|p| self.contains(p))
    }

    /// Every one of `permissions` is granted; false for an empty query
    pub fn contains_all(&self, permissions: &[Permission]) -> bool {
        !permissions.is_empty() && permissions.iter().all(|p| self.contains(p))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Permission> {
        self.0.iter()
    }

    /// Names in stable order, for display
    pub fn sorted_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.0.iter().map(|p| p.as_str().to_string()).collect();
        names.sort();
        names
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> FromIterator<&'a str> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter().map(Permission::from).collect()
    }
}

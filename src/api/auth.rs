use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ClientError, ClientResult};
use crate::http::HttpClient;
use crate::session::MeResponse;

pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Role requested at signup; the backend decides what it actually grants
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignupRole {
    Admin,
    #[default]
    Personnel,
}

impl FromStr for SignupRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(SignupRole::Admin),
            "personnel" => Ok(SignupRole::Personnel),
            other => Err(format!("unknown role '{}' (expected admin or personnel)", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub role: SignupRole,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub admin: Option<Value>,
    pub token: String,
}

impl LoginRequest {
    pub fn new(email: &str, password: &str) -> ClientResult<Self> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(ClientError::validation("Email and password are required."));
        }

        Ok(Self {
            email: email.to_string(),
            password: password.to_string(),
        })
    }
}

impl SignupRequest {
    pub fn new(full_name: &str, email: &str, password: &str, role: SignupRole) -> ClientResult<Self> {
        let full_name = full_name.trim();
        let email = email.trim();

        if full_name.is_empty() || email.is_empty() {
            return Err(ClientError::validation("Full name and email are required."));
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ClientError::validation("Password must be at least 8 characters."));
        }

        Ok(Self {
            full_name: full_name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role,
        })
    }
}

/// Token acquisition and identity endpoints. Not cached.
#[derive(Clone)]
pub struct AuthApi {
    http: Arc<HttpClient>,
}

impl AuthApi {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    pub async fn login(&self, request: &LoginRequest) -> ClientResult<AuthResponse> {
        self.http.post("/admin/auth/login", request).await?.decode()
    }

    pub async fn signup(&self, request: &SignupRequest) -> ClientResult<AuthResponse> {
        self.http.post("/admin/auth/signup", request).await?.decode()
    }

    /// Current principal and permission names
    pub async fn me(&self) -> ClientResult<MeResponse> {
        self.http.get_json("/admin/me").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_requires_both_fields() {
        assert!(LoginRequest::new("  ", "secret").is_err());
        assert!(LoginRequest::new("ops@beacon.ph", "").is_err());
        assert_eq!(LoginRequest::new(" ops@beacon.ph ", "x").unwrap().email, "ops@beacon.ph");
    }

    #[test]
    fn signup_enforces_password_length() {
        let err = SignupRequest::new("Ana Reyes", "ana@beacon.ph", "short", SignupRole::Personnel).unwrap_err();
        assert_eq!(err.to_string(), "Password must be at least 8 characters.");

        let ok = SignupRequest::new(" Ana Reyes ", "ana@beacon.ph", "longenough", SignupRole::Admin).unwrap();
        assert_eq!(ok.full_name, "Ana Reyes");
        assert_eq!(serde_json::to_value(&ok).unwrap()["role"], "admin");
    }
}

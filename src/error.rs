// Client error types
use serde_json::{json, Value};
use thiserror::Error;

/// Failure of a console request, surfaced to pages as a typed value
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    // 408 (synthetic) - deadline passed before the response completed
    #[error("Request timeout ({timeout_ms}ms)")]
    Timeout { timeout_ms: u64 },

    // 0 (synthetic) - the request never produced a response
    #[error("Network error: {0}")]
    Network(String),

    // Server responded with a non-2xx status
    #[error("{message}")]
    Http {
        status: u16,
        message: String,
        body: Option<Value>,
    },

    // Authenticated call attempted without a stored token
    #[error("No session token")]
    NoToken,

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Token storage error: {0}")]
    Storage(String),

    // Rejected locally before any request was made
    #[error("{0}")]
    Validation(String),
}

impl ClientError {
    /// Build an HTTP error from a status and its parsed body.
    /// The message is the body's `message` field when present, otherwise `HTTP <status>`.
    pub fn http(status: u16, body: Option<Value>) -> Self {
        let message = body
            .as_ref()
            .and_then(|b| b.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {}", status));

        ClientError::Http { status, message, body }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ClientError::Validation(message.into())
    }

    /// Status code in the same numbering the console has always shown:
    /// real HTTP status, 408 for timeouts, 0 for network failures.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ClientError::Timeout { .. } => Some(408),
            ClientError::Network(_) => Some(0),
            ClientError::Http { status, .. } => Some(*status),
            ClientError::NoToken => Some(401),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Http { status: 401, .. } | ClientError::NoToken)
    }

    /// Worth another attempt: the failure is transient rather than a rejection
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Timeout { .. } | ClientError::Network(_) => true,
            ClientError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ClientError::Timeout { .. } => "TIMEOUT",
            ClientError::Network(_) => "NETWORK_ERROR",
            ClientError::Http { status: 401, .. } => "UNAUTHORIZED",
            ClientError::Http { status: 403, .. } => "FORBIDDEN",
            ClientError::Http { status: 404, .. } => "NOT_FOUND",
            ClientError::Http { status, .. } if *status >= 500 => "SERVER_ERROR",
            ClientError::Http { .. } => "HTTP_ERROR",
            ClientError::NoToken => "NO_TOKEN",
            ClientError::Decode(_) => "INVALID_RESPONSE",
            ClientError::InvalidUrl(_) => "INVALID_URL",
            ClientError::Storage(_) => "STORAGE_ERROR",
            ClientError::Validation(_) => "VALIDATION_ERROR",
        }
    }

    pub fn to_json(&self) -> Value {
        let mut response = json!({
            "error": true,
            "message": self.to_string(),
            "code": self.error_code(),
        });

        if let Some(status) = self.status_code() {
            response["status"] = json!(status);
        }
        if let ClientError::Http { body: Some(body), .. } = self {
            response["body"] = body.clone();
        }

        response
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidUrl(err.to_string())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub retry: RetryConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout_ms: u64,
    /// Paths under this prefix carry the bearer token
    pub auth_prefix: String,
    /// Paths under this prefix are token acquisition endpoints and never carry one
    pub public_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub config_dir: Option<PathBuf>,
    pub token_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub default_filter: String,
    pub log_responses: bool,
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Sign-in endpoints live at `<auth_prefix>/auth/`
    pub fn public_prefix_for(auth_prefix: &str) -> String {
        format!("{}/auth/", auth_prefix.trim_end_matches('/'))
    }
}

impl ConsoleConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("BEACON_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    /// Development preset pointed at a specific backend, used by tests and embedders
    pub fn for_base_url(base_url: impl Into<String>) -> Self {
        let mut config = Self::development();
        config.api.base_url = base_url.into();
        config
    }

    fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| env::var(name).ok())
    }

    /// Apply `BEACON_*` overrides read through `lookup`
    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        // API overrides
        if let Some(v) = lookup("BEACON_API_BASE_URL") {
            if !v.trim().is_empty() {
                self.api.base_url = v.trim().to_string();
            }
        }
        if let Some(v) = lookup("BEACON_REQUEST_TIMEOUT_MS") {
            self.api.request_timeout_ms = v.parse().unwrap_or(self.api.request_timeout_ms);
        }
        if let Some(v) = lookup("BEACON_AUTH_PREFIX") {
            self.api.public_prefix = ApiConfig::public_prefix_for(&v);
            self.api.auth_prefix = v;
        }
        if let Some(v) = lookup("BEACON_PUBLIC_PREFIX") {
            self.api.public_prefix = v;
        }

        // Retry overrides
        if let Some(v) = lookup("BEACON_RETRY_COUNT") {
            self.retry.retries = v.parse().unwrap_or(self.retry.retries);
        }
        if let Some(v) = lookup("BEACON_RETRY_BASE_MS") {
            self.retry.base_delay_ms = v.parse().unwrap_or(self.retry.base_delay_ms);
        }
        if let Some(v) = lookup("BEACON_RETRY_MAX_MS") {
            self.retry.max_delay_ms = v.parse().unwrap_or(self.retry.max_delay_ms);
        }

        // Storage overrides
        if let Some(v) = lookup("BEACON_CONFIG_DIR") {
            self.storage.config_dir = Some(PathBuf::from(v));
        }

        // Logging overrides
        if let Some(v) = lookup("BEACON_LOG_RESPONSES") {
            self.logging.log_responses = v.parse().unwrap_or(self.logging.log_responses);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig::default(),
            retry: RetryConfig::default(),
            storage: StorageConfig::default(),
            logging: LoggingConfig {
                default_filter: "beacon_console=debug,beacon=debug".to_string(),
                log_responses: true,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            logging: LoggingConfig {
                default_filter: "beacon_console=info,beacon=info".to_string(),
                log_responses: true,
            },
            ..Self::development()
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            logging: LoggingConfig {
                default_filter: "info".to_string(),
                log_responses: false,
            },
            ..Self::development()
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            request_timeout_ms: 10_000,
            auth_prefix: "/admin".to_string(),
            public_prefix: Self::public_prefix_for("/admin"),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            retries: 2,
            base_delay_ms: 1_000,
            max_delay_ms: 30_000,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            config_dir: None,
            token_key: "admin_token".to_string(),
        }
    }
}

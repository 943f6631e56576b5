pub mod body;

pub use body::ResponseBody;

use std::sync::{Arc, RwLock, Weak};
use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::config::ApiConfig;
use crate::error::{ClientError, ClientResult};
use crate::storage::TokenStore;

/// Notified when any request comes back 401.
/// The token has already been cleared by the time this runs.
pub trait UnauthorizedObserver: Send + Sync {
    fn on_unauthorized(&self);
}

/// Single entry point for every backend call the console makes
pub struct HttpClient {
    inner: reqwest::Client,
    base_url: Url,
    timeout: Duration,
    auth_prefix: String,
    public_prefix: String,
    log_responses: bool,
    tokens: Arc<dyn TokenStore>,
    observers: RwLock<Vec<Weak<dyn UnauthorizedObserver>>>,
}

impl HttpClient {
    pub fn new(api: &ApiConfig, tokens: Arc<dyn TokenStore>) -> ClientResult<Self> {
        let base_url = Url::parse(api.base_url.trim_end_matches('/'))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(api.base_url.clone()));
        }

        let inner = reqwest::Client::builder()
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Ok(Self {
            inner,
            base_url,
            timeout: api.request_timeout(),
            auth_prefix: api.auth_prefix.clone(),
            public_prefix: api.public_prefix.clone(),
            log_responses: false,
            tokens,
            observers: RwLock::new(Vec::new()),
        })
    }

    pub fn with_response_logging(mut self, enabled: bool) -> Self {
        self.log_responses = enabled;
        self
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn register_observer(&self, observer: Weak<dyn UnauthorizedObserver>) {
        if let Ok(mut observers) = self.observers.write() {
            observers.retain(|o| o.strong_count() > 0);
            observers.push(observer);
        }
    }

    /// Absolute URL for a path relative to the configured base
    pub fn endpoint(&self, path: &str) -> ClientResult<Url> {
        let joined = format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path);
        Ok(Url::parse(&joined)?)
    }

    fn is_authenticated_path(&self, path: &str) -> bool {
        path.starts_with(&self.auth_prefix) && !path.starts_with(&self.public_prefix)
    }

    pub async fn get(&self, path: &str) -> ClientResult<ResponseBody> {
        self.request(Method::GET, path, None).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ClientResult<ResponseBody> {
        let body = to_value(body)?;
        self.request(Method::POST, path, Some(&body)).await
    }

    pub async fn patch<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ClientResult<ResponseBody> {
        let body = to_value(body)?;
        self.request(Method::PATCH, path, Some(&body)).await
    }

    pub async fn delete(&self, path: &str) -> ClientResult<ResponseBody> {
        self.request(Method::DELETE, path, None).await
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.get(path).await?.decode()
    }

    /// Perform one request.
    ///
    /// Authenticated-namespace paths require a stored token and carry it as a
    /// bearer header. A 401 clears the token and notifies observers before the
    /// error is returned.
    pub async fn request(&self, method: Method, path: &str, body: Option<&Value>) -> ClientResult<ResponseBody> {
        let url = self.endpoint(path)?;

        let mut builder = self
            .inner
            .request(method.clone(), url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .timeout(self.timeout);

        if self.is_authenticated_path(path) {
            match self.tokens.load()? {
                Some(token) => builder = builder.bearer_auth(token),
                None => {
                    tracing::warn!("[API] {} {} attempted without a session token", method, path);
                    return Err(ClientError::NoToken);
                }
            }
        }

        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| self.classify(e))?;
        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.contains("application/json"))
            .unwrap_or(false);

        let text = response.text().await.map_err(|e| self.classify(e))?;

        let parsed = if is_json && !text.is_empty() {
            match serde_json::from_str::<Value>(&text) {
                Ok(value) => ResponseBody::Json(value),
                Err(e) if status.is_success() => {
                    return Err(self.fail(method, path, ClientError::Decode(e.to_string())));
                }
                Err(_) => ResponseBody::from_text(text),
            }
        } else {
            ResponseBody::from_text(text)
        };

        if !status.is_success() {
            let err = ClientError::http(status.as_u16(), parsed.into_error_body());
            return Err(self.fail(method, path, err));
        }

        if self.log_responses {
            tracing::debug!("[API] {} {} -> {}", method, path, status);
        }

        Ok(parsed)
    }

    fn classify(&self, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            ClientError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else {
            ClientError::from(err)
        }
    }

    fn fail(&self, method: Method, path: &str, err: ClientError) -> ClientError {
        tracing::warn!("[API Error] {} {} ({}): {}", method, path, err.error_code(), err);

        if matches!(err, ClientError::Http { status: 401, .. }) {
            if let Err(e) = self.tokens.clear() {
                tracing::error!("Failed to clear token after 401: {}", e);
            }
            self.notify_unauthorized();
        }

        err
    }

    fn notify_unauthorized(&self) {
        let observers: Vec<Arc<dyn UnauthorizedObserver>> = match self.observers.read() {
            Ok(observers) => observers.iter().filter_map(Weak::upgrade).collect(),
            Err(_) => return,
        };

        for observer in observers {
            observer.on_unauthorized();
        }
    }
}

fn to_value<B: Serialize + ?Sized>(body: &B) -> ClientResult<Value> {
    serde_json::to_value(body).map_err(|e| ClientError::Decode(e.to_string()))
}

use std::sync::Arc;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::cache::{CachePolicy, QueryCache, QueryKey};
use crate::error::{ClientError, ClientResult};
use crate::http::{HttpClient, ResponseBody};
use crate::retry::{retry_with, RetryPolicy};

/// One cacheable read: where to fetch it, how long it stays fresh, whether it retries
#[derive(Debug, Clone)]
pub struct QuerySpec {
    pub key: QueryKey,
    pub path: String,
    pub policy: CachePolicy,
    pub retry: bool,
}

impl QuerySpec {
    pub fn new(key: QueryKey, path: impl Into<String>, policy: CachePolicy) -> Self {
        Self {
            key,
            path: path.into(),
            policy,
            retry: false,
        }
    }

    pub fn with_retry(mut self) -> Self {
        self.retry = true;
        self
    }
}

/// What a page sees of a query: still loading, failed, or data
#[derive(Debug, Clone)]
pub enum QueryState<T> {
    Loading,
    Error(ClientError),
    Ready(T),
}

impl<T> QueryState<T> {
    pub fn from_result(result: ClientResult<T>) -> Self {
        match result {
            Ok(data) => QueryState::Ready(data),
            Err(err) => QueryState::Error(err),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, QueryState::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            QueryState::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ClientError> {
        match self {
            QueryState::Error(err) => Some(err),
            _ => None,
        }
    }
}

/// HTTP client plus response cache, shared by every data hook
pub struct QueryClient {
    http: Arc<HttpClient>,
    cache: QueryCache,
    retry: RetryPolicy,
}

impl QueryClient {
    pub fn new(http: Arc<HttpClient>, retry: RetryPolicy) -> Self {
        Self {
            http,
            cache: QueryCache::new(),
            retry,
        }
    }

    pub fn http(&self) -> &Arc<HttpClient> {
        &self.http
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// Serve from cache when fresh, otherwise fetch (retrying when `spec.retry` is set) and store
    pub async fn fetch_value(&self, spec: &QuerySpec) -> ClientResult<Value> {
        let collected = self.cache.collect_garbage();
        if collected > 0 {
            tracing::trace!("Collected {} expired cache entries", collected);
        }

        if let Some(value) = self.cache.get_fresh(&spec.key) {
            tracing::trace!("Cache hit for '{}'", spec.key);
            return Ok(value);
        }

        let ticket = self.cache.begin_fetch(&spec.key);
        let policy = if spec.retry { self.retry } else { RetryPolicy::none() };
        let label = spec.key.to_string();

        let body = retry_with(&policy, &label, || self.http.get(&spec.path)).await?;
        let value = body.into_value();

        self.cache.complete(ticket, value.clone(), spec.policy);
        Ok(value)
    }

    pub async fn fetch<T: DeserializeOwned>(&self, spec: &QuerySpec) -> ClientResult<T> {
        let value = self.fetch_value(spec).await?;
        serde_json::from_value(value).map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// Like `fetch`, with a null body meaning an empty list
    pub async fn fetch_list<T: DeserializeOwned>(&self, spec: &QuerySpec) -> ClientResult<Vec<T>> {
        match self.fetch_value(spec).await? {
            Value::Null => Ok(Vec::new()),
            value => serde_json::from_value(value).map_err(|e| ClientError::Decode(e.to_string())),
        }
    }

    /// Send a write, and only once the server confirms it mark `invalidates` stale
    pub async fn mutate<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        invalidates: &[QueryKey],
    ) -> ClientResult<ResponseBody> {
        let body = serde_json::to_value(body).map_err(|e| ClientError::Decode(e.to_string()))?;
        let response = self.http.request(method, path, Some(&body)).await?;

        for key in invalidates {
            self.cache.invalidate(key);
        }

        Ok(response)
    }
}

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, Stream};
use reqwest::Method;
use serde_json::{json, Value};

use super::incidents::require_id;
use super::{SOS_DETAIL_POLICY, SOS_LIST_POLICY};
use crate::cache::QueryKey;
use crate::error::{ClientError, ClientResult};
use crate::models::{SosAction, SosAlert};
use crate::query::{QueryClient, QuerySpec};

const ROOT: &str = "sos-alerts";

/// Poll period of the live active-alert feed
pub const ACTIVE_REFRESH_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct SosApi {
    client: Arc<QueryClient>,
}

impl SosApi {
    pub fn new(client: Arc<QueryClient>) -> Self {
        Self { client }
    }

    pub fn root_key() -> QueryKey {
        QueryKey::root(ROOT)
    }

    pub fn active_key() -> QueryKey {
        Self::root_key().child("active")
    }

    pub fn list_spec() -> QuerySpec {
        QuerySpec::new(Self::root_key(), "/admin/sos", SOS_LIST_POLICY).with_retry()
    }

    pub fn active_spec() -> QuerySpec {
        QuerySpec::new(Self::active_key(), "/admin/sos?status=active", SOS_LIST_POLICY)
    }

    pub fn detail_spec(id: &str) -> QuerySpec {
        QuerySpec::new(Self::root_key().child(id), format!("/admin/sos/{}", id), SOS_DETAIL_POLICY)
    }

    pub async fn list(&self) -> ClientResult<Vec<SosAlert>> {
        self.client.fetch_list(&Self::list_spec()).await
    }

    pub async fn active(&self) -> ClientResult<Vec<SosAlert>> {
        self.client.fetch_list(&Self::active_spec()).await
    }

    pub async fn detail(&self, id: &str) -> ClientResult<SosAlert> {
        let id = require_id(id)?;
        self.client.fetch(&Self::detail_spec(id)).await
    }

    pub async fn acknowledge(&self, id: &str) -> ClientResult<()> {
        self.transition(id, SosAction::Acknowledge, json!({})).await
    }

    pub async fn dispatch(&self, id: &str, responder_id: Option<&str>) -> ClientResult<()> {
        self.transition(id, SosAction::Dispatch, json!({ "responder_id": responder_id }))
            .await
    }

    pub async fn mark_safe(&self, id: &str) -> ClientResult<()> {
        self.transition(id, SosAction::MarkSafe, json!({})).await
    }

    /// Apply an operator action. Invalidation is by prefix, so the full list,
    /// the active list and the alert's detail all refetch on next read.
    async fn transition(&self, id: &str, action: SosAction, body: Value) -> ClientResult<()> {
        let id = require_id(id)?;
        if let Some(alert) = self.cached_alert(id) {
            if !alert.accepts(action) {
                return Err(ClientError::validation(format!(
                    "SOS {} is already {}; cannot {}",
                    id,
                    alert.status,
                    action.path_segment()
                )));
            }
        }

        let path = format!("/admin/sos/{}/{}", id, action.path_segment());
        let invalidates = [Self::root_key(), Self::root_key().child(id)];

        self.client
            .mutate(Method::PATCH, &path, &body, &invalidates)
            .await?;

        tracing::info!("SOS {} -> {}", id, action.target_status());
        Ok(())
    }

    /// Last known copy of an alert, from its detail entry or the full list.
    /// Status only moves forward, so a cached copy is never ahead of the server.
    fn cached_alert(&self, id: &str) -> Option<SosAlert> {
        let cache = self.client.cache();
        if let Some(alert) = cache
            .peek(&Self::root_key().child(id))
            .and_then(|v| serde_json::from_value::<SosAlert>(v).ok())
        {
            return Some(alert);
        }

        cache
            .peek(&Self::root_key())
            .and_then(|v| serde_json::from_value::<Vec<SosAlert>>(v).ok())?
            .into_iter()
            .find(|alert| alert.id == id)
    }

    /// Active alerts, refetched every `interval`. Each tick drops the cached
    /// list first so the feed always reflects the server.
    pub fn watch_active(&self, interval: Duration) -> impl Stream<Item = ClientResult<Vec<SosAlert>>> {
        let api = self.clone();
        stream::unfold((api, true), move |(api, first)| async move {
            if !first {
                tokio::time::sleep(interval).await;
            }
            api.client.cache().invalidate(&Self::active_key());
            let result = api.active().await;
            Some((result, (api, false)))
        })
    }
}

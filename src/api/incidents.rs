use std::sync::Arc;

use reqwest::Method;

use super::{DETAIL_POLICY, LIST_POLICY};
use crate::cache::QueryKey;
use crate::error::{ClientError, ClientResult};
use crate::models::{Incident, IncidentStatus, IncidentUpdate};
use crate::query::{QueryClient, QuerySpec};

const ROOT: &str = "incidents";

#[derive(Clone)]
pub struct IncidentsApi {
    client: Arc<QueryClient>,
}

impl IncidentsApi {
    pub fn new(client: Arc<QueryClient>) -> Self {
        Self { client }
    }

    pub fn root_key() -> QueryKey {
        QueryKey::root(ROOT)
    }

    pub fn list_spec() -> QuerySpec {
        QuerySpec::new(Self::root_key(), "/admin/incidents", LIST_POLICY).with_retry()
    }

    pub fn by_status_spec(status: IncidentStatus) -> QuerySpec {
        QuerySpec::new(
            Self::root_key().child(status.as_str()),
            format!("/admin/incidents?status={}", status.as_str()),
            LIST_POLICY,
        )
    }

    pub fn detail_spec(id: &str) -> QuerySpec {
        QuerySpec::new(
            Self::root_key().child(id),
            format!("/admin/incidents/{}", id),
            DETAIL_POLICY,
        )
    }

    pub async fn list(&self) -> ClientResult<Vec<Incident>> {
        self.client.fetch_list(&Self::list_spec()).await
    }

    pub async fn by_status(&self, status: IncidentStatus) -> ClientResult<Vec<Incident>> {
        self.client.fetch_list(&Self::by_status_spec(status)).await
    }

    pub async fn detail(&self, id: &str) -> ClientResult<Incident> {
        let id = require_id(id)?;
        self.client.fetch(&Self::detail_spec(id)).await
    }

    /// Patch an incident, then mark every incident query stale
    pub async fn update(&self, id: &str, update: &IncidentUpdate) -> ClientResult<Option<Incident>> {
        let id = require_id(id)?;
        if update.is_empty() {
            return Err(ClientError::validation("Nothing to update"));
        }

        let invalidates = [Self::root_key(), Self::root_key().child(id)];
        let response = self
            .client
            .mutate(Method::PATCH, &format!("/admin/incidents/{}", id), update, &invalidates)
            .await?;

        tracing::info!("Incident {} updated", id);

        // The backend may answer with the updated record or with a bare acknowledgement
        Ok(response.decode::<Incident>().ok())
    }
}

pub(crate) fn require_id(id: &str) -> ClientResult<&str> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ClientError::validation("An id is required"));
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_nest_under_incidents() {
        let by_status = IncidentsApi::by_status_spec(IncidentStatus::InProgress);
        assert_eq!(by_status.key.to_string(), "incidents/in_progress");
        assert_eq!(by_status.path, "/admin/incidents?status=in_progress");
        assert!(!by_status.retry);

        let detail = IncidentsApi::detail_spec("42");
        assert!(detail.key.starts_with(&IncidentsApi::root_key()));
        assert!(IncidentsApi::list_spec().retry);
    }

    #[test]
    fn blank_ids_are_rejected() {
        assert!(require_id("  ").is_err());
        assert_eq!(require_id(" 7 ").unwrap(), "7");
    }
}

mod common;

use std::time::Duration;

use anyhow::Result;
use beacon_console::api::SosApi;
use beacon_console::cache::{CachePolicy, QueryKey};
use beacon_console::models::{IncidentStatus, IncidentUpdate, SosStatus};
use beacon_console::query::QuerySpec;
use futures::StreamExt;
use serde_json::Value;

async fn signed_in() -> Result<(common::MockBackend, beacon_console::Console)> {
    let backend = common::spawn_backend().await?;
    let console = common::console(&backend, common::token_store(Some(common::VALID_TOKEN)))?;
    console.mount().await;
    Ok((backend, console))
}

const SHORT: CachePolicy = CachePolicy::new(Duration::from_secs(60), Duration::from_secs(300));

#[tokio::test]
async fn fresh_reads_come_from_cache() -> Result<()> {
    let (backend, console) = signed_in().await?;

    let first = console.incidents().list().await?;
    let second = console.incidents().list().await?;

    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
    assert_eq!(backend.state.hits("GET /admin/incidents"), 1);
    Ok(())
}

#[tokio::test]
async fn acknowledge_refetches_full_and_active_lists() -> Result<()> {
    let (backend, console) = signed_in().await?;
    let sos = console.sos();

    assert_eq!(sos.list().await?.len(), 2);
    assert_eq!(sos.active().await?.len(), 1);
    sos.list().await?;
    sos.active().await?;
    assert_eq!(backend.state.hits("GET /admin/sos"), 1);
    assert_eq!(backend.state.hits("GET /admin/sos?status=active"), 1);

    sos.acknowledge("s1").await?;
    assert_eq!(backend.state.hits("PATCH /admin/sos/s1/acknowledge"), 1);

    let all = sos.list().await?;
    let active = sos.active().await?;

    assert_eq!(backend.state.hits("GET /admin/sos"), 2);
    assert_eq!(backend.state.hits("GET /admin/sos?status=active"), 2);
    assert!(active.is_empty());
    let s1 = all.iter().find(|a| a.id == "s1").unwrap();
    assert_eq!(s1.status, SosStatus::Acknowledged);
    Ok(())
}

#[tokio::test]
async fn failed_mutation_does_not_invalidate() -> Result<()> {
    let (backend, console) = signed_in().await?;
    let sos = console.sos();

    sos.list().await?;
    assert!(sos.acknowledge("missing").await.is_err());
    sos.list().await?;

    assert_eq!(backend.state.hits("GET /admin/sos"), 1);
    Ok(())
}

#[tokio::test]
async fn backward_sos_transition_is_refused_when_status_is_known() -> Result<()> {
    let (backend, console) = signed_in().await?;
    let sos = console.sos();

    // Unknown status: the server decides
    sos.mark_safe("s2").await?;
    assert_eq!(backend.state.hits("PATCH /admin/sos/s2/safe"), 1);

    let all = sos.list().await?;
    assert_eq!(all.iter().find(|a| a.id == "s2").map(|a| a.status), Some(SosStatus::Resolved));

    let err = sos.acknowledge("s2").await.unwrap_err();
    assert_eq!(err.error_code(), "VALIDATION_ERROR");
    assert!(sos.dispatch("s2", None).await.is_err());
    assert_eq!(backend.state.hits("PATCH /admin/sos/s2/acknowledge"), 0);
    assert_eq!(backend.state.hits("PATCH /admin/sos/s2/dispatch"), 0);

    sos.dispatch("s1", Some("7")).await?;
    assert_eq!(backend.state.hits("PATCH /admin/sos/s1/dispatch"), 1);
    Ok(())
}

#[tokio::test]
async fn incident_update_invalidates_list_and_detail() -> Result<()> {
    let (backend, console) = signed_in().await?;
    let incidents = console.incidents();

    incidents.list().await?;
    incidents.detail("1").await?;
    incidents.by_status(IncidentStatus::Pending).await?;

    let update = IncidentUpdate {
        status: Some(IncidentStatus::Dispatched),
        ..IncidentUpdate::default()
    };
    let updated = incidents.update("1", &update).await?;
    assert_eq!(updated.map(|i| i.status), Some(IncidentStatus::Dispatched));

    let detail = incidents.detail("1").await?;
    incidents.list().await?;
    let pending = incidents.by_status(IncidentStatus::Pending).await?;

    assert_eq!(detail.status, IncidentStatus::Dispatched);
    assert!(pending.is_empty());
    assert_eq!(backend.state.hits("GET /admin/incidents"), 2);
    assert_eq!(backend.state.hits("GET /admin/incidents/1"), 2);
    assert_eq!(backend.state.hits("GET /admin/incidents?status=pending"), 2);
    Ok(())
}

#[tokio::test]
async fn empty_update_is_rejected_locally() -> Result<()> {
    let (backend, console) = signed_in().await?;

    let err = console.incidents().update("1", &IncidentUpdate::default()).await.unwrap_err();

    assert_eq!(err.error_code(), "VALIDATION_ERROR");
    assert_eq!(backend.state.hits("PATCH /admin/incidents/1"), 0);
    Ok(())
}

#[tokio::test]
async fn retrying_query_recovers_from_transient_failures() -> Result<()> {
    let (backend, console) = signed_in().await?;
    let spec = QuerySpec::new(QueryKey::root("flaky"), "/admin/flaky", SHORT).with_retry();

    let items: Vec<Value> = console.query().fetch_list(&spec).await?;

    assert!(items.is_empty());
    assert_eq!(backend.state.hits("GET /admin/flaky"), 3);
    Ok(())
}

#[tokio::test]
async fn queries_without_retry_fail_fast() -> Result<()> {
    let (backend, console) = signed_in().await?;
    let once = QuerySpec::new(QueryKey::root("broken"), "/admin/broken", SHORT);
    let retried = QuerySpec::new(QueryKey::root("broken").child("retried"), "/admin/broken", SHORT).with_retry();

    assert!(console.query().fetch_value(&once).await.is_err());
    assert_eq!(backend.state.hits("GET /admin/broken"), 1);

    assert!(console.query().fetch_value(&retried).await.is_err());
    assert_eq!(backend.state.hits("GET /admin/broken"), 4);
    Ok(())
}

#[tokio::test]
async fn null_list_is_empty() -> Result<()> {
    let (_backend, console) = signed_in().await?;
    assert!(console.personnel().users().await?.is_empty());
    assert_eq!(console.personnel().admins().await?.len(), 2);
    Ok(())
}

#[tokio::test]
async fn active_feed_polls_the_server() -> Result<()> {
    let (backend, console) = signed_in().await?;

    let ticks: Vec<_> = console
        .sos()
        .watch_active(Duration::from_millis(20))
        .take(3)
        .collect()
        .await;

    assert_eq!(ticks.len(), 3);
    assert!(ticks.iter().all(|t| matches!(t, Ok(alerts) if alerts.len() == 1)));
    assert_eq!(backend.state.hits("GET /admin/sos?status=active"), 3);
    assert!(SosApi::active_key().starts_with(&SosApi::root_key()));
    Ok(())
}

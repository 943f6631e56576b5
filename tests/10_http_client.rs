mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use beacon_console::http::{HttpClient, ResponseBody, UnauthorizedObserver};
use beacon_console::ClientError;
use serde_json::json;

#[derive(Default)]
struct CountingObserver(AtomicUsize);

impl UnauthorizedObserver for CountingObserver {
    fn on_unauthorized(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

async fn client(token: Option<&str>) -> Result<(common::MockBackend, HttpClient)> {
    let backend = common::spawn_backend().await?;
    let config = common::test_config(&backend);
    let http = HttpClient::new(&config.api, common::token_store(token))?;
    Ok((backend, http))
}

#[tokio::test]
async fn bearer_token_only_on_authenticated_namespace() -> Result<()> {
    let (backend, http) = client(Some(common::VALID_TOKEN)).await?;

    http.get("/admin/me").await?;
    http.post("/admin/auth/login", &json!({"email": "a@b", "password": common::PASSWORD}))
        .await?;

    assert_eq!(
        backend.state.last_auth("GET /admin/me"),
        Some(Some(format!("Bearer {}", common::VALID_TOKEN)))
    );
    assert_eq!(backend.state.last_auth("POST /admin/auth/login"), Some(None));
    Ok(())
}

#[tokio::test]
async fn missing_token_fails_without_request() -> Result<()> {
    let (backend, http) = client(None).await?;

    let err = http.get("/admin/incidents").await.unwrap_err();
    assert!(matches!(err, ClientError::NoToken));
    assert_eq!(backend.state.hits("GET /admin/incidents"), 0);
    Ok(())
}

#[tokio::test]
async fn slow_response_times_out() -> Result<()> {
    let (_backend, http) = client(Some(common::VALID_TOKEN)).await?;

    // The request must settle on its own well before the outer guard
    let result = tokio::time::timeout(Duration::from_secs(2), http.get("/admin/slow")).await?;
    let err = result.unwrap_err();

    assert!(matches!(err, ClientError::Timeout { timeout_ms: 300 }), "got {:?}", err);
    assert_eq!(err.status_code(), Some(408));
    Ok(())
}

#[tokio::test]
async fn non_json_bodies_fall_back_to_text() -> Result<()> {
    let (_backend, http) = client(Some(common::VALID_TOKEN)).await?;

    let body = http.get("/admin/text").await?;
    assert_eq!(body, ResponseBody::Text("pong".to_string()));

    let err = http.get("/admin/broken").await.unwrap_err();
    match err {
        ClientError::Http { status, message, .. } => {
            assert_eq!(status, 500);
            assert_eq!(message, "boom");
        }
        other => panic!("expected HTTP error, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn http_error_message_comes_from_body() -> Result<()> {
    let (_backend, http) = client(None).await?;

    let err = http
        .post("/admin/auth/login", &json!({"email": "a@b", "password": "wrong"}))
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), Some(401));
    assert_eq!(err.to_string(), "Invalid credentials");
    assert_eq!(err.to_json()["code"], "UNAUTHORIZED");
    Ok(())
}

#[tokio::test]
async fn unauthorized_clears_token_and_notifies() -> Result<()> {
    let (_backend, http) = client(Some("expired")).await?;
    let observer = Arc::new(CountingObserver::default());
    let handle: Arc<dyn UnauthorizedObserver> = observer.clone();
    http.register_observer(Arc::downgrade(&handle));

    let err = http.get("/admin/sos").await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(http.tokens().load()?, None);
    assert_eq!(observer.0.load(Ordering::SeqCst), 1);

    // With the token gone the next call never reaches the server
    assert!(matches!(http.get("/admin/sos").await, Err(ClientError::NoToken)));
    assert_eq!(observer.0.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn unreachable_backend_is_network_error() -> Result<()> {
    let mut config = beacon_console::ConsoleConfig::for_base_url("http://127.0.0.1:9");
    config.api.request_timeout_ms = 1_000;
    let http = HttpClient::new(&config.api, common::token_store(Some(common::VALID_TOKEN)))?;

    let err = http.get("/admin/me").await.unwrap_err();
    assert!(
        matches!(err, ClientError::Network(_) | ClientError::Timeout { .. }),
        "got {:?}",
        err
    );
    assert!(err.is_retryable());
    Ok(())
}

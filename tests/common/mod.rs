#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use beacon_console::storage::{MemoryTokenStore, TokenStore};
use beacon_console::{Console, ConsoleConfig};

pub const VALID_TOKEN: &str = "tok-valid";
pub const PASSWORD: &str = "correct-horse";

/// Backend state shared with the test so it can steer responses and count calls
pub struct MockState {
    hits: Mutex<HashMap<String, usize>>,
    auth_headers: Mutex<Vec<(String, Option<String>)>>,
    pub permissions: Mutex<Value>,
    pub sos: Mutex<Vec<Value>>,
    pub incidents: Mutex<Vec<Value>>,
    pub flaky_failures: Mutex<usize>,
    /// When set, `/admin/me` answers 200 with a body that is not valid JSON
    pub malformed_me: Mutex<bool>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            hits: Mutex::new(HashMap::new()),
            auth_headers: Mutex::new(Vec::new()),
            permissions: Mutex::new(json!(["manage_users"])),
            sos: Mutex::new(vec![
                json!({"id": "s1", "userName": "Ana Reyes", "status": "active", "message": "Help",
                       "location": {"latitude": 14.6, "longitude": 120.98}}),
                json!({"id": "s2", "userName": "Ben Cruz", "status": "acknowledged"}),
            ]),
            incidents: Mutex::new(vec![
                json!({"id": 1, "title": "House fire", "category": "fire", "priority": "high", "status": "pending"}),
                json!({"id": 2, "title": "Collision", "category": "traffic_accident", "priority": "medium", "status": "resolved"}),
            ]),
            flaky_failures: Mutex::new(2),
            malformed_me: Mutex::new(false),
        }
    }
}

impl MockState {
    fn record(&self, key: &str, headers: &HeaderMap) {
        *self.hits.lock().unwrap().entry(key.to_string()).or_default() += 1;
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.auth_headers.lock().unwrap().push((key.to_string(), auth));
    }

    pub fn hits(&self, key: &str) -> usize {
        self.hits.lock().unwrap().get(key).copied().unwrap_or(0)
    }

    /// Authorization header seen on the last request to `key`
    pub fn last_auth(&self, key: &str) -> Option<Option<String>> {
        self.auth_headers
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, auth)| auth.clone())
    }

    pub fn set_permissions(&self, permissions: Value) {
        *self.permissions.lock().unwrap() = permissions;
    }
}

pub struct MockBackend {
    pub base_url: String,
    pub state: Arc<MockState>,
}

type Shared = State<Arc<MockState>>;

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", VALID_TOKEN))
        .unwrap_or(false)
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({"message": "Unauthorized"}))).into_response()
}

#[derive(Deserialize)]
struct StatusQuery {
    status: Option<String>,
}

#[derive(Deserialize)]
struct Credentials {
    email: String,
    password: String,
}

async fn login(State(state): Shared, headers: HeaderMap, Json(body): Json<Credentials>) -> Response {
    state.record("POST /admin/auth/login", &headers);
    if body.password != PASSWORD {
        return (StatusCode::UNAUTHORIZED, Json(json!({"message": "Invalid credentials"}))).into_response();
    }
    Json(json!({"admin": {"email": body.email}, "token": VALID_TOKEN})).into_response()
}

async fn signup(State(state): Shared, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    state.record("POST /admin/auth/signup", &headers);
    (StatusCode::CREATED, Json(json!({"admin": body, "token": VALID_TOKEN}))).into_response()
}

async fn me(State(state): Shared, headers: HeaderMap) -> Response {
    state.record("GET /admin/me", &headers);
    if !authorized(&headers) {
        return unauthorized();
    }
    if *state.malformed_me.lock().unwrap() {
        return ([(header::CONTENT_TYPE, "application/json")], "{\"id\": 1, \"full_name\"").into_response();
    }
    let permissions = state.permissions.lock().unwrap().clone();
    Json(json!({
        "id": 1,
        "full_name": "Ana Reyes",
        "email": "ana@beacon.ph",
        "role": "admin",
        "permissions": permissions
    }))
    .into_response()
}

async fn incidents(State(state): Shared, headers: HeaderMap, Query(q): Query<StatusQuery>) -> Response {
    let key = match &q.status {
        Some(status) => format!("GET /admin/incidents?status={}", status),
        None => "GET /admin/incidents".to_string(),
    };
    state.record(&key, &headers);
    if !authorized(&headers) {
        return unauthorized();
    }
    let all = state.incidents.lock().unwrap().clone();
    let list: Vec<Value> = all
        .into_iter()
        .filter(|i| q.status.as_deref().map_or(true, |s| i["status"] == s))
        .collect();
    Json(Value::Array(list)).into_response()
}

async fn incident_detail(State(state): Shared, headers: HeaderMap, Path(id): Path<String>) -> Response {
    state.record(&format!("GET /admin/incidents/{}", id), &headers);
    if !authorized(&headers) {
        return unauthorized();
    }
    let found = state
        .incidents
        .lock()
        .unwrap()
        .iter()
        .find(|i| i["id"].to_string().trim_matches('"') == id)
        .cloned();
    match found {
        Some(incident) => Json(incident).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"message": "Incident not found"}))).into_response(),
    }
}

async fn incident_update(
    State(state): Shared,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    state.record(&format!("PATCH /admin/incidents/{}", id), &headers);
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut incidents = state.incidents.lock().unwrap();
    match incidents.iter_mut().find(|i| i["id"].to_string().trim_matches('"') == id) {
        Some(incident) => {
            if let (Some(target), Some(patch)) = (incident.as_object_mut(), body.as_object()) {
                for (k, v) in patch {
                    target.insert(k.clone(), v.clone());
                }
            }
            Json(incident.clone()).into_response()
        }
        None => (StatusCode::NOT_FOUND, Json(json!({"message": "Incident not found"}))).into_response(),
    }
}

async fn sos_list(State(state): Shared, headers: HeaderMap, Query(q): Query<StatusQuery>) -> Response {
    let key = match &q.status {
        Some(status) => format!("GET /admin/sos?status={}", status),
        None => "GET /admin/sos".to_string(),
    };
    state.record(&key, &headers);
    if !authorized(&headers) {
        return unauthorized();
    }
    let all = state.sos.lock().unwrap().clone();
    let list: Vec<Value> = all
        .into_iter()
        .filter(|a| q.status.as_deref().map_or(true, |s| a["status"] == s))
        .collect();
    Json(Value::Array(list)).into_response()
}

async fn sos_transition(
    State(state): Shared,
    headers: HeaderMap,
    Path((id, action)): Path<(String, String)>,
) -> Response {
    state.record(&format!("PATCH /admin/sos/{}/{}", id, action), &headers);
    if !authorized(&headers) {
        return unauthorized();
    }
    let status = match action.as_str() {
        "acknowledge" => "acknowledged",
        "dispatch" => "responding",
        "safe" => "resolved",
        _ => return StatusCode::NOT_FOUND.into_response(),
    };
    let mut alerts = state.sos.lock().unwrap();
    match alerts.iter_mut().find(|a| a["id"] == id) {
        Some(alert) => {
            alert["status"] = json!(status);
            Json(alert.clone()).into_response()
        }
        None => (StatusCode::NOT_FOUND, Json(json!({"message": "SOS not found"}))).into_response(),
    }
}

async fn admins(State(state): Shared, headers: HeaderMap) -> Response {
    state.record("GET /admin/admins", &headers);
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!([
        {"id": 1, "full_name": "Ana Reyes", "email": "ana@beacon.ph", "role": "admin"},
        {"id": 2, "full_name": "Carlo Dizon", "email": "carlo@beacon.ph", "role": "dispatcher"}
    ]))
    .into_response()
}

async fn users(State(state): Shared, headers: HeaderMap) -> Response {
    state.record("GET /admin/users", &headers);
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(Value::Null).into_response()
}

async fn slow(State(state): Shared, headers: HeaderMap) -> Response {
    state.record("GET /admin/slow", &headers);
    tokio::time::sleep(Duration::from_secs(3)).await;
    Json(json!({"ok": true})).into_response()
}

async fn text(State(state): Shared, headers: HeaderMap) -> Response {
    state.record("GET /admin/text", &headers);
    "pong".into_response()
}

async fn broken(State(state): Shared, headers: HeaderMap) -> Response {
    state.record("GET /admin/broken", &headers);
    (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response()
}

async fn flaky(State(state): Shared, headers: HeaderMap) -> Response {
    state.record("GET /admin/flaky", &headers);
    let mut remaining = state.flaky_failures.lock().unwrap();
    if *remaining > 0 {
        *remaining -= 1;
        return (StatusCode::SERVICE_UNAVAILABLE, Json(json!({"message": "try later"}))).into_response();
    }
    Json(json!([])).into_response()
}

fn router(state: Arc<MockState>) -> Router {
    Router::new()
        .route("/admin/auth/login", post(login))
        .route("/admin/auth/signup", post(signup))
        .route("/admin/me", get(me))
        .route("/admin/incidents", get(incidents))
        .route("/admin/incidents/:id", get(incident_detail).patch(incident_update))
        .route("/admin/sos", get(sos_list))
        .route("/admin/sos/:id/:action", patch(sos_transition))
        .route("/admin/admins", get(admins))
        .route("/admin/users", get(users))
        .route("/admin/slow", get(slow))
        .route("/admin/text", get(text))
        .route("/admin/broken", get(broken))
        .route("/admin/flaky", get(flaky))
        .with_state(state)
}

/// Start a fresh backend on an ephemeral port
pub async fn spawn_backend() -> Result<MockBackend> {
    let state = Arc::new(MockState::default());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = router(state.clone());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("mock backend stopped: {}", e);
        }
    });

    Ok(MockBackend {
        base_url: format!("http://{}", addr),
        state,
    })
}

/// Config pointed at the mock with short timeouts and backoff
pub fn test_config(backend: &MockBackend) -> ConsoleConfig {
    let mut config = ConsoleConfig::for_base_url(&backend.base_url);
    config.api.request_timeout_ms = 300;
    config.retry.base_delay_ms = 10;
    config.retry.max_delay_ms = 50;
    config
}

pub fn token_store(token: Option<&str>) -> Arc<dyn TokenStore> {
    match token {
        Some(t) => Arc::new(MemoryTokenStore::with_token(t)),
        None => Arc::new(MemoryTokenStore::new()),
    }
}

pub fn console(backend: &MockBackend, tokens: Arc<dyn TokenStore>) -> Result<Console> {
    Ok(Console::new(test_config(backend), tokens)?)
}

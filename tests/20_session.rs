mod common;

use std::sync::Arc;

use anyhow::Result;
use beacon_console::api::SignupRole;
use beacon_console::permissions::Permission;
use beacon_console::router::Route;
use beacon_console::storage::{FileTokenStore, TokenStore};
use beacon_console::{Console, ConsoleConfig, SessionStatus};
use serde_json::json;

#[tokio::test]
async fn mount_with_valid_token_authenticates() -> Result<()> {
    let backend = common::spawn_backend().await?;
    backend.state.set_permissions(json!(["manage_users", "view_incidents"]));
    let console = common::console(&backend, common::token_store(Some(common::VALID_TOKEN)))?;

    let session = console.mount().await;

    assert_eq!(session.status, SessionStatus::Authenticated);
    let principal = session.principal.as_ref().unwrap();
    assert_eq!(principal.name, "Ana Reyes");
    assert_eq!(principal.id, "1");
    assert!(console.session().has_permission(&Permission::ManageUsers));
    assert!(!console.session().has_permission(&Permission::ManageAdmins));
    assert!(console
        .session()
        .has_all_permissions(&[Permission::ManageUsers, Permission::ViewIncidents]));
    Ok(())
}

#[tokio::test]
async fn mount_without_token_makes_no_request() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let console = common::console(&backend, common::token_store(None))?;

    let session = console.mount().await;

    assert_eq!(session.status, SessionStatus::Unauthenticated);
    assert_eq!(backend.state.hits("GET /admin/me"), 0);
    Ok(())
}

#[tokio::test]
async fn rejected_token_is_cleared_once() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let tokens = common::token_store(Some("expired"));
    let console = common::console(&backend, tokens.clone())?;

    let session = console.mount().await;

    assert_eq!(session.status, SessionStatus::Unauthenticated);
    assert_eq!(tokens.load()?, None);
    assert_eq!(console.session().expirations(), 1);
    assert_eq!(console.navigator().current(), Route::Auth);
    Ok(())
}

#[tokio::test]
async fn concurrent_401s_end_the_session_exactly_once() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let tokens = common::token_store(Some(common::VALID_TOKEN));
    let console = common::console(&backend, tokens.clone())?;
    console.mount().await;
    assert!(console.session().snapshot().is_authenticated());

    // Server-side revocation: the stored token no longer works
    tokens.save("revoked")?;
    let mut rx = console.session().subscribe();
    let _ = rx.borrow_and_update();

    let (a, b) = futures::join!(console.incidents().list(), console.sos().list());

    assert!(a.unwrap_err().is_unauthorized());
    assert!(b.unwrap_err().is_unauthorized());
    assert_eq!(console.session().expirations(), 1);
    assert_eq!(console.session().status(), SessionStatus::Unauthenticated);
    assert!(rx.has_changed()?);
    assert_eq!(tokens.load()?, None);
    Ok(())
}

#[tokio::test]
async fn login_stores_token_and_lands_on_dashboard() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let tokens = common::token_store(None);
    let console = common::console(&backend, tokens.clone())?;
    console.mount().await;

    let session = console.login("ana@beacon.ph", common::PASSWORD).await?;

    assert!(session.is_authenticated());
    assert_eq!(tokens.load()?.as_deref(), Some(common::VALID_TOKEN));
    assert_eq!(console.navigator().current(), Route::Dashboard);
    assert_eq!(backend.state.hits("GET /admin/me"), 1);
    Ok(())
}

#[tokio::test]
async fn failed_login_leaves_session_signed_out() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let console = common::console(&backend, common::token_store(None))?;
    console.mount().await;

    let err = console.login("ana@beacon.ph", "nope").await.unwrap_err();

    assert_eq!(err.to_string(), "Invalid credentials");
    assert_eq!(console.session().status(), SessionStatus::Unauthenticated);
    assert_eq!(console.session().expirations(), 0);
    Ok(())
}

#[tokio::test]
async fn signup_validates_before_sending() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let console = common::console(&backend, common::token_store(None))?;
    console.mount().await;

    let err = console
        .signup("Ana Reyes", "ana@beacon.ph", "short", SignupRole::Personnel)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Password must be at least 8 characters.");
    assert_eq!(backend.state.hits("POST /admin/auth/signup"), 0);

    let session = console
        .signup("Ana Reyes", "ana@beacon.ph", "long-enough", SignupRole::Admin)
        .await?;
    assert!(session.is_authenticated());
    Ok(())
}

#[tokio::test]
async fn logout_clears_everything() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let tokens = common::token_store(Some(common::VALID_TOKEN));
    let console = common::console(&backend, tokens.clone())?;
    console.mount().await;
    console.incidents().list().await?;

    console.logout()?;

    assert_eq!(tokens.load()?, None);
    assert_eq!(console.session().status(), SessionStatus::Unauthenticated);
    assert!(!console.session().has_permission(&Permission::ManageUsers));
    assert!(console.query().cache().is_empty());
    assert_eq!(console.navigator().current(), Route::Auth);
    Ok(())
}

#[tokio::test]
async fn malformed_principal_ends_the_session() -> Result<()> {
    let backend = common::spawn_backend().await?;
    *backend.state.malformed_me.lock().unwrap() = true;
    let tokens = common::token_store(Some(common::VALID_TOKEN));
    let console = common::console(&backend, tokens.clone())?;

    let session = console.mount().await;

    assert_eq!(session.status, SessionStatus::Unauthenticated);
    assert_eq!(tokens.load()?, None);
    assert_eq!(console.session().expirations(), 1);
    assert_eq!(console.navigator().current(), Route::Auth);
    Ok(())
}

#[tokio::test]
async fn unreachable_backend_ends_the_session() -> Result<()> {
    let mut config = ConsoleConfig::for_base_url("http://127.0.0.1:9");
    config.api.request_timeout_ms = 500;
    let tokens = common::token_store(Some(common::VALID_TOKEN));
    let console = Console::new(config, tokens.clone())?;

    let session = console.mount().await;

    assert_eq!(session.status, SessionStatus::Unauthenticated);
    assert_eq!(tokens.load()?, None);
    assert_eq!(console.navigator().current(), Route::Auth);
    Ok(())
}

#[tokio::test]
async fn corrupt_storage_file_does_not_strand_the_session() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let dir = std::env::temp_dir().join(format!("beacon-session-corrupt-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    let store = FileTokenStore::in_config_dir(Some(dir.clone()), "admin_token")?;
    std::fs::write(store.path(), "{not json")?;
    let console = common::console(&backend, Arc::new(store.clone()))?;

    let session = console.mount().await;
    assert_eq!(session.status, SessionStatus::Unauthenticated);
    assert_eq!(backend.state.hits("GET /admin/me"), 0);
    assert_eq!(store.load()?, None);

    let screen = console.open("/dashboard").await;
    assert_eq!(screen.location, Route::Auth);

    console.logout()?;
    assert_eq!(console.session().status(), SessionStatus::Unauthenticated);

    console.login("ana@beacon.ph", common::PASSWORD).await?;
    assert_eq!(store.load()?.as_deref(), Some(common::VALID_TOKEN));

    let _ = std::fs::remove_dir_all(dir);
    Ok(())
}

#[tokio::test]
async fn failed_relogin_while_signed_in_ends_the_session() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let tokens = common::token_store(Some(common::VALID_TOKEN));
    let console = common::console(&backend, tokens.clone())?;
    console.mount().await;
    assert!(console.session().snapshot().is_authenticated());

    let err = console.login("ana@beacon.ph", "nope").await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(tokens.load()?, None);
    assert_eq!(console.session().status(), SessionStatus::Unauthenticated);
    assert_eq!(console.session().expirations(), 1);
    Ok(())
}

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::api::auth::{AuthApi, LoginRequest, SignupRequest, SignupRole};
use crate::error::ClientResult;
use crate::http::{HttpClient, UnauthorizedObserver};
use crate::models::Role;
use crate::permissions::{Permission, PermissionSet};
use crate::router::{Navigator, Route};
use crate::storage::TokenStore;

/// Body of `GET /admin/me`
#[derive(Debug, Clone, Deserialize)]
pub struct MeResponse {
    #[serde(default, deserialize_with = "crate::models::flexible_id::deserialize_option")]
    pub id: Option<String>,
    #[serde(default, alias = "full_name", alias = "fullName")]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub permissions: PermissionSet,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Unauthenticated,
    Loading,
    Authenticated,
}

/// Snapshot of who is signed in and what they may do
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub status: SessionStatus,
    pub principal: Option<Principal>,
    pub permissions: PermissionSet,
}

impl Session {
    pub fn loading() -> Self {
        Self {
            status: SessionStatus::Loading,
            principal: None,
            permissions: PermissionSet::default(),
        }
    }

    pub fn unauthenticated() -> Self {
        Self {
            status: SessionStatus::Unauthenticated,
            ..Self::loading()
        }
    }

    pub fn authenticated(me: MeResponse) -> Self {
        let name = me
            .name
            .filter(|n| !n.trim().is_empty())
            .or_else(|| me.email.clone())
            .unwrap_or_else(|| "Operator".to_string());

        Self {
            status: SessionStatus::Authenticated,
            principal: Some(Principal {
                id: me.id.unwrap_or_default(),
                name,
                email: me.email,
                role: me.role,
            }),
            permissions: me.permissions,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.status == SessionStatus::Authenticated
    }

    /// False whenever not authenticated, whatever the set holds
    pub fn has_permission(&self, permission: &Permission) -> bool {
        self.is_authenticated() && self.permissions.contains(permission)
    }

    pub fn has_any_permission(&self, permissions: &[Permission]) -> bool {
        self.is_authenticated() && self.permissions.contains_any(permissions)
    }

    pub fn has_all_permissions(&self, permissions: &[Permission]) -> bool {
        self.is_authenticated() && self.permissions.contains_all(permissions)
    }
}

/// Owns the session. Every transition goes through here; everything else
/// reads snapshots or subscribes.
pub struct SessionProvider {
    auth: AuthApi,
    tokens: Arc<dyn TokenStore>,
    navigator: Arc<Navigator>,
    state: watch::Sender<Session>,
    expirations: AtomicU64,
}

impl SessionProvider {
    /// Build the provider and register it for 401 notifications from `http`
    pub fn new(http: Arc<HttpClient>, navigator: Arc<Navigator>) -> Arc<Self> {
        let (state, _) = watch::channel(Session::loading());
        let provider = Arc::new(Self {
            auth: AuthApi::new(http.clone()),
            tokens: http.tokens().clone(),
            navigator,
            state,
            expirations: AtomicU64::new(0),
        });

        let observer: Arc<dyn UnauthorizedObserver> = provider.clone();
        http.register_observer(Arc::downgrade(&observer));
        provider
    }

    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    pub fn status(&self) -> SessionStatus {
        self.state.borrow().status
    }

    pub fn has_permission(&self, permission: &Permission) -> bool {
        self.state.borrow().has_permission(permission)
    }

    pub fn has_any_permission(&self, permissions: &[Permission]) -> bool {
        self.state.borrow().has_any_permission(permissions)
    }

    pub fn has_all_permissions(&self, permissions: &[Permission]) -> bool {
        self.state.borrow().has_all_permissions(permissions)
    }

    /// How many times an established or loading session was ended by the server
    pub fn expirations(&self) -> u64 {
        self.expirations.load(Ordering::SeqCst)
    }

    /// Resolve the stored token into a session.
    ///
    /// With no token the session settles as unauthenticated without a
    /// request. Any failure leaves the session unauthenticated and the
    /// error is returned for the caller to show.
    pub async fn bootstrap(&self) -> ClientResult<Session> {
        let token = match self.tokens.load() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!("Stored token unreadable: {}", e);
                self.expire();
                return Err(e);
            }
        };

        if token.is_none() {
            self.state.send_replace(Session::unauthenticated());
            tracing::debug!("No stored token; session unauthenticated");
            return Ok(self.snapshot());
        }

        self.state.send_replace(Session::loading());

        match self.auth.me().await {
            Ok(me) => {
                let session = Session::authenticated(me);
                tracing::info!(
                    "Session established for {} ({} permissions)",
                    session.principal.as_ref().map(|p| p.name.as_str()).unwrap_or("?"),
                    session.permissions.len()
                );
                self.state.send_replace(session.clone());
                Ok(session)
            }
            Err(e) => {
                tracing::warn!("Session bootstrap failed: {}", e);
                self.expire();
                Err(e)
            }
        }
    }

    /// Exchange credentials for a token, then load the principal and land
    /// on the default page
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<Session> {
        let request = LoginRequest::new(email, password)?;
        let response = self.auth.login(&request).await?;
        self.establish(response.token).await
    }

    pub async fn signup(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
        role: SignupRole,
    ) -> ClientResult<Session> {
        let request = SignupRequest::new(full_name, email, password, role)?;
        let response = self.auth.signup(&request).await?;
        self.establish(response.token).await
    }

    async fn establish(&self, token: String) -> ClientResult<Session> {
        self.tokens.save(&token)?;
        let session = self.bootstrap().await?;
        self.navigator.replace(Route::DEFAULT);
        Ok(session)
    }

    /// Reset to unauthenticated, then forget the token. The state is reset
    /// even when the store cannot be cleared; that error is still returned.
    pub fn logout(&self) -> ClientResult<()> {
        self.state.send_replace(Session::unauthenticated());
        self.navigator.replace(Route::Auth);
        tracing::info!("Signed out");

        self.tokens.clear().map_err(|e| {
            tracing::error!("Failed to clear token on logout: {}", e);
            e
        })
    }

    /// Move to unauthenticated at most once per established session
    fn expire(&self) {
        let changed = self.state.send_if_modified(|session| {
            if session.status == SessionStatus::Unauthenticated {
                false
            } else {
                *session = Session::unauthenticated();
                true
            }
        });

        if changed {
            if let Err(e) = self.tokens.clear() {
                tracing::error!("Failed to clear token: {}", e);
            }
            self.expirations.fetch_add(1, Ordering::SeqCst);
            self.navigator.replace(Route::Auth);
            tracing::info!("Session ended; returning to sign-in");
        }
    }
}

impl UnauthorizedObserver for SessionProvider {
    fn on_unauthorized(&self) {
        self.expire();
    }
}

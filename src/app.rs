use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use crate::api::{IncidentsApi, PersonnelApi, SignupRole, SosApi};
use crate::config::ConsoleConfig;
use crate::error::ClientResult;
use crate::http::HttpClient;
use crate::layout::Layout;
use crate::pages::{self, PageContext, PageParams, View};
use crate::query::QueryClient;
use crate::retry::RetryPolicy;
use crate::router::{self, Navigator, Resolution, Route};
use crate::session::{Session, SessionProvider};
use crate::storage::{FileTokenStore, TokenStore};

const MAX_REDIRECTS: usize = 4;

/// Result of opening a location
#[derive(Debug, Clone, Serialize)]
pub struct Screen {
    pub location: Route,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub redirects: Vec<Route>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<Layout>,
    /// None while the session is still loading
    pub view: Option<View>,
}

impl Screen {
    pub fn is_pending(&self) -> bool {
        self.view.is_none()
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(layout) = &self.layout {
            writeln!(f, "{}", layout)?;
        }
        match &self.view {
            Some(view) => write!(f, "{}", view),
            None => writeln!(f, "Loading..."),
        }
    }
}

/// The whole console: configuration, session, navigation and data hooks
pub struct Console {
    config: ConsoleConfig,
    query: Arc<QueryClient>,
    session: Arc<SessionProvider>,
    navigator: Arc<Navigator>,
    incidents: IncidentsApi,
    sos: SosApi,
    personnel: PersonnelApi,
}

impl Console {
    pub fn new(config: ConsoleConfig, tokens: Arc<dyn TokenStore>) -> ClientResult<Self> {
        let http = Arc::new(
            HttpClient::new(&config.api, tokens)?.with_response_logging(config.logging.log_responses),
        );
        let navigator = Arc::new(Navigator::default());
        let session = SessionProvider::new(http.clone(), navigator.clone());
        let query = Arc::new(QueryClient::new(http, RetryPolicy::from_config(&config.retry)));

        tracing::debug!(
            "Console for {} ({:?}, timeout {}ms)",
            config.api.base_url,
            config.environment,
            config.api.request_timeout_ms
        );

        Ok(Self {
            incidents: IncidentsApi::new(query.clone()),
            sos: SosApi::new(query.clone()),
            personnel: PersonnelApi::new(query.clone()),
            config,
            query,
            session,
            navigator,
        })
    }

    /// Console backed by the token file under the configured directory
    pub fn from_config(config: ConsoleConfig) -> ClientResult<Self> {
        let tokens = FileTokenStore::in_config_dir(
            config.storage.config_dir.clone(),
            config.storage.token_key.clone(),
        )?;
        Self::new(config, Arc::new(tokens))
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    pub fn session(&self) -> &Arc<SessionProvider> {
        &self.session
    }

    pub fn navigator(&self) -> &Arc<Navigator> {
        &self.navigator
    }

    pub fn query(&self) -> &Arc<QueryClient> {
        &self.query
    }

    pub fn incidents(&self) -> &IncidentsApi {
        &self.incidents
    }

    pub fn sos(&self) -> &SosApi {
        &self.sos
    }

    pub fn personnel(&self) -> &PersonnelApi {
        &self.personnel
    }

    /// Resolve the stored token once, as on page load. Failures leave the
    /// session unauthenticated; they are logged, not returned.
    pub async fn mount(&self) -> Session {
        if let Err(e) = self.session.bootstrap().await {
            tracing::debug!("Mount without session: {}", e);
        }
        self.session.snapshot()
    }

    pub async fn login(&self, email: &str, password: &str) -> ClientResult<Session> {
        self.query.cache().clear();
        self.session.login(email, password).await
    }

    pub async fn signup(&self, full_name: &str, email: &str, password: &str, role: SignupRole) -> ClientResult<Session> {
        self.query.cache().clear();
        self.session.signup(full_name, email, password, role).await
    }

    pub fn logout(&self) -> ClientResult<()> {
        self.query.cache().clear();
        self.session.logout()
    }

    /// Navigate to `location` and render what the guard allows.
    ///
    /// Redirects are followed. A page whose fetches end the session (401) is
    /// resolved again, which sends it to sign-in.
    pub async fn open(&self, location: &str) -> Screen {
        let params = PageParams::from_location(location);
        let mut route = Route::parse(location);
        let mut redirects = Vec::new();

        for _ in 0..=MAX_REDIRECTS {
            let session = self.session.snapshot();

            match router::resolve(&route, &session) {
                Resolution::Pending => {
                    return Screen {
                        location: route,
                        redirects,
                        layout: None,
                        view: None,
                    };
                }
                Resolution::Redirect(target) => {
                    tracing::debug!("{} redirects to {}", route, target);
                    redirects.push(target.clone());
                    route = target;
                }
                Resolution::Render(target) => {
                    self.navigator.replace(target.clone());
                    let view = self.render(&target, &session, &params).await;

                    let after = self.session.snapshot();
                    if after != session && router::resolve(&target, &after) != Resolution::Render(target.clone()) {
                        continue;
                    }

                    let layout = (after.is_authenticated() && target != Route::Auth)
                        .then(|| Layout::for_session(&after, &target));

                    return Screen {
                        location: target,
                        redirects,
                        layout,
                        view: Some(view),
                    };
                }
            }
        }

        tracing::warn!("Too many redirects opening {}", location);
        Screen {
            location: route.clone(),
            redirects,
            layout: None,
            view: Some(pages::not_found::render(route.path())),
        }
    }

    async fn render(&self, route: &Route, session: &Session, params: &PageParams) -> View {
        let ctx = PageContext {
            session,
            incidents: &self.incidents,
            sos: &self.sos,
            personnel: &self.personnel,
            params,
            now: Utc::now(),
        };
        pages::render(route, &ctx).await
    }
}
